/// Popup UI for the Tab Courier extension

use crate::courier::{CourierClient, Credentials, share_active_tab};
use crate::error::CourierError;
use crate::inspect::{ConsoleLogger, inspect_active_tab};
use crate::settings::{CourierSettings, load_settings, save_settings, sign_in, verify_session};
use crate::tabs::BrowserTabs;
use crate::transport::FetchTransport;
use crate::ui::components::{ActionState, StatusView, TextField};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum Pane {
    CurrentTab,
    Settings,
}

fn now_secs() -> u64 {
    (js_sys::Date::now() / 1000.0) as u64
}

fn describe_error(err: &CourierError) -> String {
    match err {
        CourierError::Unauthorized => "Session expired, sign in again in Settings.".to_string(),
        CourierError::InvalidSettings { message } => format!("{} (open Settings)", message),
        other => other.to_string(),
    }
}

/// Drop a stored session the backend no longer accepts
async fn refresh_session(mut settings: CourierSettings) -> CourierSettings {
    let client = match CourierClient::new(&settings.api_base, FetchTransport) {
        Ok(client) => client,
        Err(_) => return settings,
    };

    if verify_session(&mut settings, &client, now_secs()).await {
        if let Err(e) = save_settings(&settings).await {
            log::error!("Failed to save settings: {}", e);
        }
    }

    settings
}

#[function_component(App)]
pub fn app() -> Html {
    let settings = use_state(CourierSettings::default);
    let status = use_state(|| ActionState::Idle);
    let active_pane = use_state(|| Pane::CurrentTab);
    let api_base_input = use_state(String::new);
    let channel_input = use_state(String::new);
    let email_input = use_state(String::new);
    let password_input = use_state(String::new);

    // Load settings on mount
    {
        let settings = settings.clone();
        let api_base_input = api_base_input.clone();
        let channel_input = channel_input.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_settings().await {
                    Ok(loaded) => {
                        api_base_input.set(loaded.api_base.clone());
                        channel_input.set(loaded.channel_id.clone());
                        settings.set(refresh_session(loaded).await);
                    }
                    Err(e) => log::error!("Failed to load settings: {}", e),
                }
            });
            || ()
        });
    }

    // Get current tab: logs only, nothing is shown in the popup
    let on_get_tab = Callback::from(|_: MouseEvent| {
        spawn_local(async {
            if let Err(e) = inspect_active_tab(&BrowserTabs, &ConsoleLogger).await {
                log::error!("Tab query failed: {}", e);
            }
        });
    });

    // Send the active tab's URL to the configured channel
    let on_share = {
        let settings = settings.clone();
        let status = status.clone();

        Callback::from(move |_: MouseEvent| {
            let current = (*settings).clone();
            let status = status.clone();

            status.set(ActionState::Busy("Sending...".to_string()));

            spawn_local(async move {
                let outcome = match CourierClient::new(&current.api_base, FetchTransport) {
                    Ok(client) => share_active_tab(&BrowserTabs, &client, &current, now_secs()).await,
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok(receipt) => {
                        let label = receipt.title.unwrap_or(receipt.url);
                        status.set(ActionState::Success(format!("Sent \"{}\"", label)));
                    }
                    Err(e) => {
                        log::error!("Share failed: {}", e);
                        status.set(ActionState::Error(describe_error(&e)));
                    }
                }
            });
        })
    };

    // Save API base and channel
    let on_save = {
        let settings = settings.clone();
        let status = status.clone();
        let api_base_input = api_base_input.clone();
        let channel_input = channel_input.clone();

        Callback::from(move |_: MouseEvent| {
            let mut updated = CourierSettings::new(&api_base_input, &channel_input);
            updated.session = settings.session.clone();

            if let Err(e) = updated.validate() {
                status.set(ActionState::Error(e.to_string()));
                return;
            }

            let settings = settings.clone();
            let status = status.clone();
            status.set(ActionState::Busy("Saving...".to_string()));

            spawn_local(async move {
                match save_settings(&updated).await {
                    Ok(_) => {
                        settings.set(updated);
                        status.set(ActionState::Success("Settings saved".to_string()));
                    }
                    Err(e) => status.set(ActionState::Error(format!("Failed to save: {}", e))),
                }
            });
        })
    };

    // Ping the backend at the typed base URL
    let on_test = {
        let status = status.clone();
        let api_base_input = api_base_input.clone();

        Callback::from(move |_: MouseEvent| {
            let api_base = (*api_base_input).clone();
            let status = status.clone();

            status.set(ActionState::Busy("Contacting server...".to_string()));

            spawn_local(async move {
                let outcome = match CourierClient::new(&api_base, FetchTransport) {
                    Ok(client) => client.ping().await,
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok(_) => status.set(ActionState::Success("Server reachable".to_string())),
                    Err(e) => status.set(ActionState::Error(describe_error(&e))),
                }
            });
        })
    };

    let on_sign_in = {
        let settings = settings.clone();
        let status = status.clone();
        let email_input = email_input.clone();
        let password_input = password_input.clone();

        Callback::from(move |_: MouseEvent| {
            let current = (*settings).clone();
            let credentials = Credentials {
                email: email_input.trim().to_string(),
                password: (*password_input).clone(),
            };
            let settings = settings.clone();
            let status = status.clone();
            let password_input = password_input.clone();

            status.set(ActionState::Busy("Signing in...".to_string()));

            spawn_local(async move {
                let outcome = match CourierClient::new(&current.api_base, FetchTransport) {
                    Ok(client) => sign_in(&current, &client, &credentials, now_secs()).await,
                    Err(e) => Err(e),
                };

                let saved = match outcome {
                    Ok(updated) => save_settings(&updated).await.map(|_| updated),
                    Err(e) => Err(e),
                };

                match saved {
                    Ok(updated) => {
                        password_input.set(String::new());
                        settings.set(updated);
                        status.set(ActionState::Success("Signed in".to_string()));
                    }
                    Err(e) => status.set(ActionState::Error(describe_error(&e))),
                }
            });
        })
    };

    let on_register = {
        let settings = settings.clone();
        let status = status.clone();
        let email_input = email_input.clone();
        let password_input = password_input.clone();

        Callback::from(move |_: MouseEvent| {
            let api_base = settings.api_base.clone();
            let credentials = Credentials {
                email: email_input.trim().to_string(),
                password: (*password_input).clone(),
            };
            let status = status.clone();

            status.set(ActionState::Busy("Creating account...".to_string()));

            spawn_local(async move {
                let outcome = match CourierClient::new(&api_base, FetchTransport) {
                    Ok(client) => client.register(&credentials).await,
                    Err(e) => Err(e),
                };

                match outcome {
                    Ok(registration) if registration.needs_confirmation() => status.set(
                        ActionState::Success("Check your inbox to confirm the account".to_string()),
                    ),
                    Ok(_) => status.set(ActionState::Success(
                        "Account created, you can sign in now".to_string(),
                    )),
                    Err(e) => status.set(ActionState::Error(describe_error(&e))),
                }
            });
        })
    };

    let on_sign_out = {
        let settings = settings.clone();
        let status = status.clone();

        Callback::from(move |_: MouseEvent| {
            let mut updated = (*settings).clone();
            if !updated.sign_out() {
                return;
            }

            let settings = settings.clone();
            let status = status.clone();

            spawn_local(async move {
                match save_settings(&updated).await {
                    Ok(_) => {
                        settings.set(updated);
                        status.set(ActionState::Idle);
                    }
                    Err(e) => status.set(ActionState::Error(format!("Failed to save: {}", e))),
                }
            });
        })
    };

    let on_input = |handle: &UseStateHandle<String>| {
        let handle = handle.clone();
        Callback::from(move |value: String| handle.set(value))
    };

    let on_pane_click = {
        let active_pane = active_pane.clone();
        move |pane: Pane| {
            let active_pane = active_pane.clone();
            Callback::from(move |_: MouseEvent| {
                active_pane.set(pane.clone());
            })
        }
    };

    let pane_class = |pane: Pane| {
        if *active_pane == pane {
            "pf-v5-c-tabs__item pf-m-current"
        } else {
            "pf-v5-c-tabs__item"
        }
    };

    let is_busy = status.is_busy();
    // Account actions talk to the saved base, so the field must not hold unsaved edits
    let base_saved = settings.base_matches(&api_base_input);
    let signed_in_as = settings.signed_in_as(now_secs()).map(str::to_string);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Tab Courier"}</h1>

            // Pane navigation
            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <li class={pane_class(Pane::CurrentTab)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_pane_click(Pane::CurrentTab)}>
                            <span class="pf-v5-c-tabs__item-text">{"Current tab"}</span>
                        </button>
                    </li>
                    <li class={pane_class(Pane::Settings)}>
                        <button class="pf-v5-c-tabs__link" onclick={on_pane_click(Pane::Settings)}>
                            <span class="pf-v5-c-tabs__item-text">{"Settings"}</span>
                        </button>
                    </li>
                </ul>
            </div>

            <StatusView state={(*status).clone()} />

            <div class="tab-pane-content">
                {match &*active_pane {
                    Pane::CurrentTab => html! {
                        <div class="flex-column-gap card">
                            <Button onclick={on_get_tab} variant={ButtonVariant::Secondary} block={true}>
                                {"Get current tab"}
                            </Button>
                            <Button onclick={on_share} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                                {"Send to channel"}
                            </Button>
                        </div>
                    },
                    Pane::Settings => html! {
                        <div class="flex-column-gap">
                            <TextField
                                label="API base URL"
                                placeholder="https://courier.example.workers.dev"
                                value={(*api_base_input).clone()}
                                oninput={on_input(&api_base_input)}
                                disabled={is_busy}
                            />
                            <TextField
                                label="Channel id"
                                placeholder="112233445566778899"
                                value={(*channel_input).clone()}
                                oninput={on_input(&channel_input)}
                                disabled={is_busy}
                            />
                            <div class="button-row">
                                <Button onclick={on_save} disabled={is_busy} variant={ButtonVariant::Primary}>
                                    {"Save"}
                                </Button>
                                <Button onclick={on_test} disabled={is_busy} variant={ButtonVariant::Secondary}>
                                    {"Test connection"}
                                </Button>
                            </div>

                            if let Some(email) = signed_in_as {
                                <div class="account-row">
                                    <p class="message-text">{format!("Signed in as {}", email)}</p>
                                    <Button onclick={on_sign_out} disabled={is_busy} variant={ButtonVariant::Secondary}>
                                        {"Sign out"}
                                    </Button>
                                </div>
                            } else {
                                <>
                                <TextField
                                    label="Email"
                                    input_type="email"
                                    value={(*email_input).clone()}
                                    oninput={on_input(&email_input)}
                                    disabled={is_busy}
                                />
                                <TextField
                                    label="Password"
                                    input_type="password"
                                    value={(*password_input).clone()}
                                    oninput={on_input(&password_input)}
                                    disabled={is_busy}
                                />
                                if !base_saved {
                                    <p class="message-text">{"Save the API base URL before signing in."}</p>
                                }
                                <div class="button-row">
                                    <Button onclick={on_sign_in} disabled={is_busy || !base_saved} variant={ButtonVariant::Secondary}>
                                        {"Sign in"}
                                    </Button>
                                    <Button onclick={on_register} disabled={is_busy || !base_saved} variant={ButtonVariant::Link}>
                                        {"Create account"}
                                    </Button>
                                </div>
                                </>
                            }
                        </div>
                    },
                }}
            </div>

            <p class="footer-popup">
                {"Tab Courier v0.1.0"}
            </p>
        </div>
    }
}
