/// "Get current tab": read the active tab and write its title and URL to the console
use crate::error::Result;
use crate::tab_data::TabDetail;
use crate::tabs::{TabSource, active_tab};
use wasm_bindgen::JsValue;
use web_sys::console;

pub const TITLE_LABEL: &str = "Tab Title:";
pub const URL_LABEL: &str = "Tab URL:";

/// Destination for the diagnostic lines
pub trait TabLogger {
    fn log_field(&self, label: &str, value: Option<&str>);
}

/// Writes `console.log(label, value)`, passing `undefined` for a missing value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConsoleLogger;

impl TabLogger for ConsoleLogger {
    fn log_field(&self, label: &str, value: Option<&str>) {
        let value_js = value.map(JsValue::from_str).unwrap_or(JsValue::UNDEFINED);
        console::log_2(&JsValue::from_str(label), &value_js);
        log::trace!("{} {}", label, value.unwrap_or("undefined"));
    }
}

/// Query the active tab once. If there is one, log its title then its URL.
///
/// Nothing is logged when the query comes back empty. Query failures are
/// returned to the caller untouched.
pub async fn inspect_active_tab<S, L>(source: &S, logger: &L) -> Result<Option<TabDetail>>
where
    S: TabSource,
    L: TabLogger,
{
    let tab = active_tab(source).await?;

    if let Some(current) = &tab {
        logger.log_field(TITLE_LABEL, current.title.as_deref());
        logger.log_field(URL_LABEL, current.url.as_deref());
    }

    Ok(tab)
}
