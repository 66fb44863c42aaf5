/// `fetch`-backed transport for the courier client
use crate::courier::{HttpReply, HttpRequest, HttpTransport};
use crate::error::{CourierError, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FetchTransport;

impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = &request.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let js_request = Request::new_with_str_and_init(request.url.as_str(), &opts)?;
        for (name, value) in &request.headers {
            js_request.headers().set(name, value)?;
        }

        let window = web_sys::window()
            .ok_or_else(|| CourierError::Bridge("No window available for fetch".to_string()))?;

        let response_js = JsFuture::from(window.fetch_with_request(&js_request)).await?;
        let response: Response = response_js.dyn_into()?;

        let body_js = JsFuture::from(response.text()?).await?;

        Ok(HttpReply {
            status: response.status(),
            body: body_js.as_string().unwrap_or_default(),
        })
    }
}
