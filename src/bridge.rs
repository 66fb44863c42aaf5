/// Imports from the popup's JS bridge (`popup.js`)
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    pub async fn queryTabs(query: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}
