/// Access to the browser's tabs API
use crate::bridge::queryTabs;
use crate::error::Result;
use crate::tab_data::{TabDetail, TabQuery};
use serde::{Deserialize, Deserializer};

/// Anything that can answer a `tabs.query` call
#[allow(async_fn_in_trait)]
pub trait TabSource {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabDetail>>;
}

/// The real tabs API, reached through `popup.js`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrowserTabs;

impl TabSource for BrowserTabs {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabDetail>> {
        let query_js = serde_wasm_bindgen::to_value(query)?;
        let tabs_js = queryTabs(query_js).await?;
        Ok(decode_tabs(serde_wasm_bindgen::Deserializer::from(tabs_js))?)
    }
}

/// Decode a `tabs.query` result; `null` or `undefined` means no tabs
pub fn decode_tabs<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<TabDetail>, D::Error> {
    Option::<Vec<TabDetail>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Query once for the active tab of the current window and return the first match
pub async fn active_tab<S: TabSource>(source: &S) -> Result<Option<TabDetail>> {
    let tabs = source
        .query_tabs(&TabQuery::active_in_current_window())
        .await?;

    Ok(tabs.into_iter().next())
}
