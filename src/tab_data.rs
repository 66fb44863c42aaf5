/// Data structures exchanged with the tabs API
use serde::{Deserialize, Serialize};

/// Filter passed verbatim to `tabs.query`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    pub active: bool,
    pub current_window: bool,
}

impl TabQuery {
    /// `{active: true, currentWindow: true}`
    pub fn active_in_current_window() -> TabQuery {
        TabQuery {
            active: true,
            current_window: true,
        }
    }
}

/// A tab descriptor as returned by the browser.
///
/// `title` and `url` are only present when the extension holds the `tabs`
/// permission or a host permission for the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabDetail {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub window_id: Option<i32>,
    #[serde(default)]
    pub index: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

impl TabDetail {
    pub fn new(title: &str, url: &str) -> TabDetail {
        TabDetail {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            ..TabDetail::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_wire_format() {
        let json = serde_json::to_string(&TabQuery::active_in_current_window()).unwrap();
        assert_eq!(json, r#"{"active":true,"currentWindow":true}"#);
    }

    #[test]
    fn test_tab_detail_from_browser_json() {
        let json = r#"{
            "id": 42,
            "windowId": 7,
            "index": 3,
            "title": "The Rust Programming Language",
            "url": "https://doc.rust-lang.org/book/",
            "favIconUrl": "https://doc.rust-lang.org/favicon.ico",
            "pinned": false,
            "audible": false
        }"#;

        let tab: TabDetail = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, Some(42));
        assert_eq!(tab.window_id, Some(7));
        assert_eq!(tab.title.as_deref(), Some("The Rust Programming Language"));
        assert_eq!(tab.url.as_deref(), Some("https://doc.rust-lang.org/book/"));
    }

    #[test]
    fn test_tab_detail_without_permissions() {
        // Without host permission the browser omits title and url
        let tab: TabDetail = serde_json::from_str(r#"{"id": 1, "index": 0}"#).unwrap();

        assert_eq!(tab.title, None);
        assert_eq!(tab.url, None);
    }
}
