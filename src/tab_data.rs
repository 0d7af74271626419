/// Data structures for Sheet Capture
use serde::{Deserialize, Serialize};

/// The subset of a chrome.tabs.Tab the capture workflow reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TabInfo {
    pub fn new(id: i32, url: &str, title: &str) -> TabInfo {
        TabInfo {
            id: Some(id),
            url: Some(url.to_string()),
            title: Some(title.to_string()),
        }
    }
}

/// chrome.contextMenus.OnClickData
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuClickInfo {
    #[serde(default)]
    pub menu_item_id: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub page_url: Option<String>,
}

/// A named set of mutually exclusive tags. No tags means free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TagGroup {
    pub fn new(name: &str, tags: &[&str]) -> TagGroup {
        TagGroup {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn is_free_text(&self) -> bool {
        self.tags.is_empty()
    }
}

/// What the user picked for one capture, shaped by the configured schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    CategoryTags {
        category: String,
        tags: String,
    },
    GroupValues {
        #[serde(rename = "tagValues")]
        values: Vec<String>,
    },
}

/// One capture, built once and consumed by the append client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureRecord {
    pub title: String,
    pub url: String,
    #[serde(flatten)]
    pub selection: Selection,
}

impl CaptureRecord {
    pub fn new(title: String, url: String, selection: Selection) -> CaptureRecord {
        CaptureRecord {
            title,
            url,
            selection,
        }
    }

    /// Tab-separated so it pastes into two spreadsheet cells
    pub fn clipboard_text(&self) -> String {
        format!("{}\t{}", self.title, self.url)
    }
}

/// Result of one append attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendResult {
    pub ok: bool,
    pub configured: bool,
    pub duplicate: bool,
}

impl AppendResult {
    pub fn not_configured() -> AppendResult {
        AppendResult::default()
    }

    pub fn failed() -> AppendResult {
        AppendResult {
            ok: false,
            configured: true,
            duplicate: false,
        }
    }

    pub fn appended(duplicate: bool) -> AppendResult {
        AppendResult {
            ok: true,
            configured: true,
            duplicate,
        }
    }
}
