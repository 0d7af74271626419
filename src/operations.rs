/// Capture operations: title resolution and outcome messages

use crate::tab_data::{AppendResult, MenuClickInfo, TabInfo};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Title used when a tab reports none
pub const UNTITLED: &str = "Untitled";

/// What the page knows about one `<a>` element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkCandidate {
    pub href: String,
    pub text: String,
    pub title: String,
    pub image_alt: Option<String>,
}

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Collapse runs of whitespace (anchor text often spans several lines)
pub fn normalize_text(text: &str) -> String {
    whitespace().replace_all(text.trim(), " ").into_owned()
}

/// Find a label for `target_url` among the page's anchors
///
/// Anchors whose href matches are checked in document order. For each,
/// visible text wins, then the title attribute, then the alt text of an
/// image inside it. The first non-empty label is returned.
pub fn resolve_link_title(candidates: &[LinkCandidate], target_url: &str) -> Option<String> {
    candidates
        .iter()
        .filter(|link| link.href == target_url)
        .find_map(|link| {
            [
                Some(link.text.as_str()),
                Some(link.title.as_str()),
                link.image_alt.as_deref(),
            ]
            .into_iter()
            .flatten()
            .map(normalize_text)
            .find(|label| !label.is_empty())
        })
}

/// Title and URL for a page-level capture (menu on page, shortcut, icon)
pub fn page_title_url(tab: &TabInfo, fallback_url: Option<&str>) -> (String, String) {
    let title = tab
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED)
        .to_string();
    let url = tab
        .url
        .as_deref()
        .filter(|u| !u.is_empty())
        .or(fallback_url)
        .unwrap_or_default()
        .to_string();
    (title, url)
}

/// Title and URL for a link capture once the page lookup has run
pub fn link_title_url(info: &MenuClickInfo, looked_up: Option<String>) -> Option<(String, String)> {
    let url = info.link_url.as_deref().filter(|u| !u.is_empty())?;
    let title = looked_up.filter(|t| !t.is_empty()).unwrap_or_else(|| url.to_string());
    Some((title, url.to_string()))
}

/// Notification outcome of one capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    DuplicateMoved,
    Appended,
    NotConfigured,
    Failed,
    ConfigurationError,
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::DuplicateMoved => "コピー & 既存エントリを最下部に移動しました",
            Outcome::Appended => "コピー & スプレッドシートに追記しました",
            Outcome::NotConfigured => "コピーしました（GAS URLが未設定）",
            Outcome::Failed => "コピーしました（スプレッドシート追記に失敗）",
            Outcome::ConfigurationError => "タグ設定が変更されました。もう一度やり直してください",
        }
    }
}

impl From<&AppendResult> for Outcome {
    fn from(result: &AppendResult) -> Self {
        match result {
            AppendResult { ok: true, duplicate: true, .. } => Outcome::DuplicateMoved,
            AppendResult { ok: true, .. } => Outcome::Appended,
            AppendResult { configured: false, .. } => Outcome::NotConfigured,
            _ => Outcome::Failed,
        }
    }
}
