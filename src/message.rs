/// Messages exchanged between the background worker and the page

use crate::error::CaptureError;
use crate::storage::Schema;
use crate::tab_data::Selection;
use serde::{Deserialize, Serialize};

/// Page → background, over chrome.runtime.sendMessage.
/// Anything that does not carry a known `action` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum RuntimeMessage {
    #[serde(rename = "sendFromPanel")]
    SendFromPanel(PanelSubmission),
}

impl RuntimeMessage {
    pub fn from_json(value: serde_json::Value) -> Option<RuntimeMessage> {
        match serde_json::from_value(value) {
            Ok(message) => Some(message),
            Err(e) => {
                log::debug!("Ignoring runtime message: {}", e);
                None
            }
        }
    }
}

/// Flat payload of a panel submission
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSubmission {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_values: Option<Vec<String>>,
}

impl PanelSubmission {
    pub fn new(title: &str, url: &str, selection: Selection) -> Self {
        let mut submission = PanelSubmission {
            title: title.to_string(),
            url: url.to_string(),
            ..Default::default()
        };
        match selection {
            Selection::CategoryTags { category, tags } => {
                submission.category = Some(category);
                submission.tags = Some(tags);
            }
            Selection::GroupValues { values } => submission.tag_values = Some(values),
        }
        submission
    }

    /// Read the selection the way the configured schema says it is shaped.
    /// The payload shape is never used to pick the schema.
    pub fn selection_for(&self, schema: &Schema) -> Result<Selection, CaptureError> {
        let selection = match schema {
            Schema::Categories(_) => {
                if self.tag_values.is_some() {
                    return Err(self.mismatch(schema));
                }
                Selection::CategoryTags {
                    category: self.category.clone().unwrap_or_default(),
                    tags: self.tags.clone().unwrap_or_default(),
                }
            }
            Schema::TagGroups(_) => match &self.tag_values {
                Some(values) => Selection::GroupValues { values: values.clone() },
                None => return Err(self.mismatch(schema)),
            },
        };

        if schema.accepts(&selection) {
            Ok(selection)
        } else {
            Err(self.mismatch(schema))
        }
    }

    fn mismatch(&self, schema: &Schema) -> CaptureError {
        let got = match &self.tag_values {
            Some(values) => format!("tagValues[{}]", values.len()),
            None => "category/tags".to_string(),
        };
        let expected = match schema {
            Schema::Categories(_) => "category/tags".to_string(),
            Schema::TagGroups(groups) => format!("tagValues[{}]", groups.len()),
        };
        CaptureError::SchemaMismatch { expected, got }
    }
}

/// What the panel needs to render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRequest {
    pub title: String,
    pub url: String,
    pub schema: Schema,
}

/// Background → page, over chrome.tabs.sendMessage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PageCommand {
    WriteClipboard { text: String },
    ShowToast { message: String },
    FindLinkTitle { url: String },
    OpenPanel(PanelRequest),
}

impl PageCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PageCommand::WriteClipboard { .. } => "writeClipboard",
            PageCommand::ShowToast { .. } => "showToast",
            PageCommand::FindLinkTitle { .. } => "findLinkTitle",
            PageCommand::OpenPanel(_) => "openPanel",
        }
    }
}
