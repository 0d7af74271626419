/// Settings serialization utilities for chrome.storage.sync

use crate::error::SettingsError;
use crate::tab_data::{Selection, TagGroup};
use serde::{Deserialize, Serialize};

pub const SCHEMA_CATEGORIES: u32 = 1;
pub const SCHEMA_TAG_GROUPS: u32 = 2;

/// Keys read from chrome.storage.sync
pub const STORAGE_KEYS: [&str; 4] = ["gasUrl", "schemaVersion", "categories", "tagGroups"];

/// Free-text group appended when a category list is migrated
const MIGRATED_TAGS_GROUP: &str = "タグ";
const MIGRATED_CATEGORY_GROUP: &str = "カテゴリ";

/// Raw storage layout, exactly as the keys sit in chrome.storage.sync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_groups: Option<Vec<TagGroup>>,
}

impl StoredSettings {
    /// True on a fresh install: no schema has ever been written
    pub fn needs_defaults(&self) -> bool {
        self.schema_version.is_none() && self.categories.is_none() && self.tag_groups.is_none()
    }

    /// Resolve the stored keys into one snapshot with an explicit schema
    pub fn into_settings(self) -> Settings {
        let gas_url = self
            .gas_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        let schema = match (self.schema_version, self.categories, self.tag_groups) {
            (Some(SCHEMA_CATEGORIES), categories, _) => Schema::Categories(categories.unwrap_or_default()),
            (Some(SCHEMA_TAG_GROUPS), _, groups) => Schema::TagGroups(groups.unwrap_or_default()),
            (version, categories, groups) => {
                if let Some(v) = version {
                    log::warn!("Unknown schemaVersion {}, inferring from stored keys", v);
                }
                match (categories, groups) {
                    (_, Some(groups)) => Schema::TagGroups(groups),
                    (Some(categories), None) => Schema::Categories(categories),
                    (None, None) => Schema::default_tag_groups(),
                }
            }
        };

        Settings { gas_url, schema }
    }
}

impl From<&Settings> for StoredSettings {
    fn from(settings: &Settings) -> Self {
        // An empty gasUrl is written so that clearing the field sticks
        let gas_url = Some(settings.gas_url.clone().unwrap_or_default());

        match &settings.schema {
            Schema::Categories(categories) => StoredSettings {
                gas_url,
                schema_version: Some(SCHEMA_CATEGORIES),
                categories: Some(categories.clone()),
                tag_groups: None,
            },
            Schema::TagGroups(groups) => StoredSettings {
                gas_url,
                schema_version: Some(SCHEMA_TAG_GROUPS),
                categories: None,
                tag_groups: Some(groups.clone()),
            },
        }
    }
}

/// The configured selection schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entries", rename_all = "camelCase")]
pub enum Schema {
    Categories(Vec<String>),
    TagGroups(Vec<TagGroup>),
}

impl Schema {
    pub fn default_tag_groups() -> Schema {
        Schema::TagGroups(vec![
            TagGroup::new("カテゴリ", &["仕事", "個人", "学習"]),
            TagGroup::new("メモ", &[]),
            TagGroup::new("ステータス", &["未着手", "進行中", "完了"]),
        ])
    }

    pub fn len(&self) -> usize {
        match self {
            Schema::Categories(categories) => categories.len(),
            Schema::TagGroups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selection used when no panel is shown
    pub fn empty_selection(&self) -> Selection {
        match self {
            Schema::Categories(_) => Selection::CategoryTags {
                category: String::new(),
                tags: String::new(),
            },
            Schema::TagGroups(groups) => Selection::GroupValues {
                values: vec![String::new(); groups.len()],
            },
        }
    }

    /// Check that a selection can be recorded under this schema
    pub fn accepts(&self, selection: &Selection) -> bool {
        match (self, selection) {
            (Schema::Categories(_), Selection::CategoryTags { .. }) => true,
            (Schema::TagGroups(groups), Selection::GroupValues { values }) => values.len() == groups.len(),
            _ => false,
        }
    }

    pub fn add_group(&mut self, name: &str) -> Result<(), SettingsError> {
        let groups = self.groups_mut()?;
        let name = normalize_name(name)?;
        ensure_unique(groups.iter().map(|g| g.name.as_str()), &name)?;
        groups.push(TagGroup { name, tags: Vec::new() });
        Ok(())
    }

    pub fn remove_group(&mut self, index: usize) -> Result<TagGroup, SettingsError> {
        let groups = self.groups_mut()?;
        if index >= groups.len() {
            return Err(SettingsError::OutOfRange(index));
        }
        Ok(groups.remove(index))
    }

    pub fn rename_group(&mut self, index: usize, name: &str) -> Result<(), SettingsError> {
        let groups = self.groups_mut()?;
        let name = normalize_name(name)?;
        if index >= groups.len() {
            return Err(SettingsError::OutOfRange(index));
        }
        ensure_unique(
            groups
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, g)| g.name.as_str()),
            &name,
        )?;
        groups[index].name = name;
        Ok(())
    }

    pub fn add_tag(&mut self, group_index: usize, tag: &str) -> Result<(), SettingsError> {
        let groups = self.groups_mut()?;
        let group = groups
            .get_mut(group_index)
            .ok_or(SettingsError::OutOfRange(group_index))?;
        let tag = normalize_name(tag)?;
        ensure_unique(group.tags.iter().map(|t| t.as_str()), &tag)?;
        group.tags.push(tag);
        Ok(())
    }

    pub fn remove_tag(&mut self, group_index: usize, tag_index: usize) -> Result<String, SettingsError> {
        let groups = self.groups_mut()?;
        let group = groups
            .get_mut(group_index)
            .ok_or(SettingsError::OutOfRange(group_index))?;
        if tag_index >= group.tags.len() {
            return Err(SettingsError::OutOfRange(tag_index));
        }
        Ok(group.tags.remove(tag_index))
    }

    pub fn add_category(&mut self, name: &str) -> Result<(), SettingsError> {
        let Schema::Categories(categories) = self else {
            return Err(SettingsError::WrongSchema);
        };
        let name = normalize_name(name)?;
        ensure_unique(categories.iter().map(|c| c.as_str()), &name)?;
        categories.push(name);
        Ok(())
    }

    pub fn remove_category(&mut self, index: usize) -> Result<String, SettingsError> {
        let Schema::Categories(categories) = self else {
            return Err(SettingsError::WrongSchema);
        };
        if index >= categories.len() {
            return Err(SettingsError::OutOfRange(index));
        }
        Ok(categories.remove(index))
    }

    /// Convert a category list into the tag-group schema. The categories
    /// become the chips of the first group, followed by a free-text group.
    pub fn migrate_to_tag_groups(&mut self) -> Result<(), SettingsError> {
        let Schema::Categories(categories) = self else {
            return Err(SettingsError::WrongSchema);
        };
        let groups = vec![
            TagGroup {
                name: MIGRATED_CATEGORY_GROUP.to_string(),
                tags: std::mem::take(categories),
            },
            TagGroup {
                name: MIGRATED_TAGS_GROUP.to_string(),
                tags: Vec::new(),
            },
        ];
        *self = Schema::TagGroups(groups);
        Ok(())
    }

    fn groups_mut(&mut self) -> Result<&mut Vec<TagGroup>, SettingsError> {
        match self {
            Schema::TagGroups(groups) => Ok(groups),
            Schema::Categories(_) => Err(SettingsError::WrongSchema),
        }
    }
}

/// One read of the Settings Store, passed into each capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gas_url: Option<String>,
    pub schema: Schema,
}

impl Settings {
    pub fn new(gas_url: Option<&str>, schema: Schema) -> Self {
        Settings {
            gas_url: gas_url.map(|u| u.to_string()),
            schema,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.gas_url.as_deref()
    }

    /// Store a user-typed endpoint; blank input clears it
    pub fn set_endpoint(&mut self, raw: &str) {
        let trimmed = raw.trim();
        self.gas_url = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Panel captures are offered only when there is something to pick
    pub fn uses_panel(&self) -> bool {
        !self.schema.is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            gas_url: None,
            schema: Schema::default_tag_groups(),
        }
    }
}

fn normalize_name(raw: &str) -> Result<String, SettingsError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SettingsError::EmptyName);
    }
    Ok(name.to_string())
}

fn ensure_unique<'a>(mut existing: impl Iterator<Item = &'a str>, name: &str) -> Result<(), SettingsError> {
    if existing.any(|e| e == name) {
        return Err(SettingsError::DuplicateName(name.to_string()));
    }
    Ok(())
}
