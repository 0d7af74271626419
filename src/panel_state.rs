/// Selection state held by the capture panel while it is open

use crate::storage::Schema;
use crate::tab_data::Selection;

/// Which control a panel row renders
#[derive(Debug, Clone, PartialEq)]
pub enum GroupControl {
    Chips(Vec<String>),
    FreeText,
}

/// One row of the panel: a label and its control
#[derive(Debug, Clone, PartialEq)]
pub struct PanelRow {
    pub label: String,
    pub control: GroupControl,
}

/// Rows to render for a schema. The category schema has a chip grid for
/// the category followed by one free-text tag field.
pub fn panel_rows(schema: &Schema) -> Vec<PanelRow> {
    match schema {
        Schema::Categories(categories) => vec![
            PanelRow {
                label: "カテゴリ".to_string(),
                control: GroupControl::Chips(categories.clone()),
            },
            PanelRow {
                label: "タグ".to_string(),
                control: GroupControl::FreeText,
            },
        ],
        Schema::TagGroups(groups) => groups
            .iter()
            .map(|group| PanelRow {
                label: group.name.clone(),
                control: if group.is_free_text() {
                    GroupControl::FreeText
                } else {
                    GroupControl::Chips(group.tags.clone())
                },
            })
            .collect(),
    }
}

/// Per-row values, index-aligned with `panel_rows`. Empty means unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSelection {
    categories: bool,
    values: Vec<String>,
}

impl PanelSelection {
    pub fn for_schema(schema: &Schema) -> Self {
        let rows = match schema {
            Schema::Categories(_) => 2,
            Schema::TagGroups(groups) => groups.len(),
        };
        PanelSelection {
            categories: matches!(schema, Schema::Categories(_)),
            values: vec![String::new(); rows],
        }
    }

    pub fn value(&self, row: usize) -> &str {
        self.values.get(row).map(|v| v.as_str()).unwrap_or_default()
    }

    pub fn is_selected(&self, row: usize, tag: &str) -> bool {
        !tag.is_empty() && self.value(row) == tag
    }

    /// Select `tag` in `row`, replacing any other selection in that row.
    /// Clicking the selected chip again clears the row.
    pub fn toggle_chip(&mut self, row: usize, tag: &str) {
        if let Some(value) = self.values.get_mut(row) {
            if value == tag {
                value.clear();
            } else {
                *value = tag.to_string();
            }
        }
    }

    pub fn set_text(&mut self, row: usize, text: &str) {
        if let Some(value) = self.values.get_mut(row) {
            *value = text.to_string();
        }
    }

    pub fn into_selection(self) -> Selection {
        let PanelSelection { categories, mut values } = self;
        if categories {
            let tags = values.pop().unwrap_or_default();
            let category = values.pop().unwrap_or_default();
            Selection::CategoryTags { category, tags }
        } else {
            Selection::GroupValues { values }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::TagGroup;

    #[test]
    fn test_rows_for_tag_groups() {
        let rows = panel_rows(&Schema::default_tag_groups());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "カテゴリ");
        assert_eq!(
            rows[0].control,
            GroupControl::Chips(vec!["仕事".to_string(), "個人".to_string(), "学習".to_string()])
        );
        assert_eq!(rows[1].control, GroupControl::FreeText);
    }

    #[test]
    fn test_rows_for_categories() {
        let rows = panel_rows(&Schema::Categories(vec!["読む".to_string()]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].control, GroupControl::Chips(vec!["読む".to_string()]));
        assert_eq!(rows[1].control, GroupControl::FreeText);
    }

    #[test]
    fn test_default_selection_is_all_empty() {
        let state = PanelSelection::for_schema(&Schema::default_tag_groups());

        assert_eq!(
            state.into_selection(),
            Selection::GroupValues {
                values: vec![String::new(), String::new(), String::new()]
            }
        );
    }

    #[test]
    fn test_double_toggle_clears_row() {
        let mut state = PanelSelection::for_schema(&Schema::default_tag_groups());

        state.toggle_chip(0, "仕事");
        assert!(state.is_selected(0, "仕事"));
        state.toggle_chip(0, "仕事");

        assert_eq!(state.value(0), "");
        assert!(!state.is_selected(0, "仕事"));
    }

    #[test]
    fn test_chips_are_mutually_exclusive() {
        let mut state = PanelSelection::for_schema(&Schema::default_tag_groups());

        state.toggle_chip(2, "未着手");
        state.toggle_chip(2, "進行中");

        assert!(!state.is_selected(2, "未着手"));
        assert!(state.is_selected(2, "進行中"));
    }

    #[test]
    fn test_rows_are_independent() {
        let mut state = PanelSelection::for_schema(&Schema::default_tag_groups());

        state.toggle_chip(0, "仕事");
        state.set_text(1, "メモ書き");
        state.toggle_chip(2, "進行中");
        state.toggle_chip(7, "ignored");

        assert_eq!(
            state.into_selection(),
            Selection::GroupValues {
                values: vec!["仕事".to_string(), "メモ書き".to_string(), "進行中".to_string()]
            }
        );
    }

    #[test]
    fn test_selection_length_matches_groups() {
        let schema = Schema::TagGroups(vec![
            TagGroup::new("a", &["x"]),
            TagGroup::new("b", &[]),
            TagGroup::new("c", &["y"]),
            TagGroup::new("d", &["z"]),
        ]);

        let selection = PanelSelection::for_schema(&schema).into_selection();

        assert!(schema.accepts(&selection));
    }

    #[test]
    fn test_category_selection() {
        let schema = Schema::Categories(vec!["仕事".to_string(), "個人".to_string()]);
        let mut state = PanelSelection::for_schema(&schema);

        state.toggle_chip(0, "仕事");
        state.toggle_chip(0, "個人");
        state.set_text(1, "rust, wasm");

        assert_eq!(
            state.into_selection(),
            Selection::CategoryTags {
                category: "個人".to_string(),
                tags: "rust, wasm".to_string()
            }
        );
    }
}
