//! Capture coordinator: one value per user-initiated capture.
//!
//! Flow: resolve title/URL → (open panel and stop) or build the selection →
//! copy to clipboard → append → toast. Every step after resolution runs even
//! when an earlier one failed, and exactly one outcome is produced.

use crate::access::is_tab_accessible;
use crate::append::{AppendTransport, RemoteAppendClient};
use crate::error::CaptureError;
use crate::message::{PageCommand, PanelRequest, PanelSubmission};
use crate::operations::{link_title_url, page_title_url, Outcome};
use crate::storage::Settings;
use crate::tab_data::{AppendResult, CaptureRecord, MenuClickInfo, Selection, TabInfo};
use async_trait::async_trait;
use uuid::Uuid;

pub const CONTEXT_MENU_ID: &str = "copyToSheet";
pub const CONTEXT_MENU_TITLE: &str = "タイトルとURLをスプレッドシートにコピー";
pub const SHORTCUT_COMMAND: &str = "send-page-to-sheet";

/// One-shot RPC into a tab's page context
#[async_trait(?Send)]
pub trait PageChannel {
    async fn execute(&self, tab_id: i32, command: &PageCommand) -> Result<Option<String>, CaptureError>;
}

/// What started the capture
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    ContextMenu { info: MenuClickInfo, tab: Option<TabInfo> },
    Shortcut { tab: Option<TabInfo> },
    ToolbarIcon { tab: TabInfo },
    PanelSubmitted { submission: PanelSubmission, tab: Option<TabInfo> },
}

/// Where a capture ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFlow {
    /// Nothing to capture (unknown menu item, no active tab)
    Ignored,
    /// Waiting for the panel's submission message
    PanelOpened,
    Notified(Outcome),
}

struct Resolved {
    tab: Option<TabInfo>,
    title: String,
    url: String,
    submission: Option<PanelSubmission>,
}

pub struct Coordinator<'a, P: PageChannel, T: AppendTransport> {
    id: Uuid,
    settings: Settings,
    page: &'a P,
    client: &'a RemoteAppendClient<T>,
}

impl<'a, P: PageChannel, T: AppendTransport> Coordinator<'a, P, T> {
    pub fn new(settings: Settings, page: &'a P, client: &'a RemoteAppendClient<T>) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            page,
            client,
        }
    }

    pub async fn run(&self, trigger: Trigger) -> CaptureFlow {
        let Some(resolved) = self.resolve(trigger).await else {
            return CaptureFlow::Ignored;
        };
        log::debug!("[{}] resolved {:?} <{}>", self.id, resolved.title, resolved.url);

        let Resolved { tab, title, url, submission } = resolved;
        let accessible = tab.as_ref().is_some_and(is_tab_accessible);

        let selection = match submission {
            Some(submission) => match submission.selection_for(&self.settings.schema) {
                Ok(selection) => selection,
                Err(e) => {
                    log::error!("[{}] refusing panel submission: {}", self.id, e);
                    return self.notify(tab.as_ref(), Outcome::ConfigurationError).await;
                }
            },
            None => {
                if accessible && self.settings.uses_panel() && self.open_panel(tab.as_ref(), &title, &url).await {
                    log::debug!("[{}] panel open, waiting for submission", self.id);
                    return CaptureFlow::PanelOpened;
                }
                self.settings.schema.empty_selection()
            }
        };

        let result = self.submit(tab.as_ref(), accessible, title, url, selection).await;
        self.notify(tab.as_ref(), Outcome::from(&result)).await
    }

    async fn resolve(&self, trigger: Trigger) -> Option<Resolved> {
        match trigger {
            Trigger::ContextMenu { info, tab } => {
                if info.menu_item_id != CONTEXT_MENU_ID {
                    return None;
                }
                if info.link_url.is_some() {
                    let looked_up = match (&tab, &info.link_url) {
                        (Some(t), Some(link)) if is_tab_accessible(t) => {
                            let command = PageCommand::FindLinkTitle { url: link.clone() };
                            self.safe_execute(t, &command).await
                        }
                        _ => None,
                    };
                    if let Some((title, url)) = link_title_url(&info, looked_up) {
                        return Some(Resolved { tab, title, url, submission: None });
                    }
                }
                let (title, url) = page_title_url(&tab.clone().unwrap_or_default(), info.page_url.as_deref());
                Some(Resolved { tab, title, url, submission: None })
            }
            Trigger::Shortcut { tab } => {
                let Some(tab) = tab else {
                    log::warn!("[{}] shortcut pressed with no active tab", self.id);
                    return None;
                };
                let (title, url) = page_title_url(&tab, None);
                Some(Resolved { tab: Some(tab), title, url, submission: None })
            }
            Trigger::ToolbarIcon { tab } => {
                let (title, url) = page_title_url(&tab, None);
                Some(Resolved { tab: Some(tab), title, url, submission: None })
            }
            Trigger::PanelSubmitted { submission, tab } => Some(Resolved {
                tab,
                title: submission.title.clone(),
                url: submission.url.clone(),
                submission: Some(submission),
            }),
        }
    }

    /// True when the panel was shown. A failed open falls back to a quick capture.
    async fn open_panel(&self, tab: Option<&TabInfo>, title: &str, url: &str) -> bool {
        let Some(tab) = tab else { return false };
        let command = PageCommand::OpenPanel(PanelRequest {
            title: title.to_string(),
            url: url.to_string(),
            schema: self.settings.schema.clone(),
        });
        match tab.id {
            Some(tab_id) => match self.page.execute(tab_id, &command).await {
                Ok(_) => true,
                Err(e) => {
                    log::warn!("[{}] could not open panel: {}", self.id, e);
                    false
                }
            },
            None => false,
        }
    }

    async fn submit(
        &self,
        tab: Option<&TabInfo>,
        accessible: bool,
        title: String,
        url: String,
        selection: Selection,
    ) -> AppendResult {
        let record = CaptureRecord::new(title, url, selection);

        if let (true, Some(tab)) = (accessible, tab) {
            let command = PageCommand::WriteClipboard {
                text: record.clipboard_text(),
            };
            self.safe_execute(tab, &command).await;
        }

        log::debug!("[{}] submitting", self.id);
        self.client.post_record(self.settings.endpoint(), &record).await
    }

    async fn notify(&self, tab: Option<&TabInfo>, outcome: Outcome) -> CaptureFlow {
        log::info!("[{}] outcome {:?}", self.id, outcome);
        if let Some(tab) = tab.filter(|t| is_tab_accessible(t)) {
            let command = PageCommand::ShowToast {
                message: outcome.message().to_string(),
            };
            self.safe_execute(tab, &command).await;
        }
        CaptureFlow::Notified(outcome)
    }

    /// Run a page command; failures are logged and read as "no result"
    async fn safe_execute(&self, tab: &TabInfo, command: &PageCommand) -> Option<String> {
        let tab_id = tab.id?;
        match self.page.execute(tab_id, command).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("[{}] {} failed: {}", self.id, command.name(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::AppendResponse;
    use crate::storage::Schema;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingPage {
        commands: RefCell<Vec<(i32, PageCommand)>>,
        link_title: Option<String>,
        fail: bool,
    }

    #[async_trait(?Send)]
    impl PageChannel for RecordingPage {
        async fn execute(&self, tab_id: i32, command: &PageCommand) -> Result<Option<String>, CaptureError> {
            self.commands.borrow_mut().push((tab_id, command.clone()));
            if self.fail {
                return Err(CaptureError::Injection("Cannot access contents of the page".to_string()));
            }
            match command {
                PageCommand::FindLinkTitle { .. } => Ok(self.link_title.clone()),
                _ => Ok(None),
            }
        }
    }

    struct FakeTransport {
        duplicate: Option<bool>,
        posted: RefCell<Vec<serde_json::Value>>,
    }

    impl FakeTransport {
        fn replying(duplicate: Option<bool>) -> RemoteAppendClient<FakeTransport> {
            RemoteAppendClient::new(FakeTransport {
                duplicate,
                posted: RefCell::new(Vec::new()),
            })
        }
    }

    #[async_trait(?Send)]
    impl AppendTransport for FakeTransport {
        async fn post_json(&self, _endpoint: &str, record: &CaptureRecord) -> Result<AppendResponse, CaptureError> {
            self.posted.borrow_mut().push(serde_json::to_value(record).unwrap());
            match self.duplicate {
                Some(duplicate) => Ok(AppendResponse { duplicate }),
                None => Err(CaptureError::Http(502)),
            }
        }
    }

    fn quick_settings(gas_url: Option<&str>) -> Settings {
        Settings::new(gas_url, Schema::TagGroups(vec![]))
    }

    fn example_tab() -> TabInfo {
        TabInfo::new(42, "https://example.com", "Example")
    }

    fn menu_info(link_url: Option<&str>) -> MenuClickInfo {
        MenuClickInfo {
            menu_item_id: CONTEXT_MENU_ID.to_string(),
            link_url: link_url.map(|l| l.to_string()),
            page_url: Some("https://example.com".to_string()),
        }
    }

    fn toasts(page: &RecordingPage) -> Vec<String> {
        page.commands
            .borrow()
            .iter()
            .filter_map(|(_, c)| match c {
                PageCommand::ShowToast { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_context_menu_without_endpoint() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let coordinator = Coordinator::new(quick_settings(None), &page, &client);

        let flow = block_on(coordinator.run(Trigger::ContextMenu {
            info: menu_info(None),
            tab: Some(example_tab()),
        }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::NotConfigured));
        let commands = page.commands.borrow();
        assert_eq!(
            commands[0],
            (
                42,
                PageCommand::WriteClipboard {
                    text: "Example\thttps://example.com".to_string()
                }
            )
        );
        assert!(client_posts(&client).is_empty());
        drop(commands);
        assert_eq!(toasts(&page), vec![Outcome::NotConfigured.message().to_string()]);
    }

    fn client_posts(client: &RemoteAppendClient<FakeTransport>) -> Vec<serde_json::Value> {
        client.transport().posted.borrow().clone()
    }

    #[test]
    fn test_panel_submission_appended() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let settings = Settings::new(Some("https://script.example/exec"), Schema::default_tag_groups());
        let coordinator = Coordinator::new(settings, &page, &client);

        let submission = PanelSubmission::new(
            "Example",
            "https://example.com",
            Selection::GroupValues {
                values: vec!["仕事".to_string(), String::new(), "進行中".to_string()],
            },
        );
        let flow = block_on(coordinator.run(Trigger::PanelSubmitted {
            submission,
            tab: Some(example_tab()),
        }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::Appended));
        let posts = client_posts(&client);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["tagValues"], serde_json::json!(["仕事", "", "進行中"]));
    }

    #[test]
    fn test_duplicate_moved() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(true));
        let coordinator = Coordinator::new(quick_settings(Some("https://script.example/exec")), &page, &client);

        let flow = block_on(coordinator.run(Trigger::Shortcut { tab: Some(example_tab()) }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::DuplicateMoved));
    }

    #[test]
    fn test_remote_failure() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(None);
        let coordinator = Coordinator::new(quick_settings(Some("https://script.example/exec")), &page, &client);

        let flow = block_on(coordinator.run(Trigger::ToolbarIcon { tab: example_tab() }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::Failed));
        assert_eq!(toasts(&page), vec![Outcome::Failed.message().to_string()]);
    }

    #[test]
    fn test_configured_groups_open_panel() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let settings = Settings::new(Some("https://script.example/exec"), Schema::default_tag_groups());
        let coordinator = Coordinator::new(settings, &page, &client);

        let flow = block_on(coordinator.run(Trigger::Shortcut { tab: Some(example_tab()) }));

        assert_eq!(flow, CaptureFlow::PanelOpened);
        let commands = page.commands.borrow();
        assert_eq!(commands.len(), 1);
        assert!(matches!(
            &commands[0].1,
            PageCommand::OpenPanel(PanelRequest { title, .. }) if title == "Example"
        ));
        assert!(client_posts(&client).is_empty());
    }

    #[test]
    fn test_inaccessible_tab_still_appends() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let settings = Settings::new(Some("https://script.example/exec"), Schema::default_tag_groups());
        let coordinator = Coordinator::new(settings, &page, &client);

        let flow = block_on(coordinator.run(Trigger::ToolbarIcon {
            tab: TabInfo::new(3, "chrome://settings", "Settings"),
        }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::Appended));
        assert!(page.commands.borrow().is_empty());
        let posts = client_posts(&client);
        assert_eq!(posts[0]["title"], "Settings");
        assert_eq!(posts[0]["tagValues"], serde_json::json!(["", "", ""]));
    }

    #[test]
    fn test_page_failures_do_not_abort_capture() {
        let page = RecordingPage {
            fail: true,
            ..Default::default()
        };
        let client = FakeTransport::replying(Some(false));
        let settings = Settings::new(Some("https://script.example/exec"), Schema::default_tag_groups());
        let coordinator = Coordinator::new(settings, &page, &client);

        let flow = block_on(coordinator.run(Trigger::Shortcut { tab: Some(example_tab()) }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::Appended));
        let names: Vec<&str> = page.commands.borrow().iter().map(|(_, c)| c.name()).collect();
        assert_eq!(names, vec!["openPanel", "writeClipboard", "showToast"]);
    }

    #[test]
    fn test_link_capture_uses_anchor_text() {
        let page = RecordingPage {
            link_title: Some("Linked article".to_string()),
            ..Default::default()
        };
        let client = FakeTransport::replying(Some(false));
        let coordinator = Coordinator::new(quick_settings(Some("https://script.example/exec")), &page, &client);

        block_on(coordinator.run(Trigger::ContextMenu {
            info: menu_info(Some("https://a.example/post")),
            tab: Some(example_tab()),
        }));

        let posts = client_posts(&client);
        assert_eq!(posts[0]["title"], "Linked article");
        assert_eq!(posts[0]["url"], "https://a.example/post");
    }

    #[test]
    fn test_link_capture_falls_back_to_url() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let coordinator = Coordinator::new(quick_settings(Some("https://script.example/exec")), &page, &client);

        block_on(coordinator.run(Trigger::ContextMenu {
            info: menu_info(Some("https://a.example/post")),
            tab: Some(TabInfo::new(5, "chrome://newtab", "New Tab")),
        }));

        let posts = client_posts(&client);
        assert_eq!(posts[0]["title"], "https://a.example/post");
        assert!(page.commands.borrow().is_empty());
    }

    #[test]
    fn test_schema_drift_refuses_capture() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let settings = Settings::new(Some("https://script.example/exec"), Schema::Categories(vec!["仕事".to_string()]));
        let coordinator = Coordinator::new(settings, &page, &client);

        let submission = PanelSubmission::new(
            "Example",
            "https://example.com",
            Selection::GroupValues {
                values: vec![String::new(); 3],
            },
        );
        let flow = block_on(coordinator.run(Trigger::PanelSubmitted {
            submission,
            tab: Some(example_tab()),
        }));

        assert_eq!(flow, CaptureFlow::Notified(Outcome::ConfigurationError));
        assert!(client_posts(&client).is_empty());
        let names: Vec<&str> = page.commands.borrow().iter().map(|(_, c)| c.name()).collect();
        assert_eq!(names, vec!["showToast"]);
    }

    #[test]
    fn test_ignored_triggers() {
        let page = RecordingPage::default();
        let client = FakeTransport::replying(Some(false));
        let coordinator = Coordinator::new(quick_settings(None), &page, &client);

        let other_menu = MenuClickInfo {
            menu_item_id: "somethingElse".to_string(),
            ..Default::default()
        };
        assert_eq!(
            block_on(coordinator.run(Trigger::ContextMenu {
                info: other_menu,
                tab: Some(example_tab())
            })),
            CaptureFlow::Ignored
        );
        assert_eq!(block_on(coordinator.run(Trigger::Shortcut { tab: None })), CaptureFlow::Ignored);
        assert!(page.commands.borrow().is_empty());
    }
}
