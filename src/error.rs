/// Error types for Sheet Capture
use thiserror::Error;

/// Failures inside one capture. None of these cross a pipeline stage: the
/// coordinator logs them and carries on to the notification step.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The page refused the command (protected page, no content script, ...)
    #[error("page command failed: {0}")]
    Injection(String),

    /// chrome.storage read or write failed
    #[error("storage error: {0}")]
    Storage(String),

    /// A panel submission does not have the shape of the configured schema
    #[error("selection does not match configured schema (expected {expected}, got {got})")]
    SchemaMismatch { expected: String, got: String },

    /// The endpoint answered with a non-2xx status
    #[error("endpoint returned HTTP {0}")]
    Http(u16),

    /// The request never completed
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered 2xx but the body was not the expected JSON
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Validation failures raised by options-page edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("名前を入力してください")]
    EmptyName,

    #[error("「{0}」は既に存在します")]
    DuplicateName(String),

    #[error("index {0} is out of range")]
    OutOfRange(usize),

    #[error("この操作は現在の設定形式では使用できません")]
    WrongSchema,
}
