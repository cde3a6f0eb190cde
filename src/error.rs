use chrono::NaiveDate;
use thiserror::Error;

/// Typed failures the conversion distinguishes. Everything else travels as
/// `anyhow::Error` with path context attached.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("config file invalid or unreadable: {0}")]
    InvalidConfig(String),
    #[error("export is not a journal document: {0}")]
    InvalidExport(String),
    #[error("entry #{index} is malformed: {reason}")]
    MalformedEntry { index: usize, reason: String },
    #[error("too many entries for {date}: suffixes a-z are all taken")]
    SuffixesExhausted { date: NaiveDate },
    #[error("attachment name `{0}` is not a plain file name")]
    UnsafeAttachmentName(String),
    #[error("another conversion holds the lock at {0}")]
    Locked(String),
}
