use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("poll {0:?} already exists")]
    AlreadyExists(String),
    #[error("poll {0:?} does not exist")]
    NotFound(String),
    /// Expected outcome of a resolution attempt, not a defect. The poll
    /// stays open for further voting.
    #[error("no option was picked by every eligible voter")]
    NoConsensus,
    #[error("no calendar template is configured")]
    TemplateMissing,
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    #[error("option index {index} out of range ({len} options)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),
    #[error("storage error: {0}")]
    Storage(#[source] anyhow::Error),
}
