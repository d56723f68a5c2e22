//! On-disk poll schema, decoupled from the in-memory [`Poll`] so the file
//! layout can evolve behind the version tag.

use serde::{Deserialize, Serialize};
use termin_core::{CoreError, Poll};
use thiserror::Error;

pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unsupported poll record version {0}")]
    UnsupportedVersion(u32),
    #[error("malformed poll record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record does not form a valid poll: {0}")]
    Invalid(#[from] CoreError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollRecord {
    pub version: u32,
    pub name: String,
    pub question: String,
    pub options: Vec<String>,
    pub posted_item_id: Option<String>,
}

impl PollRecord {
    pub fn from_poll(poll: &Poll) -> Self {
        Self {
            version: RECORD_VERSION,
            name: poll.name().to_string(),
            question: poll.question().to_string(),
            options: poll.options().to_vec(),
            posted_item_id: poll.posted_item_id().map(str::to_string),
        }
    }

    /// Rebuild the poll through its constructor so every entity invariant
    /// is re-checked on load.
    pub fn into_poll(self) -> Result<Poll, RecordError> {
        if self.version != RECORD_VERSION {
            return Err(RecordError::UnsupportedVersion(self.version));
        }
        let mut poll = Poll::new(self.name, self.question, self.options)?;
        if let Some(item_id) = self.posted_item_id {
            poll.mark_posted(item_id)?;
        }
        Ok(poll)
    }

    pub fn encode(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn decode(raw: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_posted_poll() {
        let mut poll = Poll::new("trip", "Where to?", vec!["A".into(), "B".into()]).unwrap();
        poll.mark_posted("42").unwrap();

        let encoded = PollRecord::from_poll(&poll).encode().unwrap();
        let decoded = PollRecord::decode(&encoded).unwrap().into_poll().unwrap();
        assert_eq!(decoded.name(), "trip");
        assert_eq!(decoded.question(), "Where to?");
        assert_eq!(decoded.options(), poll.options());
        assert_eq!(decoded.posted_item_id(), Some("42"));
    }

    #[test]
    fn rejects_future_versions() {
        let record = PollRecord {
            version: RECORD_VERSION + 1,
            name: "x".into(),
            question: "q".into(),
            options: vec!["A".into()],
            posted_item_id: None,
        };
        assert!(matches!(
            record.into_poll(),
            Err(RecordError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn rejects_records_that_violate_poll_invariants() {
        let record = PollRecord {
            version: RECORD_VERSION,
            name: "x".into(),
            question: "q".into(),
            options: vec![],
            posted_item_id: None,
        };
        assert!(matches!(record.into_poll(), Err(RecordError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            PollRecord::decode("{not json"),
            Err(RecordError::Json(_))
        ));
    }
}
