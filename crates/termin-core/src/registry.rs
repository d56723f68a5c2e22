use crate::error::CoreError;
use crate::poll::Poll;
use crate::store::PollStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory registry of active polls, keyed by name.
///
/// The registry owns the canonical copy of every active poll; the store
/// holds a best-effort mirror refreshed on every state change. All
/// name-keyed operations serialize on one lock, so concurrent `create`
/// calls for the same name cannot both succeed. Save failures are logged
/// and never rolled back: during the process lifetime the in-memory state
/// is the source of truth.
pub struct PollRegistry {
    store: Arc<dyn PollStore>,
    polls: RwLock<HashMap<String, Poll>>,
}

impl PollRegistry {
    pub fn new(store: Arc<dyn PollStore>) -> Self {
        Self {
            store,
            polls: RwLock::new(HashMap::new()),
        }
    }

    /// Repopulate from durable storage. Called once at process start.
    /// A failing load leaves the registry empty; it never aborts startup.
    pub async fn restore(&self) -> usize {
        let loaded = match self.store.load_all().await {
            Ok(polls) => polls,
            Err(err) => {
                tracing::warn!("could not load durable polls: {err:#}");
                return 0;
            }
        };
        let mut polls = self.polls.write().await;
        for poll in loaded {
            polls.insert(poll.name().to_string(), poll);
        }
        polls.len()
    }

    /// Register a new draft poll. The caller posts the announcement and
    /// then calls [`PollRegistry::mark_posted`].
    pub async fn create(
        &self,
        name: &str,
        question: impl Into<String>,
        options: Vec<String>,
    ) -> Result<Poll, CoreError> {
        let poll = Poll::new(name, question, options)?;
        {
            let mut polls = self.polls.write().await;
            if polls.contains_key(name) {
                return Err(CoreError::AlreadyExists(name.to_string()));
            }
            polls.insert(name.to_string(), poll.clone());
        }
        self.persist(&poll).await;
        Ok(poll)
    }

    /// Snapshot of the poll with the given name.
    pub async fn lookup(&self, name: &str) -> Result<Poll, CoreError> {
        self.polls
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(name.to_string()))
    }

    /// Record the announcement id of a freshly posted poll and persist the
    /// updated record.
    pub async fn mark_posted(&self, name: &str, item_id: &str) -> Result<Poll, CoreError> {
        let poll = {
            let mut polls = self.polls.write().await;
            let poll = polls
                .get_mut(name)
                .ok_or_else(|| CoreError::NotFound(name.to_string()))?;
            poll.mark_posted(item_id)?;
            poll.clone()
        };
        self.persist(&poll).await;
        Ok(poll)
    }

    /// Detach a poll from the registry and retire its durable record. The
    /// name is reusable as soon as this returns. Deleting the announcement
    /// from the channel is the caller's job.
    pub async fn remove(&self, name: &str) -> Result<Poll, CoreError> {
        let poll = self
            .polls
            .write()
            .await
            .remove(name)
            .ok_or_else(|| CoreError::NotFound(name.to_string()))?;
        if let Err(err) = self.store.retire(&poll).await {
            tracing::warn!(poll = name, "could not retire durable record: {err:#}");
        }
        Ok(poll)
    }

    /// Unordered snapshot of all registered polls.
    pub async fn list_all(&self) -> Vec<Poll> {
        self.polls.read().await.values().cloned().collect()
    }

    async fn persist(&self, poll: &Poll) {
        if let Err(err) = self.store.save(poll).await {
            tracing::warn!(poll = poll.name(), "could not save durable record: {err:#}");
        }
    }
}
