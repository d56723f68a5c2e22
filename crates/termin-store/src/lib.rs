//! File-backed [`PollStore`]: one JSON record per active poll, retired
//! records archived under a timestamped name, plus the calendar template
//! and invite-metadata files.

pub mod record;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use record::PollRecord;
use std::io::ErrorKind;
use std::path::PathBuf;
use termin_core::store::{InviteDefaults, PollStore};
use termin_core::Poll;

const POLLS_DIR: &str = "polls";
const FINISHED_DIR: &str = "finished";
const TEMPLATE_FILE: &str = "template.ical";
const INVITE_DATA_FILE: &str = "invite.data";

/// Archive stamp for retired records.
const TIMESTAMP_FMT: &str = "%Y-%m-%d_%H-%M-%S";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the data directory, creating the expected layout. Missing
    /// template/metadata files are reported but not fatal: the bot can run
    /// polls without them, only `!endpoll` exports need the template.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(POLLS_DIR))
            .with_context(|| format!("creating {:?}", root.join(POLLS_DIR)))?;
        std::fs::create_dir_all(root.join(FINISHED_DIR))
            .with_context(|| format!("creating {:?}", root.join(FINISHED_DIR)))?;
        if !root.join(TEMPLATE_FILE).exists() {
            tracing::warn!(
                path = %root.join(TEMPLATE_FILE).display(),
                "no calendar template found, invite exports will be unavailable"
            );
        }
        if !root.join(INVITE_DATA_FILE).exists() {
            tracing::info!(
                path = %root.join(INVITE_DATA_FILE).display(),
                "no invite metadata found, using built-in defaults"
            );
        }
        Ok(Self { root })
    }

    fn poll_path(&self, name: &str) -> PathBuf {
        self.root
            .join(POLLS_DIR)
            .join(format!("{}.json", file_stem(name)))
    }

    fn archive_path(&self, name: &str) -> PathBuf {
        let stamp = Local::now().format(TIMESTAMP_FMT);
        self.root
            .join(FINISHED_DIR)
            .join(format!("{stamp}_{}.json", file_stem(name)))
    }
}

/// Poll names are user input; escape anything that is not filename-safe so
/// a name can never address a file outside the polls directory. Injective:
/// `%` itself gets escaped.
fn file_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            stem.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                stem.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    stem
}

#[async_trait]
impl PollStore for FileStore {
    async fn save(&self, poll: &Poll) -> Result<()> {
        let path = self.poll_path(poll.name());
        let encoded = PollRecord::from_poll(poll).encode()?;
        tokio::fs::write(&path, encoded)
            .await
            .with_context(|| format!("writing poll record {path:?}"))
    }

    async fn retire(&self, poll: &Poll) -> Result<()> {
        let from = self.poll_path(poll.name());
        let to = self.archive_path(poll.name());
        tokio::fs::rename(&from, &to)
            .await
            .with_context(|| format!("archiving poll record {from:?}"))
    }

    async fn load_all(&self) -> Result<Vec<Poll>> {
        let dir = self.root.join(POLLS_DIR);
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading {dir:?}"))?;
        let mut polls = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            // A record that fails to decode is skipped, never fatal.
            let poll = async {
                let raw = tokio::fs::read_to_string(&path).await?;
                anyhow::Ok(PollRecord::decode(&raw)?.into_poll()?)
            }
            .await;
            match poll {
                Ok(poll) => polls.push(poll),
                Err(err) => {
                    tracing::warn!(path = %path.display(), "skipping unreadable poll record: {err:#}");
                }
            }
        }
        Ok(polls)
    }

    async fn load_template(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.root.join(TEMPLATE_FILE)).await {
            Ok(text) if !text.trim().is_empty() => Ok(Some(text)),
            Ok(_) => Ok(None),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).context("reading calendar template"),
        }
    }

    async fn invite_defaults(&self) -> Result<InviteDefaults> {
        let raw = match tokio::fs::read_to_string(self.root.join(INVITE_DATA_FILE)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(InviteDefaults::default())
            }
            Err(err) => return Err(err).context("reading invite metadata"),
        };
        // Line-oriented: location, summary, description, then optionally
        // start and end time of day. Missing lines keep their defaults.
        let mut defaults = InviteDefaults::default();
        let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
        if let Some(location) = lines.next() {
            defaults.location = location.to_string();
        }
        if let Some(summary) = lines.next() {
            defaults.summary = summary.to_string();
        }
        if let Some(description) = lines.next() {
            defaults.description = description.to_string();
        }
        if let Some(start) = lines.next() {
            defaults.start_time = start.to_string();
        }
        if let Some(end) = lines.next() {
            defaults.end_time = end.to_string();
        }
        Ok(defaults)
    }
}
