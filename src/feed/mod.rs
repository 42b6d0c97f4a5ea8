//! Realtime job change feed.
//!
//! Every mutation on the jobs collection is published to a broadcast channel; each
//! subscriber (one per open SSE connection) receives the events independently.
//! [`FeedCursor`] holds the merge rule shared by the SSE stream and clients: for a given job
//! id the event with the newest server timestamp wins, and a delete wins a tie.

pub mod handlers;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::jobs::Job;

/// Wire format of one feed event; clients decode it from the SSE `data` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum JobChange {
    Insert {
        job: Job,
        #[serde(with = "time::serde::rfc3339")]
        at: OffsetDateTime,
    },
    Update {
        job: Job,
        #[serde(with = "time::serde::rfc3339")]
        at: OffsetDateTime,
    },
    Delete {
        id: Uuid,
        #[serde(with = "time::serde::rfc3339")]
        at: OffsetDateTime,
    },
}

impl JobChange {
    pub fn job_id(&self) -> Uuid {
        match self {
            JobChange::Insert { job, .. } | JobChange::Update { job, .. } => job.id,
            JobChange::Delete { id, .. } => *id,
        }
    }

    pub fn at(&self) -> OffsetDateTime {
        match self {
            JobChange::Insert { at, .. } | JobChange::Update { at, .. } | JobChange::Delete { at, .. } => *at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JobChange::Insert { .. } => "insert",
            JobChange::Update { .. } => "update",
            JobChange::Delete { .. } => "delete",
        }
    }
}

#[derive(Clone)]
pub struct JobFeed {
    tx: broadcast::Sender<JobChange>,
}

impl JobFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns how many subscribers the change was handed to.
    pub fn publish(&self, change: JobChange) -> usize {
        let kind = change.kind();
        let job_id = change.job_id();
        // No subscribers is not an error: nobody is watching.
        let delivered = self.tx.send(change).unwrap_or(0);
        debug!(%job_id, kind, delivered, "job change published");
        delivered
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobChange> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[derive(Debug, Clone, Copy)]
struct Seen {
    at: OffsetDateTime,
    deleted: bool,
}

/// Last applied event per job id.
#[derive(Debug, Default)]
pub struct FeedCursor {
    seen: HashMap<Uuid, Seen>,
}

impl FeedCursor {
    /// Seeds the cursor with rows already known from a snapshot.
    #[cfg(test)]
    pub fn with_snapshot<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let seen = jobs
            .into_iter()
            .map(|j| (j.id, Seen { at: j.created_at, deleted: false }))
            .collect();
        Self { seen }
    }

    /// Records `change` and returns true unless an equal-or-newer event for the same job
    /// was already admitted. A delete wins an exact tie.
    pub fn admit(&mut self, change: &JobChange) -> bool {
        let id = change.job_id();
        let at = change.at();
        if let Some(seen) = self.seen.get(&id) {
            if at < seen.at || (at == seen.at && seen.deleted) {
                return false;
            }
        }
        let deleted = matches!(change, JobChange::Delete { .. });
        self.seen.insert(id, Seen { at, deleted });
        true
    }
}

/// A job list kept current by applying feed events, newest first.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct JobListView {
    jobs: Vec<Job>,
    cursor: FeedCursor,
}

#[cfg(test)]
impl JobListView {
    pub fn new(mut snapshot: Vec<Job>) -> Self {
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let cursor = FeedCursor::with_snapshot(&snapshot);
        Self { jobs: snapshot, cursor }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Returns whether the list changed.
    pub fn apply(&mut self, change: &JobChange) -> bool {
        if !self.cursor.admit(change) {
            return false;
        }
        match change {
            JobChange::Insert { job, .. } | JobChange::Update { job, .. } => self.upsert(job.clone()),
            JobChange::Delete { id, .. } => self.jobs.retain(|j| j.id != *id),
        }
        true
    }

    fn upsert(&mut self, job: Job) {
        if let Some(slot) = self.jobs.iter_mut().find(|j| j.id == job.id) {
            *slot = job;
            return;
        }
        let pos = self
            .jobs
            .iter()
            .position(|j| j.created_at < job.created_at)
            .unwrap_or(self.jobs.len());
        self.jobs.insert(pos, job);
    }
}
