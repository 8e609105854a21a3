use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::DisplayRecord;

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CycleStatus {
    Complete,
    /// Team-wide data is valid; the listed members fell back to `[]`.
    Partial { failed_members: Vec<String> },
    /// Nothing trustworthy was extracted; the result is the empty fallback.
    Failed { reason: String },
}

impl CycleStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, CycleStatus::Failed { .. })
    }
}

/// Everything one cycle produced. Replaces the previous result wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub team: Vec<DisplayRecord>,
    /// Member name to that member's records, in configured member order.
    pub members: IndexMap<String, Vec<DisplayRecord>>,
    pub last_updated: DateTime<Utc>,
    pub status: CycleStatus,
}

impl CrawlResult {
    /// The fail-safe result of a cycle that could not extract anything.
    pub fn empty(reason: impl ToString) -> Self {
        Self {
            team: Vec::new(),
            members: IndexMap::new(),
            last_updated: Utc::now(),
            status: CycleStatus::Failed { reason: reason.to_string() },
        }
    }

    pub fn member(&self, name: &str) -> Option<&[DisplayRecord]> {
        self.members.get(name).map(Vec::as_slice)
    }

    pub fn record_count(&self) -> usize {
        self.team.len() + self.members.values().map(Vec::len).sum::<usize>()
    }
}
