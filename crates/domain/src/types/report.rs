//! Per-item sync results and pass-level aggregation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of item a sync result refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Inventory,
    Product,
    Order,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inventory => write!(f, "inventory"),
            Self::Product => write!(f, "product"),
            Self::Order => write!(f, "order"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    Failed,
    /// Dry-run stand-in for a mutating call that was not performed.
    Skipped,
}

/// Outcome of syncing one item (one SKU, product, or order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub kind: ItemKind,
    pub id: String,
    pub outcome: SyncOutcome,
    /// Error message for failures; would-be payload for skips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SyncResult {
    pub fn success(kind: ItemKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into(), outcome: SyncOutcome::Success, detail: None }
    }

    pub fn failed(kind: ItemKind, id: impl Into<String>, error: impl Into<String>) -> Self {
        Self { kind, id: id.into(), outcome: SyncOutcome::Failed, detail: Some(error.into()) }
    }

    pub fn skipped(kind: ItemKind, id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self { kind, id: id.into(), outcome: SyncOutcome::Skipped, detail: Some(payload.into()) }
    }
}

/// Aggregated outcome of one sync pass (or a merged full pass).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub results: Vec<SyncResult>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: SyncResult) {
        self.results.push(result);
    }

    pub fn merge(&mut self, other: SyncReport) {
        self.results.extend(other.results);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(SyncOutcome::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(SyncOutcome::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(SyncOutcome::Skipped)
    }

    fn count(&self, outcome: SyncOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total, {} succeeded, {} failed, {} skipped",
            self.total(),
            self.succeeded(),
            self.failed(),
            self.skipped()
        )
    }
}
