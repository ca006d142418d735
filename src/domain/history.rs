use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Withdrawal,
    Deposit,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Withdrawal => "withdrawal",
            EntryKind::Deposit => "deposit",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One executed operation as it appears in an account's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    /// Amount in cents (always positive)
    pub amount: Cents,
    /// When the operation succeeded, truncated to whole seconds
    pub timestamp: DateTime<Utc>,
}

/// Append-only log of the operations executed against one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Only transactions call this, after the account
    /// accepted the balance change.
    pub(crate) fn record(&mut self, kind: EntryKind, amount: Cents, at: DateTime<Utc>) -> Entry {
        let entry = Entry {
            kind,
            amount,
            timestamp: at.trunc_subsecs(0),
        };
        self.entries.push(entry);
        entry
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of `kind` recorded at or after `since`.
    /// `None` counts the whole history.
    pub fn count_since(&self, kind: EntryKind, since: Option<DateTime<Utc>>) -> usize {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| since.is_none_or(|start| e.timestamp >= start))
            .count()
    }

    /// Sum of all amounts recorded with `kind`, saturating at `Cents::MAX`.
    pub fn total(&self, kind: EntryKind) -> Cents {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .fold(0, |total: Cents, e| total.saturating_add(e.amount))
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }
}
