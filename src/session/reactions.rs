//! Audience reaction tallies.
//!
//! Reactions are not deduplicated per client: every ping counts.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of reactions the audience can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Panties,
    Heart,
    Tomato,
    Shutup,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::Panties,
        ReactionKind::Heart,
        ReactionKind::Tomato,
        ReactionKind::Shutup,
    ];

    /// Wire name, as used in `/react?type=`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Panties => "panties",
            ReactionKind::Heart => "heart",
            ReactionKind::Tomato => "tomato",
            ReactionKind::Shutup => "shutup",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ReactionKind::Panties => "👙",
            ReactionKind::Heart => "❤️",
            ReactionKind::Tomato => "🍅",
            ReactionKind::Shutup => "🤫",
        }
    }

    /// Plural label for the performer dashboard.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReactionKind::Panties => "Panties",
            ReactionKind::Heart => "Hearts",
            ReactionKind::Tomato => "Tomatoes",
            ReactionKind::Shutup => "Shut ups",
        }
    }
}

impl std::fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reaction name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown reaction kind: {0:?}")]
pub struct UnknownReaction(pub String);

impl FromStr for ReactionKind {
    type Err = UnknownReaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReaction(s.to_string()))
    }
}

/// Running count per reaction kind, guarded by a single lock.
#[derive(Debug, Default)]
pub struct ReactionTable {
    counts: Mutex<HashMap<ReactionKind, u64>>,
}

impl ReactionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one reaction and return the new total for its kind.
    pub fn register(&self, kind: ReactionKind) -> u64 {
        let mut counts = self.lock();
        let count = counts.entry(kind).or_insert(0);
        *count += 1;
        *count
    }

    /// Totals of every kind received so far. Kinds never sent are absent.
    pub fn totals(&self) -> BTreeMap<ReactionKind, u64> {
        self.lock().iter().map(|(kind, count)| (*kind, *count)).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Total number of reactions across all kinds.
    pub fn total(&self) -> u64 {
        self.lock().values().sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ReactionKind, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
