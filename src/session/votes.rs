//! Per-client votes for the next song.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::store::SongId;

/// Opaque, client-generated identifier. Not authenticated.
pub type ClientId = String;

/// Message returned when a client repeats its current vote.
pub const ALREADY_VOTED: &str = "Already voted for this song";
/// Message returned when a vote is stored.
pub const VOTE_RECORDED: &str = "Vote recorded";

/// Result of [`VoteTable::cast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// First vote from this client.
    Recorded,
    /// The client moved its vote from another song.
    Changed { previous: SongId },
    /// The client already votes for this song; nothing changed.
    AlreadyVoted,
}

impl VoteOutcome {
    /// Whether the table accepted the vote.
    pub fn is_success(&self) -> bool {
        !matches!(self, VoteOutcome::AlreadyVoted)
    }

    /// Message shown to the voting client.
    pub fn message(&self) -> &'static str {
        match self {
            VoteOutcome::AlreadyVoted => ALREADY_VOTED,
            _ => VOTE_RECORDED,
        }
    }

    /// Label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOutcome::Recorded => "recorded",
            VoteOutcome::Changed { .. } => "changed",
            VoteOutcome::AlreadyVoted => "repeat",
        }
    }
}

/// Mapping of client → chosen song, at most one vote per client.
///
/// Every operation runs under one lock over the whole table, so a tally never
/// observes a half-applied vote or clear.
#[derive(Debug, Default)]
pub struct VoteTable {
    votes: Mutex<HashMap<ClientId, SongId>>,
}

impl VoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `song` as the vote of `client`.
    ///
    /// Repeating the current vote is rejected without touching the table;
    /// voting for a different song replaces the previous vote.
    pub fn cast(&self, client: &str, song: SongId) -> VoteOutcome {
        let mut votes = self.lock();
        match votes.get(client).copied() {
            Some(current) if current == song => VoteOutcome::AlreadyVoted,
            Some(previous) => {
                votes.insert(client.to_string(), song);
                VoteOutcome::Changed { previous }
            }
            None => {
                votes.insert(client.to_string(), song);
                VoteOutcome::Recorded
            }
        }
    }

    /// The song `client` currently votes for.
    pub fn vote_of(&self, client: &str) -> Option<SongId> {
        self.lock().get(client).copied()
    }

    /// Count of votes per song, taken from one consistent snapshot.
    pub fn tally(&self) -> BTreeMap<SongId, u32> {
        let votes = self.lock();
        let mut counts = BTreeMap::new();
        for song in votes.values() {
            *counts.entry(*song).or_insert(0) += 1;
        }
        counts
    }

    /// Drop every vote.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of clients with a recorded vote.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, SongId>> {
        self.votes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
