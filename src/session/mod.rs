//! In-memory session state shared by request workers and the performer.
//!
//! # Data Flow
//! ```text
//! performer                      audience workers
//!     │ set_current_song             │ /vote, /react
//!     ▼                              ▼
//! ┌──────────────────────────────────────────────┐
//! │ Session                                       │
//! │   current   (lock-free swap)                  │
//! │   votes     (VoteTable, one mutex)            │
//! │   reactions (ReactionTable, one mutex)        │
//! └──────────────────────────────────────────────┘
//!     │ vote_counts / reaction_totals    │ /current-song, /voting-state
//!     ▼                                  ▼
//! dashboard                         JSON responses
//! ```
//!
//! # Design Decisions
//! - Starting a song (setting a non-null current song) clears votes and reactions
//! - Finishing a song (setting null) keeps both, so intermission votes survive
//! - At most one table lock is held at a time, never across I/O

pub mod dashboard;
pub mod reactions;
pub mod votes;

pub use reactions::{ReactionKind, ReactionTable, UnknownReaction};
pub use votes::{ClientId, VoteOutcome, VoteTable};

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::store::{Song, SongId};

/// State for one run of the server. Shared as `Arc<Session>`.
#[derive(Debug, Default)]
pub struct Session {
    current: ArcSwapOption<Song>,
    votes: VoteTable,
    reactions: ReactionTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the song shown to the audience.
    ///
    /// A new song starts a fresh round: votes and reactions are cleared.
    pub fn set_current_song(&self, song: Option<Song>) {
        match song {
            Some(song) => {
                tracing::info!(song_id = song.id, author = %song.author, name = %song.name, "Song started");
                self.current.store(Some(Arc::new(song)));
                self.votes.clear();
                self.reactions.clear();
            }
            None => {
                tracing::info!("Song finished");
                self.current.store(None);
            }
        }
    }

    /// Shorthand for `set_current_song(None)`.
    pub fn clear_current_song(&self) {
        self.set_current_song(None);
    }

    pub fn current_song(&self) -> Option<Arc<Song>> {
        self.current.load_full()
    }

    pub fn register_vote(&self, client: &str, song: SongId) -> VoteOutcome {
        let outcome = self.votes.cast(client, song);
        tracing::debug!(client_id = %client, song_id = song, outcome = outcome.as_str(), "Vote");
        outcome
    }

    pub fn vote_for_client(&self, client: &str) -> Option<SongId> {
        self.votes.vote_of(client)
    }

    pub fn vote_counts(&self) -> BTreeMap<SongId, u32> {
        self.votes.tally()
    }

    pub fn register_reaction(&self, kind: ReactionKind) -> u64 {
        let total = self.reactions.register(kind);
        tracing::debug!(kind = %kind, total, "Reaction");
        total
    }

    pub fn reaction_totals(&self) -> BTreeMap<ReactionKind, u64> {
        self.reactions.totals()
    }

    pub fn votes(&self) -> &VoteTable {
        &self.votes
    }

    pub fn reactions(&self) -> &ReactionTable {
        &self.reactions
    }
}
