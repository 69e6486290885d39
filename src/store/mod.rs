//! Song storage boundary.
//!
//! # Data Flow
//! ```text
//! performer edits songs
//!     → SongStore::insert / update / delete
//!
//! audience request
//!     → SongStore::list_all (author, then name)
//!     → SongSummary projection (no lyrics)
//!
//! performer picks a song
//!     → SongStore::get_by_id
//!     → Session::set_current_song
//! ```
//!
//! # Design Decisions
//! - The server only reads the store; views never outlive one request
//! - `list_all` ordering is part of the contract, not left to callers

pub mod memory;
pub mod song;

pub use memory::MemorySongStore;
pub use song::{Song, SongDraft, SongId, SongSummary};

use thiserror::Error;

/// Errors raised by song storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Song input failed validation.
    #[error("invalid song: {0}")]
    Validation(String),

    /// Backing file could not be read or written.
    #[error("song file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file held malformed JSON.
    #[error("song file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable song records keyed by integer id.
pub trait SongStore: Send + Sync {
    /// Look up one song.
    fn get_by_id(&self, id: SongId) -> Result<Option<Song>, StoreError>;

    /// Every song, sorted by author and then by name.
    fn list_all(&self) -> Result<Vec<Song>, StoreError>;

    /// Store a new song and return its assigned id.
    fn insert(&self, draft: SongDraft) -> Result<SongId, StoreError>;

    /// Replace the song with the same id. Returns `false` when no such song exists.
    fn update(&self, song: &Song) -> Result<bool, StoreError>;

    /// Remove a song. Returns `false` when no such song exists.
    fn delete(&self, id: SongId) -> Result<bool, StoreError>;
}
