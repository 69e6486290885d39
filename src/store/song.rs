//! Song records and their read-only projections.

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Integer identifier assigned by the song store.
pub type SongId = i64;

/// A song as held by the store and shown to the audience while it is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: SongId,
    pub author: String,
    /// Song title. Serialized as `name`, which is what the audience page reads.
    pub name: String,
    pub lyrics: String,
}

impl Song {
    /// Project this song onto the voting-list view.
    pub fn summary(&self) -> SongSummary {
        SongSummary {
            id: self.id,
            author: self.author.clone(),
            name: self.name.clone(),
        }
    }

    /// Ordering used by every song listing: author, then name.
    pub(crate) fn listing_order(a: &Song, b: &Song) -> std::cmp::Ordering {
        a.author.cmp(&b.author).then_with(|| a.name.cmp(&b.name))
    }
}

/// The voting-list view of a song. Never carries lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: SongId,
    pub author: String,
    pub name: String,
}

/// A song that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub(crate) author: String,
    pub(crate) name: String,
    pub(crate) lyrics: String,
}

impl SongDraft {
    /// Build a draft from editor input.
    ///
    /// Every field is trimmed and must be non-empty afterwards.
    pub fn new(
        author: impl AsRef<str>,
        name: impl AsRef<str>,
        lyrics: impl AsRef<str>,
    ) -> Result<Self, StoreError> {
        let author = author.as_ref().trim();
        let name = name.as_ref().trim();
        let lyrics = lyrics.as_ref().trim();

        let missing: Vec<&str> = [("author", author), ("name", name), ("lyrics", lyrics)]
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            author: author.to_string(),
            name: name.to_string(),
            lyrics: lyrics.to_string(),
        })
    }

    /// Catalogue entries ship without lyrics, so they skip editor validation.
    pub(crate) fn catalogue(author: &str, name: &str) -> Self {
        Self {
            author: author.to_string(),
            name: name.to_string(),
            lyrics: String::new(),
        }
    }

    pub(crate) fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            author: self.author,
            name: self.name,
            lyrics: self.lyrics,
        }
    }
}
