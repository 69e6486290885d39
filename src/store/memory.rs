//! In-memory song store with optional JSON file persistence.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{Song, SongDraft, SongId, SongStore, StoreError};

/// Sample catalogue loaded into an empty store. Lyrics are left blank.
const CATALOGUE: &[(&str, &str)] = &[
    ("Daft Punk", "Get lucky"),
    ("Foster the people", "Pumped up kicks"),
    ("Imagine Dragons", "Radioactive"),
    ("Oasis", "Wonderwall"),
    ("Nirvana", "Come as you are"),
    ("Nirvana", "Smells like teen spirit"),
    ("Green day", "Wake me up when September ends"),
    ("Green day", "Boulevard of broken dreams"),
    ("Depeche mode", "Personal Jesus"),
    ("Nickelback", "How you remind me"),
    ("Metallica", "Fade to black"),
    ("Metallica", "Unforgiven"),
    ("Limp Bizkit", "Behind blue eyes"),
    ("Aerosmith", "Dream on"),
    ("Scorpions", "Still loving you"),
    ("Sting", "Shape of my heart"),
    ("Cranberries", "Zombie"),
    ("Poets of the fall", "Carnival of Rust"),
    ("RHCP", "Otherside"),
    ("RHCP", "Californication"),
    ("Звери", "Районы Кварталы"),
    ("Ария", "Беспечный ангел"),
    ("Машина времени", "Не стоит прогибаться"),
    ("Сплин", "Выхода нет"),
];

#[derive(Debug, Default)]
struct Inner {
    songs: BTreeMap<SongId, Song>,
    next_id: SongId,
}

/// A thread-safe song store kept in memory.
#[derive(Debug, Default)]
pub struct MemorySongStore {
    inner: RwLock<Inner>,
    persistence_path: Option<PathBuf>,
}

impl MemorySongStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given songs, keeping their ids.
    pub fn with_songs(songs: impl IntoIterator<Item = Song>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.write();
            for song in songs {
                inner.next_id = inner.next_id.max(song.id);
                inner.songs.insert(song.id, song);
            }
        }
        store
    }

    /// Load from file if it exists, otherwise start empty.
    ///
    /// The path is remembered for [`MemorySongStore::save_to_file`].
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut store = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let songs: Vec<Song> = serde_json::from_reader(reader)?;
            let store = Self::with_songs(songs);
            tracing::info!(path = %path.display(), songs = store.len(), "Loaded song file");
            store
        } else {
            tracing::info!(path = %path.display(), "Song file not found, starting empty");
            Self::new()
        };
        store.persistence_path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Save to the file this store was loaded from. No-op for purely in-memory stores.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let songs: Vec<Song> = self.read().songs.values().cloned().collect();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &songs)?;
        tracing::info!(path = %path.display(), songs = songs.len(), "Saved song file");
        Ok(())
    }

    /// Fill an empty store with the sample catalogue. Returns how many songs were added.
    pub fn prepopulate_if_empty(&self) -> usize {
        let mut inner = self.write();
        if !inner.songs.is_empty() {
            return 0;
        }
        for (author, name) in CATALOGUE {
            insert_locked(&mut inner, SongDraft::catalogue(author, name));
        }
        tracing::info!(songs = CATALOGUE.len(), "Seeded song catalogue");
        CATALOGUE.len()
    }

    /// Number of stored songs.
    pub fn len(&self) -> usize {
        self.read().songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert_locked(inner: &mut Inner, draft: SongDraft) -> SongId {
    inner.next_id += 1;
    let id = inner.next_id;
    inner.songs.insert(id, draft.into_song(id));
    id
}

impl SongStore for MemorySongStore {
    fn get_by_id(&self, id: SongId) -> Result<Option<Song>, StoreError> {
        Ok(self.read().songs.get(&id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Song>, StoreError> {
        let mut songs: Vec<Song> = self.read().songs.values().cloned().collect();
        songs.sort_by(Song::listing_order);
        Ok(songs)
    }

    fn insert(&self, draft: SongDraft) -> Result<SongId, StoreError> {
        Ok(insert_locked(&mut self.write(), draft))
    }

    fn update(&self, song: &Song) -> Result<bool, StoreError> {
        let mut inner = self.write();
        match inner.songs.get_mut(&song.id) {
            Some(existing) => {
                *existing = song.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: SongId) -> Result<bool, StoreError> {
        Ok(self.write().songs.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(author: &str, name: &str) -> SongDraft {
        SongDraft::new(author, name, "la la la").unwrap()
    }

    #[test]
    fn list_all_orders_by_author_then_name() {
        let store = MemorySongStore::new();
        store.insert(draft("Oasis", "Wonderwall")).unwrap();
        store.insert(draft("Nirvana", "Smells like teen spirit")).unwrap();
        store.insert(draft("Nirvana", "Come as you are")).unwrap();

        let names: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|s| (s.author, s.name))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Nirvana".to_string(), "Come as you are".to_string()),
                ("Nirvana".to_string(), "Smells like teen spirit".to_string()),
                ("Oasis".to_string(), "Wonderwall".to_string()),
            ]
        );
    }

    #[test]
    fn insert_update_delete() {
        let store = MemorySongStore::new();
        let id = store.insert(draft("Sting", "Shape of my heart")).unwrap();

        let mut song = store.get_by_id(id).unwrap().unwrap();
        song.lyrics = "He deals the cards".into();
        assert!(store.update(&song).unwrap());
        assert_eq!(store.get_by_id(id).unwrap().unwrap().lyrics, "He deals the cards");

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get_by_id(id).unwrap().is_none());

        song.id = 999;
        assert!(!store.update(&song).unwrap());
    }

    #[test]
    fn ids_keep_increasing_after_explicit_songs() {
        let store = MemorySongStore::with_songs([Song {
            id: 40,
            author: "Aerosmith".into(),
            name: "Dream on".into(),
            lyrics: String::new(),
        }]);
        let id = store.insert(draft("Scorpions", "Still loving you")).unwrap();
        assert_eq!(id, 41);
    }

    #[test]
    fn prepopulate_only_when_empty() {
        let store = MemorySongStore::new();
        let added = store.prepopulate_if_empty();
        assert_eq!(added, store.len());
        assert!(added > 0);
        assert_eq!(store.prepopulate_if_empty(), 0);
    }

    #[test]
    fn file_round_trip_keeps_ids() {
        let path = std::env::temp_dir().join(format!("bard-songs-{}.json", uuid::Uuid::new_v4()));

        let store = MemorySongStore::load_from_file(&path).unwrap();
        assert!(store.is_empty());
        let id = store.insert(draft("Cranberries", "Zombie")).unwrap();
        store.save_to_file().unwrap();

        let reloaded = MemorySongStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.get_by_id(id).unwrap().unwrap().name, "Zombie");

        std::fs::remove_file(&path).unwrap();
    }
}
