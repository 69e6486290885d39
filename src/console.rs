//! Line-oriented performer console.
//!
//! Each input line is parsed as a clap subcommand and run against the shared
//! session and song store. The console never talks to the network; it only
//! reads and changes the same state the audience endpoints use.

use std::fmt::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::net::interfaces::display_address;
use crate::session::dashboard::{reaction_results, reaction_status, voting_results, voting_status};
use crate::session::Session;
use crate::store::{SongId, SongStore, StoreError};

#[derive(Debug, Parser)]
#[command(name = "console", no_binary_name = true, disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

/// Performer commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List the song catalogue
    Songs,
    /// Show a song to the audience and start a new voting round
    Play { id: SongId },
    /// Finish the current song; votes keep coming in
    Finish,
    /// Show the vote tally
    Votes,
    /// Show the reaction tally
    Reactions,
    /// Show the address the audience should open
    Address,
    /// Stop the server and exit
    #[command(alias = "exit")]
    Quit,
}

/// Errors from running a console command.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("no song with id {0}")]
    UnknownSong(SongId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// The error carries clap's rendered message, help output included.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ConsoleLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.render().to_string())
}

/// Performer view over the running server's state.
pub struct Console {
    session: Arc<Session>,
    store: Arc<dyn SongStore>,
    address: SocketAddr,
}

impl Console {
    pub fn new(session: Arc<Session>, store: Arc<dyn SongStore>, address: SocketAddr) -> Self {
        Self {
            session,
            store,
            address,
        }
    }

    pub fn execute(&self, command: Command) -> Result<Reply, ConsoleError> {
        let text = match command {
            Command::Songs => self.songs()?,
            Command::Play { id } => self.play(id)?,
            Command::Finish => {
                self.session.clear_current_song();
                "Song finished. Voting is open.".to_string()
            }
            Command::Votes => self.votes()?,
            Command::Reactions => self.reactions(),
            Command::Address => format!("Audience page: http://{}/", display_address(self.address)),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn songs(&self) -> Result<String, ConsoleError> {
        let songs = self.store.list_all()?;
        if songs.is_empty() {
            return Ok("No songs".to_string());
        }
        let playing = self.session.current_song().map(|song| song.id);
        let mut out = String::new();
        for song in songs {
            let marker = if Some(song.id) == playing { '*' } else { ' ' };
            let _ = writeln!(out, "{marker} [{}] {} - {}", song.id, song.author, song.name);
        }
        Ok(out.trim_end().to_string())
    }

    fn play(&self, id: SongId) -> Result<String, ConsoleError> {
        let song = self.store.get_by_id(id)?.ok_or(ConsoleError::UnknownSong(id))?;
        let line = format!("Now playing: {} - {}", song.author, song.name);
        self.session.set_current_song(Some(song));
        Ok(line)
    }

    fn votes(&self) -> Result<String, ConsoleError> {
        let results = voting_results(&self.session, self.store.as_ref())?;
        let mut out = voting_status(&results);
        for result in &results {
            let _ = write!(out, "\n  {:>3}  {} - {}", result.votes, result.song.author, result.song.name);
        }
        Ok(out)
    }

    fn reactions(&self) -> String {
        let results = reaction_results(&self.session);
        let mut out = reaction_status(&results);
        for result in &results {
            let _ = write!(out, "\n  {} {}: {}", result.emoji(), result.display_name(), result.count);
        }
        out
    }
}
