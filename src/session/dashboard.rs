//! Performer-side views of the vote and reaction tallies.

use crate::session::{ReactionKind, Session};
use crate::store::{Song, SongStore, StoreError};

/// A song with the number of votes it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingResult {
    pub song: Song,
    pub votes: u32,
}

/// A reaction kind with its running count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionResult {
    pub kind: ReactionKind,
    pub count: u64,
}

impl ReactionResult {
    pub fn emoji(&self) -> &'static str {
        self.kind.emoji()
    }

    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }
}

/// Current votes joined with their songs, most votes first.
///
/// Votes for ids the store does not know are left out.
pub fn voting_results(
    session: &Session,
    store: &dyn SongStore,
) -> Result<Vec<VotingResult>, StoreError> {
    let mut results = Vec::new();
    for (song_id, votes) in session.vote_counts() {
        if let Some(song) = store.get_by_id(song_id)? {
            results.push(VotingResult { song, votes });
        }
    }
    results.sort_by(|a, b| b.votes.cmp(&a.votes));
    Ok(results)
}

/// Reaction totals, highest count first.
pub fn reaction_results(session: &Session) -> Vec<ReactionResult> {
    let mut results: Vec<ReactionResult> = session
        .reaction_totals()
        .into_iter()
        .map(|(kind, count)| ReactionResult { kind, count })
        .collect();
    results.sort_by(|a, b| b.count.cmp(&a.count));
    results
}

/// Status line above the vote list.
pub fn voting_status(results: &[VotingResult]) -> String {
    let votes: u32 = results.iter().map(|r| r.votes).sum();
    match votes {
        0 => "No votes yet".to_string(),
        1 => "1 vote received".to_string(),
        n => format!("{n} votes received"),
    }
}

/// Status line above the reaction list.
pub fn reaction_status(results: &[ReactionResult]) -> String {
    let total: u64 = results.iter().map(|r| r.count).sum();
    match total {
        0 => "No reactions yet".to_string(),
        1 => "1 reaction".to_string(),
        n => format!("{n} reactions"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySongStore;

    fn store() -> MemorySongStore {
        MemorySongStore::with_songs([
            Song {
                id: 1,
                author: "Oasis".into(),
                name: "Wonderwall".into(),
                lyrics: String::new(),
            },
            Song {
                id: 2,
                author: "Nirvana".into(),
                name: "Come as you are".into(),
                lyrics: String::new(),
            },
        ])
    }

    #[test]
    fn voting_results_sorted_and_skip_unknown_songs() {
        let session = Session::new();
        session.register_vote("a", 1);
        session.register_vote("b", 2);
        session.register_vote("c", 2);
        session.register_vote("d", 404);

        let results = voting_results(&session, &store()).unwrap();
        let ids: Vec<_> = results.iter().map(|r| (r.song.id, r.votes)).collect();
        assert_eq!(ids, vec![(2, 2), (1, 1)]);
        assert_eq!(voting_status(&results), "3 votes received");
        assert_eq!(voting_status(&results[1..]), "1 vote received");
        assert_eq!(voting_status(&[]), "No votes yet");
    }

    #[test]
    fn reaction_results_sorted_with_labels() {
        let session = Session::new();
        session.register_reaction(ReactionKind::Tomato);
        session.register_reaction(ReactionKind::Heart);
        session.register_reaction(ReactionKind::Heart);

        let results = reaction_results(&session);
        assert_eq!(results[0].kind, ReactionKind::Heart);
        assert_eq!(results[0].display_name(), "Hearts");
        assert_eq!(results[1].emoji(), "🍅");
        assert_eq!(reaction_status(&results), "3 reactions");
        assert_eq!(reaction_status(&results[1..]), "1 reaction");
        assert_eq!(reaction_status(&[]), "No reactions yet");
    }
}
