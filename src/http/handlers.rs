//! Endpoint handlers.
//!
//! Each handler turns a parsed request into a complete [`Response`]. None of
//! them touch the socket; `server.rs` owns framing and I/O.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::http::page::AUDIENCE_PAGE;
use crate::http::request::Request;
use crate::http::response::{Outcome, Response, Status};
use crate::observability::metrics;
use crate::routing::Route;
use crate::session::{ReactionKind, Session};
use crate::store::{SongId, SongStore, SongSummary};

/// Message returned by a successful `/react`.
pub const REACTION_RECORDED: &str = "Reaction recorded";

/// Shared state handed to every connection worker.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub store: Arc<dyn SongStore>,
}

impl AppState {
    pub fn new(session: Arc<Session>, store: Arc<dyn SongStore>) -> Self {
        Self { session, store }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VotingState {
    vote_counts: BTreeMap<SongId, u32>,
    /// The client's vote as a string, or the literal `"null"`.
    client_vote: String,
}

/// Dispatch a routed request.
pub fn handle(state: &AppState, route: Route, request: &Request) -> Response {
    match route {
        Route::AudiencePage => Response::html(Status::Ok, AUDIENCE_PAGE),
        Route::CurrentSong => current_song(state),
        Route::AvailableSongs => available_songs(state),
        Route::VotingState => voting_state(state, request),
        Route::Vote => vote(state, request),
        Route::React => react(state, request),
        Route::Reactions => Response::json(Status::Ok, &state.session.reaction_totals()),
        Route::NotFound => Response::not_found(),
    }
}

fn current_song(state: &AppState) -> Response {
    let song = state.session.current_song();
    Response::json(Status::Ok, &song.as_deref())
}

fn available_songs(state: &AppState) -> Response {
    match state.store.list_all() {
        Ok(songs) => {
            let summaries: Vec<SongSummary> = songs.iter().map(|song| song.summary()).collect();
            Response::json(Status::Ok, &summaries)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to list songs");
            Response::internal_error()
        }
    }
}

fn voting_state(state: &AppState, request: &Request) -> Response {
    let client_vote = request
        .query_param("clientId")
        .and_then(|client| state.session.vote_for_client(&client))
        .map_or_else(|| "null".to_string(), |song| song.to_string());

    let body = VotingState {
        vote_counts: state.session.vote_counts(),
        client_vote,
    };
    Response::json(Status::Ok, &body)
}

fn vote(state: &AppState, request: &Request) -> Response {
    let client = request.query_param("clientId").filter(|c| !c.is_empty());
    let song = request
        .query_param("songId")
        .and_then(|raw| raw.trim().parse::<SongId>().ok());

    let (Some(client), Some(song)) = (client, song) else {
        tracing::debug!(request_id = %request.id, query = ?request.query, "Rejected vote");
        return Response::bad_request();
    };

    let outcome = state.session.register_vote(&client, song);
    metrics::record_vote(outcome.as_str());
    Response::json(Status::Ok, &Outcome::new(outcome.is_success(), outcome.message()))
}

fn react(state: &AppState, request: &Request) -> Response {
    let Some(kind) = request
        .query_param("type")
        .and_then(|raw| raw.parse::<ReactionKind>().ok())
    else {
        tracing::debug!(request_id = %request.id, query = ?request.query, "Rejected reaction");
        return Response::bad_request();
    };

    state.session.register_reaction(kind);
    metrics::record_reaction(kind.as_str());
    Response::json(Status::Ok, &Outcome::new(true, REACTION_RECORDED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Router;
    use crate::store::{MemorySongStore, Song};

    fn song(id: SongId, author: &str, name: &str) -> Song {
        Song {
            id,
            author: author.into(),
            name: name.into(),
            lyrics: format!("{name} lyrics"),
        }
    }

    fn state() -> AppState {
        let store = MemorySongStore::with_songs([
            song(1, "Oasis", "Wonderwall"),
            song(2, "Nirvana", "Come as you are"),
        ]);
        AppState::new(Arc::new(Session::new()), Arc::new(store))
    }

    fn get(state: &AppState, target: &str) -> (u16, String) {
        let request = Request::parse_request_line(&format!("GET {target} HTTP/1.1")).unwrap();
        let route = Router::new().match_request(&request);
        let response = handle(state, route, &request);
        (
            response.status().code(),
            String::from_utf8(response.body().to_vec()).unwrap(),
        )
    }

    #[test]
    fn current_song_is_null_until_set() {
        let state = state();
        assert_eq!(get(&state, "/current-song"), (200, "null".into()));

        state.session.set_current_song(Some(song(1, "Oasis", "Wonderwall")));
        let (status, body) = get(&state, "/current-song");
        assert_eq!(status, 200);
        assert_eq!(
            body,
            r#"{"id":1,"author":"Oasis","name":"Wonderwall","lyrics":"Wonderwall lyrics"}"#
        );
    }

    #[test]
    fn available_songs_sorted_without_lyrics() {
        let (status, body) = get(&state(), "/available-songs");
        assert_eq!(status, 200);
        assert_eq!(
            body,
            r#"[{"id":2,"author":"Nirvana","name":"Come as you are"},{"id":1,"author":"Oasis","name":"Wonderwall"}]"#
        );
    }

    #[test]
    fn repeat_vote_then_voting_state() {
        let state = state();
        assert_eq!(
            get(&state, "/vote?clientId=c1&songId=2").1,
            r#"{"success":true,"message":"Vote recorded"}"#
        );
        assert_eq!(
            get(&state, "/vote?clientId=c1&songId=2").1,
            r#"{"success":false,"message":"Already voted for this song"}"#
        );
        assert_eq!(
            get(&state, "/voting-state?clientId=c1").1,
            r#"{"voteCounts":{"2":1},"clientVote":"2"}"#
        );
        assert_eq!(
            get(&state, "/voting-state?clientId=c9").1,
            r#"{"voteCounts":{"2":1},"clientVote":"null"}"#
        );
        assert_eq!(
            get(&state, "/voting-state").1,
            r#"{"voteCounts":{"2":1},"clientVote":"null"}"#
        );
    }

    #[test]
    fn malformed_votes_are_bad_requests() {
        let state = state();
        for target in [
            "/vote",
            "/vote?clientId=c1",
            "/vote?songId=1",
            "/vote?clientId=&songId=1",
            "/vote?clientId=c1&songId=abc",
        ] {
            let (status, body) = get(&state, target);
            assert_eq!(status, 400, "{target}");
            assert_eq!(body, r#"{"success":false,"message":"Bad request"}"#);
        }
        assert!(state.session.vote_counts().is_empty());
    }

    #[test]
    fn votes_for_unknown_songs_are_accepted() {
        let state = state();
        let (status, body) = get(&state, "/vote?clientId=c1&songId=999");
        assert_eq!(status, 200);
        assert!(body.contains(r#""success":true"#));
    }

    #[test]
    fn reactions_count_and_reject_unknown_kinds() {
        let state = state();
        assert_eq!(
            get(&state, "/react?clientId=c1&type=heart").1,
            r#"{"success":true,"message":"Reaction recorded"}"#
        );
        get(&state, "/react?clientId=c2&type=heart");
        get(&state, "/react?type=tomato");

        assert_eq!(get(&state, "/react?clientId=c1&type=vomit").0, 400);
        assert_eq!(get(&state, "/react?clientId=c1").0, 400);

        assert_eq!(get(&state, "/reactions"), (200, r#"{"heart":2,"tomato":1}"#.into()));
    }

    #[test]
    fn page_and_not_found() {
        let state = state();
        let (status, body) = get(&state, "/");
        assert_eq!(status, 200);
        assert!(body.starts_with("<!DOCTYPE html>"));

        let (status, body) = get(&state, "/nonexistent");
        assert_eq!(status, 404);
        assert!(body.contains("404"));
    }
}
