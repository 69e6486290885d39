//! Route lookup.
//!
//! # Responsibilities
//! - Store the route table
//! - Resolve method + path to exactly one route
//! - Return an explicit `NotFound` rather than a silent default
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact path lookup via HashMap
//! - Only `GET` is routable; other methods are always `NotFound`

use std::collections::HashMap;

use crate::http::request::{Method, Request};

/// Every endpoint the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    AudiencePage,
    CurrentSong,
    AvailableSongs,
    VotingState,
    Vote,
    React,
    Reactions,
    NotFound,
}

impl Route {
    /// Label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::AudiencePage => "page",
            Route::CurrentSong => "current_song",
            Route::AvailableSongs => "available_songs",
            Route::VotingState => "voting_state",
            Route::Vote => "vote",
            Route::React => "react",
            Route::Reactions => "reactions",
            Route::NotFound => "not_found",
        }
    }
}

const ROUTES: &[(&str, Route)] = &[
    ("/", Route::AudiencePage),
    ("/current-song", Route::CurrentSong),
    ("/available-songs", Route::AvailableSongs),
    ("/voting-state", Route::VotingState),
    ("/vote", Route::Vote),
    ("/react", Route::React),
    ("/reactions", Route::Reactions),
];

/// Exact-match route table.
#[derive(Debug, Clone)]
pub struct Router {
    routes: HashMap<&'static str, Route>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: ROUTES.iter().copied().collect(),
        }
    }

    /// Resolve a method and path (query already stripped).
    pub fn resolve(&self, method: &Method, path: &str) -> Route {
        if *method != Method::Get {
            return Route::NotFound;
        }
        self.routes.get(path).copied().unwrap_or(Route::NotFound)
    }

    /// Resolve a parsed request.
    pub fn match_request(&self, request: &Request) -> Route {
        self.resolve(&request.method, &request.path)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(line: &str) -> Route {
        let request = Request::parse_request_line(line).unwrap();
        Router::new().match_request(&request)
    }

    #[test]
    fn exact_paths_resolve() {
        assert_eq!(route("GET / HTTP/1.1"), Route::AudiencePage);
        assert_eq!(route("GET /current-song HTTP/1.1"), Route::CurrentSong);
        assert_eq!(route("GET /available-songs HTTP/1.1"), Route::AvailableSongs);
        assert_eq!(route("GET /reactions HTTP/1.1"), Route::Reactions);
    }

    #[test]
    fn query_does_not_affect_matching() {
        assert_eq!(route("GET /voting-state?clientId=c1 HTTP/1.1"), Route::VotingState);
        assert_eq!(route("GET /vote?clientId=c1&songId=2 HTTP/1.1"), Route::Vote);
        assert_eq!(route("GET /react?type=heart HTTP/1.1"), Route::React);
    }

    #[test]
    fn unknown_paths_and_methods_are_not_found() {
        assert_eq!(route("GET /nonexistent HTTP/1.1"), Route::NotFound);
        assert_eq!(route("GET /vote/extra HTTP/1.1"), Route::NotFound);
        assert_eq!(route("GET /Current-Song HTTP/1.1"), Route::NotFound);
        assert_eq!(route("POST /vote?clientId=c1&songId=2 HTTP/1.1"), Route::NotFound);
        assert_eq!(route("DELETE / HTTP/1.1"), Route::NotFound);
    }
}
