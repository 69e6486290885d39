//! The audience web page served at `/`.
//!
//! The page is static: it polls `/current-song` every two seconds, shows the
//! vote list between songs and the reaction buttons during one. The client ID
//! lives in the browser's `localStorage`.

pub const AUDIENCE_PAGE: &str = include_str!("../../assets/audience.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_talks_to_every_audience_endpoint() {
        for endpoint in ["/current-song", "/available-songs", "/voting-state", "/vote", "/react"] {
            assert!(AUDIENCE_PAGE.contains(endpoint), "page never calls {endpoint}");
        }
    }

    #[test]
    fn page_keeps_client_id_in_local_storage() {
        assert!(AUDIENCE_PAGE.contains("localStorage.setItem('clientId'"));
    }
}
