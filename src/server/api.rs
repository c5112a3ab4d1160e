pub mod error_response;
pub mod playlists_response;
pub mod schema_response;
pub mod videos_request;
pub mod videos_response;
