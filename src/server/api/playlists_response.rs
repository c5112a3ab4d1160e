use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistsResponse {
    pub rows: Vec<PlaylistInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub name: Option<String>,
    pub id: i64,
}
