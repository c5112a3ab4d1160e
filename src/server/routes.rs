mod get_health;
mod get_playlists;
mod get_schema;
mod patch_video;
mod post_videos;
mod post_videos_count;

pub use get_health::get_health;
pub use get_playlists::get_playlists;
pub use get_schema::get_schema;
pub use patch_video::patch_video;
pub use post_videos::post_videos;
pub use post_videos_count::post_videos_count;
