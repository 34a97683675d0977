pub mod config;
pub mod facade;
pub mod music;
pub mod pvr;

pub use config::ArtUtilsConfig;
pub use facade::{ArtUtils, NEXT_EPISODE_DAYS_AHEAD, Providers};
