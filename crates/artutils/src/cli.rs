use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "artutils")]
#[command(author, version, about = "Metadata and artwork lookups for media center items")]
pub struct Cli {
    /// Cache database path (overrides ARTUTILS_CACHE_DB)
    #[arg(long, global = true)]
    pub cache_db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Movie or TV show details from TMDB
    Tmdb {
        #[arg(long)]
        imdb_id: Option<String>,

        #[arg(long)]
        tvdb_id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        /// movie, tvshow, episode, ... (anything else searches both)
        #[arg(long, default_value = "")]
        media_type: String,

        /// Preferred kind when searching both movies and shows
        #[arg(long)]
        preftype: Option<String>,

        /// Skip the cache and fetch again
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Series details with next and last episode from TheTVDB
    Tvdb {
        #[arg(long)]
        imdb_id: Option<String>,

        #[arg(long)]
        tvdb_id: Option<String>,
    },

    /// Ratings and details from OMDb
    Omdb {
        #[arg(long)]
        imdb_id: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long, default_value = "movie")]
        media_type: String,

        /// Skip the cache and fetch again
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Artwork from fanart.tv
    ExtendedArt {
        #[arg(long)]
        imdb_id: Option<String>,

        #[arg(long)]
        tvdb_id: Option<String>,

        #[arg(long, default_value = "movie")]
        media_type: String,

        /// Skip the cache and fetch again
        #[arg(long)]
        ignore_cache: bool,
    },

    /// Animated poster and fanart, downloaded locally
    AnimatedArt {
        imdb_id: String,

        /// Skip the cache and fetch again
        #[arg(long)]
        ignore_cache: bool,
    },

    /// IMDb top 250 position
    Top250 { imdb_id: String },

    /// Split a "H:MM" or minutes value into duration fields
    Duration { duration: String },

    /// Details and artwork for a live TV or recording title
    Pvr {
        title: String,

        #[arg(long, default_value = "")]
        channel: String,

        #[arg(long, default_value = "")]
        genre: String,

        #[arg(long)]
        ignore_cache: bool,
    },

    /// Artist and album artwork
    Music {
        artist: String,

        #[arg(long)]
        album: Option<String>,

        #[arg(long)]
        track: Option<String>,

        /// Disc number within the album
        #[arg(long)]
        disc: Option<String>,

        #[arg(long)]
        ignore_cache: bool,
    },

    /// Logo for a TV channel
    ChannelLogo { channel: String },

    /// Logo for a studio from the studio logo folder
    StudioLogo { studio: String },

    /// Extrafanart folder next to a media file
    Extrafanart {
        file: PathBuf,

        #[arg(long, default_value = "movie")]
        media_type: String,
    },

    /// Codec and resolution summary for a media file
    Streamdetails {
        file: PathBuf,

        #[arg(long)]
        ignore_cache: bool,
    },
}
