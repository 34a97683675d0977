mod cli;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use artutils::{ArtUtils, ArtUtilsConfig};
use artutils_core::strings::{STATUS_CONTINUING, STATUS_ENDED, STATUS_RELEASED};
use artutils_core::{AutoSelect, LookupIds, MediaType, Record};
use clap::Parser;
use cli::{Cli, Commands};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ArtUtilsConfig::from_env();
    if let Some(cache_db) = cli.cache_db {
        config.cache_db = cache_db;
    }
    debug!(cache_db = %config.cache_db.display(), "using cache database");

    let strings: HashMap<u32, String> = HashMap::from([
        (STATUS_CONTINUING, "Continuing".to_string()),
        (STATUS_ENDED, "Ended".to_string()),
        (STATUS_RELEASED, "Released".to_string()),
    ]);
    let utils = ArtUtils::from_config(config, Arc::new(strings), Arc::new(AutoSelect)).await;

    let record = run(&utils, cli.command).await;
    let output = serde_json::to_string_pretty(&record.into_value())
        .context("failed to encode result")?;
    println!("{output}");

    utils.close().await;
    Ok(())
}

async fn run(utils: &ArtUtils, command: Commands) -> Record {
    match command {
        Commands::Tmdb {
            imdb_id,
            tvdb_id,
            title,
            year,
            media_type,
            preftype,
            ignore_cache,
        } => {
            let mut ids = LookupIds::new().with_year(year);
            if let Some(id) = imdb_id {
                ids = ids.with_imdb_id(id);
            }
            if let Some(id) = tvdb_id {
                ids = ids.with_tvdb_id(id);
            }
            if let Some(title) = title {
                ids = ids.with_title(title);
            }
            let preftype = preftype.as_deref().map(MediaType::parse);
            utils
                .get_tmdb_details(
                    &ids,
                    MediaType::parse(&media_type),
                    false,
                    preftype,
                    ignore_cache,
                )
                .await
        }
        Commands::Tvdb { imdb_id, tvdb_id } => {
            utils
                .get_tvdb_details(imdb_id.as_deref(), tvdb_id.as_deref())
                .await
        }
        Commands::Omdb {
            imdb_id,
            title,
            year,
            media_type,
            ignore_cache,
        } => {
            utils
                .get_omdb_info(
                    imdb_id.as_deref(),
                    title.as_deref(),
                    year,
                    MediaType::parse(&media_type),
                    ignore_cache,
                )
                .await
        }
        Commands::ExtendedArt {
            imdb_id,
            tvdb_id,
            media_type,
            ignore_cache,
        } => {
            utils
                .get_extended_artwork(
                    imdb_id.as_deref(),
                    tvdb_id.as_deref(),
                    MediaType::parse(&media_type),
                    ignore_cache,
                )
                .await
        }
        Commands::AnimatedArt {
            imdb_id,
            ignore_cache,
        } => utils.get_animated_artwork(&imdb_id, ignore_cache, false).await,
        Commands::Top250 { imdb_id } => utils.get_top250_rating(&imdb_id).await,
        Commands::Duration { duration } => utils.get_duration(&duration),
        Commands::Pvr {
            title,
            channel,
            genre,
            ignore_cache,
        } => {
            utils
                .get_pvr_artwork(&title, &channel, &genre, false, ignore_cache)
                .await
        }
        Commands::Music {
            artist,
            album,
            track,
            disc,
            ignore_cache,
        } => {
            utils
                .get_music_artwork(
                    &artist,
                    album.as_deref(),
                    track.as_deref(),
                    disc.as_deref(),
                    ignore_cache,
                )
                .await
        }
        Commands::ChannelLogo { channel } => utils.get_channellogo(&channel).await,
        Commands::StudioLogo { studio } => utils.get_studio_logo(&studio),
        Commands::Extrafanart { file, media_type } => {
            utils
                .get_extrafanart(&file.to_string_lossy(), MediaType::parse(&media_type))
                .await
        }
        Commands::Streamdetails { file, ignore_cache } => {
            utils
                .get_streamdetails(&file.to_string_lossy(), ignore_cache)
                .await
        }
    }
}
