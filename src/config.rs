//! Command-line and environment configuration

use clap::Parser;
use reqwest::Url;

use crate::media::thumbnail::THUMBNAIL_SIZE;
use crate::state::data::ViewMode;

/// Command-line arguments for shot-curator
#[derive(Parser, Debug)]
#[command(name = "shot-curator")]
#[command(about = "Sort unclassified shots into clusters by drag and drop")]
#[command(version)]
pub struct Args {
    /// Base address of the classification service
    #[arg(
        short,
        long,
        default_value = "http://localhost:8000",
        env = "SHOT_CURATOR_SERVICE_URL"
    )]
    pub service_url: String,

    /// View mode shown at start-up (scene or character)
    #[arg(long, default_value = "scene", env = "SHOT_CURATOR_VIEW")]
    pub view: ViewMode,

    /// Edge length of keyframe thumbnails, in pixels
    #[arg(long, default_value_t = THUMBNAIL_SIZE, env = "SHOT_CURATOR_THUMBNAIL_SIZE")]
    pub thumbnail_size: u32,

    /// Also send an explicit feedback pair after a successful move. The
    /// service already records one when it applies the move.
    #[arg(long, env = "SHOT_CURATOR_EXPLICIT_FEEDBACK")]
    pub explicit_feedback: bool,

    /// How many notifications to keep on screen
    #[arg(long, default_value_t = 5)]
    pub notice_limit: usize,
}

/// Validated settings
#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: Url,
    pub initial_view: ViewMode,
    pub thumbnail_size: u32,
    pub send_feedback: bool,
    pub notice_limit: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid service URL '{0}': {1}")]
    ServiceUrl(String, String),

    #[error("Thumbnail size must be greater than zero")]
    ThumbnailSize,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        // Relative endpoints are joined onto this, so it needs a trailing slash
        let mut raw = args.service_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let service_url = Url::parse(&raw)
            .map_err(|e| ConfigError::ServiceUrl(args.service_url.clone(), e.to_string()))?;
        if service_url.cannot_be_a_base() {
            return Err(ConfigError::ServiceUrl(
                args.service_url,
                "not a base address".to_string(),
            ));
        }

        if args.thumbnail_size == 0 {
            return Err(ConfigError::ThumbnailSize);
        }

        Ok(Config {
            service_url,
            initial_view: args.view,
            thumbnail_size: args.thumbnail_size,
            send_feedback: args.explicit_feedback,
            notice_limit: args.notice_limit,
        })
    }
}
