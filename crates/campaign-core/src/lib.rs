//! Shared domain types and configuration for the campaign automation workspace.
//!
//! Holds the campaign data model (briefs, generated content, images), the
//! static generation parameter pools, the brand profile loaded from YAML, and
//! environment-driven application configuration.

pub mod app_config;
pub mod brand;
pub mod campaign;
pub mod config;
pub mod params;
pub mod schedule;

pub use app_config::{AppConfig, Environment, PlatformCredentials};
pub use brand::{load_brand_profile, parse_brand_profile, BrandProfile, FounderPersona, Specialty};
pub use campaign::{
    AspectRatio, CampaignBrief, CampaignContent, GeneratedImage, Platform, PostImage, Resolution,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use schedule::{ScheduleMode, ScheduleZone, SchedulerState, StateStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brand profile {path}: {source}")]
    BrandFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brand profile: {0}")]
    BrandFileParse(#[from] serde_yaml::Error),

    #[error("brand profile validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid image data: {0}")]
    InvalidImageData(String),
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to access scheduler state {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scheduler state {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize scheduler state: {0}")]
    Serialize(#[from] serde_json::Error),
}
