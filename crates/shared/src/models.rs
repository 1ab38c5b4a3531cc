//! Data models for the catalog browser.
//!
//! This module defines the catalog entity as the rest of the workspace sees
//! it, independent of the wire format returned by the Kitsu API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind discriminator carried by every catalog entity
pub const ANIME_KIND: &str = "anime";

/// One anime record from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntity {
    /// Catalog identifier (immutable once fetched)
    pub id: String,
    /// Always "anime"
    pub kind: String,
    pub attributes: AnimeAttributes,
}

/// Descriptive attributes of an anime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeAttributes {
    pub title: String,
    pub synopsis: String,
    /// Set once the synopsis has been replaced by its translation
    #[serde(default)]
    pub synopsis_translated: bool,

    // Dates
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    // Type and status
    pub status: Option<AiringStatus>,
    pub subtype: Option<Subtype>,
    pub episode_count: Option<u32>,

    // Media
    pub poster_image: ImageSet,
    pub cover_image: Option<ImageSet>,
    pub youtube_video_id: Option<String>,

    /// Average rating as reported upstream (e.g. "82.14")
    pub average_rating: Option<String>,
}

impl CatalogEntity {
    /// Create an entity with the given id and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ANIME_KIND.to_string(),
            attributes: AnimeAttributes {
                title: title.into(),
                ..Default::default()
            },
        }
    }

    /// Whether the synopsis still holds its original, untranslated text
    pub fn needs_translation(&self) -> bool {
        !self.attributes.synopsis_translated && !self.attributes.synopsis.trim().is_empty()
    }

    /// Replace the synopsis with its translation.
    ///
    /// The synopsis is replaced at most once. A "translation" identical to the
    /// current text (the translator's failure fallback) leaves the entity
    /// untouched so a later pass can try again. Returns whether the synopsis
    /// changed.
    pub fn apply_translation(&mut self, translated: String) -> bool {
        if !self.needs_translation() || translated == self.attributes.synopsis {
            return false;
        }

        self.attributes.synopsis = translated;
        self.attributes.synopsis_translated = true;
        true
    }

    /// Best available poster URL
    pub fn poster_url(&self) -> Option<&str> {
        self.attributes.poster_image.preferred()
    }

    /// Best available cover URL
    pub fn cover_url(&self) -> Option<&str> {
        self.attributes
            .cover_image
            .as_ref()
            .and_then(ImageSet::preferred)
    }
}

/// Image URLs at several resolutions, any of which may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub tiny: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

impl ImageSet {
    /// Large image, falling back to the original upload
    pub fn preferred(&self) -> Option<&str> {
        self.large.as_deref().or(self.original.as_deref())
    }
}

/// Lifecycle status of an anime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiringStatus {
    Airing,
    Finished,
    Upcoming,
}

impl AiringStatus {
    /// Map a Kitsu status string ("current", "finished", "upcoming", "tba",
    /// "unreleased") to a status
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "current" => Some(AiringStatus::Airing),
            "finished" => Some(AiringStatus::Finished),
            "upcoming" | "tba" | "unreleased" => Some(AiringStatus::Upcoming),
            _ => None,
        }
    }
}

impl std::fmt::Display for AiringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiringStatus::Airing => write!(f, "airing"),
            AiringStatus::Finished => write!(f, "finished"),
            AiringStatus::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// Media subtype of an anime
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Subtype {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
}

impl Subtype {
    /// Value used by the Kitsu API for `filter[subtype]`
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Subtype::Tv => "TV",
            Subtype::Movie => "movie",
            Subtype::Ova => "OVA",
            Subtype::Ona => "ONA",
            Subtype::Special => "special",
        }
    }

    /// Parse a Kitsu subtype string (case-insensitive)
    pub fn from_api(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subtype::Tv => write!(f, "tv"),
            Subtype::Movie => write!(f, "movie"),
            Subtype::Ova => write!(f, "ova"),
            Subtype::Ona => write!(f, "ona"),
            Subtype::Special => write!(f, "special"),
        }
    }
}

impl std::str::FromStr for Subtype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tv" => Ok(Subtype::Tv),
            "movie" => Ok(Subtype::Movie),
            "ova" => Ok(Subtype::Ova),
            "ona" => Ok(Subtype::Ona),
            "special" => Ok(Subtype::Special),
            _ => Err(anyhow::anyhow!("Invalid subtype: {}", s)),
        }
    }
}

/// Color theme preference
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(anyhow::anyhow!("Invalid theme: {}", s)),
        }
    }
}
