//! CatalogRef value object
//!
//! Identifies a piece of content to extract: either a movie by TMDB id,
//! or a show episode by TMDB id + season + episode. Immutable, and the
//! canonical prefix of every cache key in the core.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::DomainError;

/// Identifies a single piece of playable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogRef {
    /// A standalone movie.
    Movie { tmdb_id: u64 },
    /// A single episode of a TV show.
    Episode { tmdb_id: u64, season: u32, episode: u32 },
}

impl CatalogRef {
    /// Builds a movie reference, rejecting a zero TMDB id.
    pub fn movie(tmdb_id: u64) -> Result<Self, DomainError> {
        if tmdb_id == 0 {
            return Err(DomainError::InvalidInput("tmdbId must be non-zero".to_string()));
        }
        Ok(CatalogRef::Movie { tmdb_id })
    }

    /// Builds an episode reference, rejecting a zero TMDB id or a season/episode below 1.
    pub fn episode(tmdb_id: u64, season: u32, episode: u32) -> Result<Self, DomainError> {
        if tmdb_id == 0 {
            return Err(DomainError::InvalidInput("tmdbId must be non-zero".to_string()));
        }
        if season < 1 {
            return Err(DomainError::InvalidInput("season must be >= 1".to_string()));
        }
        if episode < 1 {
            return Err(DomainError::InvalidInput("episode must be >= 1".to_string()));
        }
        Ok(CatalogRef::Episode { tmdb_id, season, episode })
    }

    /// Builds a reference from the raw query parameters of the extract endpoint,
    /// inferring movie vs. episode from whether season/episode were supplied.
    pub fn from_query(
        tmdb_id: u64,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Self, DomainError> {
        match (season, episode) {
            (None, None) => Self::movie(tmdb_id),
            (Some(s), Some(e)) => Self::episode(tmdb_id, s, e),
            _ => Err(DomainError::InvalidInput(
                "season and episode must both be provided for a show, or neither for a movie".to_string(),
            )),
        }
    }

    /// The TMDB id shared by both variants.
    pub fn tmdb_id(&self) -> u64 {
        match self {
            CatalogRef::Movie { tmdb_id } => *tmdb_id,
            CatalogRef::Episode { tmdb_id, .. } => *tmdb_id,
        }
    }

    /// True if this reference identifies a show episode.
    pub fn is_episode(&self) -> bool {
        matches!(self, CatalogRef::Episode { .. })
    }
}

impl fmt::Display for CatalogRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRef::Movie { tmdb_id } => write!(f, "movie:{}", tmdb_id),
            CatalogRef::Episode { tmdb_id, season, episode } => {
                write!(f, "episode:{}:s{}e{}", tmdb_id, season, episode)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_requires_nonzero_id() {
        assert!(CatalogRef::movie(0).is_err());
        assert!(CatalogRef::movie(550).is_ok());
    }

    #[test]
    fn episode_requires_season_and_episode_at_least_one() {
        assert!(CatalogRef::episode(1399, 0, 1).is_err());
        assert!(CatalogRef::episode(1399, 1, 0).is_err());
        assert!(CatalogRef::episode(1399, 1, 1).is_ok());
    }

    #[test]
    fn from_query_rejects_partial_episode_params() {
        assert!(CatalogRef::from_query(1399, Some(1), None).is_err());
        assert!(CatalogRef::from_query(1399, None, Some(1)).is_err());
        assert!(CatalogRef::from_query(1399, None, None).is_ok());
        assert!(CatalogRef::from_query(1399, Some(1), Some(1)).is_ok());
    }

    #[test]
    fn display_is_stable_for_cache_keys() {
        assert_eq!(CatalogRef::movie(550).unwrap().to_string(), "movie:550");
        assert_eq!(
            CatalogRef::episode(1399, 1, 1).unwrap().to_string(),
            "episode:1399:s1e1"
        );
    }
}
