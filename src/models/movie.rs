//! Movie records

use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

use super::patch::{Patch, SetList};

/// Front image used when a back image is stored without one.
/// A 1x1 transparent PNG.
const DEFAULT_MOVIE_IMAGE_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

static DEFAULT_MOVIE_IMAGE: Lazy<Vec<u8>> = Lazy::new(|| {
    base64::engine::general_purpose::STANDARD
        .decode(DEFAULT_MOVIE_IMAGE_B64)
        .unwrap_or_default()
});

/// Decoded default front image
pub fn default_movie_image() -> &'static [u8] {
    &DEFAULT_MOVIE_IMAGE
}

/// Checksum of a movie, derived from its name rather than any image payload
pub fn name_checksum(name: &str) -> String {
    format!("{:x}", md5::compute(name.as_bytes()))
}

/// Movie record from database
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub aliases: Option<String>,
    /// Runtime in seconds
    pub duration: Option<i64>,
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub studio_id: Option<i64>,
    pub director: Option<String>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Id and name only, for pickers and listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct MovieName {
    pub id: i64,
    pub name: String,
}

/// Input for creating a movie
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub checksum: String,
    pub name: String,
    pub aliases: Option<String>,
    pub duration: Option<i64>,
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub studio_id: Option<i64>,
    pub director: Option<String>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewMovie {
    /// A movie with only a name; checksum and timestamps are filled in.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            checksum: name_checksum(&name),
            name,
            aliases: None,
            duration: None,
            date: None,
            rating: None,
            studio_id: None,
            director: None,
            synopsis: None,
            url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a movie. `id` and `updated_at` are always written.
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePatch {
    pub id: i64,
    pub updated_at: DateTime<Utc>,
    pub checksum: Patch<String>,
    pub name: Patch<String>,
    pub aliases: Patch<String>,
    pub duration: Patch<i64>,
    pub date: Patch<NaiveDate>,
    pub rating: Patch<i64>,
    pub studio_id: Patch<i64>,
    pub director: Patch<String>,
    pub synopsis: Patch<String>,
    pub url: Patch<String>,
}

impl MoviePatch {
    /// A patch that only bumps `updated_at`
    pub fn new(id: i64, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            updated_at,
            checksum: Patch::Absent,
            name: Patch::Absent,
            aliases: Patch::Absent,
            duration: Patch::Absent,
            date: Patch::Absent,
            rating: Patch::Absent,
            studio_id: Patch::Absent,
            director: Patch::Absent,
            synopsis: Patch::Absent,
            url: Patch::Absent,
        }
    }

    /// Assignments for every field the patch mentions
    pub fn set_list(&self) -> SetList {
        let mut set = SetList::new();
        set.patch("checksum", &self.checksum)
            .patch("name", &self.name)
            .patch("aliases", &self.aliases)
            .patch("duration", &self.duration)
            .patch("date", &self.date)
            .patch("rating", &self.rating)
            .patch("studio_id", &self.studio_id)
            .patch("director", &self.director)
            .patch("synopsis", &self.synopsis)
            .patch("url", &self.url)
            .set("updated_at", self.updated_at);
        set
    }
}

impl Movie {
    /// Assignments for a whole-record replace
    pub fn full_set_list(&self) -> SetList {
        let mut set = SetList::new();
        set.set("checksum", self.checksum.clone())
            .set("name", self.name.clone())
            .set("aliases", self.aliases.clone())
            .set("duration", self.duration)
            .set("date", self.date)
            .set("rating", self.rating)
            .set("studio_id", self.studio_id)
            .set("director", self.director.clone())
            .set("synopsis", self.synopsis.clone())
            .set("url", self.url.clone())
            .set("created_at", self.created_at)
            .set("updated_at", self.updated_at);
        set
    }
}

/// Images stored in the `movies_images` sidecar table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieImages {
    pub front: Option<Vec<u8>>,
    pub back: Option<Vec<u8>>,
}

impl MovieImages {
    pub fn new(front: Option<Vec<u8>>, back: Option<Vec<u8>>) -> Self {
        Self {
            front: front.filter(|b| !b.is_empty()),
            back: back.filter(|b| !b.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// A back image requires a front image; fill the gap with the default.
    pub fn with_default_front(mut self) -> Self {
        if self.front.is_none() && self.back.is_some() {
            self.front = Some(default_movie_image().to_vec());
        }
        self
    }
}
