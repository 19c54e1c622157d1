//! Mutation inputs and their translation into patches
//!
//! An inbound update carries typed values plus the set of field names the
//! caller actually sent. A field that was sent as `null` clears the column; a
//! field that was not sent is left alone. [`ChangesetTranslator`] turns each
//! `(value, field name)` pair into the matching [`Patch`] state.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::models::{name_checksum, MoviePatch, NewMovie, Patch};

/// Names of the fields present in an inbound payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPresence {
    fields: HashSet<String>,
}

impl FieldPresence {
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Top-level keys of a JSON object; anything else has no fields
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value.as_object() {
            Some(object) => Self::from_fields(object.keys().cloned()),
            None => Self::default(),
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub struct ChangesetTranslator<'a> {
    presence: &'a FieldPresence,
}

impl<'a> ChangesetTranslator<'a> {
    pub fn new(presence: &'a FieldPresence) -> Self {
        Self { presence }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.presence.has(field)
    }

    pub fn patch<T>(&self, value: Option<T>, field: &str) -> Patch<T> {
        Patch::from_presence(self.has_field(field), value)
    }

    pub fn string(&self, value: Option<String>, field: &str) -> Patch<String> {
        self.patch(value, field)
    }

    pub fn int(&self, value: Option<i64>, field: &str) -> Patch<i64> {
        self.patch(value, field)
    }

    pub fn date(&self, value: Option<NaiveDate>, field: &str) -> Patch<NaiveDate> {
        self.patch(value, field)
    }
}

/// Input for creating a movie. Image payloads arrive already decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovieCreateInput {
    pub name: String,
    pub aliases: Option<String>,
    pub duration: Option<i64>,
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub studio_id: Option<i64>,
    pub director: Option<String>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub front_image: Option<Vec<u8>>,
    pub back_image: Option<Vec<u8>>,
}

impl MovieCreateInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The row to insert; checksum and both timestamps are derived here
    pub fn to_new_movie(&self, now: DateTime<Utc>) -> NewMovie {
        NewMovie {
            checksum: name_checksum(&self.name),
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            duration: self.duration,
            date: self.date,
            rating: self.rating,
            studio_id: self.studio_id,
            director: self.director.clone(),
            synopsis: self.synopsis.clone(),
            url: self.url.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for updating a movie. Which fields apply is decided by the
/// accompanying [`FieldPresence`], not by which values are `Some`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovieUpdateInput {
    pub id: i64,
    pub name: Option<String>,
    pub aliases: Option<String>,
    pub duration: Option<i64>,
    pub date: Option<NaiveDate>,
    pub rating: Option<i64>,
    pub studio_id: Option<i64>,
    pub director: Option<String>,
    pub synopsis: Option<String>,
    pub url: Option<String>,
    pub front_image: Option<Vec<u8>>,
    pub back_image: Option<Vec<u8>>,
}

impl MovieUpdateInput {
    /// Deserialize an input and record which keys it carried
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<(Self, FieldPresence)> {
        let presence = FieldPresence::from_json(&value);
        let input = serde_json::from_value(value)?;
        Ok((input, presence))
    }

    /// Build the patch for the present fields. Setting the name also
    /// recomputes the checksum.
    pub fn to_patch(&self, presence: &FieldPresence, now: DateTime<Utc>) -> MoviePatch {
        let translator = ChangesetTranslator::new(presence);

        let name = translator.string(self.name.clone(), "name");
        let checksum = match &name {
            Patch::Value(name) => Patch::Value(name_checksum(name)),
            _ => Patch::Absent,
        };

        MoviePatch {
            checksum,
            name,
            aliases: translator.string(self.aliases.clone(), "aliases"),
            duration: translator.int(self.duration, "duration"),
            date: translator.date(self.date, "date"),
            rating: translator.int(self.rating, "rating"),
            studio_id: translator.int(self.studio_id, "studio_id"),
            director: translator.string(self.director.clone(), "director"),
            synopsis: translator.string(self.synopsis.clone(), "synopsis"),
            url: translator.string(self.url.clone(), "url"),
            ..MoviePatch::new(self.id, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_absent_null_and_value_are_distinct() {
        let presence = FieldPresence::from_fields(["aliases", "rating"]);
        let translator = ChangesetTranslator::new(&presence);

        assert_eq!(translator.string(None, "aliases"), Patch::Null);
        assert_eq!(translator.int(Some(4), "rating"), Patch::Value(4));
        assert_eq!(translator.string(Some("ignored".into()), "director"), Patch::Absent);
    }

    #[test]
    fn test_from_json_tracks_explicit_nulls() {
        let (input, presence) = MovieUpdateInput::from_json(json!({
            "id": 7,
            "synopsis": null,
            "rating": 80
        }))
        .unwrap();

        assert_eq!(input.id, 7);
        assert!(presence.has("synopsis"));
        assert!(!presence.has("director"));

        let now = Utc::now();
        let patch = input.to_patch(&presence, now);
        assert_eq!(patch.synopsis, Patch::Null);
        assert_eq!(patch.rating, Patch::Value(80));
        assert_eq!(patch.director, Patch::Absent);
        assert_eq!(patch.checksum, Patch::Absent);

        let set = patch.set_list();
        assert_eq!(set.columns(), &["rating", "synopsis", "updated_at"]);
    }

    #[test]
    fn test_renaming_recomputes_checksum() {
        let presence = FieldPresence::from_fields(["name"]);
        let input = MovieUpdateInput {
            id: 1,
            name: Some("Heat".to_string()),
            ..Default::default()
        };
        let patch = input.to_patch(&presence, Utc::now());
        assert_eq!(patch.checksum, Patch::Value(name_checksum("Heat")));
        assert_eq!(patch.set_list().columns(), &["checksum", "name", "updated_at"]);
    }

    #[test]
    fn test_create_input_derives_checksum_and_timestamps() {
        let now = Utc::now();
        let input = MovieCreateInput {
            rating: Some(5),
            ..MovieCreateInput::named("Ronin")
        };
        let movie = input.to_new_movie(now);
        assert_eq!(movie.checksum, name_checksum("Ronin"));
        assert_eq!(movie.created_at, now);
        assert_eq!(movie.updated_at, now);
        assert_eq!(movie.rating, Some(5));
    }

    #[test]
    fn test_non_object_has_no_fields() {
        assert!(FieldPresence::from_json(&json!([1, 2])).is_empty());
    }
}
