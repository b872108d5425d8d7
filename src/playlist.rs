use crate::profile::VideoProfile;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BASE_URL_ENV: &str = "BASE_URL";

/// The persisted collection of video profiles the player browses. On disk
/// the entries live in a JSON object keyed by positional index, not an
/// array; in memory they are a plain ordered vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub base_url: String,
    pub playlist_count: u64,
    #[serde(with = "indexed")]
    pub playlist: Vec<VideoProfile>,
}

impl Playlist {
    /// A fresh playlist. `base_url` is fixed from the environment at
    /// creation time and never rewritten afterwards.
    pub fn empty() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV).unwrap_or_default(),
            playlist_count: 0,
            playlist: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::empty());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {:?}", path))
    }

    /// Overwrites every entry sharing the profile's name in place, keeping
    /// the count unchanged; appends and bumps the count when the name is new.
    pub fn merge(&mut self, profile: VideoProfile) {
        let mut merged = false;
        for entry in &mut self.playlist {
            if entry.profile_name == profile.profile_name {
                *entry = profile.clone();
                merged = true;
            }
        }
        if !merged {
            self.playlist.push(profile);
            self.playlist_count += 1;
        }
    }

    /// Full overwrite of the persisted file, pretty-printed. serde_json does
    /// not escape forward slashes, which the player's parser relies on.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("failed to write {:?}", path))
    }
}

mod indexed {
    use super::VideoProfile;
    use serde::de::{Deserializer, MapAccess, Visitor};
    use serde::ser::{SerializeMap, Serializer};

    pub fn serialize<S: Serializer>(
        entries: &[VideoProfile],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (index, entry) in entries.iter().enumerate() {
            map.serialize_entry(&index.to_string(), entry)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<VideoProfile>, D::Error> {
        struct IndexedVisitor;

        impl<'de> Visitor<'de> for IndexedVisitor {
            type Value = Vec<VideoProfile>;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of index keys to playlist entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut keyed: Vec<(u64, VideoProfile)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, entry)) = access.next_entry::<String, VideoProfile>()? {
                    let index = key.parse::<u64>().map_err(serde::de::Error::custom)?;
                    keyed.push((index, entry));
                }
                // Entry order must not depend on how the document laid the
                // keys out.
                keyed.sort_by_key(|(index, _)| *index);
                Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
            }
        }

        deserializer.deserialize_map(IndexedVisitor)
    }
}
