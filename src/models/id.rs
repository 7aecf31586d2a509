use std::fmt;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Opaque 24-hex-character record identifier.
///
/// New ids carry the creation time in their first eight hex digits followed
/// by sixteen random ones, so they sort roughly by insertion order. Parsing
/// accepts either case and normalizes to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid record id: {0}")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4().simple().to_string();
        RecordId(format!("{seconds:08x}{}", &random[..16]))
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidRecordId> {
        static ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = ID_REGEX
            .get_or_init(|| Regex::new(r"^[0-9a-fA-F]{24}$").expect("record id regex compiles"));

        if regex.is_match(raw) {
            Ok(RecordId(raw.to_ascii_lowercase()))
        } else {
            Err(InvalidRecordId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordId::parse(&raw).map_err(serde::de::Error::custom)
    }
}
