use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Serialization format tag carried by a [`JobType`].
///
/// The engine never serializes jobs itself; the tag is metadata for external
/// layers that persist or transmit job definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Bson,
    Yaml,
}

impl Default for Format {
    fn default() -> Self {
        Format::Json
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "bson" => Ok(Format::Bson),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(format!(
                "invalid job format: {other} (expected \"json\", \"bson\" or \"yaml\")"
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Format::Json => "json",
            Format::Bson => "bson",
            Format::Yaml => "yaml",
        };
        f.write_str(s)
    }
}

/// Identifies the type and implementation version of a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobType {
    pub name: String,
    pub version: u32,
    #[serde(default)]
    pub format: Format,
}

impl JobType {
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            format: Format::default(),
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{} ({})", self.name, self.version, self.format)
    }
}
