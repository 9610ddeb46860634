use std::{fs, path::Path};

use resources::snapshot::Snapshot;
use strum::Display;

use crate::error::{Error, Result};

/// Encoding of a snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// `"json"` selects JSON, any other name falls back to YAML.
    pub fn from_name(name: &str) -> Self {
        if name == "json" {
            Format::Json
        } else {
            Format::Yaml
        }
    }

    /// Picks the format from a file extension, YAML unless it is `.json`.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Yaml => "application/yaml",
        }
    }
}

pub fn encode(snapshot: &Snapshot, format: Format) -> Result<Vec<u8>> {
    let encoded = match format {
        Format::Json => serde_json::to_vec_pretty(snapshot).map_err(|err| err.to_string()),
        Format::Yaml => serde_yaml::to_vec(snapshot).map_err(|err| err.to_string()),
    };
    encoded.map_err(|message| Error::Encode {
        op: "encode",
        format,
        message,
    })
}

pub fn decode(bytes: &[u8], format: Format) -> Result<Snapshot> {
    let decoded = match format {
        Format::Json => serde_json::from_slice(bytes).map_err(|err| err.to_string()),
        Format::Yaml => serde_yaml::from_slice(bytes).map_err(|err| err.to_string()),
    };
    decoded.map_err(|message| Error::Encode {
        op: "decode",
        format,
        message,
    })
}

/// Writes `snapshot` to `path` in one write. On error the file content is undefined.
pub fn save_snapshot(snapshot: &Snapshot, path: impl AsRef<Path>, format: &str) -> Result<()> {
    let path = path.as_ref();
    let format = Format::from_name(format);
    let data = encode(snapshot, format)?;
    fs::write(path, data).map_err(|source| Error::Io {
        op: "write snapshot to",
        path: path.to_owned(),
        source,
    })?;
    tracing::info!(
        "Saved {} resources to {} as {}",
        snapshot.resources.len(),
        path.display(),
        format
    );
    Ok(())
}

/// Reads a snapshot file, choosing the decoder from its extension.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::Io {
        op: "read snapshot from",
        path: path.to_owned(),
        source,
    })?;
    decode(&data, Format::from_path(path))
}
