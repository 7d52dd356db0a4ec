//! Reading settings files. The extension picks the parser.

use crate::schema::Settings;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("{file}: expected a .ron, .toml or .json extension")]
    UnsupportedFormat { file: PathBuf },

    /// `dir` holds the same settings in more than one format.
    #[error("ambiguous settings: both {a} and {b} exist")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("cannot parse {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Every line of a name list was blank or a comment.
    #[error("name list {file} is empty")]
    EmptyNames { file: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Probe order when searching a directory.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|f| Some(f.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

/// The single `{stem}.{ron,toml,json}` in `dir`, if any.
pub fn find_data_file(dir: &Path, stem: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{stem}.{}", f.extension())))
        .filter(|p| p.is_file());
    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (first, _) => Ok(first),
    }
}

pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    format.parse(&text).map_err(|detail| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    })
}

/// Load run settings from a RON, TOML or JSON file.
///
/// A relative `names` path in the file is resolved against the file's
/// directory.
pub fn load_settings(path: &Path) -> Result<Settings, DataLoadError> {
    let mut settings: Settings = deserialize_file(path)?;
    if let Some(dir) = path.parent() {
        settings.names = settings
            .names
            .take()
            .map(|names| if names.is_relative() { dir.join(names) } else { names });
    }
    tracing::debug!(file = %path.display(), seed = ?settings.seed, "settings loaded");
    Ok(settings)
}

/// Load `settings.{ron,toml,json}` from `dir`, or defaults if none exists.
pub fn load_settings_dir(dir: &Path) -> Result<Settings, DataLoadError> {
    match find_data_file(dir, "settings")? {
        Some(path) => load_settings(&path),
        None => Ok(Settings::default()),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
