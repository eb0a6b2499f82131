//! Model persistence.
//!
//! Models and scaler states are stored as bincode byte streams with no
//! header. The file handle is scoped to each call: it is flushed and closed
//! before `export` returns, and closed before `import` returns, on success
//! and on error alike.
//!
//! # Example
//!
//! ```
//! use botdetect::serialization::{export, import};
//! use botdetect::preprocessing::ScalerState;
//!
//! let dir = tempfile::tempdir().expect("temp dir");
//! let path = dir.path().join("scaler.bin");
//! let state = ScalerState { data_min: vec![0.0], data_max: vec![2.0] };
//!
//! export(&state, &path).expect("export");
//! let loaded: ScalerState = import(&path).expect("import");
//! assert_eq!(loaded, state);
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BotDetectError, Result};

/// Removes `path` if it exists.
fn remove_existing(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Serializes `value` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns `Io` if the old file cannot be removed or the new one cannot be
/// written, and `Format` if the value cannot be encoded.
pub fn export<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    remove_existing(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|e| BotDetectError::Format {
        message: format!("Serialization failed: {e}"),
    })?;
    writer.flush()?;

    tracing::info!(path = %path.display(), "exported");
    Ok(())
}

/// Deserializes a value previously written by [`export`].
///
/// # Errors
///
/// Returns `Io` if the file is missing or unreadable and `Format` if its
/// bytes do not decode as `T`.
pub fn import<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let value = bincode::deserialize_from(reader).map_err(|e| BotDetectError::Format {
        message: format!("Deserialization failed for {}: {e}", path.display()),
    })?;
    tracing::debug!(path = %path.display(), "imported");
    Ok(value)
}
