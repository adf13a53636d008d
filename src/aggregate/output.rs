use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::AggregateError;
use crate::result::RunResult;

/// Render a combined result the way workers render theirs.
///
/// # Errors
///
/// Returns an error if the result cannot be serialized.
pub fn to_pretty_json(result: &RunResult) -> Result<Vec<u8>, AggregateError> {
    let mut bytes =
        serde_json::to_vec_pretty(result).map_err(|source| AggregateError::Serialize { source })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Replace `path` with `bytes` so readers see either the old or the new file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AggregateError> {
    let tmp = temp_path(path);
    let write_error = |source: std::io::Error| AggregateError::Write {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, bytes).map_err(write_error)?;
    if let Err(source) = std::fs::rename(&tmp, path) {
        if let Err(err) = std::fs::remove_file(&tmp) {
            tracing::debug!("Failed to remove {}: {}", tmp.display(), err);
        }
        return Err(write_error(source));
    }
    Ok(())
}

/// Write the whole document to stdout in one call.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn write_stdout(bytes: &[u8]) -> Result<(), AggregateError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|()| stdout.flush())
        .map_err(|source| AggregateError::Write {
            path: PathBuf::from("-"),
            source,
        })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
