//! Key-file persistence.
//!
//! The file is the raw codec encoding of a [`ClientEx`]. It holds both
//! secret keys, so writes go through a temp file and rename, and the file is
//! owner-only on Unix.

use crate::error::VaultResult;
use pqpass_types::{ClientEx, Decode, Encode};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroize;

/// Writes `client` to `path`, replacing any existing file.
pub fn save(path: impl AsRef<Path>, client: &ClientEx) -> VaultResult<()> {
    let path = path.as_ref();
    let mut bytes = client.to_bytes();
    let result = write_atomic(path, &bytes);
    bytes.zeroize();
    result?;
    debug!("wrote key file {}", path.display());
    Ok(())
}

/// Reads a key file written by [`save`].
pub fn load(path: impl AsRef<Path>) -> VaultResult<ClientEx> {
    let mut bytes = fs::read(path.as_ref())?;
    let client = ClientEx::from_bytes(&bytes);
    bytes.zeroize();
    Ok(client?)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> VaultResult<()> {
    let tmp_path = temp_path(path);
    let result = write_then_rename(&tmp_path, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_then_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> VaultResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)?;
    Ok(())
}
