use crate::client::SynoError::Configuration;
use crate::config::Config;
use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".synomagnet.json";
const SID_FILE_NAME: &str = ".synosid";

/// Locations of the configuration and session files
#[derive(Debug, Clone)]
pub struct Store {
    config_file: PathBuf,
    sid_file: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(config_file: PathBuf, sid_file: PathBuf) -> Self {
        Self {
            config_file,
            sid_file,
        }
    }

    /// Uses the default file names inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE_NAME), dir.join(SID_FILE_NAME))
    }

    /// Uses the default file names inside the user's home directory
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined
    pub fn from_home() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Configuration("Unable to determine the home directory".into()))?;
        Ok(Self::in_dir(&home))
    }

    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    #[must_use]
    pub fn sid_file(&self) -> &Path {
        &self.sid_file
    }

    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_config(&self) -> Result<Option<Config>> {
        read_json(&self.config_file)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_config(&self, config: &Config) -> Result<()> {
        write_json(&self.config_file, config)
    }

    /// Stored session ID, `None` when missing or blank
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read
    pub fn load_sid(&self) -> Result<Option<String>> {
        Ok(read_text(&self.sid_file)?
            .map(|sid| sid.trim().to_string())
            .filter(|sid| !sid.is_empty()))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_sid(&self, sid: &str) -> Result<()> {
        write_text(&self.sid_file, sid)
    }
}

/// Reads a whole file, `None` if it does not exist
///
/// # Errors
///
/// Returns an error for any failure other than a missing file
pub fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
    }
}

/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON for `T`
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    read_text(path)?
        .map(|contents| {
            serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
        })
        .transpose()
}

/// Replaces `path` with `contents`, readable and writable by the owner only
///
/// The data goes to a sibling temporary file first and is renamed into place.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(&tmp)
        .with_context(|| format!("open {}", tmp.display()))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("write {}", tmp.display()))?;
    drop(file);

    #[cfg(unix)]
    fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("chmod {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("persist {}", path.display()))?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// # Errors
///
/// Returns an error if serialization or writing fails
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text(path, &json)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(OsString::new, |name| name.to_os_string());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AUTH_API, TASK_API};
    use tempfile::TempDir;

    fn sample_config() -> Config {
        Config {
            server: String::from("https://nas.local"),
            user: String::from("alice"),
            download_dir: String::from("video/downloads"),
            conversion_dir: String::from("video/convert"),
            api_paths: Some(
                [(AUTH_API, "auth.cgi"), (TASK_API, "DownloadStation/task.cgi")]
                    .into_iter()
                    .collect(),
            ),
            verify_certificates: false,
        }
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());
        assert!(store.load_config().unwrap().is_none());
        assert!(store.load_sid().unwrap().is_none());
    }

    #[test]
    fn test_config_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());
        let config = sample_config();

        store.save_config(&config).unwrap();
        assert_eq!(store.load_config().unwrap(), Some(config));
    }

    #[test]
    fn test_sid_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());

        store.save_sid("abc123").unwrap();
        store.save_sid("xyz789").unwrap();
        assert_eq!(store.load_sid().unwrap().as_deref(), Some("xyz789"));
        assert!(!tmp_path(store.sid_file()).exists());
    }

    #[test]
    fn test_sid_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());

        fs::write(store.sid_file(), "abc123\n").unwrap();
        assert_eq!(store.load_sid().unwrap().as_deref(), Some("abc123"));

        fs::write(store.sid_file(), "  \n").unwrap();
        assert!(store.load_sid().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_config() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());

        fs::write(store.config_file(), "{not json").unwrap();
        assert!(store.load_config().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_owner_only_permissions() {
        let dir = TempDir::new().unwrap();
        let store = Store::in_dir(dir.path());

        fs::write(store.sid_file(), "old").unwrap();
        fs::set_permissions(store.sid_file(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save_sid("abc123").unwrap();
        store.save_config(&sample_config()).unwrap();

        for path in [store.sid_file(), store.config_file()] {
            let mode = fs::metadata(path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{}", path.display());
        }
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path(Path::new("/home/alice/.synosid")),
            PathBuf::from("/home/alice/.synosid.tmp")
        );
    }
}
