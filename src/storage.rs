// Manages local file storage for the file-backed reminder store.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to StoreData or the model types it embeds (RawItem, DueComponents,
// CalendarEvent, ...) require incrementing STORE_DATA_VERSION below.
use crate::context::AppContext;
use crate::model::{AuthorizationState, CalendarEvent, ListHandle, RawItem};
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const STORE_FILENAME: &str = "store.json";

// Version history:
// - v1: lists, items, events, default list, authorization
const STORE_DATA_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

/// On-disk document behind `FileStore`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoreData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub authorization: AuthorizationState,
    /// Answer given when the user is prompted for access.
    #[serde(default = "default_true")]
    pub grant_on_request: bool,
    #[serde(default)]
    pub default_list: Option<String>,
    #[serde(default)]
    pub lists: Vec<ListHandle>,
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: STORE_DATA_VERSION,
            authorization: AuthorizationState::NotDetermined,
            grant_on_request: true,
            default_list: None,
            lists: Vec::new(),
            items: Vec::new(),
            events: Vec::new(),
        }
    }
}

pub struct LocalStorage;

impl LocalStorage {
    pub fn get_store_path(ctx: &dyn AppContext) -> Result<PathBuf> {
        Ok(ctx.get_data_dir()?.join(STORE_FILENAME))
    }

    /// Helper to get a sidecar lock file path
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    fn open_lock_file(file_path: &Path) -> Result<fs::File> {
        let lock_path = Self::get_lock_path(file_path);
        fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))
    }

    /// Runs `f` while holding an exclusive advisory lock on a sidecar file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let file = Self::open_lock_file(file_path)?;
        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Non-blocking `with_lock`: `Ok(None)` without running `f` when another
    /// handle holds the lock.
    pub fn try_with_lock<F, T>(file_path: &Path, f: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let file = Self::open_lock_file(file_path)?;
        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Ok(None);
            }
            return Err(e.into());
        }
        let result = f();
        file.unlock()?;
        result.map(Some)
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads without locking. Missing file -> empty document.
    /// An unreadable or newer-version file is an error so callers never
    /// overwrite data they could not parse.
    fn load_internal(path: &Path) -> Result<StoreData> {
        if !path.exists() {
            return Ok(StoreData::default());
        }
        let json = fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse store file '{}'", path.display()))?;

        if data.version > STORE_DATA_VERSION {
            anyhow::bail!(
                "Store file version {} is newer than supported version {}",
                data.version,
                STORE_DATA_VERSION
            );
        }
        if data.version < STORE_DATA_VERSION {
            log::info!(
                "Upgrading store file from v{} to v{}",
                data.version,
                STORE_DATA_VERSION
            );
        }
        Ok(data)
    }

    fn save_internal(path: &Path, data: &StoreData) -> Result<()> {
        let mut data = data.clone();
        data.version = STORE_DATA_VERSION;
        let json = serde_json::to_string_pretty(&data)?;
        Self::atomic_write(path, json)
    }

    pub fn load(path: &Path) -> Result<StoreData> {
        if !path.exists() {
            return Ok(StoreData::default());
        }
        Self::with_lock(path, || Self::load_internal(path))
    }

    pub fn save(path: &Path, data: &StoreData) -> Result<()> {
        Self::with_lock(path, || Self::save_internal(path, data))
    }

    pub fn try_load(path: &Path) -> Result<Option<StoreData>> {
        if !path.exists() {
            return Ok(Some(StoreData::default()));
        }
        Self::try_with_lock(path, || Self::load_internal(path))
    }

    /// `modify` that gives up with `Ok(None)` instead of waiting for the lock.
    pub fn try_modify<F, T>(path: &Path, f: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut StoreData) -> Result<T>,
    {
        Self::try_with_lock(path, || {
            let mut data = Self::load_internal(path)?;
            let out = f(&mut data)?;
            Self::save_internal(path, &data)?;
            Ok(out)
        })
    }

    /// Read-modify-write under a single lock. Returns whatever `f` returns;
    /// the document is written back only when `f` succeeds.
    pub fn modify<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut StoreData) -> Result<T>,
    {
        Self::with_lock(path, || {
            let mut data = Self::load_internal(path)?;
            let out = f(&mut data)?;
            Self::save_internal(path, &data)?;
            Ok(out)
        })
    }
}
