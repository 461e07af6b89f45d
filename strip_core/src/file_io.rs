//! # File I/O Module
//!
//! Handles the geometry staging area with safety features:
//! - **Atomic writes**: uploaded content goes to `.tmp`, is synced, then
//!   renamed, so a crashed run never leaves a half-written geometry file
//! - **File locking**: concurrent runs against a shared staging directory
//!   (e.g. a network drive) cannot overwrite each other mid-run
//!
//! ## Staging Layout
//!
//! The collaborator hands over raw geometry text; it is persisted as
//! `<staging_dir>/in.txt`. Lock files use the `.lock` extension next to the
//! staged file, containing JSON metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use strip_core::file_io::{load_geometry, stage_geometry, StagingLock};
//! use std::path::Path;
//!
//! let staging = Path::new("uploads");
//! let lock = StagingLock::acquire(&staging.join("in.txt"), "engineer@yard.com")?;
//! let staged = stage_geometry("0\t10\n0\t5\n5\t5\n", staging)?;
//! let table = load_geometry(&staged)?;
//! drop(lock);
//! # Ok::<(), strip_core::errors::StripError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{StripError, StripResult};
use crate::geometry::HullOffsetTable;

/// Fixed name of the staged geometry file
pub const STAGED_GEOMETRY_NAME: &str = "in.txt";

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where the lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Lock file path for a staged geometry file
fn lock_path_for(staged_path: &Path) -> PathBuf {
    let mut name = staged_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(".lock");
    staged_path.with_file_name(name)
}

/// Staging lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. a `.lock` file with metadata for user visibility
pub struct StagingLock {
    lock_path: PathBuf,
    /// The underlying file handle (keeps the OS lock)
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl StagingLock {
    /// Acquire an exclusive lock for a staged geometry path.
    ///
    /// # Returns
    ///
    /// * `Ok(StagingLock)` - Lock acquired
    /// * `Err(StripError::FileLocked)` - Another process holds the lock
    pub fn acquire(staged_path: &Path, user_id: impl Into<String>) -> StripResult<Self> {
        let lock_path = lock_path_for(staged_path);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StripError::file_error(
                    "create staging dir",
                    parent.display().to_string(),
                    e.to_string(),
                )
            })?;
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| {
                StripError::file_error(
                    "open lock file",
                    lock_path.display().to_string(),
                    e.to_string(),
                )
            })?;

        if lock_file.try_lock_exclusive().is_err() {
            let holder = Self::check(staged_path);
            let (locked_by, locked_at) = match holder {
                Some(info) => (info.user_id, info.locked_at.to_rfc3339()),
                None => ("unknown".to_string(), "unknown".to_string()),
            };
            return Err(StripError::file_locked(
                staged_path.display().to_string(),
                locked_by,
                locked_at,
            ));
        }

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(|e| {
            StripError::Serialization {
                reason: e.to_string(),
            }
        })?;
        fs::write(&lock_path, json).map_err(|e| {
            StripError::file_error(
                "write lock metadata",
                lock_path.display().to_string(),
                e.to_string(),
            )
        })?;

        Ok(StagingLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Read lock metadata for a staged path without acquiring the lock.
    pub fn check(staged_path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(staged_path);
        let contents = fs::read_to_string(lock_path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

impl Drop for StagingLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self._lock_file);
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Persist uploaded geometry text to the fixed staging location.
///
/// Writes atomically: content goes to a `.tmp` sibling, is synced to disk,
/// then renamed over `<staging_dir>/in.txt`.
pub fn stage_geometry(contents: &str, staging_dir: &Path) -> StripResult<PathBuf> {
    fs::create_dir_all(staging_dir).map_err(|e| {
        StripError::file_error(
            "create staging dir",
            staging_dir.display().to_string(),
            e.to_string(),
        )
    })?;

    let path = staging_dir.join(STAGED_GEOMETRY_NAME);
    let tmp_path = path.with_extension("txt.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        StripError::file_error(
            "create temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.write_all(contents.as_bytes()).map_err(|e| {
        StripError::file_error(
            "write temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    tmp_file.sync_all().map_err(|e| {
        StripError::file_error(
            "sync temp file",
            tmp_path.display().to_string(),
            e.to_string(),
        )
    })?;

    fs::rename(&tmp_path, &path).map_err(|e| {
        // Clean up the temp file if the rename fails
        let _ = fs::remove_file(&tmp_path);
        StripError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    log::debug!("staged geometry at '{}'", path.display());
    Ok(path)
}

/// Read and parse a staged geometry file.
pub fn load_geometry(path: &Path) -> StripResult<HullOffsetTable> {
    let contents = fs::read_to_string(path).map_err(|e| {
        StripError::file_error("read", path.display().to_string(), e.to_string())
    })?;
    HullOffsetTable::parse(&contents, &path.display().to_string())
}
