//! File-backed session store
//!
//! One JSON envelope per session under the data directory:
//!
//! ```text
//! <data_dir>/<session_id>.session
//! { "version": u64, "touched_at": RFC3339, "checksum": u32, "payload": "<session json>" }
//! ```
//!
//! Writes go to a temp file that is fsynced and renamed over the target, so a
//! reader sees either the old or the new envelope. The checksum is CRC32 over
//! the payload bytes; a mismatch is reported as corruption, never repaired.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::{SessionStore, DEFAULT_IDLE_MINUTES};
use crate::session::DiagnosticSession;

const EXTENSION: &str = "session";
const MAX_KEY_LEN: usize = 128;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u64,
    touched_at: DateTime<Utc>,
    checksum: u32,
    payload: String,
}

fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    idle_ttl: Duration,
    /// Serializes version check and rename
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with_idle_ttl(dir, Duration::minutes(DEFAULT_IDLE_MINUTES))
    }

    pub fn open_with_idle_ttl(dir: impl AsRef<Path>, idle_ttl: Duration) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self {
            dir,
            idle_ttl,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> StoreResult<PathBuf> {
        let valid = !session_id.is_empty()
            && session_id.len() <= MAX_KEY_LEN
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(session_id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", session_id, EXTENSION)))
    }

    fn read_envelope(path: &Path) -> StoreResult<Option<Envelope>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))?;

        let actual = compute_checksum(envelope.payload.as_bytes());
        if actual != envelope.checksum {
            return Err(StoreError::Corrupted(format!(
                "{}: checksum mismatch (expected {:08x}, got {:08x})",
                path.display(),
                envelope.checksum,
                actual
            )));
        }
        Ok(Some(envelope))
    }

    fn is_idle(&self, envelope: &Envelope, now: DateTime<Utc>) -> bool {
        now - envelope.touched_at > self.idle_ttl
    }

    fn write_atomic(path: &Path, envelope: &Envelope) -> StoreResult<()> {
        let bytes = serde_json::to_vec(envelope)
            .map_err(|e| StoreError::Unavailable(format!("serialize envelope: {}", e)))?;
        let tmp = path.with_extension(format!("{}.tmp", EXTENSION));
        let io_err = |e: std::io::Error| {
            StoreError::Unavailable(format!("cannot write {}: {}", path.display(), e))
        };

        let mut file = File::create(&tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, session_id: &str) -> StoreResult<DiagnosticSession> {
        let path = self.path_for(session_id)?;
        let envelope = match Self::read_envelope(&path)? {
            Some(env) if !self.is_idle(&env, Utc::now()) => env,
            _ => return Err(StoreError::NotFound(session_id.to_string())),
        };

        let mut session: DiagnosticSession = serde_json::from_str(&envelope.payload)
            .map_err(|e| StoreError::Corrupted(format!("{}: {}", path.display(), e)))?;
        session.version = envelope.version;
        Ok(session)
    }

    fn save(&self, session: &DiagnosticSession, expected_version: u64) -> StoreResult<u64> {
        let path = self.path_for(&session.session_id)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))?;
        let now = Utc::now();

        let actual = match Self::read_envelope(&path)? {
            Some(env) if !self.is_idle(&env, now) => env.version,
            _ => 0,
        };
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                session_id: session.session_id.clone(),
                expected: expected_version,
                actual,
            });
        }

        let new_version = expected_version + 1;
        let mut stored = session.clone();
        stored.version = new_version;
        let payload = serde_json::to_string(&stored)
            .map_err(|e| StoreError::Unavailable(format!("serialize session: {}", e)))?;

        let envelope = Envelope {
            version: new_version,
            touched_at: now,
            checksum: compute_checksum(payload.as_bytes()),
            payload,
        };
        Self::write_atomic(&path, &envelope)?;
        Ok(new_version)
    }

    fn evict_idle(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))?;

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot list {}: {}", self.dir.display(), e))
        })?;

        let mut evicted = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            // corrupted envelopes are left in place for inspection
            if let Ok(Some(envelope)) = Self::read_envelope(&path) {
                if self.is_idle(&envelope, now) && fs::remove_file(&path).is_ok() {
                    evicted += 1;
                }
            }
        }
        Ok(evicted)
    }
}
