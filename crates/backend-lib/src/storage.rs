// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! User directory abstraction with in-memory and flat-file implementations.
//!
//! Every mutation is a single whole-record write; the auth core relies on
//! nothing stronger than that.
use async_trait::async_trait;
use dashmap::DashMap;
use homeinv_common::UserId;
use parking_lot::Mutex;
use rand::RngCore;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicI64, Ordering},
};
use tokio::fs as tokio_fs;

use crate::error::DirectoryError;
use crate::user::UserRecord;

/// High-water mark of assigned ids, kept beside the record files
const LAST_ID_FILE: &str = ".last_id";

/// Persistent store of user records, unique on username and email.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;

    /// Match `identifier` against the username, or against the stored (lowercased) email
    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, DirectoryError>;

    /// Whether a user already holds this username or (case-insensitively) this email
    async fn exists(&self, username: &str, email: &str) -> Result<bool, DirectoryError>;

    /// Store a new record, assigning an id never handed out before. Fails with
    /// [`DirectoryError::Duplicate`] on a username or email collision.
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, DirectoryError>;

    /// Replace the whole record with the given id. Fails with
    /// [`DirectoryError::NotFound`] once the record has been removed.
    async fn update(&self, record: &UserRecord) -> Result<(), DirectoryError>;

    /// Delete a record, returning it if it existed
    async fn remove(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;
}

/// `email` is the identifier lowercased, matching how registration stores it
fn matches_identifier(record: &UserRecord, identifier: &str, email: &str) -> bool {
    record.username == identifier || record.email == email
}

fn duplicate_of(record: &UserRecord, username: &str, email: &str) -> Option<DirectoryError> {
    if record.username == username {
        return Some(DirectoryError::Duplicate {
            field: "username",
            value: username.to_string(),
        });
    }
    if record.email.eq_ignore_ascii_case(email) {
        return Some(DirectoryError::Duplicate {
            field: "email",
            value: email.to_string(),
        });
    }
    None
}

/// In-process directory. Used by tests and single-instance deployments
/// that do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    records: DashMap<UserId, UserRecord>,
    last_id: AtomicI64,
    /// Serializes the uniqueness check with the insert
    insert_lock: Mutex<()>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let email = identifier.to_lowercase();
        Ok(self
            .records
            .iter()
            .find(|r| matches_identifier(r.value(), identifier, &email))
            .map(|r| r.value().clone()))
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .records
            .iter()
            .any(|r| duplicate_of(r.value(), username, email).is_some()))
    }

    async fn insert(&self, mut record: UserRecord) -> Result<UserRecord, DirectoryError> {
        let _guard = self.insert_lock.lock();

        if let Some(err) = self
            .records
            .iter()
            .find_map(|r| duplicate_of(r.value(), &record.username, &record.email))
        {
            return Err(err);
        }

        record.id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &UserRecord) -> Result<(), DirectoryError> {
        // The shard lock is held until the write lands, so a concurrent remove
        // either happens before (NotFound) or after.
        let mut stored = self
            .records
            .get_mut(&record.id)
            .ok_or(DirectoryError::NotFound(record.id))?;
        *stored = record.clone();
        Ok(())
    }

    async fn remove(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.records.remove(&id).map(|(_, record)| record))
    }
}

/// Flat-file directory: one pretty-printed JSON file per user under `<root>/users`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// reader never observes a half-written record. The last id handed out is kept
/// in `<root>/users/.last_id` so ids of deleted users are never reused.
#[derive(Debug)]
pub struct FlatFileDirectory {
    users_dir: PathBuf,
    /// Serializes inserts, updates and removals
    write_lock: tokio::sync::Mutex<()>,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let users_dir = root.as_ref().join("users");
        fs::create_dir_all(&users_dir)?;
        Ok(Self {
            users_dir,
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn last_id_path(&self) -> PathBuf {
        self.users_dir.join(LAST_ID_FILE)
    }

    /// Highest id ever assigned, or 0 for a fresh directory
    async fn read_last_id(&self) -> Result<UserId, DirectoryError> {
        match tokio_fs::read_to_string(self.last_id_path()).await {
            Ok(content) => content.trim().parse().map_err(|_| {
                DirectoryError::Unavailable(format!("corrupt {LAST_ID_FILE}: {content:?}"))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn record_path(&self, id: UserId) -> PathBuf {
        self.users_dir.join(format!("{id}.json"))
    }

    async fn read_record(path: &Path) -> Result<Option<UserRecord>, DirectoryError> {
        match tokio_fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load every stored record
    async fn scan(&self) -> Result<Vec<UserRecord>, DirectoryError> {
        let mut records = Vec::new();
        let mut entries = tokio_fs::read_dir(&self.users_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // A file may vanish between listing and reading
            if let Some(record) = Self::read_record(&path).await? {
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Write `contents` to a temp file, then rename it over `path`
    async fn write_atomic(&self, path: &Path, contents: String) -> Result<(), DirectoryError> {
        let tmp = self
            .users_dir
            .join(format!("{:016x}.tmp", rand::rng().next_u64()));

        tokio_fs::write(&tmp, contents).await?;
        if let Err(e) = tokio_fs::rename(&tmp, path).await {
            let _ = tokio_fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn write_record(&self, record: &UserRecord) -> Result<(), DirectoryError> {
        let json = serde_json::to_string_pretty(record)?;
        self.write_atomic(&self.record_path(record.id), json).await
    }
}

#[async_trait]
impl UserDirectory for FlatFileDirectory {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        Self::read_record(&self.record_path(id)).await
    }

    async fn find_by_username_or_email(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let email = identifier.to_lowercase();
        Ok(self
            .scan()
            .await?
            .into_iter()
            .find(|r| matches_identifier(r, identifier, &email)))
    }

    async fn exists(&self, username: &str, email: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .scan()
            .await?
            .iter()
            .any(|r| duplicate_of(r, username, email).is_some()))
    }

    async fn insert(&self, mut record: UserRecord) -> Result<UserRecord, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        let existing = self.scan().await?;
        if let Some(err) = existing
            .iter()
            .find_map(|r| duplicate_of(r, &record.username, &record.email))
        {
            return Err(err);
        }

        // Directories written before the counter existed only have their files
        let last_id = self
            .read_last_id()
            .await?
            .max(existing.iter().map(|r| r.id).max().unwrap_or(0));
        record.id = last_id + 1;

        self.write_atomic(&self.last_id_path(), record.id.to_string())
            .await?;
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn update(&self, record: &UserRecord) -> Result<(), DirectoryError> {
        let _guard = self.write_lock.lock().await;

        if !tokio_fs::try_exists(self.record_path(record.id)).await? {
            return Err(DirectoryError::NotFound(record.id));
        }
        self.write_record(record).await
    }

    async fn remove(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError> {
        let _guard = self.write_lock.lock().await;

        let path = self.record_path(id);
        let Some(record) = Self::read_record(&path).await? else {
            return Ok(None);
        };
        match tokio_fs::remove_file(&path).await {
            Ok(()) => Ok(Some(record)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
