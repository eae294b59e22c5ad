// Rust guideline compliant 2026-10-11

//! Storage module for JSONL file operations.
//!
//! The whole library lives in one JSONL file, one tagged [`Record`] per line.
//! Writes replace the file atomically, and concurrent processes serialize
//! through an exclusive lock on a sibling `.lock` file.

use crate::ledger::Ledger;
use crate::models::Record;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default time to wait for the storage lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2_000;

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Storage engine for library records.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Path to the JSONL file.
    path: PathBuf,
    /// How long `with_lock` waits for a busy lock.
    lock_timeout: Duration,
}

impl Storage {
    /// Creates a new Storage instance.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSONL file
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path cannot be empty",
            )));
        }
        Ok(Self {
            path,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        })
    }

    /// Sets how long [`Storage::with_lock`] waits before giving up.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout = Duration::from_millis(timeout_ms);
        self
    }

    /// Returns a reference to the JSONL file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock file guarding the JSONL file.
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Path of the copy kept when a load had to skip malformed lines.
    pub fn backup_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.bak")
    }
}

impl Storage {
    /// Loads all records, streaming the file line by line.
    ///
    /// Lines that are not valid JSON records are skipped with a warning.
    /// Since the next save would drop them, the file as read is first copied
    /// to [`Storage::backup_path`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a record fails
    /// validation.
    pub fn load_all(&self) -> Result<Vec<Record>> {
        use std::fs::File;
        use std::io::{BufRead, BufReader};

        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Record>(&line) {
                Ok(record) => {
                    record.validate()?;
                    records.push(record);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %e,
                        "skipping malformed record"
                    );
                }
            }
        }

        if skipped > 0 {
            let backup = self.backup_path();
            std::fs::copy(&self.path, &backup)?;
            tracing::warn!(skipped, backup = %backup.display(), "kept a copy of the unreadable ledger");
        }

        Ok(records)
    }

    /// Replaces the file contents with the given records.
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames
    /// it over the original, so readers see either the old or the new file.
    ///
    /// # Errors
    ///
    /// Returns an error if a record fails validation or the write fails.
    pub fn save_all(&self, records: &[Record]) -> Result<()> {
        use std::fs::File;
        use std::io::{BufWriter, Write};

        for record in records {
            record.validate()?;
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("jsonl.tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writer.write_all(b"\n")?;
            }
            let file = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
            file.sync_all()?;
        }

        std::fs::rename(&temp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "ledger saved");
        Ok(())
    }

    /// Loads the file into a [`Ledger`].
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or ids collide.
    pub fn load_ledger(&self) -> Result<Ledger> {
        Ledger::from_records(self.load_all()?)
    }

    /// Writes a [`Ledger`] back to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        self.save_all(&ledger.to_records())
    }
}

impl Storage {
    /// Executes a closure while holding an exclusive lock on the storage file.
    ///
    /// A busy lock is retried until the configured timeout elapses. The lock
    /// is released when the closure returns, whether it failed or not.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] (converted into `E`) if the lock stays
    /// busy, or whatever the closure returns.
    pub fn with_lock<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        use fs2::FileExt;
        use std::fs::OpenOptions;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())
            .map_err(Error::Io)?;

        let started = Instant::now();
        loop {
            match lock_file.try_lock_exclusive() {
                Ok(()) => break,
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if started.elapsed() >= self.lock_timeout {
                        let waited = u64::try_from(self.lock_timeout.as_millis()).unwrap_or(u64::MAX);
                        tracing::warn!(waited_ms = waited, "library lock is busy");
                        return Err(Error::LockTimeout(waited).into());
                    }
                    std::thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(Error::Io(e).into()),
            }
        }

        let result = f();
        let _ = lock_file.unlock();
        result
    }
}
