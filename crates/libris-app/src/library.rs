// Rust guideline compliant 2026-10-14

//! Transaction boundary for every Libris service.
//!
//! Each call takes the storage lock, loads the ledger, runs the reservation
//! sweep, then hands the ledger to the operation. The ledger is written back
//! only if the operation succeeds, so a failed call leaves the file as it was.

use crate::auth::{self, Actor};
use crate::error::Result;
use crate::repo::RepoContext;
use crate::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use libris_core::{Config, Ledger, Role, Storage};
use std::sync::Arc;

/// An opened library: paths, policy, storage, clock and the caller's session.
pub struct Library {
    repo: RepoContext,
    config: Config,
    storage: Storage,
    clock: Arc<dyn Clock>,
    token: Option<String>,
}

impl Library {
    /// Opens the library described by `repo`, using its config file and the
    /// saved login session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the session file is
    /// unreadable.
    pub fn open(repo: RepoContext) -> Result<Self> {
        let config = repo.load_config()?;
        let token = auth::load_saved_token(&repo)?;
        let mut library = Self::with_config(repo, config)?;
        library.token = token;
        Ok(library)
    }

    /// Opens a library with an explicit config and no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage path is invalid.
    pub fn with_config(repo: RepoContext, config: Config) -> Result<Self> {
        let storage = repo.open_storage(&config)?;
        Ok(Self {
            repo,
            config,
            storage,
            clock: Arc::new(SystemClock),
            token: None,
        })
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Paths of this library.
    #[must_use]
    pub fn repo(&self) -> &RepoContext {
        &self.repo
    }

    /// Active policy.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current time according to the library clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Session token used for role-gated calls.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Sets or clears the session token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Runs a read-write operation.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a storage error. Nothing is written
    /// in either case.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger, DateTime<Utc>) -> Result<T>,
    {
        let now = self.now();
        self.storage.with_lock(|| {
            let mut ledger = self.storage.load_ledger()?;
            ledger.expire_reservations(now);
            let out = f(&mut ledger, now)?;
            self.storage.save_ledger(&ledger)?;
            Ok(out)
        })
    }

    /// Runs a read-only operation.
    ///
    /// The sweep still runs; its result is persisted only when it expired
    /// something.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or a storage error.
    pub fn read<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Ledger, DateTime<Utc>) -> Result<T>,
    {
        let now = self.now();
        self.storage.with_lock(|| {
            let mut ledger = self.storage.load_ledger()?;
            let expired = ledger.expire_reservations(now);
            let out = f(&ledger, now)?;
            if !expired.is_empty() {
                self.storage.save_ledger(&ledger)?;
            }
            Ok(out)
        })
    }

    /// Runs a read-write operation as the session user, who must hold `role`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Unauthenticated`] without a valid session,
    /// [`crate::AppError::Forbidden`] for the wrong role, or the operation's
    /// error.
    pub fn transaction_as<T, F>(&self, role: Role, f: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger, &Actor, DateTime<Utc>) -> Result<T>,
    {
        let token = self.token.as_deref();
        self.transaction(|ledger, now| {
            let actor = auth::authenticate(ledger, token, now)?;
            actor.require(role)?;
            f(ledger, &actor, now)
        })
    }

    /// Runs a read-only operation as the session user, who must hold `role`.
    ///
    /// # Errors
    ///
    /// Same as [`Library::transaction_as`].
    pub fn read_as<T, F>(&self, role: Role, f: F) -> Result<T>
    where
        F: FnOnce(&Ledger, &Actor, DateTime<Utc>) -> Result<T>,
    {
        let token = self.token.as_deref();
        self.read(|ledger, now| {
            let actor = auth::authenticate(ledger, token, now)?;
            actor.require(role)?;
            f(ledger, &actor, now)
        })
    }

    /// Expires lapsed reservations on demand.
    ///
    /// # Returns
    ///
    /// Ids of the reservations expired by this call.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn sweep(&self) -> Result<Vec<u64>> {
        self.sweep_checked(|_| Ok(()))
    }

    /// Expires lapsed reservations as the session user, who must hold
    /// `role`.
    ///
    /// # Errors
    ///
    /// Same as [`Library::transaction_as`].
    pub fn sweep_as(&self, role: Role) -> Result<Vec<u64>> {
        let token = self.token.as_deref();
        let now = self.now();
        self.sweep_checked(|ledger| {
            auth::authenticate(ledger, token, now)?.require(role)
        })
    }

    fn sweep_checked<C>(&self, check: C) -> Result<Vec<u64>>
    where
        C: FnOnce(&Ledger) -> Result<()>,
    {
        let now = self.now();
        self.storage.with_lock(|| {
            let mut ledger = self.storage.load_ledger()?;
            check(&ledger)?;
            let expired = ledger.expire_reservations(now);
            if expired.is_empty() {
                tracing::debug!("sweep found no lapsed reservations");
            } else {
                self.storage.save_ledger(&ledger)?;
            }
            Ok(expired)
        })
    }
}
