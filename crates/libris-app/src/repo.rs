// Rust guideline compliant 2026-10-13

//! Library discovery and path management utilities.

use crate::error::{AppError, Result};
use libris_core::{Config, Storage};
use std::path::{Path, PathBuf};

/// Name of the data directory under the library root.
pub const LIBRIS_DIR: &str = ".libris";

/// Path metadata for a Libris data directory.
#[derive(Debug, Clone)]
pub struct RepoContext {
    root: PathBuf,
    libris_dir: PathBuf,
    ledger_path: PathBuf,
    config_path: PathBuf,
    session_path: PathBuf,
}

impl RepoContext {
    fn at(root: PathBuf) -> Self {
        let libris_dir = root.join(LIBRIS_DIR);
        Self {
            root,
            ledger_path: libris_dir.join("library.jsonl"),
            config_path: libris_dir.join("config.toml"),
            session_path: libris_dir.join("session.json"),
            libris_dir,
        }
    }

    /// Discovers a library starting from an optional root.
    ///
    /// # Arguments
    ///
    /// * `repo_root` - Optional root to pin discovery; defaults to the
    ///   current directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current directory cannot be resolved
    /// - The `.libris` directory is missing
    pub fn discover(repo_root: Option<&Path>) -> Result<Self> {
        let root = match repo_root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let context = Self::at(root);
        if !context.libris_dir.exists() {
            return Err(AppError::RepoNotInitialized {
                path: context.libris_dir,
            });
        }
        Ok(context)
    }

    /// Creates the `.libris` directory with a default config and an empty
    /// ledger. Existing files are left untouched.
    ///
    /// # Returns
    ///
    /// The context and whether anything was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or files cannot be written.
    pub fn init(root: &Path) -> Result<(Self, bool)> {
        let context = Self::at(root.to_path_buf());
        let mut created = false;

        if !context.libris_dir.exists() {
            std::fs::create_dir_all(&context.libris_dir)?;
            created = true;
        }
        if !context.config_path.exists() {
            Config::default().save(&context.libris_dir)?;
            created = true;
        }
        if !context.ledger_path.exists() {
            std::fs::write(&context.ledger_path, "")?;
            created = true;
        }

        Ok((context, created))
    }

    /// Returns the library root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Returns the `.libris` directory path.
    #[must_use]
    pub fn libris_dir(&self) -> &Path {
        self.libris_dir.as_path()
    }

    /// Returns the ledger JSONL path.
    #[must_use]
    pub fn ledger_path(&self) -> &Path {
        self.ledger_path.as_path()
    }

    /// Returns the config TOML path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        self.config_path.as_path()
    }

    /// Returns the path of the saved login session.
    #[must_use]
    pub fn session_path(&self) -> &Path {
        self.session_path.as_path()
    }

    /// Opens storage for the ledger file.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be initialized.
    pub fn open_storage(&self, config: &Config) -> Result<Storage> {
        Ok(Storage::new(self.ledger_path.clone())?.with_lock_timeout(config.lock_timeout_ms))
    }

    /// Loads library configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(self.libris_dir())?)
    }
}
