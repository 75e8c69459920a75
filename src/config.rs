//! Runtime configuration utilities for pv-signal-lab.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::signals::classify::{Watchlist, DEFAULT_WATCHLIST};

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root folder for raw and processed case tables.
    pub data_dir: PathBuf,
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// Optional newline-delimited watchlist file.
    pub watchlist_path: Option<PathBuf>,
    /// Number of synthetic cases produced by `generate`.
    pub n_cases: usize,
    /// RNG seed for synthetic generation.
    pub seed: u64,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let watchlist_path = env::var("WATCHLIST_PATH").ok().map(PathBuf::from);
        let n_cases = env::var("N_CASES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2000);
        let seed = env::var("SEED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(42);

        let settings = Self {
            data_dir,
            outputs_dir,
            watchlist_path,
            n_cases,
            seed,
        };
        settings.ensure_dirs()?;
        Ok(settings)
    }

    /// Settings rooted at a single directory, used by tests and scripted runs.
    pub fn rooted_at<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref();
        let settings = Self {
            data_dir: root.join("data"),
            outputs_dir: root.join("outputs"),
            watchlist_path: None,
            n_cases: 2000,
            seed: 42,
        };
        settings.ensure_dirs()?;
        Ok(settings)
    }

    fn ensure_dirs(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&self.outputs_dir).context("creating outputs dir")?;
        Ok(())
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.join_data("raw")
    }

    pub fn clean_table_path(&self) -> PathBuf {
        self.join_data("processed/clean_data.csv")
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.join_output("tables")
    }

    pub fn signals_path(&self) -> PathBuf {
        self.tables_dir().join(crate::signals::output::CSV_FILE)
    }

    /// Watchlist from `WATCHLIST_PATH`, falling back to the built-in terms.
    pub fn watchlist(&self) -> anyhow::Result<Watchlist> {
        match &self.watchlist_path {
            Some(path) => Watchlist::load(path)
                .with_context(|| format!("loading watchlist {}", path.display())),
            None => Ok(Watchlist::new(DEFAULT_WATCHLIST.iter().copied())),
        }
    }
}
