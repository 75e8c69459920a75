//! Watchlist membership and signal flagging.

use std::path::Path;

use indexmap::IndexSet;
use tracing::info;

use super::{ratio::Ratio, Thresholds};
use crate::error::{EngineError, EngineResult};

/// Priority event terms used when no watchlist file is configured.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "Sedation",
    "Respiratory depression",
    "QT prolongation",
    "Arrhythmia",
    "Syncope",
    "Drug interaction",
    "Confusion",
    "Nausea",
    "Constipation",
    "Withdrawal symptoms",
];

/// Clinically prioritised event terms. Membership is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    terms: IndexSet<String>,
}

impl Watchlist {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse one term per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| EngineError::io(path, err))?;
        let watchlist = Self::parse(&text);
        info!(path = %path.display(), terms = watchlist.len(), "loaded watchlist");
        Ok(watchlist)
    }

    pub fn contains(&self, event: &str) -> bool {
        self.terms.contains(event)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }
}

/// Flags attached to every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_watchlist: bool,
    pub signal_flag: bool,
}

/// `signal_flag` holds iff `a >= signal_min_cases` and `PRR >= signal_min_prr`.
pub fn classify(
    event: &str,
    a: u64,
    prr: Ratio,
    watchlist: &Watchlist,
    thresholds: &Thresholds,
) -> Classification {
    Classification {
        is_watchlist: watchlist.contains(event),
        signal_flag: a >= thresholds.signal_min_cases && prr.at_least(thresholds.signal_min_prr),
    }
}
