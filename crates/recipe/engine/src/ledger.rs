//! Error ledgers: two-tier error accumulation
//!
//! Each module owns a local ledger that collects what goes wrong while its
//! task runs. When the task finishes, its local entries are promoted into
//! the run's global ledger. Barrier checks scan the global ledger and turn
//! the first critical entry into an abort decision.

use parking_lot::Mutex;
use recipe_types::{CriticalError, ErrorEntry};

/// Which ledger tier a check scans
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerScope {
    /// The current module's own entries
    Local,
    /// Everything promoted so far in this run
    Global,
}

/// An append-only list of error entries behind a mutex
#[derive(Debug, Default)]
pub struct ErrorLedger {
    entries: Mutex<Vec<ErrorEntry>>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an entry
    pub fn add(&self, entry: ErrorEntry) {
        self.entries.lock().push(entry);
    }

    /// Append a message with the given severity
    pub fn record(&self, message: impl Into<String>, critical: bool) {
        self.add(ErrorEntry::new(message, critical));
    }

    /// Snapshot of the entries in ledger order
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn has_critical(&self) -> bool {
        self.entries.lock().iter().any(|e| e.critical)
    }

    /// Remove and return every entry
    pub fn take(&self) -> Vec<ErrorEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Move every entry of this ledger to the end of `global`, preserving
    /// order. Returns how many entries moved; a second call moves nothing.
    pub fn promote_into(&self, global: &ErrorLedger) -> usize {
        let moved = self.take();
        let count = moved.len();
        if count > 0 {
            global.entries.lock().extend(moved);
        }
        count
    }

    /// Scan entries in order and fail at the first critical one.
    ///
    /// The error carries every entry up to and including the critical one.
    /// The ledger itself is left untouched either way.
    pub fn check(&self) -> Result<(), CriticalError> {
        let entries = self.entries.lock();
        let Some(position) = entries.iter().position(|e| e.critical) else {
            return Ok(());
        };

        let reported = entries[..=position].to_vec();
        drop(entries);

        tracing::error!(count = reported.len(), "Encountered one or more errors");
        for entry in &reported {
            if entry.critical {
                tracing::error!(module = entry.module.as_deref(), "{}", entry.message);
            } else {
                tracing::warn!(module = entry.module.as_deref(), "{}", entry.message);
            }
        }
        tracing::error!("Critical error found, aborting");

        Err(CriticalError::new(reported))
    }
}
