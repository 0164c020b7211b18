//! Label-keyed registry of compressed sets.
//!
//! Maps an arbitrary string label to one [`CompressedSet`] and owns the two
//! concerns the core deliberately leaves out:
//!
//! - **Validation**: external device identifiers are fixed-length digit
//!   strings carrying a fixed-length prefix; the registry checks the shape,
//!   strips the prefix, and parses the remainder into the 48-bit domain.
//!   Malformed identifiers are rejected by returning `false`, never by
//!   panicking.
//! - **Concurrency**: per-label sets are created exactly once under
//!   concurrent first-writers, and every mutation of a label's set is
//!   serialized through that label's lock. Independent labels proceed
//!   without coordination.

use crate::{bits, container::CONVERSION_THRESHOLD, set::CompressedSet};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, RwLock},
};
use thiserror::Error;
use tracing::debug;

/// Errors returned when parsing an external device identifier.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid length")]
    InvalidLength,
    #[error("invalid digits")]
    InvalidDigits,
    #[error("value out of range")]
    OutOfRange,
}

/// Registry configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Required length of an external identifier, in digits.
    pub id_length: usize,
    /// Number of leading digits stripped before parsing the value.
    pub prefix_length: usize,
    /// Conversion threshold handed to each label's set.
    pub conversion_threshold: usize,
}

impl Default for Config {
    /// Matches the deployed identifier format: 15 digits with a fixed
    /// 2-digit country prefix.
    fn default() -> Self {
        Self {
            id_length: 15,
            prefix_length: 2,
            conversion_threshold: CONVERSION_THRESHOLD,
        }
    }
}

/// Shared handle to one label's set.
type Shared = Arc<Mutex<CompressedSet>>;

/// Label-keyed store of compressed sets.
pub struct Registry {
    cfg: Config,
    labels: RwLock<HashMap<String, Shared>>,
}

impl Registry {
    /// Creates a registry with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            labels: RwLock::new(HashMap::new()),
        }
    }

    /// Parses an external identifier into a 48-bit value.
    pub fn parse(&self, id: &str) -> Result<u64, Error> {
        if id.len() != self.cfg.id_length {
            return Err(Error::InvalidLength);
        }
        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidDigits);
        }
        let value: u64 = id[self.cfg.prefix_length..]
            .parse()
            .map_err(|_| Error::OutOfRange)?;
        if value > bits::MAX_VALUE {
            return Err(Error::OutOfRange);
        }
        Ok(value)
    }

    /// Records an identifier under a label.
    ///
    /// Returns `false` if the identifier is malformed; otherwise the value
    /// is added (idempotently) to the label's set, creating the set on
    /// first use.
    pub fn insert(&self, label: &str, id: &str) -> bool {
        let value = match self.parse(id) {
            Ok(value) => value,
            Err(err) => {
                debug!(label, %err, "rejected identifier");
                return false;
            }
        };
        let set = self.set_for(label);
        let mut set = set.lock().unwrap();
        set.add(value);
        true
    }

    /// Checks whether an identifier was recorded under a label.
    ///
    /// Returns `false` for malformed identifiers and for labels that were
    /// never written.
    pub fn contains(&self, label: &str, id: &str) -> bool {
        let Ok(value) = self.parse(id) else {
            return false;
        };
        let set = self.labels.read().unwrap().get(label).cloned();
        match set {
            Some(set) => set.lock().unwrap().contains(value),
            None => false,
        }
    }

    /// Returns the number of identifiers recorded under a label.
    pub fn cardinality(&self, label: &str) -> u64 {
        let set = self.labels.read().unwrap().get(label).cloned();
        match set {
            Some(set) => set.lock().unwrap().cardinality(),
            None => 0,
        }
    }

    /// Returns the number of labels with a set.
    pub fn label_count(&self) -> usize {
        self.labels.read().unwrap().len()
    }

    /// Returns the label's set, creating it exactly once.
    ///
    /// The common path is a read-locked lookup; only a first writer takes
    /// the write lock, and `entry` arbitrates concurrent first writers.
    fn set_for(&self, label: &str) -> Shared {
        if let Some(set) = self.labels.read().unwrap().get(label) {
            return set.clone();
        }
        let mut labels = self.labels.write().unwrap();
        labels
            .entry(label.to_string())
            .or_insert_with(|| {
                debug!(label, "creating set for new label");
                Arc::new(Mutex::new(CompressedSet::with_threshold(
                    self.cfg.conversion_threshold,
                )))
            })
            .clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
