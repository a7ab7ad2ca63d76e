//! Sequential member identifier assignment.
//!
//! The ledger is a two-column table (`ID,Name`), append-only, read in full
//! on every mint. Storage sits behind the `LedgerStore` trait so the web
//! surface injects a CSV file while tests inject an in-memory stand-in.
//! Identifier uniqueness relies on the ledger being the sole writer; within
//! one process the web layer serializes access with a mutex.

use crate::compose::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A minted member identifier, rendered as `PREFIX-NNNN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Format an identifier from a prefix and 1-based sequence number.
    pub fn new(prefix: &str, seq: usize) -> Self {
        Self(format!("{}-{:04}", prefix, seq))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(rename = "ID")]
    pub id: MemberId,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Storage handle for the ledger table.
pub trait LedgerStore: Send {
    /// Load every row, oldest first. A store that does not exist yet loads
    /// as empty.
    fn load(&mut self) -> Result<Vec<LedgerRecord>>;

    /// Persist the full table, replacing previous contents.
    fn persist(&mut self, rows: &[LedgerRecord]) -> Result<()>;
}

/// CSV-file-backed store with `ID,Name` headers.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for CsvStore {
    fn load(&mut self) -> Result<Vec<LedgerRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }

    fn persist(&mut self, rows: &[LedgerRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// In-memory store for deterministic tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<LedgerRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&mut self) -> Result<Vec<LedgerRecord>> {
        Ok(self.rows.clone())
    }

    fn persist(&mut self, rows: &[LedgerRecord]) -> Result<()> {
        self.rows = rows.to_vec();
        Ok(())
    }
}

/// The identifier ledger.
pub struct Ledger {
    store: Box<dyn LedgerStore>,
    prefix: String,
}

impl Ledger {
    pub fn new(store: Box<dyn LedgerStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Mint a new identifier for a display name and persist the row.
    ///
    /// The sequence number is the current row count plus one. There is no
    /// dedup check: minting twice for one name yields two identifiers.
    pub fn mint(&mut self, name: &str) -> Result<MemberId> {
        let mut rows = self.store.load()?;
        let id = MemberId::new(&self.prefix, rows.len() + 1);
        rows.push(LedgerRecord {
            id: id.clone(),
            name: name.to_string(),
        });
        self.store.persist(&rows)?;
        Ok(id)
    }

    /// Resolve a display name to its most-recently-assigned identifier.
    pub fn resolve(&mut self, name: &str) -> Result<Option<MemberId>> {
        let rows = self.store.load()?;
        Ok(rows
            .iter()
            .rev()
            .find(|row| row.name == name)
            .map(|row| row.id.clone()))
    }

    /// Number of rows ever minted.
    pub fn len(&mut self) -> Result<usize> {
        Ok(self.store.load()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
