use std::collections::HashMap;

use crate::prelude::SlewResult;
use crate::records::{ScanKey, ScanRecord};

/// Keyed scan-record store.
///
/// The pipeline only needs get-or-create, prefix lookup, per-station
/// listing, and a commit hook, so any keyed map with stable iteration
/// order satisfies the contract.
pub trait ScanStore {
    /// Returns the record for `key`, creating an empty one if absent.
    fn get_or_create(&mut self, key: &ScanKey) -> &mut ScanRecord;

    /// First record, in insertion order, whose name starts with
    /// `name_prefix` within the given session and station.
    fn find_scan(&self, name_prefix: &str, session: &str, station: &str) -> Option<ScanKey>;

    /// Distinct station codes, in first-seen order.
    fn stations(&self) -> Vec<String>;

    /// All records for a station, in insertion order.
    fn station_records(&self, station: &str) -> Vec<&ScanRecord>;

    /// Durability point after each finalized or annotated record.
    fn commit(&mut self) -> SlewResult<()>;
}

/// In-memory store backing a single batch run.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<ScanRecord>,
    index: HashMap<ScanKey, usize>,
}

impl MemoryStore {
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

impl ScanStore for MemoryStore {
    fn get_or_create(&mut self, key: &ScanKey) -> &mut ScanRecord {
        if !self.index.contains_key(key) {
            let idx = self.records.len();
            self.records.push(ScanRecord::new(key.clone()));
            self.index.insert(key.clone(), idx);
        }
        let idx = self.index[key];
        &mut self.records[idx]
    }

    fn find_scan(&self, name_prefix: &str, session: &str, station: &str) -> Option<ScanKey> {
        self.records
            .iter()
            .find(|rec| {
                rec.session == session
                    && rec.station == station
                    && rec.name.starts_with(name_prefix)
            })
            .map(ScanRecord::key)
    }

    fn stations(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for rec in &self.records {
            if !seen.iter().any(|s| s == &rec.station) {
                seen.push(rec.station.clone());
            }
        }
        seen
    }

    fn station_records(&self, station: &str) -> Vec<&ScanRecord> {
        self.records
            .iter()
            .filter(|rec| rec.station.eq_ignore_ascii_case(station))
            .collect()
    }

    fn commit(&mut self) -> SlewResult<()> {
        Ok(())
    }
}
