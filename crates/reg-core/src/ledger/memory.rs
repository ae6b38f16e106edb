use std::collections::BTreeMap;

use dashmap::DashMap;

use super::{sort_most_recent_first, RunLedger, RunRecord};
use crate::errors::CoreEngineError;

/// Ledger en memoria, seguro para escrituras concurrentes.
#[derive(Debug, Default)]
pub struct InMemoryRunLedger {
    records: DashMap<String, RunRecord>,
    blobs: DashMap<String, Vec<u8>>,
}

impl InMemoryRunLedger {
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

impl RunLedger for InMemoryRunLedger {
    fn record(&self, record: &RunRecord, blobs: &BTreeMap<String, Vec<u8>>) -> Result<(), CoreEngineError> {
        if self.records.contains_key(&record.id) {
            return Err(CoreEngineError::Internal(format!("duplicate run id {}", record.id)));
        }
        for (digest, bytes) in blobs {
            self.blobs.entry(digest.clone()).or_insert_with(|| bytes.clone());
        }
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<RunRecord>, CoreEngineError> {
        Ok(self.records.get(id).map(|r| r.value().clone()))
    }

    fn list(&self) -> Result<Vec<RunRecord>, CoreEngineError> {
        let mut all: Vec<RunRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        sort_most_recent_first(&mut all);
        Ok(all)
    }

    fn blob(&self, digest: &str) -> Result<Option<Vec<u8>>, CoreEngineError> {
        Ok(self.blobs.get(digest).map(|b| b.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StageLock;
    use chrono::{Duration, Utc};
    use serde_json::Map;

    fn record(id: &str, name: Option<&str>, age_secs: i64) -> RunRecord {
        RunRecord { id: id.into(),
                    name: name.map(str::to_string),
                    stage: "train".into(),
                    fingerprint: "f".into(),
                    lock: StageLock::new("train", BTreeMap::new(), BTreeMap::new()),
                    params: Map::new(),
                    metrics: BTreeMap::new(),
                    outputs: BTreeMap::new(),
                    created_at: Utc::now() - Duration::seconds(age_secs),
                    queue_entry: None }
    }

    #[test]
    fn list_is_most_recent_first() {
        let l = InMemoryRunLedger::new();
        l.record(&record("exp-aaaaaaa", None, 10), &BTreeMap::new()).unwrap();
        l.record(&record("exp-bbbbbbb", None, 0), &BTreeMap::new()).unwrap();
        let ids: Vec<String> = l.list().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["exp-bbbbbbb", "exp-aaaaaaa"]);
    }

    #[test]
    fn resolve_by_id_name_and_prefix() {
        let l = InMemoryRunLedger::new();
        l.record(&record("exp-abc1234", Some("baseline"), 2), &BTreeMap::new()).unwrap();
        l.record(&record("exp-abd9999", None, 1), &BTreeMap::new()).unwrap();
        assert_eq!(l.resolve("exp-abc1234").unwrap().id, "exp-abc1234");
        assert_eq!(l.resolve("baseline").unwrap().id, "exp-abc1234");
        assert_eq!(l.resolve("abd").unwrap().id, "exp-abd9999");
        assert!(matches!(l.resolve("ab"), Err(CoreEngineError::AmbiguousRun(_))));
        assert!(matches!(l.resolve("zzz"), Err(CoreEngineError::RunNotFound(_))));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let l = InMemoryRunLedger::new();
        l.record(&record("exp-abc1234", None, 0), &BTreeMap::new()).unwrap();
        assert!(l.record(&record("exp-abc1234", None, 0), &BTreeMap::new()).is_err());
    }
}
