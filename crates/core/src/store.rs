use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::metadata::ReportMetadata;

/// Process-lifetime metadata store. Written by the upload/parse collaborator,
/// read by the Q&A pipeline. Records are published as `Arc` snapshots, so a
/// reader never observes a partially written record: a re-upload swaps the
/// map entry to a fresh `Arc` while existing readers keep the old snapshot.
#[derive(Default)]
pub struct MetadataStore {
    reports: RwLock<HashMap<String, Arc<ReportMetadata>>>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for `metadata.report_id`. Returns the
    /// published snapshot.
    pub fn insert(&self, metadata: ReportMetadata) -> Arc<ReportMetadata> {
        let snapshot = Arc::new(metadata);
        let previous = self
            .reports
            .write()
            .insert(snapshot.report_id.clone(), Arc::clone(&snapshot));
        debug!(
            report_id = %snapshot.report_id,
            replaced = previous.is_some(),
            "stored report metadata"
        );
        snapshot
    }

    pub fn get(&self, report_id: &str) -> Option<Arc<ReportMetadata>> {
        self.reports.read().get(report_id).cloned()
    }

    pub fn remove(&self, report_id: &str) -> bool {
        self.reports.write().remove(report_id).is_some()
    }

    pub fn clear(&self) {
        self.reports.write().clear();
    }

    pub fn len(&self) -> usize {
        self.reports.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.read().is_empty()
    }

    pub fn report_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.reports.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
