//! Ordered event application.
//!
//! The pipeline pulls decoded events from a source, enforces the global
//! (block number, log index) order, reduces each event to its full set of
//! entity upserts, and writes them. An event is applied completely or not
//! at all: every derived-entity height is checked before the first write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::errors::IngestError;
use crate::domain::models::{ChainEvent, EntityFamily, EventPayload};
use crate::infrastructure::queue::{MetadataFetchRequest, MetadataQueue};
use crate::infrastructure::store::EntityStore;
use crate::utils::logging;

use super::reducers::ReducerRegistry;
use super::source::EventSource;

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub events_applied: u64,
    pub records_written: u64,
    /// True when the run stopped on a shutdown request rather than source
    /// exhaustion
    pub aborted: bool,
}

pub struct IngestPipeline {
    store: Arc<EntityStore>,
    registry: ReducerRegistry,
    metadata_queue: Option<MetadataQueue>,
    /// Ordering key of the last applied event
    last_applied: Option<(u64, u64)>,
    shutdown: Arc<AtomicBool>,
    start_block: u64,
}

impl IngestPipeline {
    pub fn new(store: Arc<EntityStore>, start_block: u64) -> Self {
        Self {
            store,
            registry: ReducerRegistry::new(),
            metadata_queue: None,
            last_applied: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            start_block,
        }
    }

    /// Attach the metadata queue; `UpdateOffer` events then enqueue a fetch
    /// of the offer's off-chain document.
    pub fn with_metadata_queue(mut self, queue: MetadataQueue) -> Self {
        self.metadata_queue = Some(queue);
        self
    }

    /// Flag checked between events; flip it to stop the run cleanly
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn store(&self) -> Arc<EntityStore> {
        Arc::clone(&self.store)
    }

    /// Apply one event. Returns the number of records written.
    pub fn apply(&mut self, event: &ChainEvent) -> Result<usize, IngestError> {
        let key = event.provenance.ordering_key();
        if let Some(last) = self.last_applied {
            // Equal keys are tolerated so a restarted source can overlap
            if key < last {
                return Err(IngestError::OutOfOrderEvent {
                    provenance: event.provenance.clone(),
                    last_applied: last,
                });
            }
        }

        let upserts = self
            .registry
            .reduce(&self.store, event)
            .map_err(|source| IngestError::ReduceError {
                provenance: event.provenance.clone(),
                source,
            })?;

        // Check every derived height before writing anything, so a rejected
        // event leaves no partial state behind
        for record in &upserts {
            let kind = record.kind();
            if !matches!(kind.family(), EntityFamily::Derived | EntityFamily::Link) {
                continue;
            }
            if let Some(recorded) = self.store.block_height(kind, &record.id()) {
                if event.provenance.block_number < recorded {
                    return Err(IngestError::StoreError {
                        provenance: event.provenance.clone(),
                        source: crate::infrastructure::store::StoreError::OutOfOrderWrite {
                            kind,
                            id: record.id(),
                            recorded_height: recorded,
                            incoming_height: event.provenance.block_number,
                        },
                    });
                }
            }
        }

        let written = upserts.len();
        for record in upserts {
            self.store
                .put(
                    record,
                    event.provenance.block_number,
                    event.provenance.block_timestamp,
                )
                .map_err(|source| IngestError::StoreError {
                    provenance: event.provenance.clone(),
                    source,
                })?;
        }

        self.last_applied = Some(key);
        self.enqueue_metadata(event);
        Ok(written)
    }

    /// Drain `source` to exhaustion or shutdown
    pub async fn run<S: EventSource>(
        &mut self,
        source: &mut S,
    ) -> Result<IngestSummary, IngestError> {
        let mut summary = IngestSummary::default();
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                logging::log_info("Shutdown requested; stopping ingestion");
                summary.aborted = true;
                break;
            }
            let event = source
                .next_event()
                .await
                .map_err(|e| IngestError::SourceError(e.to_string()))?;
            let Some(event) = event else {
                break;
            };
            if event.provenance.block_number < self.start_block {
                logging::log_debug(&format!(
                    "Skipping {} at block {} below start block {}",
                    event.payload.kind_name(),
                    event.provenance.block_number,
                    self.start_block
                ));
                continue;
            }
            summary.records_written += self.apply(&event)? as u64;
            summary.events_applied += 1;
        }
        Ok(summary)
    }

    fn enqueue_metadata(&self, event: &ChainEvent) {
        let Some(queue) = &self.metadata_queue else {
            return;
        };
        if let EventPayload::UpdateOffer {
            offer_id,
            offer_metadata,
            ..
        } = &event.payload
        {
            if offer_metadata.is_empty() {
                return;
            }
            queue.enqueue(MetadataFetchRequest::new(
                offer_id.to_string(),
                offer_metadata.clone(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};

    use crate::application::ingest::source::InMemoryEventSource;
    use crate::domain::models::{EntityKind, EventProvenance};

    fn provenance(block: u64, log: u64) -> EventProvenance {
        EventProvenance {
            block_number: block,
            block_timestamp: block * 12,
            transaction_hash: B256::with_last_byte(block as u8),
            log_index: log,
            emitter: Address::with_last_byte(0xAA),
            tx_sender: Address::with_last_byte(0xBB),
        }
    }

    fn update_offer(block: u64, log: u64, name: &str) -> ChainEvent {
        ChainEvent {
            provenance: provenance(block, log),
            payload: EventPayload::UpdateOffer {
                offer_id: U256::from(1u64),
                disable: false,
                name: name.to_string(),
                offer_metadata: "ipfs://offer-1".to_string(),
                nft_contract: Address::with_last_byte(0x11),
            },
        }
    }

    #[tokio::test]
    async fn applies_events_in_order() {
        let store = Arc::new(EntityStore::new());
        let mut pipeline = IngestPipeline::new(Arc::clone(&store), 0);
        let mut source = InMemoryEventSource::new(vec![
            update_offer(10, 0, "first"),
            update_offer(11, 0, "second"),
        ]);

        let summary = pipeline.run(&mut source).await.unwrap();
        assert_eq!(summary.events_applied, 2);
        assert!(!summary.aborted);
        assert!(store.exists(EntityKind::AdOffer, "1"));
    }

    #[tokio::test]
    async fn rejects_order_regression() {
        let store = Arc::new(EntityStore::new());
        let mut pipeline = IngestPipeline::new(store, 0);
        pipeline.apply(&update_offer(20, 3, "first")).unwrap();

        let err = pipeline.apply(&update_offer(20, 2, "stale")).unwrap_err();
        assert!(matches!(
            err,
            IngestError::OutOfOrderEvent {
                last_applied: (20, 3),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn skips_events_below_start_block() {
        let store = Arc::new(EntityStore::new());
        let mut pipeline = IngestPipeline::new(Arc::clone(&store), 100);
        let mut source = InMemoryEventSource::new(vec![update_offer(50, 0, "early")]);

        let summary = pipeline.run(&mut source).await.unwrap();
        assert_eq!(summary.events_applied, 0);
        assert!(!store.exists(EntityKind::AdOffer, "1"));
    }

    #[tokio::test]
    async fn shutdown_stops_between_events() {
        let store = Arc::new(EntityStore::new());
        let mut pipeline = IngestPipeline::new(store, 0);
        pipeline.shutdown_handle().store(true, Ordering::SeqCst);
        let mut source = InMemoryEventSource::new(vec![update_offer(10, 0, "first")]);

        let summary = pipeline.run(&mut source).await.unwrap();
        assert!(summary.aborted);
        assert_eq!(summary.events_applied, 0);
    }
}
