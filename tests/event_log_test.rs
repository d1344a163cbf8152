//! NDJSON event log reading, end to end through the pipeline.

use std::io::Write;
use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tempfile::NamedTempFile;

use admarket_indexer::application::ingest::{
    EventSource, IngestPipeline, NdjsonEventSource, SourceError,
};
use admarket_indexer::domain::models::{ChainEvent, EntityKind, EventPayload, EventProvenance};
use admarket_indexer::infrastructure::store::EntityStore;

fn sample_event(block: u64, name: &str) -> ChainEvent {
    ChainEvent {
        provenance: EventProvenance {
            block_number: block,
            block_timestamp: 1_700_000_000 + block,
            transaction_hash: B256::with_last_byte(block as u8),
            log_index: 0,
            emitter: Address::with_last_byte(0x22),
            tx_sender: Address::with_last_byte(0x33),
        },
        payload: EventPayload::UpdateOffer {
            offer_id: U256::from(1u64),
            disable: false,
            name: name.to_string(),
            offer_metadata: "ipfs://offer-1".to_string(),
            nft_contract: Address::with_last_byte(0x11),
        },
    }
}

fn write_log(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn ingests_an_ndjson_log_skipping_blank_lines() {
    let lines = vec![
        serde_json::to_string(&sample_event(10, "first")).unwrap(),
        String::new(),
        serde_json::to_string(&sample_event(11, "second")).unwrap(),
    ];
    let file = write_log(&lines);

    let store = Arc::new(EntityStore::new());
    let mut pipeline = IngestPipeline::new(Arc::clone(&store), 0);
    let mut source = NdjsonEventSource::open(file.path()).await.unwrap();

    let summary = pipeline.run(&mut source).await.unwrap();
    assert_eq!(summary.events_applied, 2);
    assert!(store.exists(EntityKind::AdOffer, "1"));
}

#[tokio::test]
async fn reports_the_line_of_a_malformed_entry() {
    let lines = vec![
        serde_json::to_string(&sample_event(10, "first")).unwrap(),
        "{not json".to_string(),
    ];
    let file = write_log(&lines);

    let mut source = NdjsonEventSource::open(file.path()).await.unwrap();
    assert!(source.next_event().await.unwrap().is_some());

    let err = source.next_event().await.unwrap_err();
    assert!(matches!(err, SourceError::DecodeError { line: 2, .. }));
}

#[tokio::test]
async fn empty_log_yields_no_events() {
    let file = write_log(&[]);
    let mut source = NdjsonEventSource::open(file.path()).await.unwrap();
    assert!(source.next_event().await.unwrap().is_none());
}
