use std::sync::atomic::Ordering;
use std::sync::Arc;

use admarket_indexer::application::ingest::{IngestPipeline, NdjsonEventSource};
use admarket_indexer::config::AppConfig;
use admarket_indexer::infrastructure::metadata::MetadataClient;
use admarket_indexer::infrastructure::queue::{MetadataQueue, MetadataWriter};
use admarket_indexer::infrastructure::store::EntityStore;
use admarket_indexer::utils::logging;

#[tokio::main]
async fn main() {
    logging::init_logger();

    let _version = env!("CARGO_PKG_VERSION");

    let config = AppConfig::from_env();
    let store = Arc::new(EntityStore::new());

    // The metadata worker is optional; ingestion never depends on it
    let mut metadata_queue = None;
    let mut metadata_worker = None;
    if config.metadata.enabled {
        match MetadataClient::new(&config) {
            Ok(client) => {
                let (queue, receiver) = MetadataQueue::new();
                metadata_worker =
                    Some(MetadataWriter::new(receiver, client, Arc::clone(&store)).start());
                metadata_queue = Some(queue);
            }
            Err(e) => {
                logging::log_error(&format!(
                    "Failed to create metadata client, continuing without metadata: {}",
                    e
                ));
            }
        }
    }

    let mut pipeline = IngestPipeline::new(Arc::clone(&store), config.ingest.start_block);
    if let Some(queue) = metadata_queue {
        pipeline = pipeline.with_metadata_queue(queue);
    }

    // Ctrl+C flips the shutdown flag; the pipeline stops between events
    let shutdown = pipeline.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.store(true, Ordering::SeqCst);
        }
    });

    match NdjsonEventSource::open(&config.ingest.event_log_path).await {
        Ok(mut source) => {
            logging::log_info(&format!(
                "Ingesting event log {} from block {}",
                config.ingest.event_log_path, config.ingest.start_block
            ));
            match pipeline.run(&mut source).await {
                Ok(summary) => {
                    logging::log_info(&format!(
                        "Ingestion finished: {} events applied, {} records written, {} entities{}",
                        summary.events_applied,
                        summary.records_written,
                        store.len(),
                        if summary.aborted { " (aborted)" } else { "" }
                    ));
                }
                Err(e) => logging::log_error(&format!("Ingestion failed: {}", e)),
            }
        }
        Err(e) => logging::log_error(&format!(
            "Failed to open event log {}: {}",
            config.ingest.event_log_path, e
        )),
    }

    // Dropping the pipeline closes the queue; let the worker drain it
    drop(pipeline);
    if let Some(worker) = metadata_worker {
        let _ = worker.await;
    }
}
