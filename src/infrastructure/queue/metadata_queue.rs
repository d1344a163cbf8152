//! Queue decoupling off-chain metadata fetches from the ingestion path.
//!
//! Ingestion only enqueues; the worker fetches and applies the documents as
//! late patches. A full or closed queue is logged and dropped, never an
//! ingestion failure.

use tokio::sync::mpsc;

use crate::utils::logging;

/// Request to fetch the metadata document of an ad offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFetchRequest {
    /// Offer the document belongs to
    pub offer_id: String,
    /// Where the document lives
    pub url: String,
}

impl MetadataFetchRequest {
    pub fn new(offer_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            offer_id: offer_id.into(),
            url: url.into(),
        }
    }
}

/// Sending half of the metadata queue, cloned into the ingestion pipeline
#[derive(Debug, Clone)]
pub struct MetadataQueue {
    sender: mpsc::UnboundedSender<MetadataFetchRequest>,
}

impl MetadataQueue {
    /// Create the queue; the receiver goes to the worker
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MetadataFetchRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Best-effort enqueue; a closed queue is logged, not propagated
    pub fn enqueue(&self, request: MetadataFetchRequest) {
        if self.sender.send(request).is_err() {
            logging::log_warning("Metadata queue closed; dropping fetch request");
        }
    }
}
