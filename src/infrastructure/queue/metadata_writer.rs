//! Worker draining the metadata queue: fetches each offer document and
//! applies it to the store as a late patch. Runs outside the ingestion
//! path; every failure here is logged and swallowed.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::domain::models::{
    AdOfferMetadata, CreatorMetadata, EntityRecord, TokenMetadata, TokenMetadataAttribute,
};
use crate::infrastructure::metadata::client::{MetadataClient, OfferDocument};
use crate::infrastructure::queue::metadata_queue::MetadataFetchRequest;
use crate::infrastructure::store::EntityStore;
use crate::utils::logging;

pub struct MetadataWriter {
    receiver: UnboundedReceiver<MetadataFetchRequest>,
    client: MetadataClient,
    store: Arc<EntityStore>,
}

impl MetadataWriter {
    pub fn new(
        receiver: UnboundedReceiver<MetadataFetchRequest>,
        client: MetadataClient,
        store: Arc<EntityStore>,
    ) -> Self {
        Self {
            receiver,
            client,
            store,
        }
    }

    /// Spawn the worker; it stops when the queue's senders are dropped
    pub fn start(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(request) = self.receiver.recv().await {
                self.process(request).await;
            }
            logging::log_debug("Metadata queue drained; worker stopping");
        })
    }

    async fn process(&self, request: MetadataFetchRequest) {
        match self.client.fetch_offer_document(&request.url).await {
            Ok(document) => self.apply(&request.offer_id, document),
            Err(e) => logging::log_warning(&format!(
                "Metadata fetch for offer {} failed ({}); entity left absent",
                request.offer_id, e
            )),
        }
    }

    /// Turn the document into metadata entities. Metadata writes are
    /// height-exempt, so a store put here cannot fail.
    fn apply(&self, offer_id: &str, document: OfferDocument) {
        let creator_id = document.creator.as_ref().and_then(|c| c.address);
        let token_metadata_id = document
            .token_metadata
            .as_ref()
            .map(|_| format!("{}-token", offer_id));

        if let Some(creator) = document.creator {
            if let Some(address) = creator.address {
                self.put(EntityRecord::CreatorMetadata(CreatorMetadata {
                    id: address,
                    name: creator.name,
                    description: creator.description,
                    image_url: creator.image_url,
                    external_url: creator.external_url,
                    categories: creator.categories,
                }));
            } else {
                logging::log_debug(&format!(
                    "Offer {} creator document has no address; skipping creator entity",
                    offer_id
                ));
            }
        }

        if let (Some(id), Some(token)) = (token_metadata_id.clone(), document.token_metadata) {
            self.put(EntityRecord::TokenMetadata(TokenMetadata {
                id,
                name: token.name,
                description: token.description,
                image_url: token.image_url,
                external_url: token.external_url,
                attributes: token
                    .attributes
                    .into_iter()
                    .map(|a| TokenMetadataAttribute {
                        trait_type: a.trait_type,
                        value: a.value,
                    })
                    .collect(),
            }));
        }

        self.put(EntityRecord::AdOfferMetadata(AdOfferMetadata {
            id: offer_id.to_string(),
            name: document.name,
            description: document.description,
            image: document.image,
            terms: document.terms,
            external_url: document.external_url,
            valid_from: document.valid_from,
            valid_to: document.valid_to,
            categories: document.categories,
            creator_metadata: creator_id,
            token_metadata: token_metadata_id,
        }));

        logging::log_debug(&format!("Applied metadata document for offer {}", offer_id));
    }

    fn put(&self, record: EntityRecord) {
        // Metadata entities carry no block provenance
        if let Err(e) = self.store.put(record, 0, 0) {
            logging::log_warning(&format!("Metadata patch rejected: {}", e));
        }
    }
}
