//! One reducer per event kind, grouped by emitting contract.
//!
//! Reducers are pure: given the current store snapshot and one event they
//! return the full records to upsert, and write nothing themselves. Every
//! registered kind produces at least the immutable provenance record;
//! unrecognized kinds fail reduction instead of being dropped.

pub mod admin;
pub mod marketplace;
pub mod nft;

use crate::domain::errors::ReduceError;
use crate::domain::models::{ChainEvent, EntityRecord, EventPayload, EventRecord};
use crate::domain::services::RevenueAggregator;
use crate::infrastructure::store::EntityStore;

/// Dispatches events to the per-contract reducers and owns the revenue
/// aggregation step.
#[derive(Debug, Default)]
pub struct ReducerRegistry {
    aggregator: RevenueAggregator,
}

impl ReducerRegistry {
    pub fn new() -> Self {
        Self {
            aggregator: RevenueAggregator::new(),
        }
    }

    /// Reduce one event against the current store snapshot. The first upsert
    /// is always the provenance record; the rest are the derived-entity
    /// patches of the matching reducer.
    pub fn reduce(
        &self,
        store: &EntityStore,
        event: &ChainEvent,
    ) -> Result<Vec<EntityRecord>, ReduceError> {
        if matches!(event.payload, EventPayload::Unknown) {
            return Err(ReduceError::UnhandledEventKind {
                kind: event.payload.kind_name().to_string(),
            });
        }

        let mut upserts = vec![self.provenance_record(event)];
        let derived = match &event.payload {
            EventPayload::UpdateAdProposal { .. }
            | EventPayload::UpdateAdValidation { .. }
            | EventPayload::UpdateOffer { .. }
            | EventPayload::UpdateOfferAdParameter { .. }
            | EventPayload::UpdateOfferAdmin { .. }
            | EventPayload::UpdateOfferValidator { .. }
            | EventPayload::CallWithProtocolFee { .. }
            | EventPayload::FeeUpdate { .. }
            | EventPayload::OwnershipTransferred { .. } => {
                admin::reduce(store, event, &self.aggregator)?
            }

            EventPayload::NewNftContract { .. }
            | EventPayload::Approval { .. }
            | EventPayload::ApprovalForAll { .. }
            | EventPayload::ContractUriUpdated { .. }
            | EventPayload::Initialized { .. }
            | EventPayload::Mint { .. }
            | EventPayload::RoyaltiesSet { .. }
            | EventPayload::TokensAllowlist { .. }
            | EventPayload::TokensAllowlistUpdated { .. }
            | EventPayload::Transfer { .. }
            | EventPayload::UpdateDefaultMintPrice { .. }
            | EventPayload::UpdateMintPrice { .. }
            | EventPayload::UpdateUser { .. } => nft::reduce(store, event)?,

            EventPayload::ListingAdded { .. }
            | EventPayload::ListingUpdated { .. }
            | EventPayload::ListingRemoved { .. }
            | EventPayload::NewBid { .. }
            | EventPayload::AuctionClosed { .. }
            | EventPayload::NewSale { .. }
            | EventPayload::NewOffer { .. }
            | EventPayload::AcceptedOffer { .. }
            | EventPayload::CancelledOffer { .. } => marketplace::reduce(store, event)?,

            EventPayload::Unknown => unreachable!("rejected above"),
        };
        upserts.extend(derived);
        Ok(upserts)
    }

    /// The immutable record of the log itself
    fn provenance_record(&self, event: &ChainEvent) -> EntityRecord {
        let payload = serde_json::to_value(&event.payload).unwrap_or(serde_json::Value::Null);
        let mut relations = Vec::new();

        // Value-moving events are discoverable from their revenue transaction
        if matches!(
            event.payload,
            EventPayload::CallWithProtocolFee { .. }
                | EventPayload::Mint { .. }
                | EventPayload::NewSale { .. }
                | EventPayload::AcceptedOffer { .. }
                | EventPayload::AuctionClosed { .. }
        ) {
            relations.push((
                "revenueTransaction".to_string(),
                event.provenance.revenue_transaction_id(),
            ));
        }

        EntityRecord::Event(EventRecord {
            id: event.provenance.record_id(),
            kind: event.payload.kind_name().to_string(),
            provenance: event.provenance.clone(),
            payload,
            relations,
        })
    }
}

// Typed accessors and ensure-exists helpers shared by the reducer modules.

pub(crate) mod fetch {
    use alloy_primitives::{Address, U256};

    use crate::domain::models::common::token_entity_id;
    use crate::domain::models::{
        AdOffer, AdProposal, CurrentProposal, EntityKind, EntityRecord, MarketplaceBid,
        MarketplaceListing, MarketplaceOffer, NftContract, RevenueTransaction, Token,
    };
    use crate::infrastructure::store::EntityStore;

    pub fn ad_offer(store: &EntityStore, id: &str) -> Option<AdOffer> {
        match store.get(EntityKind::AdOffer, id) {
            Some(EntityRecord::AdOffer(e)) => Some(e),
            _ => None,
        }
    }

    pub fn ad_proposal(store: &EntityStore, id: &str) -> Option<AdProposal> {
        match store.get(EntityKind::AdProposal, id) {
            Some(EntityRecord::AdProposal(e)) => Some(e),
            _ => None,
        }
    }

    pub fn current_proposal(store: &EntityStore, id: &str) -> Option<CurrentProposal> {
        match store.get(EntityKind::CurrentProposal, id) {
            Some(EntityRecord::CurrentProposal(e)) => Some(e),
            _ => None,
        }
    }

    pub fn nft_contract(store: &EntityStore, address: &Address) -> Option<NftContract> {
        match store.get(EntityKind::NftContract, &format!("{:#x}", address)) {
            Some(EntityRecord::NftContract(e)) => Some(e),
            _ => None,
        }
    }

    pub fn token(store: &EntityStore, id: &str) -> Option<Token> {
        match store.get(EntityKind::Token, id) {
            Some(EntityRecord::Token(e)) => Some(e),
            _ => None,
        }
    }

    pub fn listing(store: &EntityStore, id: &str) -> Option<MarketplaceListing> {
        match store.get(EntityKind::MarketplaceListing, id) {
            Some(EntityRecord::MarketplaceListing(e)) => Some(e),
            _ => None,
        }
    }

    pub fn marketplace_offer(store: &EntityStore, id: &str) -> Option<MarketplaceOffer> {
        match store.get(EntityKind::MarketplaceOffer, id) {
            Some(EntityRecord::MarketplaceOffer(e)) => Some(e),
            _ => None,
        }
    }

    /// Open (created) bids on a listing, via the relation index
    pub fn open_bids(store: &EntityStore, listing_id: &str) -> Vec<MarketplaceBid> {
        store
            .related(EntityKind::MarketplaceBid, "listing", listing_id)
            .into_iter()
            .filter_map(|r| match r {
                EntityRecord::MarketplaceBid(b)
                    if b.status == crate::domain::models::Status::Created =>
                {
                    Some(b)
                }
                _ => None,
            })
            .collect()
    }

    /// The contract stub to upsert when an event references an address the
    /// factory has not announced yet; `None` when it already exists.
    pub fn ensure_nft_contract(
        store: &EntityStore,
        address: &Address,
        timestamp: u64,
    ) -> Option<EntityRecord> {
        if store.exists(EntityKind::NftContract, &format!("{:#x}", address)) {
            None
        } else {
            Some(EntityRecord::NftContract(NftContract::stub(*address, timestamp)))
        }
    }

    /// Existing token, or a fresh one. The mint pointer stays unset until
    /// the mint event itself is seen.
    pub fn token_or_new(
        store: &EntityStore,
        contract: &Address,
        token_id: &U256,
        timestamp: u64,
    ) -> Token {
        let id = token_entity_id(contract, token_id);
        token(store, &id).unwrap_or(Token {
            id,
            nft_contract: *contract,
            token_id: *token_id,
            set_in_allow_list: false,
            mint: None,
            owner: None,
            last_update_timestamp: timestamp,
        })
    }

    /// The revenue-transaction row grouping this transaction's value moves
    pub fn revenue_transaction(tx_id: String, block_timestamp: u64) -> EntityRecord {
        EntityRecord::RevenueTransaction(RevenueTransaction {
            id: tx_id,
            block_timestamp,
        })
    }
}
