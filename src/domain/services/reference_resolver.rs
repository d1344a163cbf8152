use std::sync::Arc;

use crate::domain::errors::ResolveError;
use crate::domain::models::{EntityKind, EntityRecord};
use crate::infrastructure::store::EntityStore;

/// Resolves foreign-key references between entities at read time.
///
/// The target id is reconstructed from the scalar key the owning entity
/// already stores (contract address, listing id, record id), then looked up;
/// nothing is ever copied between entities. Callers decide whether a
/// `DanglingReference` is tolerable: it is for metadata and other optional
/// links, fatal for required financial ones.
#[derive(Debug, Clone)]
pub struct ReferenceResolver {
    store: Arc<EntityStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Resolve `field` on `record` to the referenced entity.
    pub fn resolve(&self, record: &EntityRecord, field: &str) -> Result<EntityRecord, ResolveError> {
        let kind = record.kind();
        let (target_kind, target_id) = self.target_of(record, field)?;
        self.store
            .get(target_kind, &target_id)
            .ok_or(ResolveError::DanglingReference {
                kind,
                id: target_id,
                field: field.to_string(),
            })
    }

    /// Same as [`resolve`](Self::resolve), but absence (dangling or unset)
    /// maps to `None`. For optional and metadata references.
    pub fn resolve_optional(&self, record: &EntityRecord, field: &str) -> Option<EntityRecord> {
        match self.resolve(record, field) {
            Ok(found) => Some(found),
            Err(ResolveError::DanglingReference { .. }) | Err(ResolveError::EmptyReference { .. }) => None,
            Err(ResolveError::NotAReference { .. }) => None,
        }
    }

    /// (target kind, target id) for a reference field, from the stored key
    fn target_of(
        &self,
        record: &EntityRecord,
        field: &str,
    ) -> Result<(EntityKind, String), ResolveError> {
        let kind = record.kind();
        let not_a_reference = || ResolveError::NotAReference {
            kind,
            field: field.to_string(),
        };
        let empty = || ResolveError::EmptyReference {
            kind,
            field: field.to_string(),
        };

        let target = match (record, field) {
            (EntityRecord::AdOffer(e), "nftContract") => {
                (EntityKind::NftContract, format!("{:#x}", e.nft_contract))
            }
            (EntityRecord::AdOfferParameterLink(e), "adOffer") => {
                (EntityKind::AdOffer, e.ad_offer.clone())
            }
            (EntityRecord::AdOfferParameterLink(e), "adParameter") => {
                (EntityKind::AdParameter, e.ad_parameter.clone())
            }
            (EntityRecord::AdProposal(e), "adOffer") => (EntityKind::AdOffer, e.ad_offer.clone()),
            (EntityRecord::AdProposal(e), "token") => (EntityKind::Token, e.token.clone()),
            (EntityRecord::AdProposal(e), "adParameter") => {
                (EntityKind::AdParameter, e.ad_parameter.clone())
            }
            (EntityRecord::CurrentProposal(e), "adOffer") => {
                (EntityKind::AdOffer, e.ad_offer.clone())
            }
            (EntityRecord::CurrentProposal(e), "token") => (EntityKind::Token, e.token.clone()),
            (EntityRecord::CurrentProposal(e), "adParameter") => {
                (EntityKind::AdParameter, e.ad_parameter.clone())
            }
            (EntityRecord::CurrentProposal(e), "pendingProposal") => (
                EntityKind::AdProposal,
                e.pending_proposal.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::CurrentProposal(e), "acceptedProposal") => (
                EntityKind::AdProposal,
                e.accepted_proposal.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::CurrentProposal(e), "rejectedProposal") => (
                EntityKind::AdProposal,
                e.rejected_proposal.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::Token(e), "nftContract") => {
                (EntityKind::NftContract, format!("{:#x}", e.nft_contract))
            }
            (EntityRecord::Token(e), "mint") => (
                EntityKind::EventRecord,
                e.mint.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::NftPrice(e), "nftContract") => {
                (EntityKind::NftContract, format!("{:#x}", e.nft_contract))
            }
            (EntityRecord::TokenPrice(e), "token") => (EntityKind::Token, e.token.clone()),
            (EntityRecord::MarketplaceListing(e), "token") => (EntityKind::Token, e.token.clone()),
            (EntityRecord::MarketplaceListing(e), "completedBid") => (
                EntityKind::MarketplaceBid,
                e.completed_bid.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::MarketplaceBid(e), "listing") => {
                (EntityKind::MarketplaceListing, e.listing.clone())
            }
            (EntityRecord::MarketplaceBid(e), "revenueTransaction") => (
                EntityKind::RevenueTransaction,
                e.revenue_transaction.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::MarketplaceDirectBuy(e), "listing") => {
                (EntityKind::MarketplaceListing, e.listing.clone())
            }
            (EntityRecord::MarketplaceDirectBuy(e), "revenueTransaction") => (
                EntityKind::RevenueTransaction,
                e.revenue_transaction.clone(),
            ),
            (EntityRecord::MarketplaceOffer(e), "token") => (EntityKind::Token, e.token.clone()),
            (EntityRecord::MarketplaceOffer(e), "revenueTransaction") => (
                EntityKind::RevenueTransaction,
                e.revenue_transaction.clone().ok_or_else(empty)?,
            ),
            (EntityRecord::AdOfferMetadata(e), "offer") => (EntityKind::AdOffer, e.id.clone()),
            (EntityRecord::AdOfferMetadata(e), "creatorMetadata") => (
                EntityKind::CreatorMetadata,
                e.creator_metadata
                    .map(|a| format!("{:#x}", a))
                    .ok_or_else(empty)?,
            ),
            (EntityRecord::AdOfferMetadata(e), "tokenMetadata") => (
                EntityKind::TokenMetadata,
                e.token_metadata.clone().ok_or_else(empty)?,
            ),
            _ => return Err(not_a_reference()),
        };
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NftContract, Token};
    use alloy_primitives::{address, U256};

    fn token(contract: alloy_primitives::Address) -> EntityRecord {
        EntityRecord::Token(Token {
            id: format!("{:#x}-1", contract),
            nft_contract: contract,
            token_id: U256::from(1u64),
            set_in_allow_list: false,
            mint: None,
            owner: None,
            last_update_timestamp: 100,
        })
    }

    #[test]
    fn resolves_contract_from_stored_address() {
        let store = Arc::new(EntityStore::new());
        let contract = address!("00000000000000000000000000000000000000aa");
        store
            .put(
                EntityRecord::NftContract(NftContract::stub(contract, 100)),
                1,
                100,
            )
            .unwrap();

        let resolver = ReferenceResolver::new(store);
        let resolved = resolver.resolve(&token(contract), "nftContract").unwrap();
        assert_eq!(resolved.kind(), EntityKind::NftContract);
    }

    #[test]
    fn missing_target_is_a_dangling_reference() {
        let store = Arc::new(EntityStore::new());
        let resolver = ReferenceResolver::new(store);
        let contract = address!("00000000000000000000000000000000000000aa");

        let err = resolver.resolve(&token(contract), "nftContract").unwrap_err();
        assert!(matches!(err, ResolveError::DanglingReference { .. }));
        assert!(resolver.resolve_optional(&token(contract), "nftContract").is_none());
    }

    #[test]
    fn unset_mint_is_an_empty_reference() {
        let store = Arc::new(EntityStore::new());
        let resolver = ReferenceResolver::new(store);
        let contract = address!("00000000000000000000000000000000000000aa");

        let err = resolver.resolve(&token(contract), "mint").unwrap_err();
        assert!(matches!(err, ResolveError::EmptyReference { .. }));
    }

    #[test]
    fn unknown_field_is_not_a_reference() {
        let store = Arc::new(EntityStore::new());
        let resolver = ReferenceResolver::new(store);
        let contract = address!("00000000000000000000000000000000000000aa");

        let err = resolver.resolve(&token(contract), "owner").unwrap_err();
        assert!(matches!(err, ResolveError::NotAReference { .. }));
    }
}
