use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::models::ad::{AdOffer, AdOfferParameterLink, AdParameter, AdProposal, CurrentProposal};
use crate::domain::models::common::EventProvenance;
use crate::domain::models::fee::{EpochCurrencyRevenue, FeeParamsForContract};
use crate::domain::models::marketplace::{
    MarketplaceBid, MarketplaceDirectBuy, MarketplaceListing, MarketplaceOffer, RevenueTransaction,
};
use crate::domain::models::metadata::{AdOfferMetadata, CreatorMetadata, TokenMetadata};
use crate::domain::models::nft::{NftContract, NftPrice, Token, TokenPrice};

/// Lifecycle family an entity kind belongs to; the store applies different
/// write rules per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFamily {
    /// Append-only, one row per on-chain log
    Event,
    /// Long-lived aggregate updated incrementally, height-checked
    Derived,
    /// Join row toggled on/off, never physically deleted
    Link,
    /// Off-chain document, applied late and height-exempt
    Metadata,
}

/// Every entity kind the store knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    AdOffer,
    AdParameter,
    AdOfferParameterLink,
    AdProposal,
    CurrentProposal,
    NftContract,
    NftPrice,
    Token,
    TokenPrice,
    MarketplaceListing,
    MarketplaceBid,
    MarketplaceDirectBuy,
    MarketplaceOffer,
    RevenueTransaction,
    FeeParamsForContract,
    EpochCurrencyRevenue,
    AdOfferMetadata,
    CreatorMetadata,
    TokenMetadata,
    EventRecord,
}

impl EntityKind {
    pub fn family(&self) -> EntityFamily {
        match self {
            EntityKind::EventRecord => EntityFamily::Event,
            EntityKind::AdOfferParameterLink | EntityKind::CurrentProposal => EntityFamily::Link,
            EntityKind::AdOfferMetadata
            | EntityKind::CreatorMetadata
            | EntityKind::TokenMetadata => EntityFamily::Metadata,
            _ => EntityFamily::Derived,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Immutable record of one on-chain log: full provenance plus the decoded
/// kind-specific fields as they arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// `txHash-logIndex`
    pub id: String,
    pub kind: String,
    pub provenance: EventProvenance,
    pub payload: Value,
    /// Relation keys this record is discoverable under
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<(String, String)>,
}

/// A materialized entity of any kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity")]
pub enum EntityRecord {
    AdOffer(AdOffer),
    AdParameter(AdParameter),
    AdOfferParameterLink(AdOfferParameterLink),
    AdProposal(AdProposal),
    CurrentProposal(CurrentProposal),
    NftContract(NftContract),
    NftPrice(NftPrice),
    Token(Token),
    TokenPrice(TokenPrice),
    MarketplaceListing(MarketplaceListing),
    MarketplaceBid(MarketplaceBid),
    MarketplaceDirectBuy(MarketplaceDirectBuy),
    MarketplaceOffer(MarketplaceOffer),
    RevenueTransaction(RevenueTransaction),
    FeeParamsForContract(FeeParamsForContract),
    EpochCurrencyRevenue(EpochCurrencyRevenue),
    AdOfferMetadata(AdOfferMetadata),
    CreatorMetadata(CreatorMetadata),
    TokenMetadata(TokenMetadata),
    Event(EventRecord),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::AdOffer(_) => EntityKind::AdOffer,
            EntityRecord::AdParameter(_) => EntityKind::AdParameter,
            EntityRecord::AdOfferParameterLink(_) => EntityKind::AdOfferParameterLink,
            EntityRecord::AdProposal(_) => EntityKind::AdProposal,
            EntityRecord::CurrentProposal(_) => EntityKind::CurrentProposal,
            EntityRecord::NftContract(_) => EntityKind::NftContract,
            EntityRecord::NftPrice(_) => EntityKind::NftPrice,
            EntityRecord::Token(_) => EntityKind::Token,
            EntityRecord::TokenPrice(_) => EntityKind::TokenPrice,
            EntityRecord::MarketplaceListing(_) => EntityKind::MarketplaceListing,
            EntityRecord::MarketplaceBid(_) => EntityKind::MarketplaceBid,
            EntityRecord::MarketplaceDirectBuy(_) => EntityKind::MarketplaceDirectBuy,
            EntityRecord::MarketplaceOffer(_) => EntityKind::MarketplaceOffer,
            EntityRecord::RevenueTransaction(_) => EntityKind::RevenueTransaction,
            EntityRecord::FeeParamsForContract(_) => EntityKind::FeeParamsForContract,
            EntityRecord::EpochCurrencyRevenue(_) => EntityKind::EpochCurrencyRevenue,
            EntityRecord::AdOfferMetadata(_) => EntityKind::AdOfferMetadata,
            EntityRecord::CreatorMetadata(_) => EntityKind::CreatorMetadata,
            EntityRecord::TokenMetadata(_) => EntityKind::TokenMetadata,
            EntityRecord::Event(_) => EntityKind::EventRecord,
        }
    }

    pub fn family(&self) -> EntityFamily {
        self.kind().family()
    }

    /// Primary id of the wrapped entity
    pub fn id(&self) -> String {
        match self {
            EntityRecord::AdOffer(e) => e.id.clone(),
            EntityRecord::AdParameter(e) => e.id.clone(),
            EntityRecord::AdOfferParameterLink(e) => e.id.clone(),
            EntityRecord::AdProposal(e) => e.id.clone(),
            EntityRecord::CurrentProposal(e) => e.id.clone(),
            EntityRecord::NftContract(e) => format!("{:#x}", e.id),
            EntityRecord::NftPrice(e) => e.id.clone(),
            EntityRecord::Token(e) => e.id.clone(),
            EntityRecord::TokenPrice(e) => e.id.clone(),
            EntityRecord::MarketplaceListing(e) => e.id.clone(),
            EntityRecord::MarketplaceBid(e) => e.id.clone(),
            EntityRecord::MarketplaceDirectBuy(e) => e.id.clone(),
            EntityRecord::MarketplaceOffer(e) => e.id.clone(),
            EntityRecord::RevenueTransaction(e) => e.id.clone(),
            EntityRecord::FeeParamsForContract(e) => format!("{:#x}", e.id),
            EntityRecord::EpochCurrencyRevenue(e) => e.id.clone(),
            EntityRecord::AdOfferMetadata(e) => e.id.clone(),
            EntityRecord::CreatorMetadata(e) => format!("{:#x}", e.id),
            EntityRecord::TokenMetadata(e) => e.id.clone(),
            EntityRecord::Event(e) => e.id.clone(),
        }
    }

    /// Stamp the last-update timestamp on entities that track one. The store
    /// calls this on every successful derived-family write.
    pub fn touch(&mut self, timestamp: u64) {
        match self {
            EntityRecord::AdOffer(e) => e.last_update_timestamp = timestamp,
            EntityRecord::AdProposal(e) => e.last_update_timestamp = timestamp,
            EntityRecord::NftContract(e) => e.last_update_timestamp = timestamp,
            EntityRecord::Token(e) => e.last_update_timestamp = timestamp,
            EntityRecord::MarketplaceListing(e) => e.last_update_timestamp = timestamp,
            EntityRecord::MarketplaceBid(e) => e.last_update_timestamp = timestamp,
            EntityRecord::MarketplaceOffer(e) => e.last_update_timestamp = timestamp,
            EntityRecord::FeeParamsForContract(e) => e.last_update_timestamp = timestamp,
            _ => {}
        }
    }

    /// (relation, key) pairs this record is indexed under for reverse
    /// traversal; the relation name matches the foreign-key field.
    pub fn relations(&self) -> Vec<(String, String)> {
        fn rel(name: &str, key: impl Into<String>) -> (String, String) {
            (name.to_string(), key.into())
        }

        match self {
            EntityRecord::AdOffer(e) => vec![rel("nftContract", format!("{:#x}", e.nft_contract))],
            EntityRecord::AdParameter(_) => vec![],
            EntityRecord::AdOfferParameterLink(e) => vec![
                rel("adOffer", e.ad_offer.clone()),
                rel("adParameter", e.ad_parameter.clone()),
            ],
            EntityRecord::AdProposal(e) => vec![
                rel("adOffer", e.ad_offer.clone()),
                rel("token", e.token.clone()),
                rel("adParameter", e.ad_parameter.clone()),
            ],
            EntityRecord::CurrentProposal(e) => vec![
                rel("adOffer", e.ad_offer.clone()),
                rel("token", e.token.clone()),
                rel("adParameter", e.ad_parameter.clone()),
            ],
            EntityRecord::NftContract(_) => vec![],
            EntityRecord::NftPrice(e) => vec![rel("nftContract", format!("{:#x}", e.nft_contract))],
            EntityRecord::Token(e) => vec![rel("nftContract", format!("{:#x}", e.nft_contract))],
            EntityRecord::TokenPrice(e) => vec![rel("token", e.token.clone())],
            EntityRecord::MarketplaceListing(e) => vec![rel("token", e.token.clone())],
            EntityRecord::MarketplaceBid(e) => {
                let mut rels = vec![rel("listing", e.listing.clone())];
                if let Some(rt) = &e.revenue_transaction {
                    rels.push(rel("revenueTransaction", rt.clone()));
                }
                rels
            }
            EntityRecord::MarketplaceDirectBuy(e) => vec![
                rel("listing", e.listing.clone()),
                rel("revenueTransaction", e.revenue_transaction.clone()),
            ],
            EntityRecord::MarketplaceOffer(e) => {
                let mut rels = vec![rel("token", e.token.clone())];
                if let Some(rt) = &e.revenue_transaction {
                    rels.push(rel("revenueTransaction", rt.clone()));
                }
                rels
            }
            EntityRecord::RevenueTransaction(_) => vec![],
            EntityRecord::FeeParamsForContract(_) => vec![],
            EntityRecord::EpochCurrencyRevenue(e) => {
                vec![rel("currency", format!("{:#x}", e.currency))]
            }
            EntityRecord::AdOfferMetadata(e) => vec![rel("offer", e.id.clone())],
            EntityRecord::CreatorMetadata(_) => vec![],
            EntityRecord::TokenMetadata(_) => vec![],
            EntityRecord::Event(e) => e.relations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::common::AdProposalStatus;

    #[test]
    fn families_follow_lifecycle_rules() {
        assert_eq!(EntityKind::EventRecord.family(), EntityFamily::Event);
        assert_eq!(EntityKind::CurrentProposal.family(), EntityFamily::Link);
        assert_eq!(EntityKind::TokenMetadata.family(), EntityFamily::Metadata);
        assert_eq!(EntityKind::MarketplaceBid.family(), EntityFamily::Derived);
    }

    #[test]
    fn touch_updates_derived_timestamp() {
        let mut record = EntityRecord::AdProposal(AdProposal {
            id: "1".into(),
            ad_offer: "1".into(),
            token: "0xab-1".into(),
            ad_parameter: "imageURL".into(),
            status: AdProposalStatus::CurrentPending,
            data: "ipfs://x".into(),
            reject_reason: None,
            creation_timestamp: 10,
            last_update_timestamp: 10,
        });
        record.touch(99);
        match record {
            EntityRecord::AdProposal(p) => assert_eq!(p.last_update_timestamp, 99),
            _ => unreachable!(),
        }
    }
}
