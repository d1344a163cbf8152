use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::domain::models::common::AdProposalStatus;

/// A sponsorship offer: a set of ad slots an NFT contract's token holders
/// may submit content proposals against.
///
/// Back-references (`allProposals`, `currentProposals`, parameter links) are
/// served from the store's relation index, never embedded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdOffer {
    pub id: String,
    /// Contract the offer lives on
    pub origin: Address,
    pub disable: bool,
    pub name: String,
    #[serde(rename = "metadataURL")]
    pub metadata_url: String,
    /// Foreign key to the NFT contract backing the offer
    pub nft_contract: Address,
    pub initial_creator: Address,
    pub creation_timestamp: u64,
    pub last_update_timestamp: u64,
    pub admins: Vec<Address>,
    pub validators: Vec<Address>,
}

/// An ad slot definition, e.g. `imageURL-350x50`: a base kind plus variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdParameter {
    pub id: String,
    pub base: String,
    pub variants: Vec<String>,
}

impl AdParameter {
    /// Parameter ids encode base and variants separated by dashes
    pub fn from_id(id: &str) -> Self {
        let mut parts = id.split('-');
        let base = parts.next().unwrap_or_default().to_string();
        let variants = parts.map(str::to_string).collect();
        Self {
            id: id.to_string(),
            base,
            variants,
        }
    }
}

/// Many-to-many link between an offer and an ad parameter. Disabling is a
/// logical delete: the row stays for auditability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdOfferParameterLink {
    pub id: String,
    pub enable: bool,
    pub ad_offer: String,
    pub ad_parameter: String,
}

/// A creator-submitted content proposal for one (offer, token, parameter)
/// slot, moving through pending/accepted/rejected buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdProposal {
    pub id: String,
    pub ad_offer: String,
    /// Token entity id (`contract-tokenId`)
    pub token: String,
    pub ad_parameter: String,
    pub status: AdProposalStatus,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    pub creation_timestamp: u64,
    pub last_update_timestamp: u64,
}

/// The slot row for one (offer, token, parameter) triple, pointing at the
/// proposals currently occupying each outcome. At most one of
/// `pending_proposal`/`accepted_proposal` is set at any time; the rejected
/// slot records history and is never cleared by a new submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProposal {
    pub id: String,
    pub ad_offer: String,
    pub token: String,
    pub ad_parameter: String,
    pub pending_proposal: Option<String>,
    pub accepted_proposal: Option<String>,
    pub rejected_proposal: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ad_parameter_id_splits_into_base_and_variants() {
        let p = AdParameter::from_id("imageURL-350x50");
        assert_eq!(p.base, "imageURL");
        assert_eq!(p.variants, vec!["350x50".to_string()]);

        let p = AdParameter::from_id("linkURL");
        assert_eq!(p.base, "linkURL");
        assert!(p.variants.is_empty());
    }
}
