use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::domain::models::common::EventProvenance;

/// One decoded contract log, as delivered by the event log source.
///
/// Serialized form is a flat JSON object: provenance fields alongside a
/// `kind` discriminator and the kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEvent {
    #[serde(flatten)]
    pub provenance: EventProvenance,
    #[serde(flatten)]
    pub payload: EventPayload,
}

/// Kind-specific fields of a decoded log. Kinds not listed here deserialize
/// to `Unknown` and fail ingestion rather than being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventPayload {
    // Sponsorship admin contract
    #[serde(rename_all = "camelCase")]
    UpdateAdProposal {
        offer_id: U256,
        token_id: U256,
        proposal_id: U256,
        ad_parameter: String,
        data: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateAdValidation {
        offer_id: U256,
        token_id: U256,
        proposal_id: U256,
        ad_parameter: String,
        validated: bool,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateOffer {
        offer_id: U256,
        disable: bool,
        name: String,
        offer_metadata: String,
        nft_contract: Address,
    },
    #[serde(rename_all = "camelCase")]
    UpdateOfferAdParameter {
        offer_id: U256,
        ad_parameter: String,
        enable: bool,
    },
    #[serde(rename_all = "camelCase")]
    UpdateOfferAdmin {
        offer_id: U256,
        admin: Address,
        enable: bool,
    },
    #[serde(rename_all = "camelCase")]
    UpdateOfferValidator {
        offer_id: U256,
        validator: Address,
        enable: bool,
    },

    // Protocol fee + ownership, emitted by several contracts
    #[serde(rename_all = "camelCase")]
    CallWithProtocolFee {
        target: Address,
        currency: Address,
        fee: U256,
        enabler: Address,
        spender: Address,
        referral_additional_information: String,
        #[serde(default)]
        referral_addresses: Vec<Address>,
    },
    #[serde(rename_all = "camelCase")]
    FeeUpdate {
        fee_recipient: Address,
        fee_bps: U256,
    },
    #[serde(rename_all = "camelCase")]
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },

    // NFT factory
    #[serde(rename_all = "camelCase")]
    NewNftContract {
        contract_addr: Address,
        owner: Address,
        name: String,
        symbol: String,
        #[serde(rename = "baseURI")]
        base_uri: String,
        #[serde(rename = "contractURI")]
        contract_uri: String,
        max_supply: U256,
        minter: Address,
        forwarder: Address,
        royalty_bps: U256,
        #[serde(default)]
        currencies: Vec<Address>,
        #[serde(default)]
        prices: Vec<U256>,
        #[serde(default)]
        allowed_token_ids: Vec<U256>,
    },

    // NFT contract
    #[serde(rename_all = "camelCase")]
    Approval {
        owner: Address,
        approved: Address,
        token_id: U256,
    },
    #[serde(rename_all = "camelCase")]
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    #[serde(rename_all = "camelCase")]
    ContractUriUpdated {},
    #[serde(rename_all = "camelCase")]
    Initialized { version: u64 },
    #[serde(rename_all = "camelCase")]
    Mint {
        token_id: U256,
        from: Address,
        to: Address,
        currency: Address,
        amount: U256,
        token_data: String,
    },
    #[serde(rename_all = "camelCase")]
    RoyaltiesSet {
        receiver: Address,
        bps: U256,
    },
    #[serde(rename_all = "camelCase")]
    TokensAllowlist { allowed: bool },
    #[serde(rename_all = "camelCase")]
    TokensAllowlistUpdated {
        token_id: U256,
        allowed: bool,
    },
    #[serde(rename_all = "camelCase")]
    Transfer {
        from: Address,
        to: Address,
        token_id: U256,
    },
    #[serde(rename_all = "camelCase")]
    UpdateDefaultMintPrice {
        currency: Address,
        enabled: bool,
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    UpdateMintPrice {
        token_id: U256,
        currency: Address,
        enabled: bool,
        amount: U256,
    },
    #[serde(rename_all = "camelCase")]
    UpdateUser {
        token_id: U256,
        user: Address,
        expires: u64,
    },

    // Marketplace contract
    #[serde(rename_all = "camelCase")]
    ListingAdded {
        listing_id: U256,
        asset_contract: Address,
        lister: Address,
        token_id: U256,
        start_time: u64,
        end_time: u64,
        quantity: U256,
        currency: Address,
        reserve_price_per_token: U256,
        buyout_price_per_token: U256,
        token_type: u8,
        transfer_type: u8,
        rental_expiration_timestamp: u64,
        listing_type: u8,
    },
    #[serde(rename_all = "camelCase")]
    ListingUpdated {
        listing_id: U256,
        quantity_to_list: U256,
        reserve_price_per_token: U256,
        buyout_price_per_token: U256,
        currency_to_accept: Address,
        start_time: u64,
        seconds_until_end_time: u64,
        rental_expiration_timestamp: u64,
    },
    #[serde(rename_all = "camelCase")]
    ListingRemoved { listing_id: U256 },
    #[serde(rename_all = "camelCase")]
    NewBid {
        listing_id: U256,
        quantity_wanted: U256,
        new_bidder: Address,
        new_price_per_token: U256,
        #[serde(default)]
        previous_bidder: Option<Address>,
        refund_bonus: U256,
        currency: Address,
        new_end_time: u64,
    },
    #[serde(rename_all = "camelCase")]
    AuctionClosed {
        listing_id: U256,
        closer: Address,
        cancelled: bool,
        auction_creator: Address,
        #[serde(default)]
        winning_bidder: Option<Address>,
    },
    #[serde(rename_all = "camelCase")]
    NewSale {
        listing_id: U256,
        asset_contract: Address,
        token_id: U256,
        buyer: Address,
        quantity_bought: U256,
        total_price_paid: U256,
    },
    #[serde(rename_all = "camelCase")]
    NewOffer {
        offeror: Address,
        offer_id: U256,
        asset_contract: Address,
        token_id: U256,
        quantity: U256,
        currency: Address,
        total_price: U256,
        token_type: u8,
        transfer_type: u8,
        expiration_timestamp: u64,
        rental_expiration_timestamp: u64,
        #[serde(default)]
        referral_additional_information: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AcceptedOffer {
        offeror: Address,
        offer_id: U256,
        asset_contract: Address,
        token_id: U256,
        seller: Address,
        quantity_bought: U256,
        total_price_paid: U256,
    },
    #[serde(rename_all = "camelCase")]
    CancelledOffer {
        offeror: Address,
        offer_id: U256,
    },

    /// Any kind this build does not know how to reduce
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    /// Name of the event kind, as used in serialized form and error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            EventPayload::UpdateAdProposal { .. } => "UpdateAdProposal",
            EventPayload::UpdateAdValidation { .. } => "UpdateAdValidation",
            EventPayload::UpdateOffer { .. } => "UpdateOffer",
            EventPayload::UpdateOfferAdParameter { .. } => "UpdateOfferAdParameter",
            EventPayload::UpdateOfferAdmin { .. } => "UpdateOfferAdmin",
            EventPayload::UpdateOfferValidator { .. } => "UpdateOfferValidator",
            EventPayload::CallWithProtocolFee { .. } => "CallWithProtocolFee",
            EventPayload::FeeUpdate { .. } => "FeeUpdate",
            EventPayload::OwnershipTransferred { .. } => "OwnershipTransferred",
            EventPayload::NewNftContract { .. } => "NewNftContract",
            EventPayload::Approval { .. } => "Approval",
            EventPayload::ApprovalForAll { .. } => "ApprovalForAll",
            EventPayload::ContractUriUpdated { .. } => "ContractUriUpdated",
            EventPayload::Initialized { .. } => "Initialized",
            EventPayload::Mint { .. } => "Mint",
            EventPayload::RoyaltiesSet { .. } => "RoyaltiesSet",
            EventPayload::TokensAllowlist { .. } => "TokensAllowlist",
            EventPayload::TokensAllowlistUpdated { .. } => "TokensAllowlistUpdated",
            EventPayload::Transfer { .. } => "Transfer",
            EventPayload::UpdateDefaultMintPrice { .. } => "UpdateDefaultMintPrice",
            EventPayload::UpdateMintPrice { .. } => "UpdateMintPrice",
            EventPayload::UpdateUser { .. } => "UpdateUser",
            EventPayload::ListingAdded { .. } => "ListingAdded",
            EventPayload::ListingUpdated { .. } => "ListingUpdated",
            EventPayload::ListingRemoved { .. } => "ListingRemoved",
            EventPayload::NewBid { .. } => "NewBid",
            EventPayload::AuctionClosed { .. } => "AuctionClosed",
            EventPayload::NewSale { .. } => "NewSale",
            EventPayload::NewOffer { .. } => "NewOffer",
            EventPayload::AcceptedOffer { .. } => "AcceptedOffer",
            EventPayload::CancelledOffer { .. } => "CancelledOffer",
            EventPayload::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn flat_json_round_trips() {
        let event = ChainEvent {
            provenance: EventProvenance {
                block_number: 12,
                block_timestamp: 1_700_000_000,
                transaction_hash: b256!(
                    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
                ),
                log_index: 3,
                emitter: address!("00000000000000000000000000000000000000aa"),
                tx_sender: address!("00000000000000000000000000000000000000cc"),
            },
            payload: EventPayload::Transfer {
                from: Address::ZERO,
                to: address!("00000000000000000000000000000000000000bb"),
                token_id: U256::from(7u64),
            },
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"Transfer\""));
        assert!(json.contains("\"blockNumber\":12"));

        let back: ChainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn unrecognized_kind_becomes_unknown() {
        let json = r#"{
            "blockNumber": 1,
            "blockTimestamp": 1000,
            "transactionHash": "0x0101010101010101010101010101010101010101010101010101010101010101",
            "logIndex": 0,
            "emitter": "0x00000000000000000000000000000000000000aa",
            "txSender": "0x00000000000000000000000000000000000000cc",
            "kind": "SomethingNewerThanThisBuild"
        }"#;
        let event: ChainEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.payload, EventPayload::Unknown);
        assert_eq!(event.payload.kind_name(), "Unknown");
    }
}
