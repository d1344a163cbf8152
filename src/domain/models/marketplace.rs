use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::domain::models::common::{FeeDistribution, ListingType, Status, TokenType, TransferType};

/// A direct-sale or auction listing of a token (sale or rental)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceListing {
    pub id: String,
    /// Marketplace contract the listing lives on
    pub origin: Address,
    pub listing_type: ListingType,
    pub lister: Address,
    /// Token entity id (`contract-tokenId`)
    pub token: String,
    pub start_time: u64,
    pub end_time: u64,
    pub quantity: U256,
    pub currency: Address,
    pub reserve_price_per_token: U256,
    pub buyout_price_per_token: U256,
    pub token_type: TokenType,
    pub transfer_type: TransferType,
    pub rental_expiration_timestamp: u64,
    pub status: Status,
    pub creation_timestamp: u64,
    pub last_update_timestamp: u64,
    /// Winning bid once an auction closes successfully
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_bid: Option<String>,
}

/// A bid on an auction listing. A newer higher bid cancels the previous one
/// and records its refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceBid {
    pub id: String,
    pub listing: String,
    pub bidder: Address,
    pub quantity: U256,
    pub new_price_per_token: U256,
    pub total_bid_amount: U256,
    pub paid_bid_amount: U256,
    pub refund_bonus: U256,
    pub refund_profit: U256,
    pub currency: Address,
    pub status: Status,
    pub creation_tx_hash: B256,
    /// Set when the bid wins and value actually moves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_transaction: Option<String>,
    pub creation_timestamp: u64,
    pub last_update_timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<FeeDistribution>,
}

/// A completed direct buy of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceDirectBuy {
    pub id: String,
    pub listing: String,
    pub buyer: Address,
    pub quantity_bought: U256,
    pub total_price_paid: U256,
    /// Required financial link; resolution failure is fatal for callers
    pub revenue_transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<FeeDistribution>,
}

/// A buy-side offer on a token, outside any listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOffer {
    pub id: String,
    pub origin: Address,
    pub offeror: Address,
    pub token: String,
    pub quantity: U256,
    pub currency: Address,
    pub total_price: U256,
    pub token_type: TokenType,
    pub transfer_type: TransferType,
    pub expiration_timestamp: u64,
    pub rental_expiration_timestamp: u64,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_transaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_additional_information: Option<String>,
    pub creation_timestamp: u64,
    pub last_update_timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<FeeDistribution>,
}

/// Groups every value-moving row of one transaction. Bids, buys, offers,
/// mints and protocol fees point back at it by transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueTransaction {
    /// Transaction hash as hex
    pub id: String,
    pub block_timestamp: u64,
}
