use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Where an event came from on chain. Every ingested event carries one, and
/// every immutable event record keeps it for replay/debugging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProvenance {
    /// Block the log was emitted in
    pub block_number: u64,
    /// Block timestamp in unix seconds
    pub block_timestamp: u64,
    /// Hash of the transaction that emitted the log
    pub transaction_hash: B256,
    /// Position of the log within the block
    pub log_index: u64,
    /// Contract that emitted the log
    pub emitter: Address,
    /// Sender of the transaction
    pub tx_sender: Address,
}

impl EventProvenance {
    /// Ordering key events must be applied in (non-decreasing)
    pub fn ordering_key(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }

    /// Deterministic id for the immutable record of this log
    pub fn record_id(&self) -> String {
        format!("{:#x}-{}", self.transaction_hash, self.log_index)
    }

    /// Id of the revenue transaction grouping all value transfers of this tx
    pub fn revenue_transaction_id(&self) -> String {
        format!("{:#x}", self.transaction_hash)
    }
}

/// Lifecycle of listings, bids and offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Unset,
    Created,
    Completed,
    Cancelled,
}

/// Current-vs-previous bucket of an ad proposal for its sponsorship slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdProposalStatus {
    CurrentAccepted,
    CurrentPending,
    CurrentRejected,
    PrevAccepted,
    PrevPending,
    PrevRejected,
}

impl AdProposalStatus {
    /// Whether this proposal still occupies a `CURRENT_*` bucket
    pub fn is_current(&self) -> bool {
        matches!(
            self,
            AdProposalStatus::CurrentAccepted
                | AdProposalStatus::CurrentPending
                | AdProposalStatus::CurrentRejected
        )
    }

    /// The `PREV_*` bucket this status demotes into
    pub fn demoted(&self) -> AdProposalStatus {
        match self {
            AdProposalStatus::CurrentAccepted => AdProposalStatus::PrevAccepted,
            AdProposalStatus::CurrentPending => AdProposalStatus::PrevPending,
            AdProposalStatus::CurrentRejected => AdProposalStatus::PrevRejected,
            other => *other,
        }
    }
}

/// How the protocol fee was taken relative to the quoted amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeeMethodology {
    AddedToAmount,
    CutToAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    Direct,
    Auction,
}

impl ListingType {
    /// Decode the numeric enum the marketplace contract emits
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ListingType::Direct),
            1 => Some(ListingType::Auction),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "ERC1155")]
    Erc1155,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC20")]
    Erc20,
}

impl TokenType {
    /// Decode the numeric enum the marketplace contract emits
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TokenType::Erc1155),
            1 => Some(TokenType::Erc721),
            2 => Some(TokenType::Erc20),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferType {
    Rent,
    Sale,
}

impl TransferType {
    /// Decode the numeric enum the marketplace contract emits
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TransferType::Rent),
            1 => Some(TransferType::Sale),
            _ => None,
        }
    }
}

/// Split of a sale amount between protocol, seller and creator.
///
/// The schema attaches these as loose optional fields; they are only ever
/// populated together, so they live in one struct and producers state the
/// methodology explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeDistribution {
    pub methodology: FeeMethodology,
    pub amount_sent_to_protocol: U256,
    pub protocol_recipient: Address,
    pub amount_sent_to_seller: U256,
    pub seller_recipient: Address,
    pub amount_sent_to_creator: U256,
    pub creator_recipient: Address,
}

/// Deterministic id for a token within an NFT contract
pub fn token_entity_id(contract: &Address, token_id: &U256) -> String {
    format!("{:#x}-{}", contract, token_id)
}

/// Deterministic id for a default mint price row of an NFT contract
pub fn nft_price_id(contract: &Address, currency: &Address) -> String {
    format!("{:#x}-{:#x}", contract, currency)
}

/// Deterministic id for a per-token mint price row
pub fn token_price_id(contract: &Address, token_id: &U256, currency: &Address) -> String {
    format!("{:#x}-{}-{:#x}", contract, token_id, currency)
}

/// Deterministic id for the (offer, parameter) link row
pub fn offer_parameter_link_id(offer_id: &U256, ad_parameter: &str) -> String {
    format!("{}-{}", offer_id, ad_parameter)
}

/// Deterministic id for the sponsorship slot of (offer, token, parameter)
pub fn current_proposal_id(offer_id: &U256, token_id: &U256, ad_parameter: &str) -> String {
    format!("{}-{}-{}", offer_id, token_id, ad_parameter)
}

/// Deterministic id for an epoch revenue bucket
pub fn epoch_currency_revenue_id(year: i32, month: u32, currency: &Address) -> String {
    format!("{}-{}-{:#x}", year, month, currency)
}
