use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Royalty terms set on an NFT contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyInfo {
    pub receiver: Address,
    pub bps: U256,
}

/// An NFT contract deployed through the factory. Fields other than `id` and
/// `allow_list` arrive incrementally from later events and metadata fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftContract {
    /// Contract address
    pub id: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "baseURI", skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
    #[serde(rename = "contractURI", skip_serializing_if = "Option::is_none")]
    pub contract_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minter: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarder: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub royalty: Option<RoyaltyInfo>,
    /// Whether minting is restricted to allow-listed token ids
    pub allow_list: bool,
    pub last_update_timestamp: u64,
}

impl NftContract {
    /// A contract known only by address, before its factory event is seen
    pub fn stub(address: Address, timestamp: u64) -> Self {
        Self {
            id: address,
            name: None,
            symbol: None,
            base_uri: None,
            contract_uri: None,
            max_supply: None,
            minter: None,
            forwarder: None,
            owner: None,
            royalty: None,
            allow_list: false,
            last_update_timestamp: timestamp,
        }
    }
}

/// Default mint price of a contract in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftPrice {
    pub id: String,
    pub currency: Address,
    pub amount: U256,
    pub enabled: bool,
    pub nft_contract: Address,
}

/// One token of an NFT contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// `contract-tokenId`
    pub id: String,
    pub nft_contract: Address,
    pub token_id: U256,
    pub set_in_allow_list: bool,
    /// Record id of the mint event, once seen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint: Option<String>,
    /// Current holder, tracked from transfer events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    pub last_update_timestamp: u64,
}

/// Mint price override for one token in one currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrice {
    pub id: String,
    pub currency: Address,
    pub amount: U256,
    pub enabled: bool,
    pub token: String,
}
