//! Reducers for the NFT factory and the NFT contracts it deploys: contract
//! announcements, mints, transfers, pricing, allow-list toggles, royalties
//! and tenancy updates.

use alloy_primitives::{Address, U256};

use crate::application::ingest::reducers::fetch;
use crate::domain::errors::ReduceError;
use crate::domain::models::common::{nft_price_id, token_price_id};
use crate::domain::models::{
    ChainEvent, EntityRecord, EventPayload, NftContract, NftPrice, RoyaltyInfo, TokenPrice,
};
use crate::infrastructure::store::EntityStore;

pub fn reduce(store: &EntityStore, event: &ChainEvent) -> Result<Vec<EntityRecord>, ReduceError> {
    let ts = event.provenance.block_timestamp;
    let emitter = event.provenance.emitter;
    match &event.payload {
        EventPayload::NewNftContract {
            contract_addr,
            owner,
            name,
            symbol,
            base_uri,
            contract_uri,
            max_supply,
            minter,
            forwarder,
            royalty_bps,
            currencies,
            prices,
            allowed_token_ids,
        } => Ok(new_nft_contract(
            store,
            ts,
            contract_addr,
            owner,
            name,
            symbol,
            base_uri,
            contract_uri,
            max_supply,
            minter,
            forwarder,
            royalty_bps,
            currencies,
            prices,
            allowed_token_ids,
        )),
        EventPayload::Mint {
            token_id, to, ..
        } => Ok(mint(store, event, token_id, to)),
        EventPayload::Transfer { to, token_id, .. } => Ok(transfer(store, ts, &emitter, token_id, to)),
        EventPayload::TokensAllowlist { allowed } => Ok(set_allow_list(store, &emitter, *allowed, ts)),
        EventPayload::TokensAllowlistUpdated { token_id, allowed } => {
            Ok(allow_list_token(store, ts, &emitter, token_id, *allowed))
        }
        EventPayload::RoyaltiesSet { receiver, bps } => {
            Ok(set_royalties(store, ts, &emitter, receiver, bps))
        }
        EventPayload::UpdateDefaultMintPrice {
            currency,
            enabled,
            amount,
        } => Ok(vec![EntityRecord::NftPrice(NftPrice {
            id: nft_price_id(&emitter, currency),
            currency: *currency,
            amount: *amount,
            enabled: *enabled,
            nft_contract: emitter,
        })]),
        EventPayload::UpdateMintPrice {
            token_id,
            currency,
            enabled,
            amount,
        } => Ok(update_mint_price(store, ts, &emitter, token_id, currency, *enabled, amount)),
        // Pure event records: nothing derived changes shape
        EventPayload::Approval { .. }
        | EventPayload::ApprovalForAll { .. }
        | EventPayload::ContractUriUpdated { .. }
        | EventPayload::Initialized { .. }
        | EventPayload::UpdateUser { .. } => Ok(vec![]),
        other => Err(ReduceError::UnhandledEventKind {
            kind: other.kind_name().to_string(),
        }),
    }
}

/// Factory announcement: the authoritative row for the contract, plus its
/// default price list.
#[allow(clippy::too_many_arguments)]
fn new_nft_contract(
    store: &EntityStore,
    ts: u64,
    contract_addr: &Address,
    owner: &Address,
    name: &str,
    symbol: &str,
    base_uri: &str,
    contract_uri: &str,
    max_supply: &U256,
    minter: &Address,
    forwarder: &Address,
    royalty_bps: &U256,
    currencies: &[Address],
    prices: &[U256],
    allowed_token_ids: &[U256],
) -> Vec<EntityRecord> {
    let mut upserts = vec![EntityRecord::NftContract(NftContract {
        id: *contract_addr,
        name: Some(name.to_string()),
        symbol: Some(symbol.to_string()),
        base_uri: Some(base_uri.to_string()),
        contract_uri: Some(contract_uri.to_string()),
        max_supply: Some(*max_supply),
        minter: Some(*minter),
        forwarder: Some(*forwarder),
        owner: Some(*owner),
        royalty: Some(RoyaltyInfo {
            receiver: *owner,
            bps: *royalty_bps,
        }),
        allow_list: !allowed_token_ids.is_empty(),
        last_update_timestamp: ts,
    })];

    for (currency, amount) in currencies.iter().zip(prices.iter()) {
        upserts.push(EntityRecord::NftPrice(NftPrice {
            id: nft_price_id(contract_addr, currency),
            currency: *currency,
            amount: *amount,
            enabled: true,
            nft_contract: *contract_addr,
        }));
    }
    for token_id in allowed_token_ids {
        let mut token = fetch::token_or_new(store, contract_addr, token_id, ts);
        token.set_in_allow_list = true;
        upserts.push(EntityRecord::Token(token));
    }
    upserts
}

/// A token is minted: the token row gets its mint pointer and first owner,
/// and the mint joins the transaction's revenue group. Later mints of the
/// same token (fungible token types) keep the original pointer.
fn mint(
    store: &EntityStore,
    event: &ChainEvent,
    token_id: &U256,
    to: &Address,
) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let emitter = event.provenance.emitter;
    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, &emitter, ts) {
        upserts.push(stub);
    }

    let mut token = fetch::token_or_new(store, &emitter, token_id, ts);
    if token.mint.is_none() {
        token.mint = Some(event.provenance.record_id());
    }
    token.owner = Some(*to);
    upserts.push(EntityRecord::Token(token));
    upserts.push(fetch::revenue_transaction(
        event.provenance.revenue_transaction_id(),
        ts,
    ));
    upserts
}

/// Ownership move. A transfer for a token with no mint on record still
/// creates the token row; its mint pointer stays dangling until the mint
/// arrives.
fn transfer(
    store: &EntityStore,
    ts: u64,
    contract: &Address,
    token_id: &U256,
    to: &Address,
) -> Vec<EntityRecord> {
    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, contract, ts) {
        upserts.push(stub);
    }
    let mut token = fetch::token_or_new(store, contract, token_id, ts);
    token.owner = Some(*to);
    upserts.push(EntityRecord::Token(token));
    upserts
}

fn set_allow_list(
    store: &EntityStore,
    contract: &Address,
    allowed: bool,
    ts: u64,
) -> Vec<EntityRecord> {
    let mut record = fetch::nft_contract(store, contract)
        .unwrap_or_else(|| NftContract::stub(*contract, ts));
    record.allow_list = allowed;
    vec![EntityRecord::NftContract(record)]
}

fn allow_list_token(
    store: &EntityStore,
    ts: u64,
    contract: &Address,
    token_id: &U256,
    allowed: bool,
) -> Vec<EntityRecord> {
    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, contract, ts) {
        upserts.push(stub);
    }
    let mut token = fetch::token_or_new(store, contract, token_id, ts);
    token.set_in_allow_list = allowed;
    upserts.push(EntityRecord::Token(token));
    upserts
}

fn set_royalties(
    store: &EntityStore,
    ts: u64,
    contract: &Address,
    receiver: &Address,
    bps: &U256,
) -> Vec<EntityRecord> {
    let mut record = fetch::nft_contract(store, contract)
        .unwrap_or_else(|| NftContract::stub(*contract, ts));
    record.royalty = Some(RoyaltyInfo {
        receiver: *receiver,
        bps: *bps,
    });
    vec![EntityRecord::NftContract(record)]
}

fn update_mint_price(
    store: &EntityStore,
    ts: u64,
    contract: &Address,
    token_id: &U256,
    currency: &Address,
    enabled: bool,
    amount: &U256,
) -> Vec<EntityRecord> {
    let token = fetch::token_or_new(store, contract, token_id, ts);
    let token_entity = token.id.clone();
    vec![
        EntityRecord::Token(token),
        EntityRecord::TokenPrice(TokenPrice {
            id: token_price_id(contract, token_id, currency),
            currency: *currency,
            amount: *amount,
            enabled,
            token: token_entity,
        }),
    ]
}
