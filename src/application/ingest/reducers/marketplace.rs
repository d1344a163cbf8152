//! Reducers for the marketplace contract: listings, auction bids, direct
//! buys, and buy-side offers.

use alloy_primitives::{Address, U256};

use crate::application::ingest::reducers::fetch;
use crate::domain::errors::ReduceError;
use crate::domain::models::{
    ChainEvent, EntityRecord, EventPayload, ListingType, MarketplaceBid, MarketplaceDirectBuy,
    MarketplaceListing, MarketplaceOffer, Status, TokenType, TransferType,
};
use crate::infrastructure::store::EntityStore;
use crate::utils::logging;

pub fn reduce(store: &EntityStore, event: &ChainEvent) -> Result<Vec<EntityRecord>, ReduceError> {
    match &event.payload {
        EventPayload::ListingAdded { .. } => listing_added(store, event),
        EventPayload::ListingUpdated {
            listing_id,
            quantity_to_list,
            reserve_price_per_token,
            buyout_price_per_token,
            currency_to_accept,
            start_time,
            seconds_until_end_time,
            rental_expiration_timestamp,
        } => Ok(listing_updated(
            store,
            listing_id,
            quantity_to_list,
            reserve_price_per_token,
            buyout_price_per_token,
            currency_to_accept,
            *start_time,
            *seconds_until_end_time,
            *rental_expiration_timestamp,
        )),
        EventPayload::ListingRemoved { listing_id } => {
            Ok(set_listing_status(store, listing_id, Status::Cancelled))
        }
        EventPayload::NewBid {
            listing_id,
            quantity_wanted,
            new_bidder,
            new_price_per_token,
            refund_bonus,
            currency,
            new_end_time,
            ..
        } => Ok(new_bid(
            store,
            event,
            listing_id,
            quantity_wanted,
            new_bidder,
            new_price_per_token,
            refund_bonus,
            currency,
            *new_end_time,
        )),
        EventPayload::AuctionClosed {
            listing_id,
            cancelled,
            winning_bidder,
            ..
        } => Ok(auction_closed(store, event, listing_id, *cancelled, winning_bidder)),
        EventPayload::NewSale {
            listing_id,
            buyer,
            quantity_bought,
            total_price_paid,
            ..
        } => Ok(new_sale(
            store,
            event,
            listing_id,
            buyer,
            quantity_bought,
            total_price_paid,
        )),
        EventPayload::NewOffer { .. } => new_offer(store, event),
        EventPayload::AcceptedOffer {
            offer_id,
            ..
        } => Ok(accepted_offer(store, event, offer_id)),
        EventPayload::CancelledOffer { offer_id, .. } => {
            Ok(set_offer_status(store, offer_id, Status::Cancelled))
        }
        other => Err(ReduceError::UnhandledEventKind {
            kind: other.kind_name().to_string(),
        }),
    }
}

fn listing_added(store: &EntityStore, event: &ChainEvent) -> Result<Vec<EntityRecord>, ReduceError> {
    let EventPayload::ListingAdded {
        listing_id,
        asset_contract,
        lister,
        token_id,
        start_time,
        end_time,
        quantity,
        currency,
        reserve_price_per_token,
        buyout_price_per_token,
        token_type,
        transfer_type,
        rental_expiration_timestamp,
        listing_type,
    } = &event.payload
    else {
        unreachable!("dispatched on payload kind");
    };
    let ts = event.provenance.block_timestamp;

    let malformed = |field: &str, code: u8| ReduceError::MalformedEvent {
        kind: event.payload.kind_name().to_string(),
        message: format!("unknown {} code {}", field, code),
    };
    let token_type =
        TokenType::from_code(*token_type).ok_or_else(|| malformed("tokenType", *token_type))?;
    let transfer_type = TransferType::from_code(*transfer_type)
        .ok_or_else(|| malformed("transferType", *transfer_type))?;
    let listing_type = ListingType::from_code(*listing_type)
        .ok_or_else(|| malformed("listingType", *listing_type))?;

    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, asset_contract, ts) {
        upserts.push(stub);
    }
    let token = fetch::token_or_new(store, asset_contract, token_id, ts);
    let token_entity = token.id.clone();
    upserts.push(EntityRecord::Token(token));

    upserts.push(EntityRecord::MarketplaceListing(MarketplaceListing {
        id: listing_id.to_string(),
        origin: event.provenance.emitter,
        listing_type,
        lister: *lister,
        token: token_entity,
        start_time: *start_time,
        end_time: *end_time,
        quantity: *quantity,
        currency: *currency,
        reserve_price_per_token: *reserve_price_per_token,
        buyout_price_per_token: *buyout_price_per_token,
        token_type,
        transfer_type,
        rental_expiration_timestamp: *rental_expiration_timestamp,
        status: Status::Created,
        creation_timestamp: ts,
        last_update_timestamp: ts,
        completed_bid: None,
    }));
    Ok(upserts)
}

#[allow(clippy::too_many_arguments)]
fn listing_updated(
    store: &EntityStore,
    listing_id: &U256,
    quantity_to_list: &U256,
    reserve_price_per_token: &U256,
    buyout_price_per_token: &U256,
    currency_to_accept: &Address,
    start_time: u64,
    seconds_until_end_time: u64,
    rental_expiration_timestamp: u64,
) -> Vec<EntityRecord> {
    let Some(mut listing) = fetch::listing(store, &listing_id.to_string()) else {
        logging::log_warning(&format!(
            "Update for unknown listing {}; recording event only",
            listing_id
        ));
        return vec![];
    };
    listing.quantity = *quantity_to_list;
    listing.reserve_price_per_token = *reserve_price_per_token;
    listing.buyout_price_per_token = *buyout_price_per_token;
    listing.currency = *currency_to_accept;
    listing.start_time = start_time;
    listing.end_time = start_time + seconds_until_end_time;
    listing.rental_expiration_timestamp = rental_expiration_timestamp;
    vec![EntityRecord::MarketplaceListing(listing)]
}

fn set_listing_status(store: &EntityStore, listing_id: &U256, status: Status) -> Vec<EntityRecord> {
    let Some(mut listing) = fetch::listing(store, &listing_id.to_string()) else {
        logging::log_warning(&format!(
            "Status change for unknown listing {}; recording event only",
            listing_id
        ));
        return vec![];
    };
    listing.status = status;
    vec![EntityRecord::MarketplaceListing(listing)]
}

/// A higher bid arrives: the previous open bid is cancelled with its refund
/// recorded, the new bid opens, and the auction end time moves.
#[allow(clippy::too_many_arguments)]
fn new_bid(
    store: &EntityStore,
    event: &ChainEvent,
    listing_id: &U256,
    quantity_wanted: &U256,
    new_bidder: &Address,
    new_price_per_token: &U256,
    refund_bonus: &U256,
    currency: &Address,
    new_end_time: u64,
) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let Some(mut listing) = fetch::listing(store, &listing_id.to_string()) else {
        logging::log_warning(&format!(
            "Bid on unknown listing {}; recording event only",
            listing_id
        ));
        return vec![];
    };

    let mut upserts = Vec::new();
    for mut prior in fetch::open_bids(store, &listing.id) {
        prior.status = Status::Cancelled;
        prior.refund_bonus = *refund_bonus;
        prior.refund_profit = *refund_bonus;
        upserts.push(EntityRecord::MarketplaceBid(prior));
    }

    let total = *new_price_per_token * *quantity_wanted;
    upserts.push(EntityRecord::MarketplaceBid(MarketplaceBid {
        id: event.provenance.record_id(),
        listing: listing.id.clone(),
        bidder: *new_bidder,
        quantity: *quantity_wanted,
        new_price_per_token: *new_price_per_token,
        total_bid_amount: total,
        paid_bid_amount: total,
        refund_bonus: U256::ZERO,
        refund_profit: U256::ZERO,
        currency: *currency,
        status: Status::Created,
        creation_tx_hash: event.provenance.transaction_hash,
        revenue_transaction: None,
        creation_timestamp: ts,
        last_update_timestamp: ts,
        fee: None,
    }));

    listing.end_time = new_end_time;
    upserts.push(EntityRecord::MarketplaceListing(listing));
    upserts
}

/// Auction settles: the listing completes or cancels, and on success the
/// winner's open bid completes under the transaction's revenue group.
fn auction_closed(
    store: &EntityStore,
    event: &ChainEvent,
    listing_id: &U256,
    cancelled: bool,
    winning_bidder: &Option<Address>,
) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let Some(mut listing) = fetch::listing(store, &listing_id.to_string()) else {
        logging::log_warning(&format!(
            "Close of unknown listing {}; recording event only",
            listing_id
        ));
        return vec![];
    };

    let mut upserts = Vec::new();
    if cancelled {
        listing.status = Status::Cancelled;
    } else {
        listing.status = Status::Completed;
        upserts.push(fetch::revenue_transaction(
            event.provenance.revenue_transaction_id(),
            ts,
        ));
        let winner = fetch::open_bids(store, &listing.id)
            .into_iter()
            .find(|b| Some(b.bidder) == *winning_bidder);
        if let Some(mut bid) = winner {
            bid.status = Status::Completed;
            bid.revenue_transaction = Some(event.provenance.revenue_transaction_id());
            listing.completed_bid = Some(bid.id.clone());
            upserts.push(EntityRecord::MarketplaceBid(bid));
        }
    }
    upserts.push(EntityRecord::MarketplaceListing(listing));
    upserts
}

/// Direct buy of a listing: always a value transfer, so the buy row carries
/// a required revenue-transaction reference.
fn new_sale(
    store: &EntityStore,
    event: &ChainEvent,
    listing_id: &U256,
    buyer: &Address,
    quantity_bought: &U256,
    total_price_paid: &U256,
) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let mut upserts = vec![fetch::revenue_transaction(
        event.provenance.revenue_transaction_id(),
        ts,
    )];

    upserts.push(EntityRecord::MarketplaceDirectBuy(MarketplaceDirectBuy {
        id: event.provenance.record_id(),
        listing: listing_id.to_string(),
        buyer: *buyer,
        quantity_bought: *quantity_bought,
        total_price_paid: *total_price_paid,
        revenue_transaction: event.provenance.revenue_transaction_id(),
        fee: None,
    }));

    if let Some(mut listing) = fetch::listing(store, &listing_id.to_string()) {
        listing.quantity = listing.quantity.saturating_sub(*quantity_bought);
        if listing.quantity.is_zero() {
            listing.status = Status::Completed;
        }
        upserts.push(EntityRecord::MarketplaceListing(listing));
    } else {
        logging::log_warning(&format!(
            "Direct buy of unknown listing {}; buy row kept, listing reference dangling",
            listing_id
        ));
    }
    upserts
}

fn new_offer(store: &EntityStore, event: &ChainEvent) -> Result<Vec<EntityRecord>, ReduceError> {
    let EventPayload::NewOffer {
        offeror,
        offer_id,
        asset_contract,
        token_id,
        quantity,
        currency,
        total_price,
        token_type,
        transfer_type,
        expiration_timestamp,
        rental_expiration_timestamp,
        referral_additional_information,
    } = &event.payload
    else {
        unreachable!("dispatched on payload kind");
    };
    let ts = event.provenance.block_timestamp;

    let malformed = |field: &str, code: u8| ReduceError::MalformedEvent {
        kind: event.payload.kind_name().to_string(),
        message: format!("unknown {} code {}", field, code),
    };
    let token_type =
        TokenType::from_code(*token_type).ok_or_else(|| malformed("tokenType", *token_type))?;
    let transfer_type = TransferType::from_code(*transfer_type)
        .ok_or_else(|| malformed("transferType", *transfer_type))?;

    let mut upserts = Vec::new();
    if let Some(stub) = fetch::ensure_nft_contract(store, asset_contract, ts) {
        upserts.push(stub);
    }
    let token = fetch::token_or_new(store, asset_contract, token_id, ts);
    let token_entity = token.id.clone();
    upserts.push(EntityRecord::Token(token));

    upserts.push(EntityRecord::MarketplaceOffer(MarketplaceOffer {
        id: offer_id.to_string(),
        origin: event.provenance.emitter,
        offeror: *offeror,
        token: token_entity,
        quantity: *quantity,
        currency: *currency,
        total_price: *total_price,
        token_type,
        transfer_type,
        expiration_timestamp: *expiration_timestamp,
        rental_expiration_timestamp: *rental_expiration_timestamp,
        status: Status::Created,
        revenue_transaction: None,
        referral_additional_information: referral_additional_information.clone(),
        creation_timestamp: ts,
        last_update_timestamp: ts,
        fee: None,
    }));
    Ok(upserts)
}

fn accepted_offer(store: &EntityStore, event: &ChainEvent, offer_id: &U256) -> Vec<EntityRecord> {
    let ts = event.provenance.block_timestamp;
    let Some(mut offer) = fetch::marketplace_offer(store, &offer_id.to_string()) else {
        logging::log_warning(&format!(
            "Acceptance of unknown offer {}; recording event only",
            offer_id
        ));
        return vec![];
    };
    offer.status = Status::Completed;
    offer.revenue_transaction = Some(event.provenance.revenue_transaction_id());
    vec![
        fetch::revenue_transaction(event.provenance.revenue_transaction_id(), ts),
        EntityRecord::MarketplaceOffer(offer),
    ]
}

fn set_offer_status(store: &EntityStore, offer_id: &U256, status: Status) -> Vec<EntityRecord> {
    let Some(mut offer) = fetch::marketplace_offer(store, &offer_id.to_string()) else {
        logging::log_warning(&format!(
            "Status change for unknown offer {}; recording event only",
            offer_id
        ));
        return vec![];
    };
    offer.status = status;
    vec![EntityRecord::MarketplaceOffer(offer)]
}
