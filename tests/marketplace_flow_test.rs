//! Marketplace scenarios: auctions with outbids, direct buys, offers.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};

use admarket_indexer::application::ingest::{IngestPipeline, InMemoryEventSource};
use admarket_indexer::domain::models::{
    ChainEvent, EntityKind, EntityRecord, EventPayload, EventProvenance, Status,
};
use admarket_indexer::infrastructure::store::EntityStore;

const MARKETPLACE: Address = Address::with_last_byte(0x66);
const NFT_CONTRACT: Address = Address::with_last_byte(0x11);
const SELLER: Address = Address::with_last_byte(0x77);
const BIDDER_A: Address = Address::with_last_byte(0x88);
const BIDDER_B: Address = Address::with_last_byte(0x99);
const WETH: Address = Address::with_last_byte(0x55);

fn event(block: u64, log: u64, payload: EventPayload) -> ChainEvent {
    ChainEvent {
        provenance: EventProvenance {
            block_number: block,
            block_timestamp: 1_700_000_000 + block,
            transaction_hash: B256::with_last_byte(block as u8),
            log_index: log,
            emitter: MARKETPLACE,
            tx_sender: SELLER,
        },
        payload,
    }
}

fn listing_added(block: u64, listing_type: u8, quantity: u64) -> ChainEvent {
    event(
        block,
        0,
        EventPayload::ListingAdded {
            listing_id: U256::from(1u64),
            asset_contract: NFT_CONTRACT,
            lister: SELLER,
            token_id: U256::from(7u64),
            start_time: 1_700_000_000,
            end_time: 1_700_100_000,
            quantity: U256::from(quantity),
            currency: WETH,
            reserve_price_per_token: U256::from(100u64),
            buyout_price_per_token: U256::from(1_000u64),
            token_type: 1,
            transfer_type: 1,
            rental_expiration_timestamp: 0,
            listing_type,
        },
    )
}

fn new_bid(block: u64, bidder: Address, price: u64, refund_bonus: u64) -> ChainEvent {
    event(
        block,
        0,
        EventPayload::NewBid {
            listing_id: U256::from(1u64),
            quantity_wanted: U256::from(1u64),
            new_bidder: bidder,
            new_price_per_token: U256::from(price),
            previous_bidder: None,
            refund_bonus: U256::from(refund_bonus),
            currency: WETH,
            new_end_time: 1_700_200_000,
        },
    )
}

async fn ingest(store: &Arc<EntityStore>, events: Vec<ChainEvent>) {
    let mut pipeline = IngestPipeline::new(Arc::clone(store), 0);
    let mut source = InMemoryEventSource::new(events);
    pipeline.run(&mut source).await.unwrap();
}

fn listing(store: &EntityStore) -> admarket_indexer::domain::models::MarketplaceListing {
    match store.get(EntityKind::MarketplaceListing, "1") {
        Some(EntityRecord::MarketplaceListing(l)) => l,
        other => panic!("expected listing, got {:?}", other),
    }
}

#[tokio::test]
async fn outbid_cancels_the_previous_bid_with_its_refund() {
    let store = Arc::new(EntityStore::new());
    ingest(
        &store,
        vec![
            listing_added(10, 1, 1),
            new_bid(11, BIDDER_A, 120, 0),
            new_bid(12, BIDDER_B, 150, 6),
        ],
    )
    .await;

    let bids = store.related(EntityKind::MarketplaceBid, "listing", "1");
    assert_eq!(bids.len(), 2);

    let mut cancelled = 0;
    for bid in bids {
        let EntityRecord::MarketplaceBid(bid) = bid else {
            panic!("relation index returned a non-bid")
        };
        match bid.status {
            Status::Cancelled => {
                cancelled += 1;
                assert_eq!(bid.bidder, BIDDER_A);
                assert_eq!(bid.refund_bonus, U256::from(6u64));
            }
            Status::Created => assert_eq!(bid.bidder, BIDDER_B),
            other => panic!("unexpected bid status {:?}", other),
        }
    }
    assert_eq!(cancelled, 1);

    // Each bid moved the auction end time
    assert_eq!(listing(&store).end_time, 1_700_200_000);
}

#[tokio::test]
async fn auction_close_completes_the_winning_bid() {
    let store = Arc::new(EntityStore::new());
    ingest(
        &store,
        vec![
            listing_added(10, 1, 1),
            new_bid(11, BIDDER_A, 120, 0),
            event(
                12,
                0,
                EventPayload::AuctionClosed {
                    listing_id: U256::from(1u64),
                    closer: SELLER,
                    cancelled: false,
                    auction_creator: SELLER,
                    winning_bidder: Some(BIDDER_A),
                },
            ),
        ],
    )
    .await;

    let listing = listing(&store);
    assert_eq!(listing.status, Status::Completed);
    let winning = listing.completed_bid.expect("winning bid recorded");

    let Some(EntityRecord::MarketplaceBid(bid)) =
        store.get(EntityKind::MarketplaceBid, &winning)
    else {
        panic!("winning bid missing");
    };
    assert_eq!(bid.status, Status::Completed);
    let revenue = bid.revenue_transaction.expect("winner carries revenue link");
    assert!(store.exists(EntityKind::RevenueTransaction, &revenue));
}

#[tokio::test]
async fn direct_buy_decrements_quantity_and_completes_at_zero() {
    let store = Arc::new(EntityStore::new());
    let buy = |block: u64, qty: u64| {
        event(
            block,
            0,
            EventPayload::NewSale {
                listing_id: U256::from(1u64),
                asset_contract: NFT_CONTRACT,
                token_id: U256::from(7u64),
                buyer: BIDDER_A,
                quantity_bought: U256::from(qty),
                total_price_paid: U256::from(qty * 1_000),
            },
        )
    };
    ingest(&store, vec![listing_added(10, 0, 3), buy(11, 2)]).await;

    let partial = listing(&store);
    assert_eq!(partial.quantity, U256::from(1u64));
    assert_eq!(partial.status, Status::Created);

    ingest(&store, vec![buy(12, 1)]).await;
    let sold_out = listing(&store);
    assert_eq!(sold_out.quantity, U256::ZERO);
    assert_eq!(sold_out.status, Status::Completed);

    let buys = store.related(EntityKind::MarketplaceDirectBuy, "listing", "1");
    assert_eq!(buys.len(), 2);
}

#[tokio::test]
async fn accepted_offer_carries_the_revenue_link() {
    let store = Arc::new(EntityStore::new());
    ingest(
        &store,
        vec![
            event(
                10,
                0,
                EventPayload::NewOffer {
                    offeror: BIDDER_A,
                    offer_id: U256::from(4u64),
                    asset_contract: NFT_CONTRACT,
                    token_id: U256::from(7u64),
                    quantity: U256::from(1u64),
                    currency: WETH,
                    total_price: U256::from(900u64),
                    token_type: 1,
                    transfer_type: 1,
                    expiration_timestamp: 1_800_000_000,
                    rental_expiration_timestamp: 0,
                    referral_additional_information: None,
                },
            ),
            event(
                11,
                0,
                EventPayload::AcceptedOffer {
                    offeror: BIDDER_A,
                    offer_id: U256::from(4u64),
                    asset_contract: NFT_CONTRACT,
                    token_id: U256::from(7u64),
                    seller: SELLER,
                    quantity_bought: U256::from(1u64),
                    total_price_paid: U256::from(900u64),
                },
            ),
        ],
    )
    .await;

    let Some(EntityRecord::MarketplaceOffer(offer)) =
        store.get(EntityKind::MarketplaceOffer, "4")
    else {
        panic!("offer missing");
    };
    assert_eq!(offer.status, Status::Completed);
    let revenue = offer.revenue_transaction.expect("revenue link set");
    assert!(store.exists(EntityKind::RevenueTransaction, &revenue));
}
