pub mod ad;
pub mod common;
pub mod entity;
pub mod events;
pub mod fee;
pub mod marketplace;
pub mod metadata;
pub mod nft;

// Re-export models for direct imports
pub use ad::{AdOffer, AdOfferParameterLink, AdParameter, AdProposal, CurrentProposal};
pub use common::{
    AdProposalStatus, EventProvenance, FeeDistribution, FeeMethodology, ListingType, Status,
    TokenType, TransferType,
};
pub use entity::{EntityFamily, EntityKind, EntityRecord, EventRecord};
pub use events::{ChainEvent, EventPayload};
pub use fee::{EpochCurrencyRevenue, FeeParamsForContract};
pub use marketplace::{
    MarketplaceBid, MarketplaceDirectBuy, MarketplaceListing, MarketplaceOffer, RevenueTransaction,
};
pub use metadata::{AdOfferMetadata, CreatorMetadata, TokenMetadata, TokenMetadataAttribute};
pub use nft::{NftContract, NftPrice, RoyaltyInfo, Token, TokenPrice};
