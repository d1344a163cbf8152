pub mod proposal_state;
pub mod query;
pub mod reference_resolver;
pub mod revenue_aggregator;

// Re-export services for direct imports
pub use query::QueryFacade;
pub use reference_resolver::ReferenceResolver;
pub use revenue_aggregator::RevenueAggregator;
