pub mod metadata;
pub mod queue;
pub mod store;
