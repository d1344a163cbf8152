pub mod entity_store;
pub mod error;

pub use entity_store::EntityStore;
pub use error::StoreError;
