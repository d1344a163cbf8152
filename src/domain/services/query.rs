use std::sync::Arc;

use crate::domain::errors::ResolveError;
use crate::domain::models::{EntityKind, EntityRecord};
use crate::domain::services::reference_resolver::ReferenceResolver;
use crate::infrastructure::store::EntityStore;

/// Read contract exposed to the external query layer: point lookups,
/// reverse-relationship traversal and reference resolution over the
/// materialized snapshot. Monetary scalars come back as `U256`, addresses as
/// fixed-length hex, exactly as stored.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    store: Arc<EntityStore>,
    resolver: ReferenceResolver,
}

impl QueryFacade {
    pub fn new(store: Arc<EntityStore>) -> Self {
        let resolver = ReferenceResolver::new(store.clone());
        Self { store, resolver }
    }

    /// Point lookup by (kind, id)
    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<EntityRecord> {
        self.store.get(kind, id)
    }

    /// All records of `kind` whose `relation` field carries `key`, e.g. all
    /// `AdProposal` rows for an `AdOffer`.
    pub fn related(&self, kind: EntityKind, relation: &str, key: &str) -> Vec<EntityRecord> {
        self.store.related(kind, relation, key)
    }

    /// Follow a declared reference field to its target entity.
    pub fn resolve(&self, record: &EntityRecord, field: &str) -> Result<EntityRecord, ResolveError> {
        self.resolver.resolve(record, field)
    }

    /// Like [`resolve`](Self::resolve), mapping absence to `None`.
    pub fn resolve_optional(&self, record: &EntityRecord, field: &str) -> Option<EntityRecord> {
        self.resolver.resolve_optional(record, field)
    }
}
