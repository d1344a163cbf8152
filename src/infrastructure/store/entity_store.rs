use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use crate::domain::models::{EntityFamily, EntityKind, EntityRecord};
use crate::infrastructure::store::error::StoreError;

struct Versioned {
    record: EntityRecord,
    block_height: u64,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<(EntityKind, String), Versioned>,
    /// (kind, relation, key) -> ids of records of `kind` carrying that key
    relations: HashMap<(EntityKind, String, String), BTreeSet<String>>,
}

/// In-memory keyed storage of all entity records, versioned by block height.
///
/// Last-write-wins per (kind, id). Writes to derived and link entities whose
/// block height precedes the recorded one are rejected; immutable event
/// records and late metadata patches are exempt. All access goes through the
/// interior lock, which is what serializes concurrent writers per key.
#[derive(Default)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore").finish_non_exhaustive()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one record at `block_height`. For derived entities the write
    /// also stamps `last_update_timestamp` with `event_timestamp`.
    pub fn put(
        &self,
        record: EntityRecord,
        block_height: u64,
        event_timestamp: u64,
    ) -> Result<(), StoreError> {
        let mut record = record;
        let kind = record.kind();
        let id = record.id();
        let mut inner = self.inner.write().expect("store lock poisoned");

        match kind.family() {
            EntityFamily::Event | EntityFamily::Metadata => {}
            EntityFamily::Derived | EntityFamily::Link => {
                if let Some(existing) = inner.records.get(&(kind, id.clone())) {
                    if block_height < existing.block_height {
                        return Err(StoreError::OutOfOrderWrite {
                            kind,
                            id,
                            recorded_height: existing.block_height,
                            incoming_height: block_height,
                        });
                    }
                }
                record.touch(event_timestamp);
            }
        }

        // Re-index relations: drop the previous record's keys, add the new ones
        if let Some(previous) = inner.records.get(&(kind, id.clone())) {
            for (relation, key) in previous.record.relations() {
                if let Some(ids) = inner.relations.get_mut(&(kind, relation, key)) {
                    ids.remove(&id);
                }
            }
        }
        for (relation, key) in record.relations() {
            inner
                .relations
                .entry((kind, relation, key))
                .or_default()
                .insert(id.clone());
        }

        inner.records.insert(
            (kind, id),
            Versioned {
                record,
                block_height,
            },
        );
        Ok(())
    }

    /// Point lookup
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<EntityRecord> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .records
            .get(&(kind, id.to_string()))
            .map(|v| v.record.clone())
    }

    pub fn exists(&self, kind: EntityKind, id: &str) -> bool {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.records.contains_key(&(kind, id.to_string()))
    }

    /// Block height an entity was last written at
    pub fn block_height(&self, kind: EntityKind, id: &str) -> Option<u64> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .records
            .get(&(kind, id.to_string()))
            .map(|v| v.block_height)
    }

    /// Reverse-relationship traversal: all records of `kind` whose `relation`
    /// field carries `key`, in deterministic id order.
    pub fn related(&self, kind: EntityKind, relation: &str, key: &str) -> Vec<EntityRecord> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .relations
            .get(&(kind, relation.to_string(), key.to_string()))
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.records.get(&(kind, id.clone())))
                    .map(|v| v.record.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of stored records across all kinds
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("store lock poisoned");
        inner.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Full snapshot keyed `Kind:id`, deterministic across runs; replaying
    /// the same event stream must produce an identical snapshot.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .records
            .iter()
            .map(|((kind, id), v)| {
                let value = serde_json::to_value(&v.record).unwrap_or(Value::Null);
                (format!("{}:{}", kind, id), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AdOffer, EventProvenance, EventRecord, NftContract, Token};
    use alloy_primitives::{address, b256, Address, U256};

    fn sample_offer(id: &str) -> EntityRecord {
        EntityRecord::AdOffer(AdOffer {
            id: id.to_string(),
            origin: Address::ZERO,
            disable: false,
            name: "offer".into(),
            metadata_url: "https://example.org/offer.json".into(),
            nft_contract: address!("00000000000000000000000000000000000000aa"),
            initial_creator: Address::ZERO,
            creation_timestamp: 100,
            last_update_timestamp: 100,
            admins: vec![],
            validators: vec![],
        })
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = EntityStore::new();
        store.put(sample_offer("1"), 5, 100).unwrap();
        let got = store.get(EntityKind::AdOffer, "1").unwrap();
        assert_eq!(got.id(), "1");
        assert!(store.exists(EntityKind::AdOffer, "1"));
        assert_eq!(store.block_height(EntityKind::AdOffer, "1"), Some(5));
    }

    #[test]
    fn derived_write_at_lower_height_is_rejected() {
        let store = EntityStore::new();
        store.put(sample_offer("1"), 10, 100).unwrap();
        let err = store.put(sample_offer("1"), 9, 90).unwrap_err();
        match err {
            StoreError::OutOfOrderWrite {
                recorded_height,
                incoming_height,
                ..
            } => {
                assert_eq!(recorded_height, 10);
                assert_eq!(incoming_height, 9);
            }
        }
        // The rejected write left the entity untouched
        assert_eq!(store.block_height(EntityKind::AdOffer, "1"), Some(10));
    }

    #[test]
    fn event_records_are_exempt_from_height_ordering() {
        let store = EntityStore::new();
        let record = |height: u64| {
            EntityRecord::Event(EventRecord {
                id: format!("0xaa-{}", height),
                kind: "Transfer".into(),
                provenance: EventProvenance {
                    block_number: height,
                    block_timestamp: 1000,
                    transaction_hash: b256!(
                        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
                    ),
                    log_index: 0,
                    emitter: Address::ZERO,
                    tx_sender: Address::ZERO,
                },
                payload: serde_json::json!({}),
                relations: vec![],
            })
        };
        store.put(record(10), 10, 1000).unwrap();
        store.put(record(3), 3, 1000).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn derived_put_stamps_last_update_timestamp() {
        let store = EntityStore::new();
        store.put(sample_offer("1"), 5, 777).unwrap();
        match store.get(EntityKind::AdOffer, "1").unwrap() {
            EntityRecord::AdOffer(o) => assert_eq!(o.last_update_timestamp, 777),
            _ => unreachable!(),
        }
    }

    #[test]
    fn relation_index_supports_reverse_traversal() {
        let store = EntityStore::new();
        let contract = address!("00000000000000000000000000000000000000aa");
        store
            .put(
                EntityRecord::NftContract(NftContract::stub(contract, 100)),
                1,
                100,
            )
            .unwrap();
        for token_id in [1u64, 2, 3] {
            store
                .put(
                    EntityRecord::Token(Token {
                        id: format!("{:#x}-{}", contract, token_id),
                        nft_contract: contract,
                        token_id: U256::from(token_id),
                        set_in_allow_list: false,
                        mint: None,
                        owner: None,
                        last_update_timestamp: 100,
                    }),
                    2,
                    100,
                )
                .unwrap();
        }

        let tokens = store.related(
            EntityKind::Token,
            "nftContract",
            &format!("{:#x}", contract),
        );
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn snapshot_is_deterministic() {
        let build = || {
            let store = EntityStore::new();
            store.put(sample_offer("1"), 5, 100).unwrap();
            store.put(sample_offer("2"), 6, 101).unwrap();
            store.snapshot()
        };
        assert_eq!(build(), build());
    }
}
