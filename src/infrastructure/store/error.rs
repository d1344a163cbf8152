use std::error::Error;
use std::fmt;

use crate::domain::models::EntityKind;

/// Error type for entity store operations
#[derive(Debug)]
pub enum StoreError {
    /// A write whose block height precedes the entity's recorded height
    OutOfOrderWrite {
        kind: EntityKind,
        id: String,
        recorded_height: u64,
        incoming_height: u64,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::OutOfOrderWrite {
                kind,
                id,
                recorded_height,
                incoming_height,
            } => write!(
                f,
                "Out-of-order write to {} {}: entity is at block {}, write is for block {}",
                kind, id, recorded_height, incoming_height
            ),
        }
    }
}

impl Error for StoreError {}
