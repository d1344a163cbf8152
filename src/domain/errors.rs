use std::error::Error;
use std::fmt;

use crate::domain::models::{EntityKind, EventProvenance};
use crate::infrastructure::store::error::StoreError;

/// Error type for cross-entity reference resolution
#[derive(Debug)]
pub enum ResolveError {
    /// The referenced entity does not exist in the store
    DanglingReference {
        kind: EntityKind,
        id: String,
        field: String,
    },
    /// The named field is not a reference on this entity kind
    NotAReference { kind: EntityKind, field: String },
    /// The reference field is present but unset on this record
    EmptyReference { kind: EntityKind, field: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::DanglingReference { kind, id, field } => write!(
                f,
                "Dangling reference: {}.{} points at missing entity {}",
                kind, field, id
            ),
            ResolveError::NotAReference { kind, field } => {
                write!(f, "{}.{} is not a reference field", kind, field)
            }
            ResolveError::EmptyReference { kind, field } => {
                write!(f, "{}.{} is not set on this record", kind, field)
            }
        }
    }
}

impl Error for ResolveError {}

/// Error type for event reduction
#[derive(Debug)]
pub enum ReduceError {
    /// No reducer is registered for this event kind
    UnhandledEventKind { kind: String },
    /// An event field could not be interpreted (e.g. unknown enum code)
    MalformedEvent { kind: String, message: String },
    /// A required financial reference could not be resolved
    ResolveError(ResolveError),
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::UnhandledEventKind { kind } => {
                write!(f, "No reducer registered for event kind {}", kind)
            }
            ReduceError::MalformedEvent { kind, message } => {
                write!(f, "Malformed {} event: {}", kind, message)
            }
            ReduceError::ResolveError(e) => write!(f, "Reference resolution failed: {}", e),
        }
    }
}

impl Error for ReduceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReduceError::ResolveError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResolveError> for ReduceError {
    fn from(error: ResolveError) -> Self {
        ReduceError::ResolveError(error)
    }
}

/// Error type for the ingestion pipeline. Fatal variants carry the offending
/// event's provenance so the operator can replay from the right spot.
#[derive(Debug)]
pub enum IngestError {
    /// The source delivered an event that regresses the (block, log) order
    OutOfOrderEvent {
        provenance: EventProvenance,
        last_applied: (u64, u64),
    },
    /// Reduction failed for the event at `provenance`
    ReduceError {
        provenance: EventProvenance,
        source: ReduceError,
    },
    /// A store write was rejected for the event at `provenance`
    StoreError {
        provenance: EventProvenance,
        source: StoreError,
    },
    /// The event source itself failed
    SourceError(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::OutOfOrderEvent {
                provenance,
                last_applied,
            } => write!(
                f,
                "Out-of-order event at block {} log {} (tx {:#x}): last applied was block {} log {}",
                provenance.block_number,
                provenance.log_index,
                provenance.transaction_hash,
                last_applied.0,
                last_applied.1
            ),
            IngestError::ReduceError { provenance, source } => write!(
                f,
                "Reduce failed at block {} log {} (tx {:#x}): {}",
                provenance.block_number, provenance.log_index, provenance.transaction_hash, source
            ),
            IngestError::StoreError { provenance, source } => write!(
                f,
                "Store write failed at block {} log {} (tx {:#x}): {}",
                provenance.block_number, provenance.log_index, provenance.transaction_hash, source
            ),
            IngestError::SourceError(msg) => write!(f, "Event source error: {}", msg),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IngestError::ReduceError { source, .. } => Some(source),
            IngestError::StoreError { source, .. } => Some(source),
            _ => None,
        }
    }
}
