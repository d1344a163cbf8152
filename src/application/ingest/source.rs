use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::domain::models::ChainEvent;

/// Error type for event log sources
#[derive(Debug)]
pub enum SourceError {
    IoError(std::io::Error),
    /// A line that is not a valid event
    DecodeError { line: usize, message: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::IoError(e) => write!(f, "Event log I/O error: {}", e),
            SourceError::DecodeError { line, message } => {
                write!(f, "Event log decode error at line {}: {}", line, message)
            }
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SourceError::IoError(e) => Some(e),
            SourceError::DecodeError { .. } => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(error: std::io::Error) -> Self {
        SourceError::IoError(error)
    }
}

/// Seam to the external event log: anything that can hand over decoded
/// events in (block, log index) order.
#[async_trait]
pub trait EventSource: Send {
    /// Next event in order, or `None` when the log is exhausted
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, SourceError>;
}

/// Reads events from an NDJSON file, one event object per line. Blank lines
/// are skipped.
pub struct NdjsonEventSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl NdjsonEventSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

#[async_trait]
impl EventSource for NdjsonEventSource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, SourceError> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event =
                serde_json::from_str(&line).map_err(|e| SourceError::DecodeError {
                    line: self.line_no,
                    message: e.to_string(),
                })?;
            return Ok(Some(event));
        }
        Ok(None)
    }
}

/// In-memory source over a prepared batch of events
pub struct InMemoryEventSource {
    events: VecDeque<ChainEvent>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<ChainEvent>) -> Self {
        Self {
            events: events.into(),
        }
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn next_event(&mut self) -> Result<Option<ChainEvent>, SourceError> {
        Ok(self.events.pop_front())
    }
}
