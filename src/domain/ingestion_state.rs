use std::fmt;
use std::str::FromStr;

/// Stage of a single document's trip through the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionState {
    Idle,
    Loading,
    Chunking,
    Embedding,
    Writing,
    Done,
    Failed,
}

impl IngestionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestionState::Idle => "IDLE",
            IngestionState::Loading => "LOADING",
            IngestionState::Chunking => "CHUNKING",
            IngestionState::Embedding => "EMBEDDING",
            IngestionState::Writing => "WRITING",
            IngestionState::Done => "DONE",
            IngestionState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestionState::Done | IngestionState::Failed)
    }

    pub fn can_transition_to(&self, next: IngestionState) -> bool {
        use IngestionState::*;

        match (self, next) {
            (Idle, Loading)
            | (Loading, Chunking)
            | (Chunking, Embedding)
            | (Embedding, Writing)
            | (Writing, Done) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl FromStr for IngestionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(IngestionState::Idle),
            "LOADING" => Ok(IngestionState::Loading),
            "CHUNKING" => Ok(IngestionState::Chunking),
            "EMBEDDING" => Ok(IngestionState::Embedding),
            "WRITING" => Ok(IngestionState::Writing),
            "DONE" => Ok(IngestionState::Done),
            "FAILED" => Ok(IngestionState::Failed),
            _ => Err(format!("Invalid ingestion state: {}", s)),
        }
    }
}

impl fmt::Display for IngestionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
