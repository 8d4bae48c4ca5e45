//! Typed error hierarchy for the product factory.
//!
//! Four enums cover the four failure classes:
//! - `IntakeError` — validation failures caught before any network call
//! - `AgentError` — manager/publisher agent failures (reported or transport)
//! - `StorageError` — local storage reads and writes
//! - `SessionError` — workflow-level failures wrapping the above

use thiserror::Error;

/// Message shown when an agent failure carries no usable text.
pub const GENERIC_AGENT_FAILURE: &str =
    "Something went wrong talking to the agent. Please try again.";

/// Validation failures on user input.
#[derive(Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("Please describe your product idea")]
    EmptyIdea,

    #[error("Price must be a non-negative number, got {0}")]
    InvalidPrice(f64),

    #[error("No bullet at position {index} (list has {len})")]
    BulletIndex { index: usize, len: usize },

    #[error("No tag at position {index} (list has {len})")]
    TagIndex { index: usize, len: usize },
}

/// Failures from an agent call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The agent answered with `success: false`.
    #[error("{}", reported_message(.0))]
    Reported(String),

    #[error("Agent request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Agent returned HTTP {status}")]
    Status { status: u16 },

    #[error("Agent response could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

fn reported_message(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_AGENT_FAILURE
    } else {
        message
    }
}

impl AgentError {
    /// Text to show inline: the agent's literal message when it sent one.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Failures from the local storage substrate.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage file is not a valid key/value document: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to encode value for storage: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Failures surfaced by the product workflow.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("No product package loaded. Generate a product first.")]
    NoPackage,

    #[error("A generation is already in progress")]
    GenerationInFlight,

    #[error("A publish is already in progress")]
    PublishInFlight,
}
