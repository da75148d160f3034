//! Object lifecycle operation types
//!
//! Every top-level orchestrator call builds one [`OperationState`] from
//! scratch and hands it back by value, on success inside `Ok` and on failure
//! inside [`OperationError`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::http::AdtResponse;
use crate::constants::DEFAULT_REQUEST_TIMEOUT_MS;
use crate::errors::{AdtError, AdtObjectErrorCode};

/// Object version addressed by reads and checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectVersion {
    #[default]
    Active,
    Inactive,
}

impl ObjectVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for ObjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a check run looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckVersion {
    Active,
    Inactive,
    /// Whether the object may be deleted
    Deletion,
}

impl CheckVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deletion => "deletion",
        }
    }
}

impl From<ObjectVersion> for CheckVersion {
    fn from(version: ObjectVersion) -> Self {
        match version {
            ObjectVersion::Active => Self::Active,
            ObjectVersion::Inactive => Self::Inactive,
        }
    }
}

impl fmt::Display for CheckVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote step of an object operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", content = "version", rename_all = "camelCase")]
pub enum OperationStep {
    Validate,
    Create,
    Check(CheckVersion),
    Lock,
    Update,
    Unlock,
    Activate,
    Delete,
    Read,
    ReadMetadata,
    ReadTransport,
}

impl fmt::Display for OperationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => f.write_str("validate"),
            Self::Create => f.write_str("create"),
            Self::Check(version) => write!(f, "check({version})"),
            Self::Lock => f.write_str("lock"),
            Self::Update => f.write_str("update"),
            Self::Unlock => f.write_str("unlock"),
            Self::Activate => f.write_str("activate"),
            Self::Delete => f.write_str("delete"),
            Self::Read => f.write_str("read"),
            Self::ReadMetadata => f.write_str("readMetadata"),
            Self::ReadTransport => f.write_str("readTransport"),
        }
    }
}

/// Response snapshot of a step that reached the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: OperationStep,
    pub response: AdtResponse,
}

/// A failure observed during an operation, recovered or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepError {
    pub step: OperationStep,
    pub error: AdtError,
    pub timestamp: DateTime<Utc>,
}

/// Accumulated result of one orchestrator call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationState {
    steps: Vec<StepRecord>,
    lock_handle: Option<String>,
    errors: Vec<StepError>,
}

impl OperationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: OperationStep, response: AdtResponse) {
        self.steps.push(StepRecord { step, response });
    }

    pub fn record_error(&mut self, step: OperationStep, error: AdtError, timestamp: DateTime<Utc>) {
        self.errors.push(StepError { step, error, timestamp });
    }

    pub fn set_lock_handle(&mut self, handle: impl Into<String>) {
        self.lock_handle = Some(handle.into());
    }

    pub fn lock_handle(&self) -> Option<&str> {
        self.lock_handle.as_deref()
    }

    /// Recorded steps in execution order.
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Just the step kinds, in execution order.
    pub fn step_sequence(&self) -> Vec<OperationStep> {
        self.steps.iter().map(|record| record.step).collect()
    }

    /// Latest response recorded for `step`.
    pub fn response(&self, step: OperationStep) -> Option<&AdtResponse> {
        self.steps.iter().rev().find(|record| record.step == step).map(|record| &record.response)
    }

    pub fn errors(&self) -> &[StepError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Failure of an orchestrator call.
///
/// `source` is the error that stopped the sequence, never the error of a
/// cleanup step. `state` holds everything recorded up to that point,
/// cleanup attempts included.
#[derive(Debug, Error)]
#[error("{code}: {source}")]
pub struct OperationError {
    pub code: AdtObjectErrorCode,
    pub source: AdtError,
    pub state: Box<OperationState>,
}

impl OperationError {
    pub fn new(code: AdtObjectErrorCode, source: AdtError, state: OperationState) -> Self {
        Self { code, source, state: Box::new(state) }
    }

    /// Stable string form of the failure code.
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

/// Options of `create` and `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationOptions {
    pub activate_on_create: bool,
    pub activate_on_update: bool,
    pub delete_on_failure: bool,
    /// Source sent by source-based kinds (class, program)
    pub source_code: Option<String>,
    /// XML sent by metadata kinds (domain, data element)
    pub xml_content: Option<String>,
    /// HTTP completion timeout of each request, not an object readiness wait
    #[serde(with = "duration_millis")]
    pub timeout: Duration,
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            activate_on_create: false,
            activate_on_update: false,
            delete_on_failure: false,
            source_code: None,
            xml_content: None,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl OperationOptions {
    #[must_use]
    pub fn activate_on_create(mut self) -> Self {
        self.activate_on_create = true;
        self
    }

    #[must_use]
    pub fn activate_on_update(mut self) -> Self {
        self.activate_on_update = true;
        self
    }

    #[must_use]
    pub fn delete_on_failure(mut self) -> Self {
        self.delete_on_failure = true;
        self
    }

    #[must_use]
    pub fn source_code(mut self, source: impl Into<String>) -> Self {
        self.source_code = Some(source.into());
        self
    }

    #[must_use]
    pub fn xml_content(mut self, xml: impl Into<String>) -> Self {
        self.xml_content = Some(xml.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Options of the read family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Ask the server to hold the request until the object is available
    pub with_long_polling: bool,
}

impl ReadOptions {
    pub fn long_polling() -> Self {
        Self { with_long_polling: true }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
