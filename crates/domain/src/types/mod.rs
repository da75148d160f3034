//! Data model of the client

pub mod adt;
pub mod auth;
pub mod http;
pub mod objects;
pub mod session;
pub mod token;

pub use adt::{
    CheckVersion, ObjectVersion, OperationError, OperationOptions, OperationState, OperationStep,
    ReadOptions, StepError, StepRecord,
};
pub use auth::{
    AuthMethodPriority, AuthType, AuthorizationConfig, ConnectionConfig, HeaderValidationResult,
    SapConfig, StoredConfig, ValidatedAuthConfig,
};
pub use http::{AdtRequest, AdtResponse, HeaderBag, HttpMethod};
pub use objects::{
    AdtObjectConfig, ClassConfig, DataElementConfig, DataElementTypeKind, DomainConfig,
    FixedValue, ProgramConfig, ProgramType,
};
pub use session::SessionState;
pub use token::{
    BrowserMode, GrantType, TokenFormat, TokenProviderOptions, TokenProviderResult, TokenResult,
};
