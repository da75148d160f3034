//! ADT object lifecycle: per-kind descriptions, response markers and the
//! orchestrator that drives them

pub mod kinds;
pub mod markers;
pub mod object;

pub use kinds::{
    ClassKind, DataElementKind, DomainKind, ObjectKind, PayloadFormat, ProgramKind, UpdatePayload,
};
pub use object::{AdtClass, AdtDataElement, AdtDomain, AdtObject, AdtProgram};
