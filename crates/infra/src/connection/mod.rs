//! ABAP connection and its session handling

pub mod abap;
pub mod session;

pub use abap::{AbapConnection, AbapConnectionBuilder};
pub use session::SessionManager;
