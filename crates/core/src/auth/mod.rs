//! Authentication: header resolution, proxy header rules and token ports

pub mod ports;
pub mod proxy;
pub mod resolver;

pub use ports::{LegacyTokenProvider, ServiceKeyStore, SessionStore, TokenProvider, TokenRefresher};
pub use proxy::{DestinationRole, ResolvedDestination};
pub use resolver::AuthResolver;
