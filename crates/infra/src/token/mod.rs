//! Token refresh and provider adaptation

pub mod legacy;
pub mod refresher;

pub use legacy::LegacyTokenProviderAdapter;
pub use refresher::CachedTokenRefresher;
