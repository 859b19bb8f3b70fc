/// Client credentials token exchange.
pub mod credentials;
/// Cached access tokens with expiry tracking.
pub mod token;
