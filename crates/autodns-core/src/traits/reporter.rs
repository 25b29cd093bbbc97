// # Reporter Trait
//
// Defines the interface for delivering the selected address to the remote
// endpoint.
//
// ## Implementations
//
// - HTTP (`POST /api/v1/public-ip`): `autodns-reporter-http` crate

use async_trait::async_trait;
use std::net::Ipv6Addr;

use crate::error::ReportError;

/// Trait for reporter implementations
///
/// # Contract
///
/// - One delivery attempt per call. Retries are a loop decision
///   (see [`CommitPolicy`](crate::config::CommitPolicy)).
/// - Success means the server accepted the address; anything else is a
///   [`ReportError`].
/// - Credentials must never appear in logs or error messages.
///
/// The loop bounds every call with its own timeout, so an implementation
/// that hangs is reported as [`ReportError::Timeout`].
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Report `address` to the remote endpoint
    async fn report(&self, address: Ipv6Addr) -> Result<(), ReportError>;

    /// Name of the reporter (for logging/debugging)
    fn reporter_name(&self) -> &'static str;
}
