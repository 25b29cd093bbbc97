// # Address Source Trait
//
// Defines the interface for reading the raw address table of one network
// interface.
//
// ## Implementations
//
// - `getifaddrs(3)` based: `autodns-ip-ifaddrs` crate
//
// ## Usage
//
// ```rust,ignore
// use autodns_core::AddressSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     for entry in source.query_addresses("eth0").await? {
//         println!("{:?} {}", entry.family, entry.address);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::error::QueryError;

/// Address family of a raw table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// IPv4 (`AF_INET`)
    Inet,
    /// IPv6 (`AF_INET6`)
    Inet6,
}

/// One entry of an interface address table, as reported by the OS
///
/// The address is kept in textual form: it may carry a `%zone` suffix and
/// is not guaranteed to parse. Cleaning it up is the selector's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAddress {
    /// Address family of the entry
    pub family: AddressFamily,
    /// Textual address
    pub address: String,
}

impl RawAddress {
    /// Create an IPv6 entry
    pub fn inet6(address: impl Into<String>) -> Self {
        Self {
            family: AddressFamily::Inet6,
            address: address.into(),
        }
    }

    /// Create an IPv4 entry
    pub fn inet(address: impl Into<String>) -> Self {
        Self {
            family: AddressFamily::Inet,
            address: address.into(),
        }
    }
}

impl From<IpAddr> for RawAddress {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self::inet(v4.to_string()),
            IpAddr::V6(v6) => Self::inet6(v6.to_string()),
        }
    }
}

/// Trait for interface address sources
///
/// # Contract
///
/// - Return every entry present on the interface, all families included;
///   filtering is done by the core.
/// - Perform a single lookup per call: no caching, no retry, no polling.
///   The reporting loop owns scheduling.
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Read the address table of `interface`
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<RawAddress>)`: All entries in OS enumeration order
    /// - `Err(QueryError)`: If the lookup failed
    async fn query_addresses(&self, interface: &str) -> Result<Vec<RawAddress>, QueryError>;

    /// Name of the source (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
