// # getifaddrs Address Source
//
// This crate provides the interface address source used by the autodns
// daemon. It reads the OS address table through the `if-addrs` crate
// (`getifaddrs(3)` on Unix).
//
// ## Behavior
//
// - One table read per query, no caching
// - Every family is returned; the core filters IPv6 itself
// - An interface without any entry is reported as `NotFound`, whether it
//   is missing or merely unconfigured
//
// The lookup is a blocking syscall, so it runs on tokio's blocking pool.

use async_trait::async_trait;
use autodns_core::error::QueryError;
use autodns_core::traits::{AddressSource, RawAddress};
use std::io;
use std::net::IpAddr;

/// Address source backed by `getifaddrs(3)`
#[derive(Debug, Clone, Copy, Default)]
pub struct IfAddrsSource;

impl IfAddrsSource {
    /// Create a new source
    pub fn new() -> Self {
        Self
    }

    fn read_table(interface: &str) -> Result<Vec<RawAddress>, QueryError> {
        let interfaces = if_addrs::get_if_addrs().map_err(|e| map_io_error(interface, e))?;

        entries_for_interface(
            interface,
            interfaces.into_iter().map(|iface| (iface.name, iface.addr.ip())),
        )
    }
}

#[async_trait]
impl AddressSource for IfAddrsSource {
    async fn query_addresses(&self, interface: &str) -> Result<Vec<RawAddress>, QueryError> {
        let name = interface.to_string();
        tokio::task::spawn_blocking(move || Self::read_table(&name))
            .await
            .map_err(|e| QueryError::Unsupported(format!("address lookup task failed: {}", e)))?
    }

    fn source_name(&self) -> &'static str {
        "ifaddrs"
    }
}

/// Keep the entries of `interface`, in enumeration order
///
/// Fails with [`QueryError::NotFound`] when the interface has no entry,
/// which covers both an unknown interface and one without any address.
pub fn entries_for_interface<I>(interface: &str, entries: I) -> Result<Vec<RawAddress>, QueryError>
where
    I: IntoIterator<Item = (String, IpAddr)>,
{
    let table: Vec<RawAddress> = entries
        .into_iter()
        .filter(|(name, _)| name == interface)
        .map(|(_, ip)| RawAddress::from(ip))
        .collect();

    // getifaddrs only lists interfaces that carry an address, so a missing
    // interface and an unconfigured one look the same
    if table.is_empty() {
        return Err(QueryError::NotFound(format!(
            "{} (no such interface, or no address assigned)",
            interface
        )));
    }

    tracing::debug!("Interface {} has {} address(es)", interface, table.len());
    Ok(table)
}

fn map_io_error(interface: &str, err: io::Error) -> QueryError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            QueryError::PermissionDenied(format!("{}: {}", interface, err))
        }
        io::ErrorKind::NotFound => QueryError::NotFound(format!("{}: {}", interface, err)),
        _ => QueryError::Unsupported(format!("{}: {}", interface, err)),
    }
}
