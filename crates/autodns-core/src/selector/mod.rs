//! Address classification and selection
//!
//! Turns the raw address table of one interface into at most one preferred
//! IPv6 address.
//!
//! ## Rules
//!
//! 1. The `%zone` suffix is stripped.
//! 2. Link-local (`fe80:`) and loopback (`::1`) addresses are discarded.
//! 3. Addresses whose interface identifier carries the EUI-64 `fffe` marker
//!    are *permanent*; everything else is *temporary*.
//! 4. The first temporary address wins. The first permanent address is the
//!    fallback.
//!
//! Selection is pure: the same table always yields the same result.

use serde::{Deserialize, Serialize};
use std::net::Ipv6Addr;
use tracing::{debug, warn};

use crate::config::LOOPBACK_INTERFACE;
use crate::traits::{AddressFamily, RawAddress};

/// Scope of an observed IPv6 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressScope {
    /// `fe80::/10`, not globally routable
    LinkLocal,
    /// `::1`
    Loopback,
    /// Privacy-extension address, rotated by the OS
    GlobalTemporary,
    /// Stable address built from the EUI-64 modified MAC
    GlobalPermanent,
}

/// How permanent (EUI-64) addresses are recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eui64Detector {
    /// Look for `fffe` in the concatenated text of the last four groups
    ///
    /// Best-effort: on compressed addresses (`::`) the last four groups
    /// may reach into the network prefix.
    #[default]
    Textual,

    /// Check bytes 11 and 12 of the 128-bit address for `ff:fe`
    Bitwise,
}

impl Eui64Detector {
    /// Whether `address` (whose stripped lowercase text is `text`) looks
    /// like an EUI-64 address
    pub fn is_eui64(self, text: &str, address: &Ipv6Addr) -> bool {
        match self {
            Eui64Detector::Textual => {
                let groups: Vec<&str> = text.split(':').collect();
                if groups.len() < 4 {
                    return false;
                }
                groups[groups.len() - 4..].concat().contains("fffe")
            }
            Eui64Detector::Bitwise => {
                let octets = address.octets();
                octets[11] == 0xff && octets[12] == 0xfe
            }
        }
    }
}

impl std::str::FromStr for Eui64Detector {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "textual" => Ok(Eui64Detector::Textual),
            "bitwise" => Ok(Eui64Detector::Bitwise),
            other => Err(crate::Error::config(format!(
                "Unknown EUI-64 detector '{}'. Valid: textual, bitwise",
                other
            ))),
        }
    }
}

/// One observed address on the monitored interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRecord {
    /// The address, zone identifier stripped
    pub address: Ipv6Addr,
    /// Derived classification
    pub scope: AddressScope,
}

impl AddressRecord {
    /// Parse and classify a textual IPv6 address
    ///
    /// The zone suffix is removed before parsing. Returns `None` when the
    /// remainder is not a valid IPv6 address.
    pub fn parse(raw: &str, detector: Eui64Detector) -> Option<Self> {
        let text = strip_zone(raw).to_lowercase();
        let address: Ipv6Addr = text.parse().ok()?;

        let scope = if text.starts_with("fe80:") {
            AddressScope::LinkLocal
        } else if address == Ipv6Addr::LOCALHOST {
            AddressScope::Loopback
        } else if detector.is_eui64(&text, &address) {
            AddressScope::GlobalPermanent
        } else {
            AddressScope::GlobalTemporary
        };

        Some(Self { address, scope })
    }
}

/// Remove a `%zone` suffix from a textual address
pub fn strip_zone(raw: &str) -> &str {
    raw.split('%').next().unwrap_or(raw)
}

/// Why a selection came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// A temporary address was chosen
    Temporary,
    /// No temporary address existed; a permanent one was chosen
    PermanentFallback,
    /// The table held no IPv6 entries
    NoIpv6Addresses,
    /// IPv6 entries existed, but none was eligible
    NoEligibleAddress,
    /// The interface name was empty
    EmptyInterfaceName,
    /// The interface name was the loopback interface
    LoopbackInterface,
}

impl SelectionOutcome {
    /// Whether the outcome reflects bad input rather than the table contents
    pub fn is_input_error(self) -> bool {
        matches!(
            self,
            SelectionOutcome::EmptyInterfaceName | SelectionOutcome::LoopbackInterface
        )
    }
}

/// Output of one classification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// The address to report, if any
    pub chosen: Option<Ipv6Addr>,
    /// Temporary addresses, in table order
    pub candidates: Vec<Ipv6Addr>,
    /// True when a permanent address stands in for a missing temporary one
    pub fallback_used: bool,
    /// Classification of the result
    pub outcome: SelectionOutcome,
    /// Entries skipped because they could not be parsed
    pub skipped: Vec<String>,
}

impl SelectionResult {
    fn empty(outcome: SelectionOutcome) -> Self {
        Self {
            chosen: None,
            candidates: Vec::new(),
            fallback_used: false,
            outcome,
            skipped: Vec::new(),
        }
    }
}

/// Picks the address to report out of an interface address table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressSelector {
    detector: Eui64Detector,
}

impl AddressSelector {
    /// Create a selector using the given EUI-64 detector
    pub fn new(detector: Eui64Detector) -> Self {
        Self { detector }
    }

    /// Select the preferred address of `interface` from `table`
    ///
    /// Never fails: invalid input is reported through
    /// [`SelectionResult::outcome`].
    pub fn select(&self, interface: &str, table: &[RawAddress]) -> SelectionResult {
        if interface.is_empty() {
            return SelectionResult::empty(SelectionOutcome::EmptyInterfaceName);
        }
        if interface == LOOPBACK_INTERFACE {
            return SelectionResult::empty(SelectionOutcome::LoopbackInterface);
        }

        let mut saw_ipv6 = false;
        let mut temporary = Vec::new();
        let mut permanent = Vec::new();
        let mut skipped = Vec::new();

        for entry in table.iter().filter(|e| e.family == AddressFamily::Inet6) {
            saw_ipv6 = true;

            let Some(record) = AddressRecord::parse(&entry.address, self.detector) else {
                warn!("Skipping malformed IPv6 address '{}' on interface {}", entry.address, interface);
                skipped.push(entry.address.clone());
                continue;
            };

            match record.scope {
                AddressScope::LinkLocal | AddressScope::Loopback => {}
                AddressScope::GlobalTemporary => {
                    debug!("Found temporary IPv6 address {} on interface {}", record.address, interface);
                    temporary.push(record.address);
                }
                AddressScope::GlobalPermanent => {
                    debug!("Found permanent IPv6 address {} on interface {}", record.address, interface);
                    permanent.push(record.address);
                }
            }
        }

        if !saw_ipv6 {
            debug!("No IPv6 address found on interface {}", interface);
            return SelectionResult::empty(SelectionOutcome::NoIpv6Addresses);
        }

        let (chosen, fallback_used, outcome) = if let Some(first) = temporary.first() {
            debug!("Selected temporary IPv6 address: {}", first);
            (Some(*first), false, SelectionOutcome::Temporary)
        } else if let Some(first) = permanent.first() {
            warn!(
                "No temporary IPv6 address found on interface {}, using permanent address",
                interface
            );
            (Some(*first), true, SelectionOutcome::PermanentFallback)
        } else {
            (None, false, SelectionOutcome::NoEligibleAddress)
        };

        SelectionResult {
            chosen,
            candidates: temporary,
            fallback_used,
            outcome,
            skipped,
        }
    }
}
