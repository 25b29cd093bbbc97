//! Core traits for the autodns agent
//!
//! This module defines the collaborator interfaces the reporting loop
//! depends on.
//!
//! - [`AddressSource`]: Read the raw address table of an interface
//! - [`Reporter`]: Deliver the selected address to the remote endpoint

pub mod address_source;
pub mod reporter;

pub use address_source::{AddressFamily, AddressSource, RawAddress};
pub use reporter::Reporter;
