// # autodns-core
//
// Core library for the autodns IPv6 reporting agent.
//
// ## Architecture Overview
//
// This library provides the decision logic of the agent:
// - **AddressSource**: Trait for reading an interface address table
// - **Reporter**: Trait for delivering the selected address
// - **AddressSelector**: Classifies addresses and picks the one to report
// - **ReportingAgent**: Polling loop that reports address changes
// - **AgentState**: The loop's last committed address
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Decisions live here, I/O lives in plugins
// 2. **Deterministic Selection**: Same table in, same address out
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Never Crash on a Tick**: Every per-tick failure is logged and absorbed

pub mod agent;
pub mod config;
pub mod error;
pub mod selector;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use agent::{AgentEvent, ReportingAgent, TickOutcome};
pub use config::{AgentConfig, CommitPolicy, ServerConfig};
pub use error::{Error, QueryError, ReportError, Result};
pub use selector::{AddressRecord, AddressScope, AddressSelector, Eui64Detector, SelectionOutcome, SelectionResult};
pub use state::AgentState;
pub use traits::{AddressFamily, AddressSource, RawAddress, Reporter};
