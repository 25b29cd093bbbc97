//! Test doubles and common utilities for agent contract tests
//!
//! This module provides minimal collaborators that script address tables
//! and record reporter calls without doing any I/O.

#![allow(dead_code)]

use autodns_core::config::{AgentConfig, ServerConfig};
use autodns_core::error::{QueryError, ReportError};
use autodns_core::traits::{AddressSource, RawAddress, Reporter};
use std::collections::VecDeque;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type QueryResult = Result<Vec<RawAddress>, QueryError>;

/// An address source that replays a scripted sequence of tables
///
/// Each query pops the next scripted answer; once the script runs out the
/// last answer is repeated.
pub struct ScriptedAddressSource {
    script: Mutex<VecDeque<QueryResult>>,
    last: Mutex<Option<QueryResult>>,
    query_call_count: Arc<AtomicUsize>,
}

impl ScriptedAddressSource {
    pub fn new(script: Vec<QueryResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            query_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always answers with the same IPv6 table
    pub fn fixed(addresses: &[&str]) -> Self {
        Self::new(vec![Ok(table(addresses))])
    }

    /// Get the number of times query_addresses() was called
    pub fn query_call_count(&self) -> usize {
        self.query_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressSource for ScriptedAddressSource {
    async fn query_addresses(&self, _interface: &str) -> Result<Vec<RawAddress>, QueryError> {
        self.query_call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(answer) = next {
            *last = Some(answer);
        }
        last.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// An address source that panics on every query
pub struct PanickingAddressSource;

#[async_trait::async_trait]
impl AddressSource for PanickingAddressSource {
    async fn query_addresses(&self, _interface: &str) -> Result<Vec<RawAddress>, QueryError> {
        panic!("address table exploded");
    }

    fn source_name(&self) -> &'static str {
        "panicking"
    }
}

/// How a [`MockReporter`] answers
#[derive(Debug, Clone)]
pub enum ReporterBehavior {
    /// Accept every report
    Accept,
    /// Fail every report with the given error
    Fail(ReportError),
    /// Never answer
    Hang,
    /// Panic on every report
    Panic,
}

/// A reporter that records every address it is asked to report
pub struct MockReporter {
    behavior: ReporterBehavior,
    report_call_count: Arc<AtomicUsize>,
    reported: Arc<Mutex<Vec<Ipv6Addr>>>,
}

impl MockReporter {
    pub fn new(behavior: ReporterBehavior) -> Self {
        Self {
            behavior,
            report_call_count: Arc::new(AtomicUsize::new(0)),
            reported: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn accepting() -> Self {
        Self::new(ReporterBehavior::Accept)
    }

    pub fn rejecting(status: u16) -> Self {
        Self::new(ReporterBehavior::Fail(ReportError::rejected(status, "rejected")))
    }

    /// Get the number of times report() was called
    pub fn report_call_count(&self) -> usize {
        self.report_call_count.load(Ordering::SeqCst)
    }

    /// Get the addresses passed to report(), in call order
    pub fn reported(&self) -> Vec<Ipv6Addr> {
        self.reported.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Reporter for MockReporter {
    async fn report(&self, address: Ipv6Addr) -> Result<(), ReportError> {
        self.report_call_count.fetch_add(1, Ordering::SeqCst);
        self.reported.lock().unwrap().push(address);

        match &self.behavior {
            ReporterBehavior::Accept => Ok(()),
            ReporterBehavior::Fail(e) => Err(e.clone()),
            ReporterBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
            ReporterBehavior::Panic => panic!("reporter exploded"),
        }
    }

    fn reporter_name(&self) -> &'static str {
        "mock"
    }
}

/// Build an IPv6-only raw table
pub fn table(addresses: &[&str]) -> Vec<RawAddress> {
    addresses.iter().map(|a| RawAddress::inet6(*a)).collect()
}

/// Parse an IPv6 address
pub fn ip(text: &str) -> Ipv6Addr {
    text.parse().expect("valid IPv6 address")
}

/// Helper to create a minimal AgentConfig for testing
pub fn minimal_config() -> AgentConfig {
    let mut config = AgentConfig::new(
        "eth0",
        ServerConfig::new("http://gateway.test", "test-token"),
    );
    config.check_interval_secs = 5;
    config.report_timeout_secs = 10;
    config.event_channel_capacity = 100;
    config
}

pub const CHECK_INTERVAL: Duration = Duration::from_secs(5);
