//! Configuration types for the autodns agent
//!
//! This module defines all configuration structures used throughout the crate.
//! Loading them (environment variables, files) is the daemon's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::selector::Eui64Detector;

/// Name of the loopback interface, which can never be monitored
pub const LOOPBACK_INTERFACE: &str = "lo";

/// Path appended to the server base URL when reporting
pub const REPORT_PATH: &str = "/api/v1/public-ip";

/// Main agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Network interface to monitor (e.g., "eth0")
    pub interface: String,

    /// Remote endpoint settings
    pub server: ServerConfig,

    /// Seconds to sleep between two ticks
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Upper bound for a single report, in seconds
    #[serde(default = "default_report_timeout_secs")]
    pub report_timeout_secs: u64,

    /// When the loop commits a new address to its state
    #[serde(default)]
    pub commit_policy: CommitPolicy,

    /// How EUI-64 (permanent) addresses are recognized
    #[serde(default)]
    pub eui64_detector: Eui64Detector,

    /// Capacity of the agent event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl AgentConfig {
    /// Create a new configuration with defaults for everything but the
    /// interface and the server
    pub fn new(interface: impl Into<String>, server: ServerConfig) -> Self {
        Self {
            interface: interface.into(),
            server,
            check_interval_secs: default_check_interval_secs(),
            report_timeout_secs: default_report_timeout_secs(),
            commit_policy: CommitPolicy::default(),
            eui64_detector: Eui64Detector::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Set the check interval
    pub fn with_check_interval_secs(mut self, secs: u64) -> Self {
        self.check_interval_secs = secs;
        self
    }

    /// Set the commit policy
    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Set the EUI-64 detector
    pub fn with_eui64_detector(mut self, detector: Eui64Detector) -> Self {
        self.eui64_detector = detector;
        self
    }

    /// Interval between ticks
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Timeout applied to each report attempt
    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_interface(&self.interface)?;

        if self.check_interval_secs == 0 {
            return Err(crate::Error::config("Check interval must be at least 1 second"));
        }

        if self.report_timeout_secs == 0 {
            return Err(crate::Error::config("Report timeout must be at least 1 second"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        self.server.validate()
    }
}

/// Validate a monitored interface name
pub fn validate_interface(interface: &str) -> Result<(), crate::Error> {
    if interface.is_empty() {
        return Err(crate::Error::config("Network interface is not specified"));
    }
    if interface == LOOPBACK_INTERFACE {
        return Err(crate::Error::config("Cannot monitor loopback interface"));
    }
    Ok(())
}

/// Remote endpoint configuration
///
/// Both values are passed through untouched to the reporter.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "https://gateway.example.com")
    pub base_url: String,

    /// Token sent in the `X-API-Token` header
    pub api_token: String,
}

// Keeps the token out of logs
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"<REDACTED>")
            .finish()
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: api_token.into(),
        }
    }

    /// Full URL reports are posted to
    pub fn report_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), REPORT_PATH)
    }

    /// Validate the server configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.base_url.is_empty() {
            return Err(crate::Error::config("Server URL cannot be empty"));
        }
        if !self.base_url.starts_with("https://") && !self.base_url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Server URL must use HTTP or HTTPS scheme. Got: {}",
                self.base_url
            )));
        }
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }
        Ok(())
    }
}

/// When the reporting loop records an address as reported
///
/// The agent compares every selected address against the last committed one
/// and only reports on a difference. The policy decides whether a failed
/// report still counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Commit after every attempt, successful or not.
    ///
    /// A failed address is not retried; the next distinct address (or a
    /// restart) triggers the next report.
    #[default]
    Always,

    /// Commit only after a successful report; failures are retried on the
    /// next tick.
    OnSuccess,
}

impl CommitPolicy {
    /// Whether an attempt with the given success flag advances the state
    pub fn commits(self, succeeded: bool) -> bool {
        match self {
            CommitPolicy::Always => true,
            CommitPolicy::OnSuccess => succeeded,
        }
    }
}

impl std::str::FromStr for CommitPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always" => Ok(CommitPolicy::Always),
            "on_success" | "on-success" => Ok(CommitPolicy::OnSuccess),
            other => Err(crate::Error::config(format!(
                "Unknown commit policy '{}'. Valid: always, on_success",
                other
            ))),
        }
    }
}

fn default_check_interval_secs() -> u64 {
    5
}

fn default_report_timeout_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    100
}
