//! Reporting agent
//!
//! The ReportingAgent is responsible for:
//! - Polling the interface address table on a fixed interval
//! - Selecting the preferred IPv6 address
//! - Reporting the address when it differs from the last committed one
//! - Committing state according to its [`CommitPolicy`]
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     ┌─────────────────┐
//! │ AddressSource │────▶│ AddressSelector │
//! └───────────────┘     └─────────────────┘
//!                                │ chosen
//!                                ▼
//!                       ┌────────────────┐      ┌──────────┐
//!                       │ ReportingAgent │─────▶│ Reporter │
//!                       └────────────────┘      └──────────┘
//!                          │           │
//!                          ▼           ▼
//!                   ┌────────────┐ ┌─────────┐
//!                   │ AgentState │ │ Events  │
//!                   └────────────┘ └─────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Query the interface (failure: log, skip the tick)
//! 2. Select an address (none: warn, skip the tick)
//! 3. Same as the committed address: nothing to do
//! 4. Otherwise report it, then commit per policy
//! 5. Sleep `check_interval`, repeat
//!
//! A tick always runs to completion; shutdown is only observed while
//! sleeping.

use std::future::Future;
use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::config::{AgentConfig, CommitPolicy};
use crate::error::{QueryError, ReportError, Result};
use crate::selector::{AddressSelector, SelectionOutcome};
use crate::state::AgentState;
use crate::traits::{AddressSource, Reporter};

/// Events emitted by the ReportingAgent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentEvent {
    /// Agent started
    Started {
        interface: String,
    },

    /// Interface lookup failed
    QueryFailed {
        error: String,
    },

    /// No address could be selected
    NoSuitableAddress {
        outcome: SelectionOutcome,
    },

    /// The selected address equals the committed one
    AddressUnchanged {
        address: Ipv6Addr,
    },

    /// A new address was selected and is about to be reported
    AddressChanged {
        previous: Option<Ipv6Addr>,
        new: Ipv6Addr,
    },

    /// The server accepted the report
    ReportSucceeded {
        address: Ipv6Addr,
    },

    /// The report failed
    ReportFailed {
        address: Ipv6Addr,
        error: String,
        committed: bool,
    },

    /// A collaborator failed unexpectedly (e.g. panicked)
    TickFaulted {
        error: String,
    },

    /// Agent stopped
    Stopped {
        reason: String,
    },
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The address source failed; state untouched
    QueryFailed(QueryError),

    /// Nothing eligible on the interface; state untouched
    NoSuitableAddress(SelectionOutcome),

    /// The selected address was already committed
    Unchanged(Ipv6Addr),

    /// The address was reported and committed
    Reported {
        address: Ipv6Addr,
        previous: Option<Ipv6Addr>,
    },

    /// The report failed; `committed` tells whether the state still moved
    ReportFailed {
        address: Ipv6Addr,
        error: ReportError,
        committed: bool,
    },

    /// A collaborator failed unexpectedly; state untouched
    Faulted(String),
}

impl TickOutcome {
    /// Whether the reporter was called during the tick
    pub fn reporter_invoked(&self) -> bool {
        matches!(self, TickOutcome::Reported { .. } | TickOutcome::ReportFailed { .. })
    }
}

/// Periodic IPv6 reporting loop
///
/// Owns its [`AgentState`]; several agents can run side by side.
///
/// ## Lifecycle
///
/// 1. Create with [`ReportingAgent::new()`]
/// 2. Start with [`ReportingAgent::run_until()`]
/// 3. The agent ticks until the shutdown future resolves
///
/// Individual ticks can also be driven with [`ReportingAgent::tick()`].
pub struct ReportingAgent {
    /// Interface address lookup
    address_source: Arc<dyn AddressSource>,

    /// Delivery of selected addresses
    reporter: Arc<dyn Reporter>,

    /// Address classification
    selector: AddressSelector,

    /// Monitored interface
    interface: String,

    /// Sleep between ticks
    check_interval: Duration,

    /// Upper bound for one report
    report_timeout: Duration,

    /// When to commit a reported address
    commit_policy: CommitPolicy,

    /// Loop state
    state: AgentState,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<AgentEvent>,
}

impl ReportingAgent {
    /// Create a new reporting agent
    ///
    /// # Parameters
    ///
    /// - `address_source`: Interface address lookup
    /// - `reporter`: Reporter implementation
    /// - `config`: Agent configuration
    ///
    /// # Returns
    ///
    /// A tuple of (agent, event_receiver) where event_receiver yields agent events
    pub fn new(
        address_source: Arc<dyn AddressSource>,
        reporter: Arc<dyn Reporter>,
        config: &AgentConfig,
    ) -> Result<(Self, mpsc::Receiver<AgentEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let agent = Self {
            address_source,
            reporter,
            selector: AddressSelector::new(config.eui64_detector),
            interface: config.interface.clone(),
            check_interval: config.check_interval(),
            report_timeout: config.report_timeout(),
            commit_policy: config.commit_policy,
            state: AgentState::new(),
            event_tx: tx,
        };

        Ok((agent, rx))
    }

    /// Current loop state
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Monitored interface
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Run the agent until `shutdown` resolves
    ///
    /// The shutdown future is only polled between ticks, so a tick in
    /// progress always completes.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Monitoring interface {} every {:?}",
            self.interface, self.check_interval
        );
        self.emit_event(AgentEvent::Started {
            interface: self.interface.clone(),
        });

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.check_interval) => {}
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(AgentEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }
            }
        }

        info!("Agent stopped");
    }

    /// Run one tick: query, select, maybe report, update state
    pub async fn tick(&mut self) -> TickOutcome {
        let source = Arc::clone(&self.address_source);
        let interface = self.interface.clone();
        let queried =
            tokio::spawn(async move { source.query_addresses(&interface).await }).await;

        let table = match queried {
            Ok(Ok(table)) => table,
            Ok(Err(e)) => {
                error!("Error querying interface {}: {}", self.interface, e);
                self.emit_event(AgentEvent::QueryFailed {
                    error: e.to_string(),
                });
                return TickOutcome::QueryFailed(e);
            }
            Err(e) => return self.fault(format!("address source failed: {}", e)),
        };

        let selection = self.selector.select(&self.interface, &table);

        let Some(address) = selection.chosen else {
            warn!(
                "No suitable IPv6 address detected on interface {} ({:?})",
                self.interface, selection.outcome
            );
            self.emit_event(AgentEvent::NoSuitableAddress {
                outcome: selection.outcome,
            });
            return TickOutcome::NoSuitableAddress(selection.outcome);
        };

        if !self.state.is_new(address) {
            debug!("IPv6 address unchanged: {}", address);
            self.emit_event(AgentEvent::AddressUnchanged { address });
            return TickOutcome::Unchanged(address);
        }

        let previous = self.state.last_reported_address();
        info!(
            "IPv6 address changed: {} -> {}",
            previous.map(|ip| ip.to_string()).unwrap_or("None".to_string()),
            address
        );
        self.emit_event(AgentEvent::AddressChanged {
            previous,
            new: address,
        });

        let result = self.attempt_report(address).await;
        let succeeded = result.is_ok();
        self.state.record_attempt(address, succeeded);

        let committed = self.commit_policy.commits(succeeded);
        if committed {
            self.state.commit(address);
        }

        match result {
            Ok(()) => {
                info!("Successfully reported IP address: {}", address);
                self.emit_event(AgentEvent::ReportSucceeded { address });
                TickOutcome::Reported { address, previous }
            }
            Err(e) => {
                error!(
                    "Failed to report IP address {} via {}: {}",
                    address,
                    self.reporter.reporter_name(),
                    e
                );
                if !committed {
                    debug!("Address {} not committed, will retry next tick", address);
                }
                self.emit_event(AgentEvent::ReportFailed {
                    address,
                    error: e.to_string(),
                    committed,
                });
                TickOutcome::ReportFailed {
                    address,
                    error: e,
                    committed,
                }
            }
        }
    }

    /// Perform a single report attempt, bounded by the report timeout
    ///
    /// A panicking reporter is turned into [`ReportError::Unexpected`].
    async fn attempt_report(&self, address: Ipv6Addr) -> std::result::Result<(), ReportError> {
        let reporter = Arc::clone(&self.reporter);
        let mut handle = tokio::spawn(async move { reporter.report(address).await });

        match tokio::time::timeout(self.report_timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ReportError::Unexpected(e.to_string())),
            Err(_) => {
                handle.abort();
                Err(ReportError::Timeout(self.report_timeout))
            }
        }
    }

    fn fault(&self, message: String) -> TickOutcome {
        error!("Error in reporting loop: {}", message);
        self.emit_event(AgentEvent::TickFaulted {
            error: message.clone(),
        });
        TickOutcome::Faulted(message)
    }

    /// Emit an agent event
    fn emit_event(&self, event: AgentEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("Event channel full, dropping event: {:?}", event);
            }
            // The daemon drops the receiver
            Err(TrySendError::Closed(_)) => {
                debug!("Event channel closed, dropping event");
            }
        }
    }
}
