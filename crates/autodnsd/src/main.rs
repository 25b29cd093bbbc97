// # autodnsd - IPv6 Reporting Daemon
//
// This daemon is a THIN integration layer: all decisions (address
// selection, change detection, commit policy) live in autodns-core.
//
// The autodnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the address source and reporter into a ReportingAgent
// 4. Stopping cleanly on SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `SERVER_URL`: Base URL of the gateway server (required)
// - `API_TOKEN`: Token sent as `X-API-Token` (required)
// - `NETWORK_INTERFACE`: Interface to monitor, not `lo` (required)
// - `CHECK_INTERVAL`: Seconds between checks (default: 5)
// - `REPORT_TIMEOUT`: Seconds before a report is abandoned (default: 10)
// - `COMMIT_POLICY`: `always` or `on_success` (default: always)
// - `EUI64_DETECTOR`: `textual` or `bitwise` (default: textual)
// - `LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export SERVER_URL=https://gateway.example.com
// export API_TOKEN=your_token
// export NETWORK_INTERFACE=eth0
// export CHECK_INTERVAL=5
//
// autodnsd
// ```

use anyhow::{Context, Result};
use autodns_core::config::{AgentConfig, CommitPolicy, ServerConfig};
use autodns_core::selector::Eui64Detector;
use autodns_core::ReportingAgent;
use autodns_ip_ifaddrs::IfAddrsSource;
use autodns_reporter_http::HttpReporter;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum AutodnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AutodnsExitCode> for ExitCode {
    fn from(code: AutodnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    server_url: String,
    api_token: String,
    network_interface: String,
    check_interval: u64,
    report_timeout: u64,
    commit_policy: CommitPolicy,
    eui64_detector: Eui64Detector,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} environment variable is not set", key))
        };

        let number = |key: &str, default: u64| -> Result<u64> {
            match lookup(key) {
                Some(v) => v
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a positive integer. Got: {}", key, v)),
                None => Ok(default),
            }
        };

        Ok(Self {
            server_url: required("SERVER_URL")?,
            api_token: required("API_TOKEN")?,
            network_interface: required("NETWORK_INTERFACE")?,
            check_interval: number("CHECK_INTERVAL", 5)?,
            report_timeout: number("REPORT_TIMEOUT", 10)?,
            commit_policy: lookup("COMMIT_POLICY")
                .map(|v| v.parse::<CommitPolicy>())
                .transpose()?
                .unwrap_or_default(),
            eui64_detector: lookup("EUI64_DETECTOR")
                .map(|v| v.parse::<Eui64Detector>())
                .transpose()?
                .unwrap_or_default(),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the agent configuration
    fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig::new(
            self.network_interface.clone(),
            ServerConfig::new(self.server_url.clone(), self.api_token.clone()),
        )
        .with_check_interval_secs(self.check_interval)
        .with_commit_policy(self.commit_policy)
        .with_eui64_detector(self.eui64_detector);
        config.report_timeout_secs = self.report_timeout;
        config
    }

    /// Validate the configuration
    ///
    /// This performs validation including:
    /// - Agent configuration (interface, interval, URL scheme, token presence)
    /// - Placeholder tokens
    /// - Numeric ranges
    /// - Log level
    fn validate(&self) -> Result<()> {
        self.agent_config().validate()?;

        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token") || token_lower.contains("replace_me") {
            anyhow::bail!(
                "API_TOKEN appears to be a placeholder. \
                Use the token configured on the gateway server."
            );
        }

        if self.check_interval > 86_400 {
            anyhow::bail!(
                "CHECK_INTERVAL must be between 1 and 86400 seconds. Got: {}",
                self.check_interval
            );
        }

        if self.report_timeout > 300 {
            anyhow::bail!(
                "REPORT_TIMEOUT must be between 1 and 300 seconds. Got: {}",
                self.report_timeout
            );
        }

        if self.server_url.starts_with("http://") {
            eprintln!(
                "WARNING: SERVER_URL uses HTTP (not HTTPS). \
                The API token is sent in clear text."
            );
        }

        // Validate log level
        parse_log_level(&self.log_level)?;

        Ok(())
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return AutodnsExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return AutodnsExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = parse_log_level(&config.log_level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AutodnsExitCode::ConfigError.into();
    }

    info!("Starting autodnsd");
    info!("Server URL: {}", config.server_url);
    info!("Check interval: {} seconds", config.check_interval);
    info!("Monitoring network interface: {}", config.network_interface);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AutodnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            AutodnsExitCode::RuntimeError
        } else {
            AutodnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let agent_config = config.agent_config();

    let reporter = HttpReporter::new(&agent_config.server, agent_config.report_timeout())
        .context("Failed to create HTTP reporter")?;
    info!("Reporting to {}", reporter.url());

    let (mut agent, events) = ReportingAgent::new(
        Arc::new(IfAddrsSource::new()),
        Arc::new(reporter),
        &agent_config,
    )
    .context("Failed to create reporting agent")?;

    // Everything worth knowing is already logged by the agent
    drop(events);

    let shutdown = shutdown_signal()?;
    agent.run_until(shutdown).await;

    info!("Shutting down daemon");
    Ok(())
}

/// Resolve on SIGTERM or SIGINT
///
/// The handlers are installed before the agent starts, so a signal that
/// arrives during the first tick is not lost.
#[cfg(unix)]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received shutdown signal: {}", name);
    })
}

/// Resolve on ctrl-c
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal: SIGINT"),
            Err(e) => {
                error!("Failed to wait for CTRL-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    })
}
