//! Contract Test: Commit Policy
//!
//! This test verifies how report failures move the agent state.
//!
//! Constraints verified:
//! - `CommitPolicy::Always` commits the address even when the report fails,
//!   so the same address is never re-reported on the next tick
//! - Timeouts and panicking reporters count as ordinary report failures
//! - `CommitPolicy::OnSuccess` keeps retrying until the server accepts
//!
//! If this test fails with `Always`, the agent may hot-loop against an
//! unreachable server.

mod common;

use autodns_core::{CommitPolicy, ReportError, ReportingAgent, TickOutcome};
use common::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn rejected_report_still_commits_address() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::rejecting(500));

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &minimal_config())
            .expect("agent construction succeeds");

    let first = agent.tick().await;
    match first {
        TickOutcome::ReportFailed { address, error, committed } => {
            assert_eq!(address, ip("2001:db8::9c1e:4a2b:7f10:33d1"));
            assert_eq!(error.status(), Some(500));
            assert!(committed);
        }
        other => panic!("expected ReportFailed, got {:?}", other),
    }
    assert_eq!(
        agent.state().last_reported_address(),
        Some(ip("2001:db8::9c1e:4a2b:7f10:33d1"))
    );

    let second = agent.tick().await;
    assert_eq!(second, TickOutcome::Unchanged(ip("2001:db8::9c1e:4a2b:7f10:33d1")));
    assert_eq!(reporter.report_call_count(), 1);

    let attempt = agent.state().last_attempt().expect("attempt recorded");
    assert!(!attempt.succeeded);
}

#[tokio::test]
async fn network_failure_still_commits_address() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::new(ReporterBehavior::Fail(ReportError::network(
        "connection refused",
    ))));

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &minimal_config())
            .expect("agent construction succeeds");

    for _ in 0..3 {
        agent.tick().await;
    }

    assert_eq!(reporter.report_call_count(), 1);
}

#[tokio::test]
async fn failed_address_is_replaced_by_next_change() {
    let source = Arc::new(ScriptedAddressSource::new(vec![
        Ok(table(&["2001:db8::a:b:c:1"])),
        Ok(table(&["2001:db8::a:b:c:1"])),
        Ok(table(&["2001:db8::a:b:c:2"])),
    ]));
    let reporter = Arc::new(MockReporter::rejecting(503));

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &minimal_config())
            .expect("agent construction succeeds");

    for _ in 0..3 {
        agent.tick().await;
    }

    assert_eq!(
        reporter.reported(),
        vec![ip("2001:db8::a:b:c:1"), ip("2001:db8::a:b:c:2")]
    );
}

#[tokio::test(start_paused = true)]
async fn hanging_reporter_times_out_and_commits() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::new(ReporterBehavior::Hang));

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &minimal_config())
            .expect("agent construction succeeds");

    let outcome = agent.tick().await;
    assert_eq!(
        outcome,
        TickOutcome::ReportFailed {
            address: ip("2001:db8::9c1e:4a2b:7f10:33d1"),
            error: ReportError::Timeout(Duration::from_secs(10)),
            committed: true,
        }
    );

    agent.tick().await;
    assert_eq!(reporter.report_call_count(), 1);
}

#[tokio::test]
async fn panicking_reporter_is_a_failed_report() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::new(ReporterBehavior::Panic));

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &minimal_config())
            .expect("agent construction succeeds");

    let outcome = agent.tick().await;
    match outcome {
        TickOutcome::ReportFailed { error: ReportError::Unexpected(_), committed, .. } => {
            assert!(committed);
        }
        other => panic!("expected unexpected ReportFailed, got {:?}", other),
    }

    assert_eq!(agent.tick().await, TickOutcome::Unchanged(ip("2001:db8::9c1e:4a2b:7f10:33d1")));
}

#[tokio::test]
async fn on_success_policy_retries_failed_address() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::rejecting(500));
    let config = minimal_config().with_commit_policy(CommitPolicy::OnSuccess);

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &config).expect("agent construction succeeds");

    for _ in 0..3 {
        match agent.tick().await {
            TickOutcome::ReportFailed { committed, .. } => assert!(!committed),
            other => panic!("expected ReportFailed, got {:?}", other),
        }
    }

    assert_eq!(reporter.report_call_count(), 3);
    assert_eq!(agent.state().last_reported_address(), None);
}

#[tokio::test]
async fn on_success_policy_commits_after_success() {
    let source = Arc::new(ScriptedAddressSource::fixed(&["2001:db8::9c1e:4a2b:7f10:33d1"]));
    let reporter = Arc::new(MockReporter::accepting());
    let config = minimal_config().with_commit_policy(CommitPolicy::OnSuccess);

    let (mut agent, _event_rx) =
        ReportingAgent::new(source, reporter.clone(), &config).expect("agent construction succeeds");

    agent.tick().await;
    agent.tick().await;

    assert_eq!(reporter.report_call_count(), 1);
}
