use cerebus_core::{ConnectionError, ConnectionManager, SdkStatus};
use std::panic::{self, AssertUnwindSafe};

mod common;
use common::fake_sdk::FakeSdk;
use common::init_test_logging;

#[test]
fn guard_disconnects_at_end_of_scope() {
    init_test_logging();
    let (fake_sdk, log) = FakeSdk::new();
    let mut manager = ConnectionManager::new(Box::new(fake_sdk));

    {
        let mut session = manager.session().expect("entering the scope connects");
        assert!(session.is_connected());
        let (status, _) = session.get_continuous_data().expect("data inside the scope");
        assert!(status.is_ok());
    }

    assert!(!manager.is_connected());
    assert_eq!(log.opens(), 1);
    assert_eq!(log.closes(), 1);
}

#[test]
fn with_session_disconnects_when_the_block_fails() {
    init_test_logging();
    let (fake_sdk, log) = FakeSdk::new();
    let mut manager = ConnectionManager::new(Box::new(fake_sdk));

    let result = manager.with_session(|session| -> anyhow::Result<()> {
        session.get_event_data()?;
        anyhow::bail!("analysis blew up")
    });

    assert!(result.is_err());
    assert!(!manager.is_connected());
    assert_eq!(log.closes(), 1);
}

#[test]
fn with_session_returns_the_block_value() {
    let (fake_sdk, _log) = FakeSdk::new();
    let mut manager = ConnectionManager::new(Box::new(fake_sdk));

    let time = manager
        .with_session(|session| session.time().map(|(_, time)| time))
        .expect("block succeeds");

    assert_eq!(time, 1234);
    assert!(!manager.is_connected());
}

#[test]
fn guard_disconnects_while_unwinding() {
    init_test_logging();
    let (fake_sdk, log) = FakeSdk::new();
    let mut manager = ConnectionManager::new(Box::new(fake_sdk));

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _session = manager.session().expect("connect");
        panic!("boom");
    }));

    assert!(outcome.is_err());
    assert!(!manager.is_connected());
    assert_eq!(log.closes(), 1);
}

#[test]
fn failed_entry_never_runs_the_block() {
    let (fake_sdk, log) = FakeSdk::new();
    let mut manager =
        ConnectionManager::new(Box::new(fake_sdk.with_open_status(SdkStatus::ERR_OPEN_UDP)));
    let mut ran = false;

    let result: Result<(), ConnectionError> = manager.with_session(|_| {
        ran = true;
        Ok(())
    });

    assert!(matches!(result, Err(ConnectionError::Connect { .. })));
    assert!(!ran);
    assert_eq!(log.closes(), 0);
}

#[test]
fn explicit_close_reports_close_failures() {
    let (fake_sdk, log) = FakeSdk::new();
    let mut manager =
        ConnectionManager::new(Box::new(fake_sdk.with_close_status(SdkStatus::CLOSED)));

    let session = manager.session().expect("connect");
    let err = session.close().expect_err("close status is surfaced");

    assert_eq!(err.status(), Some(SdkStatus::CLOSED));
    assert!(!manager.is_connected());
    assert_eq!(log.closes(), 1, "drop after close must not close again");
}
