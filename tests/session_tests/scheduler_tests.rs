//! Tests for command scheduling
//!
//! These tests verify:
//! - A command is written only when the connection is free
//! - Queued commands run one at a time, in issue order
//! - Success, default and channel completions
//! - A failed command stalls the queue
//! - Behaviour after the transport closes

use bytes::Bytes;
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use xqwire::network::RecordingTransport;
use xqwire::session::{Completion, Credentials, Handler, Notification, Notifier, Phase};
use xqwire::{Reply, SessionCore, WireError};

// =============================================================================
// Helper Functions
// =============================================================================

/// A logged-in session with its sent bytes cleared
fn logged_in() -> (SessionCore, RecordingTransport, Receiver<Notification>) {
    let transport = RecordingTransport::new();
    let mut core = SessionCore::new(
        Box::new(transport.clone()),
        Credentials::new("admin", "admin"),
        Notifier::new(),
        8,
    );
    let notifications = core.subscribe();

    core.start().unwrap();
    core.on_data(Bytes::from_static(b"abc123\0\x00")).unwrap();
    assert_eq!(core.phase(), Phase::Ready);
    assert_eq!(notifications.try_recv().unwrap(), Notification::LoggedIn);
    transport.take();

    (core, transport, notifications)
}

fn recording_handler(tx: Sender<(String, String)>) -> Completion {
    Completion::Handler(Box::new(move |result, info| {
        tx.send((result, info)).unwrap();
    }))
}

fn success(result: &str) -> Bytes {
    let mut wire = result.as_bytes().to_vec();
    wire.extend_from_slice(b"\0\0\x00");
    Bytes::from(wire)
}

// =============================================================================
// Single Command Tests
// =============================================================================

#[test]
fn test_command_sent_when_idle() {
    let (mut core, transport, _notifications) = logged_in();
    let (tx, rx) = unbounded();

    core.execute("xquery <foo/>", recording_handler(tx)).unwrap();

    assert_eq!(transport.take(), b"xquery <foo/>\0".to_vec());
    assert!(core.is_busy());

    core.on_data(Bytes::from_static(b"<foo/>\0\0\x00")).unwrap();

    assert_eq!(rx.try_recv().unwrap(), ("<foo/>".to_string(), String::new()));
    assert!(!core.is_busy());
    assert_eq!(core.buffered(), 0);
}

#[test]
fn test_command_text_is_escaped() {
    let (mut core, transport, _notifications) = logged_in();

    core.execute("a\u{0}b", Completion::Default).unwrap();

    assert_eq!(transport.take(), vec![b'a', 0xFF, 0x00, b'b', 0x00]);
}

#[test]
fn test_reply_fragmented_byte_by_byte() {
    let (mut core, _transport, _notifications) = logged_in();
    let (tx, rx) = unbounded();
    core.execute("xquery 1", recording_handler(tx)).unwrap();

    for &b in b"result\0some info\0\x00" {
        assert!(rx.try_recv().is_err());
        core.on_data(Bytes::copy_from_slice(&[b])).unwrap();
    }

    assert_eq!(
        rx.try_recv().unwrap(),
        ("result".to_string(), "some info".to_string())
    );
}

#[test]
fn test_default_completion_emits_result() {
    let (mut core, _transport, notifications) = logged_in();

    core.execute("info", None::<Handler>).unwrap();
    core.on_data(Bytes::from_static(b"out\0took 1ms\0\x00")).unwrap();

    assert_eq!(
        notifications.try_recv().unwrap(),
        Notification::Result {
            result: "out".to_string(),
            info: "took 1ms".to_string(),
            code: 0,
        }
    );
}

#[test]
fn test_reply_completion_receives_reply() {
    let (mut core, _transport, _notifications) = logged_in();
    let (tx, rx) = bounded(1);

    core.execute("xquery 2", Completion::Reply(tx)).unwrap();
    core.on_data(success("2")).unwrap();

    assert_eq!(rx.try_recv().unwrap().unwrap(), Reply::new("2", ""));
}

// =============================================================================
// Queueing Tests
// =============================================================================

#[test]
fn test_second_command_waits_for_full_reply() {
    let (mut core, transport, _notifications) = logged_in();

    core.execute("xquery <a/>", Completion::Default).unwrap();
    core.execute("xquery <b/>", Completion::Default).unwrap();
    assert_eq!(transport.take(), b"xquery <a/>\0".to_vec());
    assert_eq!(core.queued(), 1);

    // Both strings but not the status byte
    core.on_data(Bytes::from_static(b"<a/>\0\0")).unwrap();
    assert!(transport.sent().is_empty());

    core.on_data(Bytes::from_static(&[0x00])).unwrap();
    assert_eq!(transport.take(), b"xquery <b/>\0".to_vec());
    assert_eq!(core.queued(), 0);
    assert!(core.is_busy());
}

#[test]
fn test_queued_commands_run_in_issue_order() {
    let (mut core, transport, _notifications) = logged_in();
    let (tx, rx) = unbounded();

    for i in 0..5 {
        let tx = tx.clone();
        core.execute(
            format!("cmd {}", i),
            Completion::Handler(Box::new(move |result, _| tx.send(result).unwrap())),
        )
        .unwrap();
    }
    assert_eq!(core.queued(), 4);

    for i in 0..5 {
        let expected = format!("cmd {}\0", i).into_bytes();
        assert_eq!(transport.take(), expected);
        assert!(core.is_busy());

        core.on_data(success(&format!("r{}", i))).unwrap();
        assert_eq!(rx.try_recv().unwrap(), format!("r{}", i));
    }

    assert!(!core.is_busy());
    assert_eq!(core.queued(), 0);
    assert!(transport.sent().is_empty());
}

#[test]
fn test_replies_in_one_chunk_drain_whole_queue() {
    let (mut core, transport, _notifications) = logged_in();
    let (tx, rx) = unbounded();

    for name in ["a", "b", "c"] {
        let tx = tx.clone();
        core.execute(
            name,
            Completion::Handler(Box::new(move |result, _| tx.send(result).unwrap())),
        )
        .unwrap();
    }

    core.on_data(Bytes::from_static(b"1\0\0\x002\0\0\x003\0\0\x00")).unwrap();

    let results: Vec<String> = rx.try_iter().collect();
    assert_eq!(results, vec!["1", "2", "3"]);
    assert_eq!(transport.take(), b"a\0b\0c\0".to_vec());
    assert!(!core.is_busy());
}

#[test]
fn test_status_snapshot() {
    let (mut core, _transport, _notifications) = logged_in();
    core.execute("one", Completion::Default).unwrap();
    core.execute("two", Completion::Default).unwrap();

    let status = core.status();
    assert_eq!(status.phase, Phase::Ready);
    assert!(status.busy);
    assert_eq!(status.queued, 1);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_failed_command_reports_error_and_skips_handler() {
    let (mut core, _transport, notifications) = logged_in();
    let (tx, rx) = unbounded();

    core.execute("xquery 1 +", recording_handler(tx)).unwrap();
    core.on_data(Bytes::from_static(b"\0Incomplete expression\0\x01")).unwrap();

    assert!(rx.try_recv().is_err());
    match notifications.try_recv().unwrap() {
        Notification::Error { message } => {
            assert!(message.contains("xquery 1 +"));
            assert!(message.contains("Incomplete expression"));
        }
        other => panic!("Expected error notification, got {:?}", other),
    }
}

#[test]
fn test_failed_command_stalls_queue() {
    let (mut core, transport, _notifications) = logged_in();

    core.execute("bad", Completion::Default).unwrap();
    core.execute("good", Completion::Default).unwrap();
    transport.take();

    core.on_data(Bytes::from_static(b"\0error\0\x01")).unwrap();

    assert!(core.is_busy());
    assert_eq!(core.queued(), 1);
    assert!(transport.sent().is_empty());

    core.execute("later", Completion::Default).unwrap();
    assert_eq!(core.queued(), 2);
    assert!(transport.sent().is_empty());
}

#[test]
fn test_reply_completion_receives_failure() {
    let (mut core, _transport, _notifications) = logged_in();
    let (tx, rx) = bounded(1);

    core.execute("drop db", Completion::Reply(tx)).unwrap();
    core.on_data(Bytes::from_static(b"\0not found\0\x01")).unwrap();

    match rx.try_recv().unwrap() {
        Err(WireError::CommandFailed { command, info }) => {
            assert_eq!(command, "drop db");
            assert_eq!(info, "not found");
        }
        other => panic!("Expected CommandFailed, got {:?}", other),
    }
}

// =============================================================================
// Closure Tests
// =============================================================================

#[test]
fn test_close_drops_queue_and_notifies() {
    let (mut core, _transport, notifications) = logged_in();
    let (queued_tx, queued_rx) = bounded(1);

    core.execute("running", Completion::Default).unwrap();
    core.execute("waiting", Completion::Reply(queued_tx)).unwrap();

    core.on_close();

    assert_eq!(core.phase(), Phase::Closed);
    assert!(core.is_busy());
    assert_eq!(core.queued(), 0);
    assert!(!core.has_pending_read());
    assert_eq!(
        notifications.try_recv().unwrap(),
        Notification::Closed { dropped: 1 }
    );
    // Its sender was dropped with the queue
    assert!(queued_rx.recv().is_err());
}

#[test]
fn test_execute_after_close_fails() {
    let (mut core, transport, _notifications) = logged_in();
    core.on_close();
    let (tx, rx) = bounded(1);

    let result = core.execute("xquery 1", Completion::Reply(tx));

    assert!(matches!(result, Err(WireError::Closed)));
    assert!(matches!(rx.try_recv().unwrap(), Err(WireError::Closed)));
    assert!(transport.sent().is_empty());
}

#[test]
fn test_data_after_close_is_ignored() {
    let (mut core, _transport, _notifications) = logged_in();
    core.on_close();

    core.on_data(Bytes::from_static(b"late\0")).unwrap();
    assert_eq!(core.buffered(), 0);
}

#[test]
fn test_dropped_subscriber_is_forgotten() {
    let (mut core, _transport, notifications) = logged_in();
    assert_eq!(core.status().subscribers, 1);

    drop(notifications);
    core.execute("info", Completion::Default).unwrap();
    core.on_data(success("out")).unwrap();

    assert_eq!(core.status().subscribers, 0);
}

#[test]
fn test_close_is_idempotent() {
    let (mut core, _transport, notifications) = logged_in();
    core.on_close();
    core.on_close();

    assert_eq!(
        notifications.try_recv().unwrap(),
        Notification::Closed { dropped: 0 }
    );
    assert!(notifications.try_recv().is_err());
}
