//! Dispatch Pipeline Tests
//!
//! Producer threads -> RequestQueue -> Dispatcher workers -> RequestHandler

use smq_core::application::{Dispatcher, DispatcherConfig};
use smq_core::domain::{NewRequest, RequestId};
use smq_core::port::id_provider::SequentialIdProvider;
use smq_core::port::request_handler::mocks::{MockBehavior, MockRequestHandler};
use smq_core::port::time_provider::SystemTimeProvider;
use smq_core::{Queue, RequestQueue};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn new_request(i: usize) -> NewRequest {
    NewRequest {
        method: "POST".to_string(),
        target: format!("/jobs/{}", i),
        payload: Some(format!("{{\"n\":{}}}", i)),
    }
}

#[test]
fn test_pipeline_every_request_handled_once() {
    let queue: Arc<RequestQueue> = Arc::new(Queue::new());
    let handler = Arc::new(MockRequestHandler::new_success());
    let ids = Arc::new(SequentialIdProvider::new("req"));

    let handle = Dispatcher::new(
        Arc::clone(&queue),
        handler.clone(),
        DispatcherConfig {
            workers: 4,
            poll_timeout: Duration::from_millis(10),
        },
    )
    .start()
    .unwrap();

    let producers: Vec<_> = (0..3)
        .map(|p| {
            let q = Arc::clone(&queue);
            let ids = Arc::clone(&ids);
            thread::spawn(move || {
                for i in 0..100 {
                    let req = new_request(p * 100 + i)
                        .into_request(ids.as_ref(), &SystemTimeProvider)
                        .unwrap();
                    assert!(q.push(req).unwrap().is_enqueued());
                }
            })
        })
        .collect();
    for p in producers {
        p.join().unwrap();
    }

    handle.shutdown();
    let report = handle.join().unwrap();

    assert_eq!(report.handled, 300);
    let seen: HashSet<RequestId> = handler.seen_ids().into_iter().collect();
    assert_eq!(seen.len(), 300);
    assert_eq!(queue.stats().popped, 300);
}

#[test]
fn test_single_worker_preserves_fifo() {
    let queue: Arc<RequestQueue> = Arc::new(Queue::new());
    let handler = Arc::new(MockRequestHandler::new_success());
    let ids = SequentialIdProvider::new("req");

    for i in 0..20 {
        let req = new_request(i).into_request(&ids, &SystemTimeProvider).unwrap();
        let _ = queue.push(req).unwrap();
    }
    queue.shutdown();

    let report = Dispatcher::new(
        Arc::clone(&queue),
        handler.clone(),
        DispatcherConfig {
            workers: 1,
            ..Default::default()
        },
    )
    .start()
    .unwrap()
    .join()
    .unwrap();

    assert_eq!(report.handled, 20);
    let expected: Vec<RequestId> = (1..=20).map(|n| RequestId::new(format!("req-{}", n))).collect();
    assert_eq!(handler.seen_ids(), expected);
}

#[test]
fn test_pipeline_isolates_failures_and_panics() {
    let queue: Arc<RequestQueue> = Arc::new(Queue::new());
    let handler = Arc::new(MockRequestHandler::new_fail("downstream unavailable"));
    let ids = SequentialIdProvider::new("req");

    let handle = Dispatcher::new(
        Arc::clone(&queue),
        handler.clone(),
        DispatcherConfig {
            workers: 2,
            poll_timeout: Duration::from_millis(10),
        },
    )
    .start()
    .unwrap();

    let push = |i| {
        let req = new_request(i).into_request(&ids, &SystemTimeProvider).unwrap();
        let _ = queue.push(req).unwrap();
    };

    for i in 0..3 {
        push(i);
    }
    while handler.call_count() < 3 {
        thread::sleep(Duration::from_millis(5));
    }

    handler.set_behavior(MockBehavior::Panic("handler bug".to_string()));
    for i in 3..5 {
        push(i);
    }
    while handler.call_count() < 5 {
        thread::sleep(Duration::from_millis(5));
    }

    handler.set_behavior(MockBehavior::Success);
    for i in 5..10 {
        push(i);
    }

    handle.shutdown();
    let report = handle.join().unwrap();

    assert_eq!(report.failed, 3);
    assert_eq!(report.panicked, 2);
    assert_eq!(report.handled, 5);
}

#[test]
fn test_slow_handler_drains_backlog_after_shutdown() {
    let queue: Arc<RequestQueue> = Arc::new(Queue::new());
    let handler = Arc::new(MockRequestHandler::new_slow(Duration::from_millis(5)));
    let ids = SequentialIdProvider::new("req");

    let handle = Dispatcher::new(
        Arc::clone(&queue),
        handler.clone(),
        DispatcherConfig {
            workers: 2,
            poll_timeout: Duration::from_millis(10),
        },
    )
    .start()
    .unwrap();

    for i in 0..40 {
        let req = new_request(i).into_request(&ids, &SystemTimeProvider).unwrap();
        let _ = queue.push(req).unwrap();
    }

    // Shut down with a backlog still queued; workers finish it before exiting
    handle.shutdown();
    let late = new_request(99).into_request(&ids, &SystemTimeProvider).unwrap();
    assert!(queue.push(late).unwrap().into_rejected().is_some());

    let report = handle.join().unwrap();
    assert_eq!(report.handled, 40);
    assert!(queue.is_empty());
}
