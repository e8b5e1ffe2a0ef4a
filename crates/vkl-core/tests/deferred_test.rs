//! Tests for the deferred-operation ledger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use vkl_core::DeferredLedger;

#[test]
fn test_closures_accumulate_per_operation() {
    let ledger = DeferredLedger::new();
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let ran = Arc::clone(&ran);
        ledger.on_completion(7, Box::new(move || {
            ran.fetch_add(1, Ordering::SeqCst);
        }));
    }
    assert!(ledger.is_pending(7));
    assert_eq!(ledger.len(), 1);

    let entry = ledger.pop(7).expect("entry parked");
    assert_eq!(entry.completion_count(), 3);
    assert!(ledger.pop(7).is_none());

    entry.complete(false);
    assert_eq!(ran.load(Ordering::SeqCst), 3);
}

#[test]
fn test_success_closures_receive_outputs() {
    let ledger = DeferredLedger::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    ledger.on_outputs(1, Box::new(|| vec![10, 11]));
    ledger.on_outputs(1, Box::new(|| vec![12]));
    let sink = Arc::clone(&seen);
    ledger.on_success(1, Box::new(move |created| sink.lock().extend_from_slice(created)));

    assert!(ledger.complete(1, true));
    assert_eq!(*seen.lock(), vec![10, 11, 12]);
    assert!(!ledger.is_pending(1));
}

#[test]
fn test_failure_skips_outputs_and_success() {
    let ledger = DeferredLedger::new();
    let completed = Arc::new(AtomicUsize::new(0));
    let produced = Arc::new(AtomicUsize::new(0));
    let succeeded = Arc::new(AtomicUsize::new(0));

    let c = Arc::clone(&completed);
    ledger.on_completion(2, Box::new(move || {
        c.fetch_add(1, Ordering::SeqCst);
    }));
    let p = Arc::clone(&produced);
    ledger.on_outputs(2, Box::new(move || {
        p.fetch_add(1, Ordering::SeqCst);
        vec![1]
    }));
    let s = Arc::clone(&succeeded);
    ledger.on_success(2, Box::new(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(ledger.complete(2, false));
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(produced.load(Ordering::SeqCst), 0);
    assert_eq!(succeeded.load(Ordering::SeqCst), 0);
}

#[test]
fn test_discard_drops_without_running() {
    let ledger = DeferredLedger::new();
    let ran = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&ran);
    ledger.on_completion(3, Box::new(move || {
        r.fetch_add(1, Ordering::SeqCst);
    }));

    ledger.discard(3);
    assert!(ledger.is_empty());
    assert!(!ledger.complete(3, true));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn test_closure_may_reenter_ledger() {
    let ledger = Arc::new(DeferredLedger::new());
    let inner = Arc::clone(&ledger);
    ledger.on_completion(4, Box::new(move || {
        inner.on_completion(5, Box::new(|| {}));
    }));

    assert!(ledger.complete(4, true));
    assert!(ledger.is_pending(5));
}
