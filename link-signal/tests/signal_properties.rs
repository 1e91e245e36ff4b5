//! Property tests for the single-slot signal

use link_signal::{ConnectivitySignal, SignalError, WaitTimeout};
use proptest::prelude::*;
use std::time::Duration;

const SHORT: WaitTimeout = WaitTimeout::After(Duration::from_millis(5));

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any burst of signals before a wait leaves exactly one token behind.
    #[test]
    fn prop_burst_collapses_to_one_token(count in 1usize..32) {
        let signal = ConnectivitySignal::new();
        let notifier = signal.notifier();

        for _ in 0..count {
            notifier.notify();
        }

        let stats = signal.stats();
        prop_assert_eq!(stats.accepted, 1);
        prop_assert_eq!(stats.ignored, (count - 1) as u64);

        prop_assert!(signal.wait(SHORT).is_ok());
        prop_assert_eq!(signal.wait(SHORT), Err(SignalError::TimedOut(Duration::from_millis(5))));
    }

    /// Interleaved signal/wait pairs never consume more than they produce.
    #[test]
    fn prop_consumed_never_exceeds_accepted(ops in proptest::collection::vec(any::<bool>(), 0..40)) {
        let signal = ConnectivitySignal::new();

        for op in ops {
            if op {
                signal.signal();
            } else {
                signal.try_wait();
            }
        }

        let stats = signal.stats();
        prop_assert!(stats.consumed <= stats.accepted);
        prop_assert!(stats.accepted - stats.consumed <= 1);
        prop_assert_eq!(signal.is_signaled(), stats.accepted - stats.consumed == 1);
    }
}

#[test]
fn destroy_then_wait_reports_destroyed() {
    let signal = ConnectivitySignal::create(1).unwrap();
    signal.destroy();
    assert_eq!(signal.wait(WaitTimeout::Forever), Err(SignalError::Destroyed));
}
