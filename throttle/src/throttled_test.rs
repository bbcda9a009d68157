use std::panic::{AssertUnwindSafe, catch_unwind};

use super::*;
use crate::clock::ManualClock;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Replay `times` against a fresh throttle and return the admitted readings.
fn admitted_times(interval_ms: u64, times: &[i64]) -> Vec<i64> {
    let clock = ManualClock::new(0);
    let mut fired = Vec::new();
    {
        let mut t = Throttled::with_clock(|now: i64| fired.push(now), ms(interval_ms), clock.clone());
        for &now in times {
            clock.set(now);
            t.call(now);
        }
    }
    fired
}

/// Greedy reference: keep a time when it is at least `interval` past the last kept one.
fn expected_admissions(interval_ms: i64, times: &[i64]) -> Vec<i64> {
    let mut kept: Vec<i64> = Vec::new();
    for &t in times {
        match kept.last() {
            Some(&last) if t - last < interval_ms => {}
            _ => kept.push(t),
        }
    }
    kept
}

#[test]
fn scenario_from_call_log() {
    assert_eq!(admitted_times(200, &[0, 50, 150, 200, 450]), vec![0, 200, 450]);
}

#[test]
fn first_call_runs_action_once() {
    for interval in [0, 1, 1_000, 60_000] {
        let mut count = 0;
        {
            let mut t = Throttled::with_clock(|()| count += 1, ms(interval), ManualClock::new(12_345));
            assert_eq!(t.call(()), Some(()));
        }
        assert_eq!(count, 1, "interval {interval}");
    }
}

#[test]
fn suppression_window_boundary() {
    let clock = ManualClock::new(0);
    let mut t = Throttled::with_clock(|()| "ran", ms(1_000), clock.clone());
    assert_eq!(t.call(()), Some("ran"));
    clock.set(500);
    assert_eq!(t.call(()), None);
    clock.set(1_000);
    assert_eq!(t.call(()), Some("ran"));
}

#[test]
fn admissions_match_greedy_reference() {
    // Deterministic pseudo-random non-decreasing call times.
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    for interval in [0_u64, 1, 7, 50, 200, 1_000] {
        let mut now = 0_i64;
        let mut times = Vec::new();
        for _ in 0..200 {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            now += i64::try_from((seed >> 33) % 120).expect("small step");
            times.push(now);
        }
        let interval_ms = i64::try_from(interval).expect("small interval");
        assert_eq!(
            admitted_times(interval, &times),
            expected_admissions(interval_ms, &times),
            "interval {interval}"
        );
    }
}

#[test]
fn zero_interval_passes_every_call() {
    let times = [0, 0, 1, 1, 1, 5, 90, 90];
    assert_eq!(admitted_times(0, &times), times.to_vec());
}

#[test]
fn arguments_forwarded_unmodified_and_in_order() {
    let clock = ManualClock::new(0);
    let mut received = Vec::new();
    {
        let mut t = Throttled::with_clock(
            |(id, name, tags): (u32, String, Vec<&'static str>)| received.push((id, name, tags)),
            ms(10),
            clock.clone(),
        );
        t.call((7, "lien".to_owned(), vec!["a", "b"]));
        clock.advance(5);
        t.call((8, "dropped".to_owned(), vec![]));
        clock.advance(5);
        t.call((9, "flsa".to_owned(), vec!["c"]));
    }
    assert_eq!(
        received,
        vec![
            (7, "lien".to_owned(), vec!["a", "b"]),
            (9, "flsa".to_owned(), vec!["c"]),
        ]
    );
}

#[test]
fn action_error_passes_through_and_still_counts() {
    let clock = ManualClock::new(0);
    let mut t = Throttled::with_clock(
        |code: i32| -> Result<i32, String> { if code < 0 { Err(format!("bad code {code}")) } else { Ok(code) } },
        ms(100),
        clock.clone(),
    );
    assert_eq!(t.call(-3), Some(Err("bad code -3".to_owned())));
    assert_eq!(t.state().last_invocation_ms(), Some(0));

    clock.set(50);
    assert_eq!(t.call(4), None);

    clock.set(100);
    assert_eq!(t.call(4), Some(Ok(4)));
}

#[test]
fn panicking_action_propagates_and_still_counts() {
    let clock = ManualClock::new(0);
    let mut calls = 0;
    let mut t = Throttled::with_clock(
        |()| {
            calls += 1;
            assert!(calls > 1, "first call fails");
        },
        ms(100),
        clock.clone(),
    );

    let outcome = catch_unwind(AssertUnwindSafe(|| t.call(())));
    assert!(outcome.is_err());
    assert_eq!(t.state().last_invocation_ms(), Some(0));

    clock.set(99);
    assert_eq!(t.call(()), None);
    clock.set(100);
    assert_eq!(t.call(()), Some(()));
}

#[test]
fn independent_wrappers_do_not_interfere() {
    let clock = ManualClock::new(0);
    let mut a = Throttled::with_clock(|()| 'a', ms(100), clock.clone());
    let mut b = Throttled::with_clock(|()| 'b', ms(100), clock.clone());
    assert_eq!(a.call(()), Some('a'));
    assert_eq!(b.call(()), Some('b'));
    clock.set(10);
    assert_eq!(a.call(()), None);
    assert_eq!(b.call(()), None);
}

#[test]
fn phase_follows_clock() {
    let clock = ManualClock::new(0);
    let mut t = Throttled::with_clock(|()| (), ms(300), clock.clone());
    assert!(t.is_ready());
    t.call(());
    clock.set(100);
    assert_eq!(t.phase(), Phase::CoolingDown { remaining_ms: 200 });
    clock.set(300);
    assert!(t.is_ready());
}

#[test]
fn call_at_uses_explicit_time() {
    let mut t = Throttled::with_clock(|n: u8| n, ms(10), ManualClock::new(0));
    assert_eq!(t.call_at(100, 1), Some(1));
    assert_eq!(t.call_at(105, 2), None);
    assert_eq!(t.call_at(110, 3), Some(3));
}

#[test]
fn from_millis_rejects_negative_interval() {
    let err = Throttled::from_millis(|()| (), -250).err().expect("negative interval");
    assert_eq!(err, ThrottleError::NegativeInterval { millis: -250 });
}

#[test]
fn from_millis_builds_system_clock_wrapper() {
    let mut t = Throttled::from_millis(|x: u8| x * 2, 60_000).expect("valid interval");
    assert_eq!(t.state().min_interval_ms(), 60_000);
    assert_eq!(t.call(4), Some(8));
    assert_eq!(t.call(5), None);
}

#[test]
fn into_inner_returns_action() {
    let t = Throttled::new(|x: i32| x + 1, ms(5));
    let action = t.into_inner();
    assert_eq!(action(1), 2);
}

#[test]
fn make_throttled_closure_keeps_private_state() {
    let clock = ManualClock::new(0);
    let mut first = make_throttled_with_clock(|s: &str| s.len(), ms(50), clock.clone());
    let mut second = make_throttled_with_clock(|s: &str| s.len(), ms(50), clock.clone());
    assert_eq!(first("quiz"), Some(4));
    assert_eq!(first("quiz"), None);
    assert_eq!(second("rights"), Some(6));
    clock.set(50);
    assert_eq!(first("again"), Some(5));
}

#[test]
fn make_throttled_uses_wall_clock() {
    let mut f = make_throttled(|n: u32| n, Duration::from_secs(3_600));
    assert_eq!(f(1), Some(1));
    assert_eq!(f(2), None);
}

#[test]
fn call_accepts_arguments_borrowed_for_one_call_only() {
    let clock = ManualClock::new(0);
    let mut t = Throttled::with_clock(|s: &str| s.len(), ms(10), clock.clone());
    let mut lengths = Vec::new();
    for i in 0..3_i64 {
        let event = format!("event-{i}");
        clock.set(i * 10);
        lengths.push(t.call(event.as_str()));
    }
    assert_eq!(lengths, vec![Some(7), Some(7), Some(7)]);
}

#[test]
fn make_throttled_takes_owned_arguments_per_event() {
    let clock = ManualClock::new(0);
    let mut f = make_throttled_with_clock(|s: String| s.len(), ms(10), clock.clone());
    let mut lengths = Vec::new();
    for i in 0..3_i64 {
        clock.set(i * 5);
        lengths.push(f(format!("x{i}")));
    }
    assert_eq!(lengths, vec![Some(2), None, Some(2)]);
}
