extern crate traffic_lib;

use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use traffic_lib::{CycleConfig, CycleConfigBuilder, Error, Phase, PhaseController, ShutdownSignal};

fn config(min_ms: u64, max_ms: u64) -> CycleConfig {
    CycleConfigBuilder::new()
        .cycle_range(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
        .build()
        .unwrap()
}

#[test]
fn test_fresh_light_is_red() {
    let light = PhaseController::new();
    assert_eq!(light.get_current_phase(), Phase::Red);
    light.simulate().unwrap();
    assert_eq!(light.get_current_phase(), Phase::Red);
}

#[test]
fn test_wait_for_green_returns_after_first_cycle() {
    let light = PhaseController::with_config(config(50, 80));
    let start = Instant::now();
    light.simulate().unwrap();
    light.wait_for_green().unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(5), "returned after {:?}", elapsed);
}

#[test]
fn test_light_alternates() {
    let light = PhaseController::with_config(config(20, 30));
    light.simulate().unwrap();
    for _ in 0..3 {
        light.wait_for_green().unwrap();
        light.wait_for(Phase::Red).unwrap();
    }
}

#[test]
fn test_concurrent_waiters_all_return() {
    const WAITERS: usize = 5;
    let light = Arc::new(PhaseController::with_config(config(10, 20)));
    light.simulate().unwrap();

    let (tx, rx) = mpsc::channel();
    let handles: Vec<_> = (0..WAITERS)
        .map(|i| {
            let light = light.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                light.wait_for_green().unwrap();
                tx.send(i).unwrap();
            })
        })
        .collect();
    drop(tx);

    let mut done = Vec::new();
    for _ in 0..WAITERS {
        done.push(rx.recv_timeout(Duration::from_secs(10)).unwrap());
    }
    for handle in handles {
        handle.join().unwrap();
    }
    done.sort_unstable();
    assert_eq!(done, (0..WAITERS).collect::<Vec<_>>());
}

#[test]
fn test_second_simulate_is_rejected() {
    let light = PhaseController::with_config(config(10, 20));
    light.simulate().unwrap();
    match light.simulate() {
        Err(Error::AlreadySimulating(id)) => assert_eq!(id, light.id()),
        other => panic!("expected AlreadySimulating, got {:?}", other),
    }
    assert!(light.is_running());
}

#[test]
fn test_simulate_after_stop_is_rejected() {
    let light = PhaseController::with_config(config(10, 20));
    light.stop();
    assert!(matches!(light.simulate(), Err(Error::Stopped(_))));
}

#[test]
fn test_stop_releases_waiters() {
    // cycles far longer than the test, so no green arrives
    let light = Arc::new(PhaseController::with_config(config(60_000, 60_000)));
    light.simulate().unwrap();

    let waiter = {
        let light = light.clone();
        thread::spawn(move || light.wait_for_green())
    };
    thread::sleep(Duration::from_millis(50));
    light.stop();
    assert!(matches!(waiter.join().unwrap(), Err(Error::Stopped(_))));
    assert!(!light.is_running());
}

#[test]
fn test_external_shutdown_signal_stops_light() {
    let signal = ShutdownSignal::new();
    let light = Arc::new(PhaseController::with_shutdown(
        config(60_000, 60_000),
        signal.clone(),
    ));
    light.simulate().unwrap();

    let waiter = {
        let light = light.clone();
        thread::spawn(move || light.wait_for_green())
    };
    thread::sleep(Duration::from_millis(50));
    signal.shutdown();
    assert!(matches!(waiter.join().unwrap(), Err(Error::Stopped(_))));
}

#[test]
fn test_drop_joins_cycle_thread() {
    let signal = ShutdownSignal::new();
    {
        let light = PhaseController::with_shutdown(config(10, 20), signal.clone());
        light.simulate().unwrap();
        thread::sleep(Duration::from_millis(30));
    }
    assert!(signal.is_shutdown());
}
