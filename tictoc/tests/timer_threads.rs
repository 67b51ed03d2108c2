// Copyright © 2024 Stephan Kunz

//! Timer tests outside of a tokio runtime, using the dedicated waiter thread and wall clock time

use std::{
	sync::{
		atomic::{AtomicUsize, Ordering},
		mpsc, Arc,
	},
	thread,
	time::Duration,
};
use tictoc::prelude::*;

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn counting(duration: Duration) -> (Timer, Arc<AtomicUsize>) {
	let counter = Arc::new(AtomicUsize::new(0));
	let calls = counter.clone();
	let timer = Timer::new(duration, move || {
		calls.fetch_add(1, Ordering::SeqCst);
		Ok(())
	});
	(timer, counter)
}

#[test]
fn fires_once_without_runtime() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(300));
	timer.start();
	assert!(timer.running());
	thread::sleep(Duration::from_millis(600));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
	assert!(!timer.running());
	assert_eq!(timer.time_left(), Duration::ZERO);
}

#[test]
fn stopped_timer_does_not_fire() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(300));
	timer.start();
	thread::sleep(Duration::from_millis(100));
	timer.stop();
	let left = timer.time_left();
	assert!(left > Duration::ZERO && left < Duration::from_millis(300));

	thread::sleep(Duration::from_millis(400));
	assert_eq!(counter.load(Ordering::SeqCst), 0);
	assert_eq!(timer.time_left(), left);
}

#[test]
fn scope_cancels_on_panic() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(200));
	let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
		let _scope = timer.scope();
		panic!("failure inside scope");
	}));
	assert!(result.is_err());
	assert!(!timer.running());
	thread::sleep(Duration::from_millis(400));
	assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn stop_during_callback_lets_it_complete() {
	init_tracing();
	let (entered_tx, entered_rx) = mpsc::channel();
	let (release_tx, release_rx) = mpsc::channel::<()>();
	let (done_tx, done_rx) = mpsc::channel();

	let timer = Timer::new(Duration::from_millis(50), move || {
		entered_tx.send(())?;
		release_rx.recv()?;
		done_tx.send(())?;
		Ok(())
	});
	timer.start();

	entered_rx
		.recv_timeout(Duration::from_secs(5))
		.expect("callback entered");
	// the waiter has already claimed the expiry
	timer.stop();
	release_tx.send(()).expect("callback waiting");
	done_rx
		.recv_timeout(Duration::from_secs(5))
		.expect("callback completed");

	assert!(timer.expired());
	assert!(!timer.running());
	assert!(timer.take_callback_error().is_none());
}

#[test]
fn shared_between_threads() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(200));
	let timer = Arc::new(timer);

	let starters: Vec<_> = (0..4)
		.map(|_| {
			let timer = timer.clone();
			thread::spawn(move || timer.start())
		})
		.collect();
	for starter in starters {
		starter.join().expect("starter finished");
	}

	thread::sleep(Duration::from_millis(500));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn failing_callback_does_not_reach_caller() {
	init_tracing();
	let timer = Timer::builder()
		.duration(Duration::from_millis(50))
		.callback(|| Err("no luck".into()))
		.build();
	timer.start();
	thread::sleep(Duration::from_millis(300));
	let failure = timer.take_callback_error().expect("failure recorded");
	assert_eq!(failure.to_string(), "timer callback failed with no luck");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fires_on_multi_thread_runtime() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(200));
	timer.start();
	// blocking the test thread does not stop the waiter task
	thread::sleep(Duration::from_millis(500));
	assert_eq!(counter.load(Ordering::SeqCst), 1);
	assert!(!timer.running());
}

#[tokio::test]
async fn fires_while_current_thread_runtime_is_blocked() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(100));
	timer.start();

	// polling without ever yielding to the runtime
	let mut waited = 0;
	while timer.running() && waited < 20 {
		thread::sleep(Duration::from_millis(100));
		waited += 1;
	}
	assert_eq!(counter.load(Ordering::SeqCst), 1);
	assert!(!timer.running());
	assert!(timer.expired());
}

#[tokio::test]
async fn stop_on_current_thread_runtime_cancels() {
	init_tracing();
	let (timer, counter) = counting(Duration::from_millis(200));
	timer.start();
	thread::sleep(Duration::from_millis(50));
	timer.stop();
	thread::sleep(Duration::from_millis(400));
	assert_eq!(counter.load(Ordering::SeqCst), 0);
	assert!(!timer.expired());
}
