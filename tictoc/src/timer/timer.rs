// Copyright © 2023 Stephan Kunz

//! Module `timer` provides a countdown `Timer`, which can also be created using the `TimerBuilder`.
//! When the countdown reaches zero, a `Timer` calls its assigned `TimerCallback` exactly once.
//!
//! The expiry is detected by a waiter running in the background. Inside a multi thread
//! tokio runtime the waiter is a task spawned on that runtime, otherwise it runs on a
//! dedicated thread, so a caller blocking its own thread never holds back the callback.

// region:		--- modules
use super::timer_builder::{NoDuration, TimerBuilder};
use crate::{
	chronometer::Chronometer,
	error::{Error, Result},
};
use std::{
	fmt::Debug,
	ops::Deref,
	panic::AssertUnwindSafe,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
	time::Duration,
};
use tokio::{
	runtime::{Handle, RuntimeFlavor},
	sync::Notify,
	time,
};
use tracing::{debug, error, instrument, warn, Level};
// endregion:	--- modules

// region:		--- types
/// type definition for the functions called by a timer
#[allow(clippy::module_name_repetitions)]
pub type TimerCallback = Arc<Mutex<dyn FnMut() -> Result<()> + Send + 'static>>;
// endregion:	--- types

// region:		--- State
/// Registration of the currently active waiter
#[derive(Debug)]
struct Waiter {
	generation: u64,
	cancel: Arc<Notify>,
}

impl Waiter {
	fn cancel(self) {
		// stores a permit, so a waiter not yet sleeping will see it too
		self.cancel.notify_one();
	}
}

#[derive(Debug, Default)]
struct State {
	chronometer: Chronometer,
	expired: bool,
	generation: u64,
	waiter: Option<Waiter>,
	callback_error: Option<Error>,
}

impl State {
	fn is_current(&self, generation: u64) -> bool {
		self.waiter
			.as_ref()
			.is_some_and(|waiter| waiter.generation == generation)
	}

	fn cancel_waiter(&mut self) {
		if let Some(waiter) = self.waiter.take() {
			waiter.cancel();
		}
	}
}

/// Where the waiter of a [`Timer`] is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
	/// On the callers runtime if it is a multi thread runtime, otherwise on a dedicated thread
	Auto,
	/// Always on the callers runtime, if there is one
	#[cfg_attr(not(test), allow(dead_code))]
	CallerRuntime,
}

/// The part of a [`Timer`] shared with its waiter
struct Shared {
	duration: Duration,
	callback: Option<TimerCallback>,
	placement: Placement,
	state: Mutex<State>,
}

impl Shared {
	/// State is consistent after every operation, so a poisoned lock can be reused
	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn time_left(&self, state: &State) -> Duration {
		self.duration.saturating_sub(state.chronometer.partial())
	}
}
// endregion:	--- State

// region:		--- Timer
/// Countdown timer
pub struct Timer {
	shared: Arc<Shared>,
}

impl Debug for Timer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.shared.lock();
		f.debug_struct("Timer")
			.field("duration", &self.shared.duration)
			.field("partial", &state.chronometer.partial())
			.field("running", &state.chronometer.running())
			.field("expired", &state.expired)
			.finish_non_exhaustive()
	}
}

impl Drop for Timer {
	fn drop(&mut self) {
		self.shared.lock().cancel_waiter();
	}
}

impl Timer {
	/// Constructor for a [`Timer`] calling `callback` when `duration` has elapsed
	#[must_use]
	pub fn new<F>(duration: Duration, callback: F) -> Self
	where
		F: FnMut() -> Result<()> + Send + 'static,
	{
		Self::from_parts(
			duration,
			Some(Arc::new(Mutex::new(callback))),
			Placement::Auto,
		)
	}

	/// Constructor for a [`Timer`] without callback
	#[must_use]
	pub fn with_duration(duration: Duration) -> Self {
		Self::from_parts(duration, None, Placement::Auto)
	}

	/// Get a [`TimerBuilder`]
	#[must_use]
	pub const fn builder() -> TimerBuilder<NoDuration> {
		TimerBuilder::new()
	}

	pub(crate) fn from_parts(
		duration: Duration,
		callback: Option<TimerCallback>,
		placement: Placement,
	) -> Self {
		Self {
			shared: Arc::new(Shared {
				duration,
				callback,
				placement,
				state: Mutex::new(State::default()),
			}),
		}
	}

	/// Create an independent copy of the timer without callback.
	/// The copy takes over duration, measured time and expiry state,
	/// a running timer results in a running copy with its own waiter.
	#[must_use]
	pub fn detached_copy(&self) -> Self {
		let (chronometer, expired) = {
			let state = self.shared.lock();
			(state.chronometer.clone(), state.expired)
		};
		let running = chronometer.running();
		let copy = Self::from_parts(self.shared.duration, None, self.shared.placement);
		{
			let mut state = copy.shared.lock();
			state.chronometer = chronometer;
			state.expired = expired;
		}
		if running {
			copy.start();
		}
		copy
	}

	/// Start or resume the countdown.
	/// A waiter is launched unless one is already active.
	#[instrument(level = Level::TRACE, skip_all)]
	pub fn start(&self) {
		let (generation, cancel) = {
			let mut state = self.shared.lock();
			state.chronometer.start();
			if state.waiter.is_some() {
				return;
			}
			state.generation += 1;
			let generation = state.generation;
			let cancel = Arc::new(Notify::new());
			state.waiter = Some(Waiter {
				generation,
				cancel: cancel.clone(),
			});
			(generation, cancel)
		};

		if let Err(reason) = spawn_waiter(self.shared.clone(), generation, cancel) {
			error!("could not spawn timer waiter: {reason}");
			retire(&self.shared, generation);
		}
	}

	/// Stop the countdown keeping the elapsed time, a pending callback is cancelled
	#[instrument(level = Level::TRACE, skip_all)]
	pub fn stop(&self) {
		let mut state = self.shared.lock();
		state.chronometer.stop();
		state.cancel_waiter();
	}

	/// Stop the countdown and set it back to the full duration
	#[instrument(level = Level::TRACE, skip_all)]
	pub fn reset(&self) {
		let mut state = self.shared.lock();
		state.chronometer.reset();
		state.cancel_waiter();
		state.expired = false;
	}

	/// The countdown length
	#[must_use]
	pub fn duration(&self) -> Duration {
		self.shared.duration
	}

	/// Running time measured so far
	#[must_use]
	pub fn partial(&self) -> Duration {
		self.shared.lock().chronometer.partial()
	}

	/// Remaining time of the countdown, never below zero
	#[must_use]
	pub fn time_left(&self) -> Duration {
		let state = self.shared.lock();
		self.shared.time_left(&state)
	}

	/// Remaining time of the countdown in seconds
	#[must_use]
	pub fn time_left_secs(&self) -> f64 {
		self.time_left().as_secs_f64()
	}

	/// `true` while the countdown is running
	#[must_use]
	pub fn running(&self) -> bool {
		self.shared.lock().chronometer.running()
	}

	/// `true` if the countdown has reached zero since creation or the last reset
	#[must_use]
	pub fn expired(&self) -> bool {
		self.shared.lock().expired
	}

	/// `true` while a waiter is active
	#[must_use]
	pub fn waiting(&self) -> bool {
		self.shared.lock().waiter.is_some()
	}

	/// Take the failure of the latest callback invocation, if there was one
	#[must_use]
	pub fn take_callback_error(&self) -> Option<Error> {
		self.shared.lock().callback_error.take()
	}

	/// Start the countdown for the lifetime of the returned [`TimerScope`].
	/// The timer is stopped and a pending callback cancelled when the scope is dropped.
	pub fn scope(&self) -> TimerScope<'_> {
		self.start();
		TimerScope { timer: self }
	}
}
// endregion:	--- Timer

// region:		--- TimerScope
/// Guard returned by [`Timer::scope`]
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TimerScope<'a> {
	timer: &'a Timer,
}

impl Deref for TimerScope<'_> {
	type Target = Timer;

	fn deref(&self) -> &Self::Target {
		self.timer
	}
}

impl Drop for TimerScope<'_> {
	fn drop(&mut self) {
		self.timer.stop();
	}
}
// endregion:	--- TimerScope

// region:		--- waiter
fn spawn_waiter(shared: Arc<Shared>, generation: u64, cancel: Arc<Notify>) -> std::io::Result<()> {
	if let Ok(handle) = Handle::try_current() {
		// a current thread runtime is blocked whenever its caller is
		if shared.placement == Placement::CallerRuntime
			|| handle.runtime_flavor() == RuntimeFlavor::MultiThread
		{
			handle.spawn(run_waiter(shared, generation, cancel));
			return Ok(());
		}
	}

	std::thread::Builder::new()
		.name("tictoc-timer".into())
		.spawn(move || {
			match tokio::runtime::Builder::new_current_thread()
				.enable_time()
				.build()
			{
				Ok(runtime) => runtime.block_on(run_waiter(shared, generation, cancel)),
				Err(reason) => {
					error!("could not create timer runtime: {reason}");
					retire(&shared, generation);
				}
			}
		})
		.map(|_| ())
}

/// Remove the registration of a waiter, if it is still the current one
fn retire(shared: &Shared, generation: u64) {
	let mut state = shared.lock();
	if state.is_current(generation) {
		state.waiter = None;
	}
}

#[instrument(name = "timer", level = Level::ERROR, skip_all)]
async fn run_waiter(shared: Arc<Shared>, generation: u64, cancel: Arc<Notify>) {
	loop {
		let left = {
			let mut state = shared.lock();
			if !state.is_current(generation) {
				debug!("timer waiter superseded");
				return;
			}
			let left = shared.time_left(&state);
			if left.is_zero() {
				// claim the expiry, a later stop() can no longer suppress the callback
				state.chronometer.stop();
				state.expired = true;
				state.waiter = None;
				break;
			}
			left
		};

		tokio::select! {
			() = time::sleep(left) => {}
			() = cancel.notified() => {
				debug!("timer waiter cancelled");
				return;
			}
		}
	}

	debug!("timer expired");
	fire(&shared);
}

/// Invoke the callback, failures are logged and stored for [`Timer::take_callback_error`]
fn fire(shared: &Shared) {
	let Some(callback) = &shared.callback else {
		return;
	};

	let outcome = {
		let mut callback = match callback.lock() {
			Ok(callback) => callback,
			Err(poisoned) => {
				warn!("found poisoned Mutex");
				callback.clear_poison();
				poisoned.into_inner()
			}
		};
		std::panic::catch_unwind(AssertUnwindSafe(|| callback()))
	};

	let failure = match outcome {
		Ok(Ok(())) => return,
		Ok(Err(reason)) => Error::Callback(reason),
		Err(payload) => Error::from_panic(payload.as_ref()),
	};
	error!("callback failed with {failure}");
	shared.lock().callback_error = Some(failure);
}
// endregion:	--- waiter
