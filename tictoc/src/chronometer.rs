// Copyright © 2024 Stephan Kunz

//! Module `chronometer` provides a stopwatch accumulating running time across start/stop cycles.
//!
//! # Example
//! ```
//! use tictoc::chronometer::Chronometer;
//!
//! let mut chrono = Chronometer::new();
//! chrono.start();
//! assert!(chrono.running());
//! chrono.stop();
//! let measured = chrono.partial();
//! assert_eq!(chrono.partial(), measured);
//! chrono.reset();
//! assert!(chrono.partial().is_zero());
//!
//! // or scoped
//! {
//! 	let scope = chrono.scope();
//! 	assert!(scope.running());
//! }
//! assert!(!chrono.running());
//! ```

// region:		--- modules
use core::{
	ops::{Deref, DerefMut},
	time::Duration,
};
use tokio::time::Instant;
// endregion:	--- modules

// region:		--- Chronometer
/// Chronometer
#[derive(Debug, Clone, Default)]
pub struct Chronometer {
	/// Time collected by the already finished running segments
	accumulated: Duration,
	/// Start of the current running segment, `None` while stopped
	segment_start: Option<Instant>,
}

impl Chronometer {
	/// Constructor for a stopped [`Chronometer`] with zero accumulated time
	#[must_use]
	pub const fn new() -> Self {
		Self {
			accumulated: Duration::ZERO,
			segment_start: None,
		}
	}

	/// Start the chronometer or resume after the latest stop.
	/// Starting a running chronometer has no effect.
	pub fn start(&mut self) {
		if self.segment_start.is_none() {
			self.segment_start = Some(Instant::now());
		}
	}

	/// Stop the chronometer keeping the current count
	pub fn stop(&mut self) {
		self.stop_with(false);
	}

	/// Stop the chronometer and set it back to zero
	pub fn reset(&mut self) {
		self.stop_with(true);
	}

	/// Stop the chronometer
	/// - `reset == true`: the count is set back to zero
	/// - `reset == false`: the current count is kept
	pub fn stop_with(&mut self, reset: bool) {
		if let Some(start) = self.segment_start.take() {
			self.accumulated += start.elapsed();
		}
		if reset {
			self.accumulated = Duration::ZERO;
		}
	}

	/// `true` while the chronometer is measuring
	#[must_use]
	pub const fn running(&self) -> bool {
		self.segment_start.is_some()
	}

	/// Total running time measured so far
	#[must_use]
	pub fn partial(&self) -> Duration {
		self.segment_start
			.map_or(self.accumulated, |start| self.accumulated + start.elapsed())
	}

	/// Total running time measured so far in seconds
	#[must_use]
	pub fn partial_secs(&self) -> f64 {
		self.partial().as_secs_f64()
	}

	/// Start the chronometer for the lifetime of the returned [`ChronometerScope`].
	/// The chronometer is stopped (not reset) when the scope is dropped,
	/// also when leaving it by an early return or a panic.
	pub fn scope(&mut self) -> ChronometerScope<'_> {
		self.start();
		ChronometerScope { chronometer: self }
	}
}
// endregion:	--- Chronometer

// region:		--- ChronometerScope
/// Guard returned by [`Chronometer::scope`]
#[derive(Debug)]
pub struct ChronometerScope<'a> {
	chronometer: &'a mut Chronometer,
}

impl Deref for ChronometerScope<'_> {
	type Target = Chronometer;

	fn deref(&self) -> &Self::Target {
		self.chronometer
	}
}

impl DerefMut for ChronometerScope<'_> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.chronometer
	}
}

impl Drop for ChronometerScope<'_> {
	fn drop(&mut self) {
		self.chronometer.stop();
	}
}
// endregion:	--- ChronometerScope
