// Copyright © 2023 Stephan Kunz

//! Module `timer_builder` provides the `TimerBuilder`, a typestate builder for a [`Timer`].
//! A [`Timer`] can only be built after its duration has been set, the callback is optional.

// region:		--- modules
use super::timer::{Placement, Timer, TimerCallback};
use crate::error::Result;
use std::{
	sync::{Arc, Mutex},
	time::Duration,
};
// endregion:	--- modules

// region:		--- states
/// State signaling that the [`TimerBuilder`] has no duration set
pub struct NoDuration;
/// State signaling that the [`TimerBuilder`] has the duration set
pub struct Countdown {
	/// The [`Duration`] of the [`Timer`]s countdown
	duration: Duration,
}
// endregion:	--- states

// region:		--- TimerBuilder
/// A builder for a timer
#[allow(clippy::module_name_repetitions)]
pub struct TimerBuilder<D> {
	duration: D,
	callback: Option<TimerCallback>,
}

impl Default for TimerBuilder<NoDuration> {
	fn default() -> Self {
		Self::new()
	}
}

impl TimerBuilder<NoDuration> {
	/// Construct a [`TimerBuilder`] in initial state
	#[must_use]
	pub const fn new() -> Self {
		Self {
			duration: NoDuration,
			callback: None,
		}
	}

	/// Set the countdown length
	#[must_use]
	pub fn duration(self, duration: Duration) -> TimerBuilder<Countdown> {
		let Self { callback, .. } = self;
		TimerBuilder {
			duration: Countdown { duration },
			callback,
		}
	}

	/// Set the countdown length in seconds.
	/// Negative and `NaN` values result in a countdown of zero, which expires immediately.
	#[must_use]
	pub fn duration_secs(self, secs: f64) -> TimerBuilder<Countdown> {
		let duration = if secs.is_nan() || secs <= 0.0 {
			Duration::ZERO
		} else {
			Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
		};
		self.duration(duration)
	}
}

impl<D> TimerBuilder<D> {
	/// Set the function to call when the countdown reaches zero
	#[must_use]
	pub fn callback<F>(self, callback: F) -> Self
	where
		F: FnMut() -> Result<()> + Send + 'static,
	{
		let Self { duration, .. } = self;
		Self {
			duration,
			callback: Some(Arc::new(Mutex::new(callback))),
		}
	}
}

impl TimerBuilder<Countdown> {
	/// Build the [`Timer`]
	#[must_use]
	pub fn build(self) -> Timer {
		Timer::from_parts(self.duration.duration, self.callback, Placement::Auto)
	}
}
// endregion:	--- TimerBuilder
