// Copyright © 2024 Stephan Kunz

//! Module `timing` provides the `TimingDecorator` measuring and reporting the execution time of functions and methods.
//!
//! Usually a decorator is not created by hand but by the [`timed`](crate::timed) attribute,
//! which places one in a `static` within the decorated function.
//!
//! # Example
//! ```
//! use tictoc::timing::{CallKind, TimingDecorator};
//!
//! static TIMING: TimingDecorator = TimingDecorator::new(CallKind::Function, "answer", true);
//!
//! fn answer() -> u32 {
//! 	TIMING.measure(|| 42)
//! }
//!
//! assert_eq!(answer(), 42);
//! assert_eq!(answer(), 42);
//! assert_eq!(TIMING.calls(), 2);
//! ```

// region:		--- modules
use crate::chronometer::Chronometer;
use core::{fmt::Display, time::Duration};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;
// endregion:	--- modules

// region:		--- CallKind
/// What kind of callable is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
	/// A free function or associated function without receiver
	Function,
	/// A method, reported together with its receivers type
	Method,
}

impl Display for CallKind {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		match self {
			Self::Function => write!(f, "Function"),
			Self::Method => write!(f, "Method"),
		}
	}
}
// endregion:	--- CallKind

// region:		--- Report
/// The result of one measured invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
	/// Kind of the measured callable
	pub kind: CallKind,
	/// Name of the measured callable
	pub name: &'static str,
	/// Type of the receiver for methods
	pub receiver: Option<&'static str>,
	/// Duration of this invocation
	pub elapsed: Duration,
	/// Sum over all invocations, if the decorator accumulates
	pub total: Option<Duration>,
}

impl Display for Report {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		write!(f, "[TimingDecorator]: {} ", self.kind)?;
		if let Some(receiver) = self.receiver {
			write!(f, "{receiver}::")?;
		}
		write!(
			f,
			"{} > Time: {:.6}",
			self.name,
			self.elapsed.as_secs_f64()
		)?;
		if let Some(total) = self.total {
			write!(f, " - Total: {:.6}", total.as_secs_f64())?;
		}
		Ok(())
	}
}
// endregion:	--- Report

// region:		--- TimingDecorator
#[derive(Debug)]
struct Totals {
	total: Duration,
	calls: u64,
	last: Option<Report>,
}

/// Measures each invocation of a callable and reports it via `tracing`
#[derive(Debug)]
pub struct TimingDecorator {
	kind: CallKind,
	name: &'static str,
	print_sum: bool,
	totals: Mutex<Totals>,
}

impl TimingDecorator {
	/// Constructor for a [`TimingDecorator`]
	/// - `print_sum == true`: every report includes the sum of all measured durations
	#[must_use]
	pub const fn new(kind: CallKind, name: &'static str, print_sum: bool) -> Self {
		Self {
			kind,
			name,
			print_sum,
			totals: Mutex::new(Totals {
				total: Duration::ZERO,
				calls: 0,
				last: None,
			}),
		}
	}

	/// Constructor for a [`TimingDecorator`] of a free function
	#[must_use]
	pub const fn function(name: &'static str, print_sum: bool) -> Self {
		Self::new(CallKind::Function, name, print_sum)
	}

	/// Constructor for a [`TimingDecorator`] of a method
	#[must_use]
	pub const fn method(name: &'static str, print_sum: bool) -> Self {
		Self::new(CallKind::Method, name, print_sum)
	}

	/// Run `f` and report its execution time.
	/// The value of `f` is returned unchanged, a panic is reported before it continues unwinding.
	pub fn measure<R, F>(&self, f: F) -> R
	where
		F: FnOnce() -> R,
	{
		self.measure_with(None, f)
	}

	/// Run `f` as method of `receiver` and report its execution time
	pub fn measure_method<T, R, F>(&self, receiver: &T, f: F) -> R
	where
		T: ?Sized,
		F: FnOnce() -> R,
	{
		self.measure_with(Some(core::any::type_name_of_val(receiver)), f)
	}

	/// Run `f` as method of a receiver of type `T` and report its execution time
	pub fn measure_on<T, R, F>(&self, f: F) -> R
	where
		T: ?Sized,
		F: FnOnce() -> R,
	{
		self.measure_with(Some(core::any::type_name::<T>()), f)
	}

	fn measure_with<R, F>(&self, receiver: Option<&'static str>, f: F) -> R
	where
		F: FnOnce() -> R,
	{
		let _measurement = Measurement::begin(self, receiver);
		f()
	}

	fn lock(&self) -> MutexGuard<'_, Totals> {
		self.totals.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn record(&self, receiver: Option<&'static str>, elapsed: Duration) {
		let mut totals = self.lock();
		totals.total += elapsed;
		totals.calls += 1;
		let report = Report {
			kind: self.kind,
			name: self.name,
			receiver,
			elapsed,
			total: self.print_sum.then_some(totals.total),
		};
		info!("{report}");
		totals.last = Some(report);
	}

	/// Name of the measured callable
	#[must_use]
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Kind of the measured callable
	#[must_use]
	pub const fn kind(&self) -> CallKind {
		self.kind
	}

	/// Sum of all measured durations
	#[must_use]
	pub fn total(&self) -> Duration {
		self.lock().total
	}

	/// Number of measured invocations
	#[must_use]
	pub fn calls(&self) -> u64 {
		self.lock().calls
	}

	/// Report of the latest invocation
	#[must_use]
	pub fn last_report(&self) -> Option<Report> {
		self.lock().last.clone()
	}

	/// Set sum and count of measured invocations back to zero
	pub fn reset_total(&self) {
		let mut totals = self.lock();
		totals.total = Duration::ZERO;
		totals.calls = 0;
		totals.last = None;
	}
}

/// A running measurement, reported when dropped
struct Measurement<'a> {
	decorator: &'a TimingDecorator,
	receiver: Option<&'static str>,
	chronometer: Chronometer,
}

impl<'a> Measurement<'a> {
	fn begin(decorator: &'a TimingDecorator, receiver: Option<&'static str>) -> Self {
		let mut chronometer = Chronometer::new();
		chronometer.start();
		Self {
			decorator,
			receiver,
			chronometer,
		}
	}
}

impl Drop for Measurement<'_> {
	fn drop(&mut self) {
		self.chronometer.stop();
		self.decorator
			.record(self.receiver, self.chronometer.partial());
	}
}
// endregion:	--- TimingDecorator
