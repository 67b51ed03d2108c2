// Copyright © 2024 Stephan Kunz
#![crate_type = "lib"]
#![crate_name = "tictoc"]
#![warn(missing_docs)]

//! Library implements time measurement: a [`Chronometer`](chronometer::Chronometer),
//! a countdown [`Timer`](timer::Timer) with callback and the
//! [`TimingDecorator`](timing::TimingDecorator) for execution times.
//!

// region:    --- modules
/// Stopwatch
pub mod chronometer;
/// Error handling
pub mod error;
/// Public interface of tictoc.
/// Typically it is sufficient to include the prelude with
/// `use tictoc::prelude::*;`
pub mod prelude;
/// Countdown timer
pub mod timer;
/// Execution time measurement
pub mod timing;

pub use tictoc_macros::timed;
// endregion: --- modules
