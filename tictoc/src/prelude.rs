// Copyright © 2024 Stephan Kunz

//! Most commonly used interface of tictoc.
//!

// re-exports
pub use std::time::Duration;

pub use crate::chronometer::{Chronometer, ChronometerScope};
pub use crate::error::{Error, Result};
pub use crate::timed;
pub use crate::timer::{Timer, TimerBuilder, TimerCallback, TimerScope};
pub use crate::timing::{CallKind, Report, TimingDecorator};
