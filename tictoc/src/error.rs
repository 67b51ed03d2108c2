// Copyright © 2024 Stephan Kunz

//! The `tictoc` specific error enum `Error` together with a type alias for [`std::result::Result`] to write only `Result<T>`.
//!

// region:		--- types
/// Boxed error as returned by user supplied callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type alias for `std::result::Result` to ease up implementation
pub type Result<T> = std::result::Result<T, BoxError>;
// endregion:	--- types

// region:		--- Error
/// `tictoc` error type.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
	/// The callback of a `Timer` returned an error.
	#[error("timer callback failed with {0}")]
	Callback(#[source] BoxError),
	/// The callback of a `Timer` panicked.
	#[error("timer callback panicked: {0}")]
	CallbackPanic(String),
}

impl Error {
	/// Create an [`Error::CallbackPanic`] from the payload of a caught panic
	#[must_use]
	pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
		let reason = payload
			.downcast_ref::<&str>()
			.map(|s| (*s).to_string())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "unknown reason".into());
		Self::CallbackPanic(reason)
	}
}
// endregion:	--- Error
