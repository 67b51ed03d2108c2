// Copyright © 2024 Stephan Kunz

//! `#[timed(...)]` macro for `tictoc`
//!

extern crate proc_macro;

mod r#impl;

use proc_macro::TokenStream;

/// Measures every invocation of the marked function and reports the execution time
/// using a `tictoc::timing::TimingDecorator` dedicated to that function.
///
/// # Usage
/// ```no_test
/// #[tictoc::timed]
/// fn foo(msg: &str) {
///     // your code
///     ...
/// }
/// ```
///
/// ## Methods
/// With `method` the report names the type of the receiver.
/// The function must take a `self` receiver.
///
/// ```no_test
/// impl Baz {
///     #[tictoc::timed(method)]
///     fn qux(&self) {
///         ...
///     }
/// }
/// ```
///
/// ## Running total
/// With `print_sum` each report also contains the sum over all invocations.
///
/// ```no_test
/// #[tictoc::timed(print_sum)]
/// fn bar() {
///     ...
/// }
/// ```
///
#[proc_macro_attribute]
pub fn timed(metadata: TokenStream, input: TokenStream) -> TokenStream {
	// call implementation with conversion to and from proc-macro2 library
	r#impl::timed(metadata.into(), input.into()).into()
}
