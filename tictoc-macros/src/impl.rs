// Copyright © 2024 Stephan Kunz

//! Macro implementation
//!

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
	parse::Parser, punctuated::Punctuated, visit::Visit, ItemFn, Lifetime, Meta, ReturnType,
	Token, Type, TypeImplTrait, TypeReference,
};

type Arguments = Punctuated<Meta, Token![,]>;

const UNSUPPORTED: &str = "not supported by macro";

#[derive(Default)]
struct Config {
	method: bool,
	print_sum: bool,
}

fn parse_config(args: Arguments) -> Result<Config, syn::Error> {
	let mut config = Config::default();

	for arg in args {
		match arg {
			Meta::Path(path) => {
				// get ident
				let ident = path
					.get_ident()
					.ok_or_else(|| syn::Error::new_spanned(&path, "must have a specified ident"))?
					.to_string()
					.to_lowercase();

				match ident.as_str() {
					"method" => config.method = true,
					"print_sum" => config.print_sum = true,
					_ => return Err(syn::Error::new_spanned(&path, UNSUPPORTED)),
				}
			}
			Meta::List(list) => {
				return Err(syn::Error::new_spanned(&list, UNSUPPORTED));
			}
			Meta::NameValue(named_value) => {
				return Err(syn::Error::new_spanned(&named_value, UNSUPPORTED));
			}
		}
	}

	Ok(config)
}

/// Finds parts of a type which cannot be repeated as closure return type
#[derive(Default)]
struct Borrowing {
	found: bool,
}

impl<'ast> Visit<'ast> for Borrowing {
	fn visit_type_reference(&mut self, _: &'ast TypeReference) {
		self.found = true;
	}

	fn visit_type_impl_trait(&mut self, _: &'ast TypeImplTrait) {
		self.found = true;
	}

	fn visit_lifetime(&mut self, _: &'ast Lifetime) {
		self.found = true;
	}
}

/// Return type usable as annotation of the closure wrapping the body.
/// `impl Trait` is not allowed there and elided lifetimes would not refer to the arguments.
fn closure_output(output: &ReturnType) -> Option<&Type> {
	match output {
		ReturnType::Default => None,
		ReturnType::Type(_, ty) => {
			let mut borrowing = Borrowing::default();
			borrowing.visit_type(ty);
			(!borrowing.found).then_some(&**ty)
		}
	}
}

pub fn timed(args: TokenStream, item_fn: TokenStream) -> TokenStream {
	// save original for creation of result with error
	let mut result_with_error = item_fn.clone();

	// parse the function
	let item_fn: ItemFn = match syn::parse2(item_fn) {
		Ok(item) => item,
		Err(error) => {
			result_with_error.extend(error.into_compile_error());
			return result_with_error;
		}
	};

	// an async body would be measured until its first suspension only
	if let Some(asyncness) = item_fn.sig.asyncness {
		let err = syn::Error::new_spanned(asyncness, "macro cannot be used for async functions");
		result_with_error.extend(err.into_compile_error());
		return result_with_error;
	}

	// parse args
	let config = Arguments::parse_terminated
		.parse2(args)
		.and_then(parse_config);

	match config {
		Ok(config) => {
			if config.method && item_fn.sig.receiver().is_none() {
				let err = syn::Error::new_spanned(
					&item_fn.sig.ident,
					"`method` requires a function with `self` receiver",
				);
				result_with_error.extend(err.into_compile_error());
				return result_with_error;
			}

			// variables for quote macro
			let attrs = item_fn.attrs;
			let vis = item_fn.vis;
			let signature = item_fn.sig;
			let body = item_fn.block;
			let name = signature.ident.to_string();
			let print_sum = config.print_sum;
			let closure = closure_output(&signature.output).map_or_else(
				|| quote! { move || #body },
				|output| quote! { move || -> #output #body },
			);

			let (kind, measure) = if config.method {
				(
					quote! { ::tictoc::timing::CallKind::Method },
					quote! { __TICTOC_TIMING.measure_on::<Self, _, _> },
				)
			} else {
				(
					quote! { ::tictoc::timing::CallKind::Function },
					quote! { __TICTOC_TIMING.measure },
				)
			};

			quote! {
				#(#attrs)*
				#vis #signature {
					static __TICTOC_TIMING: ::tictoc::timing::TimingDecorator =
						::tictoc::timing::TimingDecorator::new(#kind, #name, #print_sum);
					#measure(#closure)
				}
			}
		}
		Err(err) => {
			result_with_error.extend(err.into_compile_error());
			result_with_error
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn expand(args: TokenStream, item: TokenStream) -> String {
		timed(args, item).to_string()
	}

	#[test]
	fn plain_function() {
		let output = expand(quote! {}, quote! { fn add(a: u32, b: u32) -> u32 { a + b } });
		assert!(output.contains("TimingDecorator :: new"));
		assert!(output.contains("CallKind :: Function"));
		assert!(output.contains("\"add\" , false"));
		assert!(output.contains("move || -> u32"));
		assert!(!output.contains("compile_error"));
	}

	#[test]
	fn method_with_sum() {
		let output = expand(
			quote! { method, print_sum },
			quote! { fn qux(&self) -> &str { &self.message } },
		);
		assert!(output.contains("CallKind :: Method"));
		assert!(output.contains("measure_on :: < Self , _ , _ >"));
		assert!(output.contains("\"qux\" , true"));
		assert!(output.contains("move || {"));
		assert!(!output.contains("compile_error"));
	}

	#[test]
	fn rejected_input() {
		let method_without_receiver = expand(quote! { method }, quote! { fn f() {} });
		assert!(method_without_receiver.contains("compile_error"));

		let unknown_argument = expand(quote! { fast }, quote! { fn f() {} });
		assert!(unknown_argument.contains("compile_error"));

		let named_value = expand(quote! { print_sum = true }, quote! { fn f() {} });
		assert!(named_value.contains("compile_error"));

		let async_function = expand(quote! {}, quote! { async fn f() {} });
		assert!(async_function.contains("compile_error"));
	}

	#[test]
	fn closure_annotation() {
		let plain: ReturnType = syn::parse_quote! { -> Result<u32, String> };
		assert!(closure_output(&plain).is_some());
		let simple: ReturnType = syn::parse_quote! { -> Simple };
		assert!(closure_output(&simple).is_some());
		let opaque: ReturnType = syn::parse_quote! { -> impl Iterator<Item = u8> };
		assert!(closure_output(&opaque).is_none());
		let borrowed: ReturnType = syn::parse_quote! { -> Option<&'a str> };
		assert!(closure_output(&borrowed).is_none());
		let elided: ReturnType = syn::parse_quote! { -> Vec<&str> };
		assert!(closure_output(&elided).is_none());
		let nested_opaque: ReturnType = syn::parse_quote! { -> Box<impl Fn()> };
		assert!(closure_output(&nested_opaque).is_none());
		let bounded: ReturnType = syn::parse_quote! { -> Box<dyn Fn() + 'static> };
		assert!(closure_output(&bounded).is_none());
		let implements: ReturnType = syn::parse_quote! { -> Implements };
		assert!(closure_output(&implements).is_some());
		assert!(closure_output(&ReturnType::Default).is_none());
	}
}
