//! Proc macro for declaring loading-steps transition tables.

use darling::FromMeta;
use darling::ast::NestedMeta;
use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

mod attrs;
mod codegen;
mod validation;

/// Turns an impl block of `#[on(state = .., event = ..)]` handlers into a
/// total transition function.
///
/// Each handler is a synchronous `fn(&self) -> Transition<State>`; one handler
/// may serve several (state, event) pairs. The macro adds to the impl block:
///
/// * `transition(&self, state, event) -> State`, returning `state` unchanged
///   for pairs that have no handler,
/// * `accepts(state, event) -> bool`,
/// * `TRANSITIONS`, the declared pairs in declaration order.
///
/// A (state, event) pair declared twice is a compile error.
#[proc_macro_attribute]
pub fn transition_table(args: TokenStream, input: TokenStream) -> TokenStream {
    let meta = match NestedMeta::parse_meta_list(args.into()) {
        Ok(meta) => meta,
        Err(e) => return TokenStream::from(darling::Error::from(e).write_errors()),
    };
    let table_args = match attrs::TableArgs::from_list(&meta) {
        Ok(args) => args,
        Err(e) => return TokenStream::from(e.write_errors()),
    };
    let input_impl = parse_macro_input!(input as ItemImpl);

    match generate_table(table_args, input_impl) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn generate_table(
    args: attrs::TableArgs,
    input: ItemImpl,
) -> syn::Result<proc_macro2::TokenStream> {
    let table = validation::TableStructure::parse(args, input)?;
    Ok(codegen::generate(&table))
}
