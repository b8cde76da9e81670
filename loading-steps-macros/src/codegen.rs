//! Code generation for transition tables.

use proc_macro2::TokenStream;
use quote::quote;

use crate::validation::TableStructure;

/// Generate the impl block: the passthrough items, the handlers without their
/// `#[on]` attributes, and the generated table functions.
pub fn generate(table: &TableStructure) -> TokenStream {
    let item = &table.impl_block;
    let attrs = &item.attrs;
    let (impl_generics, _, where_clause) = item.generics.split_for_impl();
    let self_ty = &item.self_ty;

    let passthrough = &table.passthrough;
    let handlers = table.handlers.iter().map(|handler| &handler.method);

    let table_const = render_table_const(table);
    let transition_fn = render_transition(table);
    let accepts_fn = render_accepts(table);

    quote! {
        #(#attrs)*
        impl #impl_generics #self_ty #where_clause {
            #(#passthrough)*
            #(#handlers)*

            #table_const
            #transition_fn
            #accepts_fn
        }
    }
}

fn render_table_const(table: &TableStructure) -> TokenStream {
    let state_ty = &table.args.state;
    let event_ty = &table.args.event;
    let pairs = table.arms().map(|(_, arm)| {
        let (state, event) = (&arm.state, &arm.event);
        quote! { (#state_ty::#state, #event_ty::#event) }
    });

    quote! {
        /// Every declared (state, event) pair, in declaration order.
        pub const TRANSITIONS: &[(#state_ty, #event_ty)] = &[#(#pairs),*];
    }
}

fn render_transition(table: &TableStructure) -> TokenStream {
    let state_ty = &table.args.state;
    let event_ty = &table.args.event;
    let arms = table.arms().map(|(handler, arm)| {
        let (state, event) = (&arm.state, &arm.event);
        let method = &handler.method.sig.ident;
        quote! {
            (#state_ty::#state, #event_ty::#event) => self.#method().into_state(),
        }
    });

    quote! {
        /// Applies `event` to `state`. Undeclared pairs leave the state
        /// unchanged.
        #[must_use]
        #[allow(unreachable_patterns)]
        pub fn transition(&self, state: #state_ty, event: #event_ty) -> #state_ty {
            match (state, event) {
                #(#arms)*
                (state, _) => state,
            }
        }
    }
}

fn render_accepts(table: &TableStructure) -> TokenStream {
    let state_ty = &table.args.state;
    let event_ty = &table.args.event;
    let patterns = table.arms().map(|(_, arm)| {
        let (state, event) = (&arm.state, &arm.event);
        quote! { (#state_ty::#state, #event_ty::#event) }
    });

    quote! {
        /// Returns true if `event` has a declared handler in `state`.
        #[must_use]
        pub fn accepts(state: #state_ty, event: #event_ty) -> bool {
            matches!((state, event), #(#patterns)|*)
        }
    }
}
