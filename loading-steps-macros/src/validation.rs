//! Validation logic for transition table structure.

use darling::FromMeta;
use syn::{Error, FnArg, ImplItem, ImplItemFn, ReturnType, Type};

use crate::attrs::{OnAttr, TableArgs};

/// A method carrying one or more `#[on(..)]` attributes.
#[derive(Debug, Clone)]
pub struct Handler {
    /// The method with its `#[on(..)]` attributes removed.
    pub method: ImplItemFn,
    /// Every (state, event) pair routed to this method.
    pub arms: Vec<OnAttr>,
}

/// The parsed impl block.
#[derive(Debug)]
pub struct TableStructure {
    pub args: TableArgs,
    pub impl_block: syn::ItemImpl,
    pub handlers: Vec<Handler>,
    /// Items that are not transition handlers; emitted unchanged.
    pub passthrough: Vec<ImplItem>,
}

impl TableStructure {
    /// Parse the impl block and extract the transition table.
    pub fn parse(args: TableArgs, impl_block: syn::ItemImpl) -> syn::Result<Self> {
        if let Some((_, path, _)) = &impl_block.trait_ {
            return Err(Error::new_spanned(
                path,
                "#[transition_table] must be placed on an inherent impl block",
            ));
        }

        let mut handlers: Vec<Handler> = Vec::new();
        let mut passthrough = Vec::new();

        for item in &impl_block.items {
            let ImplItem::Fn(method) = item else {
                passthrough.push(item.clone());
                continue;
            };

            match Handler::parse(method)? {
                Some(handler) => {
                    check_conflicts(&handlers, &handler)?;
                    handlers.push(handler);
                }
                None => passthrough.push(item.clone()),
            }
        }

        if handlers.is_empty() {
            return Err(Error::new_spanned(
                &impl_block.self_ty,
                "transition table declares no #[on(state = .., event = ..)] handlers",
            ));
        }

        Ok(Self {
            args,
            impl_block,
            handlers,
            passthrough,
        })
    }

    /// All declared (state, event) pairs in declaration order.
    pub fn arms(&self) -> impl Iterator<Item = (&Handler, &OnAttr)> {
        self.handlers
            .iter()
            .flat_map(|handler| handler.arms.iter().map(move |arm| (handler, arm)))
    }
}

impl Handler {
    /// Returns `None` when the method has no `#[on(..)]` attribute.
    fn parse(method: &ImplItemFn) -> syn::Result<Option<Self>> {
        let mut arms = Vec::new();
        let mut attrs = Vec::with_capacity(method.attrs.len());

        for attr in &method.attrs {
            if attr.path().is_ident("on") {
                arms.push(OnAttr::from_meta(&attr.meta)?);
            } else {
                attrs.push(attr.clone());
            }
        }

        if arms.is_empty() {
            return Ok(None);
        }

        check_signature(method)?;

        let mut method = method.clone();
        method.attrs = attrs;
        Ok(Some(Self { method, arms }))
    }
}

/// Handlers run inside a synchronous, total `transition` function, so they
/// must be plain `fn(&self) -> Transition<State>`.
fn check_signature(method: &ImplItemFn) -> syn::Result<()> {
    let sig = &method.sig;

    if let Some(asyncness) = &sig.asyncness {
        return Err(Error::new_spanned(
            asyncness,
            "transition handlers must be synchronous",
        ));
    }

    let receiver_ok = matches!(
        sig.inputs.first(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    );
    if !receiver_ok || sig.inputs.len() != 1 {
        return Err(Error::new_spanned(
            &sig.inputs,
            "transition handlers must take `&self` and no other arguments",
        ));
    }

    let returns_transition = match &sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_some_and(|seg| seg.ident == "Transition"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if !returns_transition {
        return Err(Error::new_spanned(
            &sig.output,
            "transition handlers must return `Transition<State>`",
        ));
    }

    Ok(())
}

fn check_conflicts(existing: &[Handler], candidate: &Handler) -> syn::Result<()> {
    for (index, arm) in candidate.arms.iter().enumerate() {
        let earlier_in_candidate = candidate.arms[..index]
            .iter()
            .any(|other| other.state == arm.state && other.event == arm.event);
        let owner = existing.iter().find(|handler| {
            handler
                .arms
                .iter()
                .any(|other| other.state == arm.state && other.event == arm.event)
        });

        if earlier_in_candidate || owner.is_some() {
            let owner_name = owner
                .map(|handler| &handler.method.sig.ident)
                .unwrap_or(&candidate.method.sig.ident);
            return Err(Error::new(
                arm.event.span(),
                format!(
                    "conflicting transition: ({}, {}) is already handled by `{}`",
                    arm.state, arm.event, owner_name
                ),
            ));
        }
    }
    Ok(())
}
