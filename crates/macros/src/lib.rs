//! Proc macros for Wayfinder navigation metadata.
//!
//! Provides the `#[nav_controller]` attribute macro, which turns the
//! `#[nav_item(...)]` and `#[authorize(...)]` annotations on a handler's
//! `impl` block into a `HandlerDescriptor` linked into the kernel's
//! handler table.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Attribute, Expr, Ident, ImplItem, ItemImpl, LitStr, Token, Type,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Registers a request handler's navigation metadata.
///
/// Every method of the annotated `impl` block becomes an action named after
/// the method. Methods may carry any number of `#[nav_item]` declarations
/// (one navigation entry each) and `#[authorize]` role requirements; the
/// `impl` block itself may also carry `#[authorize]`, which applies to every
/// action.
///
/// # Example
///
/// ```ignore
/// pub struct AdminController;
///
/// #[nav_controller]
/// #[authorize(roles = "Everyone")]
/// impl AdminController {
///     #[nav_item("MainNav", sub_context = "AdminSubNav", title = "Admin", ordering_hint = 999)]
///     #[nav_item("AdminSubNav", title = "General Admin")]
///     #[authorize(roles = "Administrators")]
///     pub fn index() {}
/// }
/// ```
#[proc_macro_attribute]
pub fn nav_controller(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "nav_controller takes no arguments",
        )
        .to_compile_error()
        .into();
    }

    let mut item_impl = parse_macro_input!(item as ItemImpl);

    match expand_controller(&mut item_impl) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand_controller(item_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if !item_impl.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item_impl.generics,
            "nav_controller does not support generic handlers",
        ));
    }

    let type_name = handler_ident(&item_impl.self_ty)?.to_string();
    let handler_roles = take_authorize(&mut item_impl.attrs)?;

    let mut actions = Vec::new();
    for impl_item in &mut item_impl.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let roles = take_authorize(&mut method.attrs)?;
        let nav = take_nav_items(&mut method.attrs)?
            .iter()
            .map(nav_declaration)
            .collect::<Vec<_>>();
        let name = method.sig.ident.to_string();

        actions.push(quote! {
            ::wayfinder_kernel::menu::ActionDescriptor {
                name: #name,
                roles: &[#(#roles),*],
                nav: &[#(#nav),*],
            }
        });
    }

    let static_ident = format_ident!("__WAYFINDER_HANDLER_{}", type_name.to_uppercase());

    Ok(quote! {
        #item_impl

        #[doc(hidden)]
        #[::wayfinder_kernel::linkme::distributed_slice(::wayfinder_kernel::menu::NAV_HANDLERS)]
        #[linkme(crate = ::wayfinder_kernel::linkme)]
        static #static_ident: ::wayfinder_kernel::menu::HandlerDescriptor =
            ::wayfinder_kernel::menu::HandlerDescriptor {
                type_name: #type_name,
                roles: &[#(#handler_roles),*],
                actions: &[#(#actions),*],
            };
    })
}

/// Last path segment of the implementing type (`crate::web::HomeController` -> `HomeController`).
fn handler_ident(ty: &Type) -> syn::Result<&Ident> {
    if let Type::Path(type_path) = ty
        && let Some(segment) = type_path.path.segments.last()
    {
        return Ok(&segment.ident);
    }
    Err(syn::Error::new_spanned(
        ty,
        "nav_controller must be applied to an impl block of a named type",
    ))
}

fn nav_declaration(args: &NavItemArgs) -> TokenStream2 {
    let context = &args.context;
    let sub_context = args.sub_context.clone().unwrap_or_else(empty_lit);
    let title = args.title.clone().unwrap_or_else(empty_lit);
    let description = args.description.clone().unwrap_or_else(empty_lit);
    let ordering_hint = match &args.ordering_hint {
        Some(expr) => quote!(#expr),
        None => quote!(0),
    };
    let render_context = match &args.render_context {
        Some(lit) => quote!(::core::option::Option::Some(#lit)),
        None => quote!(::core::option::Option::None),
    };

    quote! {
        ::wayfinder_kernel::menu::NavDeclaration {
            context: #context,
            sub_context: #sub_context,
            title: #title,
            description: #description,
            ordering_hint: #ordering_hint,
            render_context: #render_context,
        }
    }
}

fn empty_lit() -> LitStr {
    LitStr::new("", proc_macro2::Span::call_site())
}

/// Remove every `#[authorize(roles = "...")]` attribute, returning the role strings.
fn take_authorize(attrs: &mut Vec<Attribute>) -> syn::Result<Vec<LitStr>> {
    let mut roles = Vec::new();
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if attr.path().is_ident("authorize") {
            let args: AuthorizeArgs = attr.parse_args()?;
            roles.push(args.roles);
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    Ok(roles)
}

/// Remove every `#[nav_item(...)]` attribute, preserving declaration order.
fn take_nav_items(attrs: &mut Vec<Attribute>) -> syn::Result<Vec<NavItemArgs>> {
    let mut items = Vec::new();
    let mut kept = Vec::with_capacity(attrs.len());

    for attr in attrs.drain(..) {
        if attr.path().is_ident("nav_item") {
            items.push(attr.parse_args::<NavItemArgs>()?);
        } else {
            kept.push(attr);
        }
    }

    *attrs = kept;
    Ok(items)
}

/// Arguments to `#[nav_item("Context", key = value, ...)]`.
struct NavItemArgs {
    context: LitStr,
    sub_context: Option<LitStr>,
    title: Option<LitStr>,
    description: Option<LitStr>,
    ordering_hint: Option<Expr>,
    render_context: Option<LitStr>,
}

impl Parse for NavItemArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = NavItemArgs {
            context: input.parse()?,
            sub_context: None,
            title: None,
            description: None,
            ordering_hint: None,
            render_context: None,
        };

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }

            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "sub_context" => args.sub_context = Some(input.parse()?),
                "title" => args.title = Some(input.parse()?),
                "description" => args.description = Some(input.parse()?),
                "ordering_hint" => args.ordering_hint = Some(input.parse()?),
                "render_context" => args.render_context = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown nav_item argument `{other}`"),
                    ));
                }
            }
        }

        Ok(args)
    }
}

/// Arguments to `#[authorize(roles = "...")]`.
struct AuthorizeArgs {
    roles: LitStr,
}

impl Parse for AuthorizeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        if key != "roles" {
            return Err(syn::Error::new(
                key.span(),
                "expected `roles = \"...\"`",
            ));
        }
        input.parse::<Token![=]>()?;
        Ok(AuthorizeArgs {
            roles: input.parse()?,
        })
    }
}
