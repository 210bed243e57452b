//! Procedural macros for scoped-store

use darling::{FromDeriveInput, FromMeta, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Case convention applied to variant names
    #[darling(default)]
    rename_all: Option<RenameRule>,

    /// Also implement `ActionSummary` with its default (Debug) summary
    #[darling(default)]
    summary: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit kind, overrides `rename_all`
    #[darling(default)]
    kind: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum RenameRule {
    SnakeCase,
    ScreamingSnakeCase,
    KebabCase,
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "snake_case" => Ok(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnakeCase),
            "kebab-case" => Ok(Self::KebabCase),
            other => Err(darling::Error::unknown_value(other)),
        }
    }
}

impl RenameRule {
    fn apply(self, variant: &str) -> String {
        let snake = to_snake_case(variant);
        match self {
            Self::SnakeCase => snake,
            Self::ScreamingSnakeCase => snake.to_uppercase(),
            Self::KebabCase => snake.replace('_', "-"),
        }
    }
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method returning the variant's kind as a static
/// string, plus an inherent `KINDS` constant listing every kind in
/// declaration order.
///
/// - `#[action(rename_all = "SCREAMING_SNAKE_CASE")]` (or `snake_case`,
///   `kebab-case`) converts variant names
/// - `#[action(kind = "...")]` on a variant sets its kind explicitly
/// - `#[action(summary)]` also implements `ActionSummary`
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(rename_all = "SCREAMING_SNAKE_CASE")]
/// enum CountAction {
///     Increment,
///     #[action(kind = "RESET_TO")]
///     Reset(i32),
/// }
///
/// assert_eq!(CountAction::Increment.name(), "INCREMENT");
/// assert_eq!(CountAction::Reset(0).name(), "RESET_TO");
/// assert_eq!(CountAction::KINDS, &["INCREMENT", "RESET_TO"]);
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let kinds: Vec<String> = variants
        .iter()
        .map(|v| match (&v.kind, opts.rename_all) {
            (Some(kind), _) => kind.clone(),
            (None, Some(rule)) => rule.apply(&v.ident.to_string()),
            (None, None) => v.ident.to_string(),
        })
        .collect();

    for (i, kind) in kinds.iter().enumerate() {
        if kinds[..i].contains(kind) {
            return syn::Error::new_spanned(
                &variants[i].ident,
                format!("duplicate action kind `{}`", kind),
            )
            .to_compile_error()
            .into();
        }
    }

    let name_arms = variants.iter().zip(kinds.iter()).map(|(v, kind)| {
        let variant_name = &v.ident;
        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #kind
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #kind
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #kind
            },
        }
    });

    let mut expanded = quote! {
        impl #impl_generics scoped_store::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            /// Every action kind, in declaration order
            pub const KINDS: &'static [&'static str] = &[#(#kinds),*];
        }
    };

    if opts.summary {
        expanded = quote! {
            #expanded

            impl #impl_generics scoped_store::ActionSummary for #name #ty_generics #where_clause {}
        };
    }

    TokenStream::from(expanded)
}
