//! Procedural macros used in the definition and implementation of getters and setters for ValidationOptions

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::ParseStream;
use syn::parse::{Parse, Result};
use syn::{Expr, Ident, Token};

type ValueName = Ident;
type ValueType = Ident;
type DefaultValue = Expr;

/// Signature contains the results of parsing a vo_gets_and_sets definition, i.e., the
/// name of a value stored in a ValidationOptions map and the corresponding type.
struct Signature {
    value_name: ValueName,
    value_type: ValueType,
}

impl Parse for Signature {
    fn parse(stream: ParseStream) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        Ok(Signature {
            value_name,
            value_type,
        })
    }
}

/// SignatureWithDefault contains the results of parsing a vo_gets_and_sets_with_default definition, i.e., the
/// name of a value stored in a ValidationOptions map, the corresponding type and the default value,
/// i.e., `vo_gets_and_sets_with_default!(VO_VALIDATE_KEY_USAGE, bool, true)`.
struct SignatureWithDefault {
    value_name: ValueName,
    value_type: ValueType,
    default_value: DefaultValue,
}

impl Parse for SignatureWithDefault {
    fn parse(stream: ParseStream) -> Result<Self> {
        let value_name = stream.parse()?;
        let _comma: Token!(,) = stream.parse()?;
        let value_type = stream.parse()?;
        let _comma2: Token!(,) = stream.parse()?;
        let default_value = stream.parse()?;
        Ok(SignatureWithDefault {
            value_name,
            value_type,
            default_value,
        })
    }
}

/// is_string_numeric is used to determine if a string value contains only numeric characters.
/// It is used to process a slice that omits the first character, i.e., in order to identify
/// types like u8, u64, etc.
fn is_string_numeric(str: &str) -> bool {
    !str.is_empty() && str.chars().all(|c| c.is_numeric())
}

/// variant_name maps a Rust type name to the ValidationOptionTypes variant that carries it,
/// i.e., bool maps to Bool, u64 maps to U64 and all other names are used as is.
fn variant_name(type_name: &str) -> String {
    if type_name == "bool" {
        "Bool".to_string()
    } else if is_string_numeric(&type_name[1..]) {
        type_name.to_uppercase()
    } else {
        type_name.to_string()
    }
}

/// Names used for generated accessors drop the three character `VO_` prefix, i.e., `VO_CHECK_REVOCATION`
/// yields `get_check_revocation` and `set_check_revocation`.
fn accessor_names(flag: &Ident) -> (String, String) {
    let flag_str = format!("{}", flag)[3..].to_lowercase();
    (format!("get_{}", flag_str), format!("set_{}", flag_str))
}

fn setter_tokens(flag: &Ident, setter_str: &str, return_t: &Ident, vo_type: &Ident) -> TokenStream {
    let setter = Ident::new(setter_str, flag.span());
    let setter_comment = format!(
        "`{}` is used to set `{}` items in a [`ValidationOptions`] instance",
        setter_str, flag
    );
    quote! {
        #[doc = #setter_comment]
        pub fn #setter(&mut self, v: #return_t) {
            self.0.insert(#flag.to_string(), ValidationOptionTypes::#vo_type(v));
        }
    }
}

/// Generates `get_` and `set_` methods for an optional `ValidationOptions` item. The getter
/// returns None when the item is absent.
#[proc_macro]
pub fn vo_gets_and_sets(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as Signature);
    let flag = signature.value_name;
    let return_t = signature.value_type;

    let (getter_str, setter_str) = accessor_names(&flag);
    let getter = Ident::new(&getter_str, flag.span());
    let vo_type = Ident::new(&variant_name(&format!("{}", return_t)), return_t.span());

    let getter_comment = format!(
        "`{}` is used to retrieve `{}` items from a [`ValidationOptions`] instance",
        getter_str, flag
    );
    let setter = setter_tokens(&flag, &setter_str, &return_t, &vo_type);

    let tokens = quote! {
        impl ValidationOptions {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> Option<#return_t> {
                match self.0.get(#flag) {
                    Some(ValidationOptionTypes::#vo_type(v)) => Some(v.clone()),
                    _ => None,
                }
            }
            #setter
        }
    };
    tokens.into()
}

/// Generates `get_` and `set_` methods for a `ValidationOptions` item with a default value.
#[proc_macro]
pub fn vo_gets_and_sets_with_default(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let signature = syn::parse_macro_input!(input as SignatureWithDefault);
    let flag = signature.value_name;
    let return_t = signature.value_type;
    let default_value = signature.default_value;

    let (getter_str, setter_str) = accessor_names(&flag);
    let getter = Ident::new(&getter_str, flag.span());
    let vo_type = Ident::new(&variant_name(&format!("{}", return_t)), return_t.span());

    let getter_comment = format!(
        "`{}` is used to retrieve `{}` items from a [`ValidationOptions`] instance, returning the default when absent",
        getter_str, flag
    );
    let setter = setter_tokens(&flag, &setter_str, &return_t, &vo_type);

    let tokens = quote! {
        impl ValidationOptions {
            #[doc = #getter_comment]
            pub fn #getter(&self) -> #return_t {
                match self.0.get(#flag) {
                    Some(ValidationOptionTypes::#vo_type(v)) => v.clone(),
                    _ => #default_value,
                }
            }
            #setter
        }
    };
    tokens.into()
}
