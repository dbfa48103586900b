use proc_macro2::TokenTree;
use syn::{meta::ParseNestedMeta, parse::ParseStream, Attribute, LitStr, Token};

use crate::case::RenameRule;

/// Struct-level options from `#[typed(...)]` and `#[serde(...)]`
#[derive(Default)]
pub struct ContainerAttrs {
    pub validate: bool,
    pub rename_all: Option<RenameRule>,
}

/// Where a field's raw value comes from
pub enum Source {
    Form(String),
    Url(String),
    Json(String),
    Untagged,
}

/// Field-level options gathered from `#[typed(...)]` and `#[serde(...)]`
#[derive(Default)]
pub struct FieldAttrs {
    pub skip: bool,
    form: Option<String>,
    url: Option<String>,
    serde_rename: Option<String>,
}

impl FieldAttrs {
    /// `field` is the unraw identifier, renamed by `rename_all` when serde
    /// would rename it
    pub fn source(&self, field: &str, rename_all: Option<RenameRule>) -> Source {
        if let Some(key) = &self.form {
            Source::Form(key.clone())
        } else if let Some(key) = &self.url {
            Source::Url(key.clone())
        } else if let Some(key) = &self.serde_rename {
            Source::Json(key.clone())
        } else if let Some(rule) = rename_all {
            Source::Json(rule.apply_to_field(field))
        } else {
            Source::Untagged
        }
    }
}

pub fn container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("typed") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("validate") {
                    parsed.validate = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported typed attribute, expected `validate`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    if let Some(name) = deserialize_name(&meta)? {
                        // serde rejects unknown rules itself
                        parsed.rename_all = RenameRule::parse(&name);
                    }
                } else {
                    skip_meta_value(meta.input)?;
                }
                Ok(())
            })?;
        }
    }

    Ok(parsed)
}

pub fn field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("typed") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("form")
                    || meta.path.is_ident("query")
                    || meta.path.is_ident("schema")
                {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.form.get_or_insert(value.value());
                } else if meta.path.is_ident("url") {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.url = Some(value.value());
                } else {
                    return Err(meta.error(
                        "unsupported typed attribute, expected `form`, `query`, `schema`, `url` or `skip`",
                    ));
                }
                Ok(())
            })?;
        } else if attr.path().is_ident("serde") {
            read_serde(attr, &mut parsed)?;
        }
    }

    Ok(parsed)
}

// Only `rename` and the skip flags matter here. Every other item is skipped
// whole, whatever its shape.
fn read_serde(attr: &Attribute, parsed: &mut FieldAttrs) -> syn::Result<()> {
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("skip") || meta.path.is_ident("skip_deserializing") {
            parsed.skip = true;
        } else if meta.path.is_ident("rename") {
            if let Some(name) = deserialize_name(&meta)? {
                parsed.serde_rename = Some(name);
            }
        } else {
            skip_meta_value(meta.input)?;
        }
        Ok(())
    })
}

/// The name serde deserializes under: `x = "k"` or `x(deserialize = "k")`
fn deserialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<String>> {
    if meta.input.peek(Token![=]) {
        let value: LitStr = meta.value()?.parse()?;
        return Ok(Some(value.value()));
    }

    let mut name = None;
    meta.parse_nested_meta(|inner| {
        let value: LitStr = inner.value()?.parse()?;
        if inner.path.is_ident("deserialize") {
            name = Some(value.value());
        }
        Ok(())
    })?;
    Ok(name)
}

/// Consume the rest of a nested meta item up to the next top-level comma
fn skip_meta_value(input: ParseStream) -> syn::Result<()> {
    while !input.is_empty() && !input.peek(Token![,]) {
        input.parse::<TokenTree>()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn json_key(source: Source) -> Option<String> {
        match source {
            Source::Json(key) => Some(key),
            _ => None,
        }
    }

    #[test]
    fn test_rename_found_after_other_serde_items() {
        let attrs: Vec<Attribute> = vec![parse_quote!(
            #[serde(default = "default_sort", with = "sort::codec", bound(deserialize = "T: Ord, U: Ord"), rename = "sortBy")]
        )];

        let parsed = field_attrs(&attrs).unwrap();

        assert_eq!(json_key(parsed.source("sort_key", None)).as_deref(), Some("sortBy"));
    }

    #[test]
    fn test_deserialize_rename_wins_over_rename_all() {
        let attrs: Vec<Attribute> = vec![parse_quote!(
            #[serde(rename(serialize = "out", deserialize = "in"))]
        )];

        let parsed = field_attrs(&attrs).unwrap();

        assert_eq!(
            json_key(parsed.source("value", Some(RenameRule::Camel))).as_deref(),
            Some("in")
        );
    }

    #[test]
    fn test_container_rename_all() {
        let attrs: Vec<Attribute> = vec![
            parse_quote!(#[serde(deny_unknown_fields, rename_all = "camelCase")]),
            parse_quote!(#[typed(validate)]),
        ];

        let parsed = container_attrs(&attrs).unwrap();
        let field = FieldAttrs::default();

        assert!(parsed.validate);
        assert_eq!(
            json_key(field.source("page_size", parsed.rename_all)).as_deref(),
            Some("pageSize")
        );
        assert!(matches!(field.source("page_size", None), Source::Untagged));
    }

    #[test]
    fn test_malformed_rename_is_an_error() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(rename = 5)])];

        assert!(field_attrs(&attrs).is_err());
    }
}
