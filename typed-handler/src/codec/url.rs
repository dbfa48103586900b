//! Struct decoding from path parameters and form values

use thiserror::Error;

use super::{Decoder, FieldError, FieldSource, Incoming};
use crate::error::BoxError;
use crate::payload::Decodable;

/// Failure decoding a request into a struct
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The target has no field table
    #[error("value is not a struct")]
    InvalidTarget,

    #[error("{name}: {source}")]
    Field {
        name: &'static str,
        #[source]
        source: FieldError,
    },

    /// The request body could not be read
    #[error("cannot read request body: {0}")]
    Body(#[source] BoxError),

    #[error("request body exceeds limit of {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The router's path parameters could not be extracted
    #[error("invalid path parameters: {0}")]
    PathParams(#[source] BoxError),
}

/// Decodes struct fields from path parameters and form/query values
///
/// Per field, the first matching rule applies:
///
/// 1. `#[typed(form|query|schema = "k")]`: form value `k`, nothing else
/// 2. `#[typed(url = "k")]`: path parameter `k`
/// 3. `#[serde(rename = "k")]`, or the name a struct-level
///    `#[serde(rename_all = "..")]` gives the field: path parameter `k`, then
///    form value `k`
/// 4. untagged: path parameter matching the field name ignoring case, then
///    form value matching it ignoring case
///
/// Fields without a non-empty value keep their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlDecoder;

impl UrlDecoder {
    fn lookup<'r>(req: &'r Incoming<'_>, name: &str, source: FieldSource) -> Option<&'r str> {
        match source {
            FieldSource::Form(key) => req.form_value(key),
            FieldSource::Url(key) => req.path_params().get(key),
            FieldSource::Json(key) => req
                .path_params()
                .get(key)
                .filter(|value| !value.is_empty())
                .or_else(|| req.form_value(key)),
            FieldSource::Untagged => req
                .path_params()
                .get_ignore_case(name)
                .filter(|value| !value.is_empty())
                .or_else(|| req.form_value_ignore_case(name)),
        }
    }
}

impl Decoder for UrlDecoder {
    fn decode(&self, req: &Incoming<'_>, target: &mut dyn Decodable) -> Result<(), BoxError> {
        let fields = target.fields().ok_or(DecodeError::InvalidTarget)?;

        for (index, field) in fields.iter().enumerate() {
            let Some(raw) = Self::lookup(req, field.name, field.source) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            target
                .set_field(index, raw)
                .map_err(|source| DecodeError::Field {
                    name: field.name,
                    source,
                })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PathParams;
    use crate::{Decodable, HttpError};
    use axum::body::Bytes;
    use chrono::NaiveDate;
    use http::{header, request::Parts, Request};
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Default, Deserialize, Decodable)]
    struct Everything {
        #[typed(url = "id")]
        id: u64,
        #[typed(form = "name")]
        name: String,
        #[typed(query = "limit")]
        limit: Option<u32>,
        #[typed(schema = "offset")]
        offset: i64,
        #[typed(query = "ratio")]
        ratio: f32,
        #[typed(query = "dry_run")]
        dry_run: bool,
        #[typed(query = "verbose")]
        verbose: bool,
        #[typed(query = "since")]
        since: Option<NaiveDate>,
        #[serde(rename = "orgSlug")]
        org: String,
        untagged: String,
        #[typed(skip)]
        #[serde(skip)]
        internal: String,
    }

    fn request(uri: &str) -> Parts {
        Request::get(uri).body(()).unwrap().into_parts().0
    }

    fn decode<T: Decodable>(parts: &Parts, params: &PathParams, target: &mut T) -> Result<(), BoxError> {
        let incoming = Incoming::new(parts, params, Bytes::new());
        UrlDecoder.decode(&incoming, target)
    }

    #[test]
    fn test_decodes_every_supported_kind() {
        let parts = request(
            "/orgs/x/items/9?name=widget&limit=10&offset=-3&ratio=0.5&dry_run=1&since=2024-01-31&internal=nope",
        );
        let params: PathParams = [("id", "9"), ("orgSlug", "acme")].into_iter().collect();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.id, 9);
        assert_eq!(value.name, "widget");
        assert_eq!(value.limit, Some(10));
        assert_eq!(value.offset, -3);
        assert_eq!(value.ratio, 0.5);
        assert!(value.dry_run);
        assert_eq!(value.since, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(value.org, "acme");
        assert_eq!(value.internal, "");
    }

    #[test]
    fn test_absent_values_keep_zero_values() {
        let parts = request("/items");
        let params = PathParams::new();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.id, 0);
        assert_eq!(value.name, "");
        assert_eq!(value.limit, None);
        assert_eq!(value.since, None);
        assert!(!value.verbose);
    }

    #[test]
    fn test_bool_false_string_sets_true() {
        let parts = request("/items?verbose=false");
        let params = PathParams::new();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert!(value.verbose);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let parts = request("/items?verbose=&limit=");
        let params = PathParams::new();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert!(!value.verbose);
        assert_eq!(value.limit, None);
    }

    #[test]
    fn test_form_tag_never_falls_through_to_path() {
        let parts = request("/items");
        let params: PathParams = [("name", "from-path")].into_iter().collect();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.name, "");
    }

    #[test]
    fn test_url_tag_ignores_query() {
        let parts = request("/items?id=5");
        let params = PathParams::new();
        let mut value = Everything::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.id, 0);
    }

    #[test]
    fn test_json_tag_prefers_path_then_form() {
        let params = PathParams::new();
        let parts = request("/items?orgSlug=from-query");
        let mut value = Everything::default();
        decode(&parts, &params, &mut value).unwrap();
        assert_eq!(value.org, "from-query");

        let params: PathParams = [("orgSlug", "from-path")].into_iter().collect();
        let mut value = Everything::default();
        decode(&parts, &params, &mut value).unwrap();
        assert_eq!(value.org, "from-path");
    }

    #[test]
    fn test_untagged_matches_ignoring_case() {
        let params = PathParams::new();
        let parts = request("/items?UNTAGGED=query");
        let mut value = Everything::default();
        decode(&parts, &params, &mut value).unwrap();
        assert_eq!(value.untagged, "query");

        let params: PathParams = [("Untagged", "path")].into_iter().collect();
        let mut value = Everything::default();
        decode(&parts, &params, &mut value).unwrap();
        assert_eq!(value.untagged, "path");
    }

    #[test]
    fn test_unparsable_int_names_field_and_kind() {
        let parts = request("/items?offset=abc");
        let params = PathParams::new();
        let mut value = Everything::default();

        let err = decode(&parts, &params, &mut value).unwrap_err();

        assert!(err.downcast_ref::<HttpError>().is_none());
        let decode_err = err.downcast_ref::<DecodeError>().unwrap();
        assert!(matches!(
            decode_err,
            DecodeError::Field {
                name: "offset",
                source: FieldError::Int(_)
            }
        ));
        assert!(err.to_string().starts_with("offset: invalid int: "));
    }

    #[test]
    fn test_non_struct_target_is_invalid() {
        let parts = request("/items?a=1");
        let params = PathParams::new();
        let mut value = Value::Null;

        let err = decode(&parts, &params, &mut value).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DecodeError>(),
            Some(DecodeError::InvalidTarget)
        ));
        assert_eq!(err.to_string(), "value is not a struct");
    }

    #[test]
    fn test_urlencoded_post_body() {
        let parts = Request::post("/items")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let params = PathParams::new();
        let incoming = Incoming::new(&parts, &params, Bytes::from_static(b"name=gadget&limit=3"));
        let mut value = Everything::default();

        UrlDecoder.decode(&incoming, &mut value).unwrap();

        assert_eq!(value.name, "gadget");
        assert_eq!(value.limit, Some(3));
    }

    fn default_sort() -> String {
        "name".into()
    }

    #[derive(Debug, Default, Deserialize, Decodable)]
    #[serde(rename_all = "camelCase")]
    struct Listing {
        page_size: u32,
        #[serde(rename = "q")]
        search_text: String,
        #[serde(default = "default_sort", alias = "order", rename = "sortBy")]
        sort_key: String,
        #[typed(query = "cursor")]
        next_cursor: Option<String>,
    }

    #[test]
    fn test_rename_all_names_untagged_fields() {
        let parts = request("/items?pageSize=25&q=lamp&sortBy=price&cursor=abc");
        let params = PathParams::new();
        let mut value = Listing::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.page_size, 25);
        assert_eq!(value.search_text, "lamp");
        assert_eq!(value.sort_key, "price");
        assert_eq!(value.next_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_rename_all_replaces_field_name() {
        let parts = request("/items?page_size=5");
        let params = PathParams::new();
        let mut value = Listing::default();

        decode(&parts, &params, &mut value).unwrap();

        assert_eq!(value.page_size, 0);
    }
}
