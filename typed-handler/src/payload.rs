//! Request and response value capabilities
//!
//! Request types implement [`Decodable`], response types [`Encodable`]. Both
//! are normally derived:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use typed_handler::{Decodable, Encodable};
//!
//! #[derive(Debug, Default, Deserialize, Decodable)]
//! struct GetUser {
//!     #[typed(url = "id")]
//!     id: u64,
//!     #[typed(query = "fields")]
//!     fields: Option<String>,
//! }
//!
//! #[derive(Debug, Serialize, Encodable)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{Field, FieldError, Validate};

/// A value that can be filled in from a request
pub trait Decodable: Send + 'static {
    /// Field table for struct decoding, `None` when the type is not a struct
    fn fields(&self) -> Option<&'static [Field]> {
        None
    }

    /// Convert `raw` and store it in the field at `index` of [`fields`](Self::fields)
    fn set_field(&mut self, index: usize, _raw: &str) -> Result<(), FieldError> {
        Err(FieldError::NoSuchField(index))
    }

    /// Replace `self` with the JSON document in `body`
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()>;

    /// Self-check hook, if the type has one
    fn validator(&self) -> Option<&dyn Validate> {
        None
    }
}

/// A value that can be written as a response body
pub trait Encodable: Send + 'static {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>>;

    /// Self-check hook, if the type has one
    fn validator(&self) -> Option<&dyn Validate> {
        None
    }
}

/// Marker for "no request value" or "no response body"
///
/// A handler taking `NoBody` never reads or decodes the request body; a
/// handler returning `NoBody` produces an empty 200 response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoBody;

impl Decodable for NoBody {
    fn fields(&self) -> Option<&'static [Field]> {
        Some(&[])
    }

    fn decode_json(&mut self, _body: &[u8]) -> serde_json::Result<()> {
        Ok(())
    }
}

impl Encodable for NoBody {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

impl Decodable for Value {
    fn decode_json(&mut self, body: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(body)?;
        Ok(())
    }
}

impl Encodable for Value {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl<T: Serialize + Send + 'static> Encodable for Vec<T> {
    fn encode_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_decode_replaces_contents() {
        let mut value = Value::Null;
        value.decode_json(br#"{"a":[1,2]}"#).unwrap();
        assert_eq!(value, json!({"a": [1, 2]}));
        assert!(value.fields().is_none());
    }

    #[test]
    fn test_value_decode_error() {
        let mut value = Value::Null;
        assert!(value.decode_json(b"{").is_err());
    }

    #[test]
    fn test_value_set_field_rejected() {
        let mut value = Value::Null;
        let err = value.set_field(0, "x").unwrap_err();
        assert!(matches!(err, FieldError::NoSuchField(0)));
    }

    #[test]
    fn test_no_body_is_an_empty_struct() {
        assert_eq!(NoBody.fields(), Some(&[][..]));
        assert!(NoBody.encode_json().unwrap().is_empty());
    }

    #[test]
    fn test_vec_encodes_as_array() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(list.encode_json().unwrap(), br#"["a","b"]"#);
    }
}
