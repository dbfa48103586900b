//! Field descriptors and string-to-value conversion
//!
//! A struct deriving [`Decodable`](crate::Decodable) exposes a static table of
//! [`Field`]s. Each entry names the field and where its raw value comes from;
//! the decoder looks the raw string up and hands it to the generated setter,
//! which converts it through [`FieldValue`].

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::error::BoxError;

/// Where a field's raw value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Form or query value under the given key; never falls through
    Form(&'static str),
    /// Path parameter under the given key
    Url(&'static str),
    /// Path parameter, then form value, under the serde name
    Json(&'static str),
    /// Case-insensitive match on the field name: path parameters, then form values
    Untagged,
}

/// A decodable field in a request struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Rust field name
    pub name: &'static str,
    /// Lookup rule for the raw value
    pub source: FieldSource,
}

impl Field {
    /// Describe a field
    pub const fn new(name: &'static str, source: FieldSource) -> Self {
        Self { name, source }
    }
}

/// Failure converting a raw string into a field value
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("invalid int: {0}")]
    Int(#[source] ParseIntError),

    #[error("invalid uint: {0}")]
    Uint(#[source] ParseIntError),

    #[error("invalid float: {0}")]
    Float(#[source] ParseFloatError),

    /// A text-parsed type rejected the value
    #[error("invalid {kind}: {source}")]
    Text {
        kind: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("no field at index {0}")]
    NoSuchField(usize),
}

impl FieldError {
    /// Wrap a parse failure from a text-parsed type
    pub fn text(kind: &'static str, source: impl Into<BoxError>) -> Self {
        FieldError::Text {
            kind,
            source: source.into(),
        }
    }
}

/// A type that can be populated from a single raw string
///
/// Implemented for strings, every integer width, floats, `bool`, `Option<T>`,
/// the `chrono` date/time types and `uuid::Uuid`. Other `FromStr` types opt in
/// with [`impl_text_field_value!`](crate::impl_text_field_value).
pub trait FieldValue: Sized {
    /// Convert a non-empty raw value
    fn parse_field(raw: &str) -> Result<Self, FieldError>;

    /// Store a non-empty raw value into `self`
    fn assign(&mut self, raw: &str) -> Result<(), FieldError> {
        *self = Self::parse_field(raw)?;
        Ok(())
    }
}

impl FieldValue for String {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        Ok(raw.to_owned())
    }
}

// Any non-empty value is true, including "false" and "0". Empty values never
// reach the setter, so a bool is either untouched or true.
impl FieldValue for bool {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        Ok(!raw.is_empty())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn parse_field(raw: &str) -> Result<Self, FieldError> {
        T::parse_field(raw).map(Some)
    }
}

macro_rules! impl_parsed {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl FieldValue for $ty {
                fn parse_field(raw: &str) -> Result<Self, FieldError> {
                    raw.parse::<$ty>().map_err(FieldError::$variant)
                }
            }
        )+
    };
}

impl_parsed!(Int => i8, i16, i32, i64, i128, isize);
impl_parsed!(Uint => u8, u16, u32, u64, u128, usize);
impl_parsed!(Float => f32, f64);

/// Implement [`FieldValue`] for types parsed through `FromStr`
///
/// ```rust
/// use std::str::FromStr;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Slug(String);
///
/// impl FromStr for Slug {
///     type Err = std::io::Error;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         Ok(Slug(s.to_lowercase()))
///     }
/// }
///
/// typed_handler::impl_text_field_value!(Slug);
///
/// use typed_handler::FieldValue;
/// assert_eq!(Slug::parse_field("Hello").unwrap(), Slug("hello".into()));
/// ```
#[macro_export]
macro_rules! impl_text_field_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::FieldValue for $ty {
                fn parse_field(
                    raw: &str,
                ) -> ::core::result::Result<Self, $crate::FieldError> {
                    <$ty as ::core::str::FromStr>::from_str(raw)
                        .map_err(|err| $crate::FieldError::text(::core::stringify!($ty), err))
                }
            }
        )+
    };
}

impl_text_field_value!(
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::NaiveTime,
    uuid::Uuid,
);
