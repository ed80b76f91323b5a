//! Logging filtered values through `slog`.
//!
//! [`FilteredJson`] is a `slog::Value` holding the JSON a [`FieldFilter`]
//! produces for a value, emitted through `slog`'s nested-value support. Only
//! the filtered form is ever serialized; fields the filter omits never reach
//! the drain.
//!
//! Logging is infallible here: if the value cannot be serialized, a placeholder
//! string is logged instead of propagating the error.

use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{filter::FieldFilter, walk::Filterable};

const SERIALIZE_FAILED: &str = "Failed to serialize filtered value";

/// A `slog::Value` carrying an already-filtered JSON payload.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredJson {
    value: JsonValue,
}

impl FilteredJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The filtered payload.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for FilteredJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Turns any [`Filterable`] value into a loggable [`FilteredJson`].
///
/// ```rust
/// use json_only::{slog::IntoFilteredJson, FieldFilter, JsonOnly};
///
/// #[derive(JsonOnly)]
/// #[json_only("id")]
/// struct Session {
///     id: u64,
///     token: String,
/// }
///
/// let filter = FieldFilter::new();
/// let session = Session { id: 7, token: "secret".into() };
/// let logged = session.filtered_json(&filter);
///
/// assert_eq!(logged.as_json(), &serde_json::json!({ "id": 7 }));
/// ```
pub trait IntoFilteredJson: Filterable {
    /// Filters `self` with `filter` and captures the resulting JSON.
    ///
    /// On serialization failure the payload is the string
    /// `"Failed to serialize filtered value"`.
    fn filtered_json(&self, filter: &FieldFilter) -> FilteredJson {
        let value = filter
            .to_value(self)
            .unwrap_or_else(|_| JsonValue::String(SERIALIZE_FAILED.to_string()));
        FilteredJson::new(value)
    }
}

impl<T> IntoFilteredJson for T where T: Filterable + ?Sized {}
