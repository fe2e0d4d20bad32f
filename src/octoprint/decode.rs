//! Lenient JSON decoding for controller responses
//!
//! Controllers are not trusted to return well-formed bodies. A body that is
//! not JSON, or a field that is missing, decodes to the zero value instead of
//! failing the request. [`Decoded::present`] records whether anything was
//! actually found, so callers can tell "the controller said nothing" apart
//! from a real empty value.

use serde_json::{Map, Value};

/// Opaque JSON object as returned by a controller
pub type JsonObject = Map<String, Value>;

/// Best-effort decode result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded<T> {
    /// Decoded value, or the zero value when nothing was found
    pub value: T,

    /// Whether the value was actually present in the response
    pub present: bool,
}

impl<T> Decoded<T> {
    /// Value found in the response
    pub fn found(value: T) -> Self {
        Self {
            value,
            present: true,
        }
    }

    /// Nothing usable in the response
    pub fn absent() -> Self
    where
        T: Default,
    {
        Self {
            value: T::default(),
            present: false,
        }
    }

    /// Unwrap into the (possibly zero) value
    pub fn into_value(self) -> T {
        self.value
    }

    /// The value, or `None` when the response held nothing usable
    pub fn into_present(self) -> Option<T> {
        self.present.then_some(self.value)
    }
}

/// Decode a body as a JSON object
///
/// Non-JSON bodies and JSON documents that are not objects yield an empty
/// object with `present == false`.
pub fn decode_object(body: &[u8]) -> Decoded<JsonObject> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Decoded::found(map),
        _ => Decoded::absent(),
    }
}

/// Decode a string at a dotted path (`"current.state"`) from a raw body
pub fn decode_string_field(body: &[u8], path: &str) -> Decoded<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(root) => string_at(&root, path),
        Err(_) => Decoded::absent(),
    }
}

/// Walk a dotted path through objects and arrays (numeric segments index arrays)
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Render a JSON value as a plain string
///
/// Strings are returned unquoted, other scalars and containers use their JSON
/// text, and `null` counts as absent.
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn string_at(root: &Value, path: &str) -> Decoded<String> {
    lookup(root, path)
        .and_then(stringify)
        .map_or_else(Decoded::absent, Decoded::found)
}
