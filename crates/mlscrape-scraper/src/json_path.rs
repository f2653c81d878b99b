//! Null-safe lookups into untrusted, deeply nested page state.
//!
//! Paths are dot separated; a segment made of digits indexes into an array
//! (`"pictures.pictures.0.id"`). A missing key, a type mismatch, an
//! out-of-range index and an explicit `null` all read as absent.

use serde_json::{Number, Value};

pub trait JsonPath {
    /// Value at `path`, or `None` when any segment is absent or `null`.
    fn at(&self, path: &str) -> Option<&Value>;

    fn str_at(&self, path: &str) -> Option<&str> {
        self.at(path).and_then(Value::as_str)
    }

    /// Owned string at `path`, treating `""` as absent.
    fn string_at(&self, path: &str) -> Option<String> {
        self.str_at(path).filter(|s| !s.is_empty()).map(str::to_owned)
    }

    fn number_at(&self, path: &str) -> Option<Number> {
        match self.at(path)? {
            Value::Number(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Number at `path`, treating `0` as absent.
    fn nonzero_number_at(&self, path: &str) -> Option<Number> {
        self.number_at(path).filter(|n| n.as_f64() != Some(0.0))
    }

    /// Unsigned integer at `path`, treating `0` as absent.
    fn nonzero_u64_at(&self, path: &str) -> Option<u64> {
        self.at(path).and_then(Value::as_u64).filter(|&n| n != 0)
    }

    /// Array at `path`, or an empty slice.
    fn array_at(&self, path: &str) -> &[Value] {
        self.at(path)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl JsonPath for Value {
    fn at(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }
}

/// First entry of a components list whose `type` equals `kind`.
pub fn find_component<'a>(components: &'a [Value], kind: &str) -> Option<&'a Value> {
    components
        .iter()
        .find(|c| c.str_at("type") == Some(kind))
}
