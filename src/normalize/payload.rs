use serde_json::Value;
use tracing::warn;

use super::parse::parse_bool_safe;

/// Where in a payload a list of records was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArraySource {
    /// The payload itself is the array.
    Bare,
    /// Under one of the keys the endpoint is known to use.
    Keyed(String),
    /// Last resort: the first property holding an array of objects.
    Discovered(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShape<'a> {
    pub source: ArraySource,
    pub items: &'a [Value],
}

impl<'a> ArrayShape<'a> {
    /// Object entries with header/placeholder rows removed.
    pub fn records(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let items: &'a [Value] = self.items;
        items.iter().filter(|v| v.is_object() && !is_header(v))
    }
}

/// Locate the record list of a payload whose shape varies by endpoint.
/// `context` names the endpoint in the discovery log line.
pub fn locate_array<'a>(payload: &'a Value, known_keys: &[&str], context: &str) -> Option<ArrayShape<'a>> {
    if let Some(items) = payload.as_array() {
        return Some(ArrayShape { source: ArraySource::Bare, items });
    }

    for key in known_keys {
        if let Some(items) = payload.get(*key).and_then(|v| v.as_array()) {
            return Some(ArrayShape { source: ArraySource::Keyed((*key).to_string()), items });
        }
    }

    let obj = payload.as_object()?;
    let (key, items) = obj.iter().find_map(|(k, v)| {
        v.as_array()
            .filter(|a| a.iter().any(|e| e.is_object()))
            .map(|a| (k, a))
    })?;
    warn!(
        context,
        key = %key,
        "[NORMALIZE] {context}: no known list key ({}), fell back to first array property \"{key}\"",
        known_keys.join("/"),
    );
    Some(ArrayShape { source: ArraySource::Discovered(key.clone()), items })
}

/// Provider lists interleave section headers (`{"name": "BATSMEN", "isHeader": true}`).
pub fn is_header(v: &Value) -> bool {
    parse_bool_safe(v.get("isHeader"))
}

/// First present, non-null value among `keys`.
pub fn first_value<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| v.get(*k)).find(|x| !x.is_null())
}
