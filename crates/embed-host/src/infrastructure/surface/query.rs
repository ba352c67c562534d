//! Query-string formatting for the surface address.
//!
//! Keys are emitted in sorted order.  A `null` value produces a bare key, a
//! list produces one pair per element in the chosen [`ArrayFormat`], and
//! everything else produces `key=value`.  With strict encoding the characters
//! `!'()*` are escaped too, which is what [`urlencoding::encode`] does out of
//! the box; relaxed encoding restores them afterwards.

use std::borrow::Cow;

use serde_json::{Map, Value};

/// How list values are spelled in the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayFormat {
    /// `key=a&key=b`
    #[default]
    Repeat,
    /// `key[]=a&key[]=b`
    Bracket,
    /// `key[0]=a&key[1]=b`
    Index,
}

/// Encoding switches for [`format_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFormat {
    /// Percent-encode keys and values at all.
    pub encode: bool,
    /// Also escape `!'()*`.
    pub strict: bool,
    pub array_format: ArrayFormat,
}

impl Default for QueryFormat {
    fn default() -> Self {
        Self {
            encode: true,
            strict: true,
            array_format: ArrayFormat::Repeat,
        }
    }
}

const RELAXED: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// Formats `params` as a query string (without the leading `?`).
///
/// # Examples
///
/// ```rust
/// use embed_host::infrastructure::surface::query::{format_query, QueryFormat};
/// use serde_json::json;
///
/// let params = json!({"video": "v1", "parent": ["a.com", "b.com"], "muted": null});
/// let query = format_query(params.as_object().unwrap(), &QueryFormat::default());
/// assert_eq!(query, "muted&parent=a.com&parent=b.com&video=v1");
/// ```
pub fn format_query(params: &Map<String, Value>, format: &QueryFormat) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    keys.into_iter()
        .filter_map(|key| {
            let pair = match &params[key.as_str()] {
                Value::Null => encode(key, format).into_owned(),
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| list_pair(key, item, idx, format))
                    .collect::<Vec<_>>()
                    .join("&"),
                scalar => format!("{}={}", encode(key, format), encode(&scalar_text(scalar), format)),
            };
            (!pair.is_empty()).then_some(pair)
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn list_pair(key: &str, item: &Value, idx: usize, format: &QueryFormat) -> String {
    let key = encode(key, format);
    match (format.array_format, item) {
        (ArrayFormat::Index, Value::Null) => format!("{key}[{idx}]"),
        (ArrayFormat::Index, item) => format!(
            "{key}[{}]={}",
            encode(&idx.to_string(), format),
            encode(&scalar_text(item), format)
        ),
        (_, Value::Null) => key.into_owned(),
        (ArrayFormat::Bracket, item) => format!("{key}[]={}", encode(&scalar_text(item), format)),
        (ArrayFormat::Repeat, item) => format!("{key}={}", encode(&scalar_text(item), format)),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode<'a>(raw: &'a str, format: &QueryFormat) -> Cow<'a, str> {
    if !format.encode {
        return Cow::Borrowed(raw);
    }
    let strict = urlencoding::encode(raw);
    if format.strict {
        return strict;
    }
    let mut relaxed = strict.into_owned();
    for (escaped, plain) in RELAXED {
        relaxed = relaxed.replace(escaped, plain);
    }
    Cow::Owned(relaxed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
