//! Argument helpers shared by the per-capability request types.

use serde::Deserialize;

/// A list of strings that callers may also send as a single string
/// (e.g. `"to": "a@x.com"`). Comma-separated single strings are split.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    One(String),
    Many(Vec<String>),
}

impl StringList {
    /// Trimmed, non-empty entries.
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            Self::One(single) => single.split(',').map(str::to_string).collect(),
            Self::Many(items) => items,
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Converts an optional list argument into a plain vector.
pub fn list_or_empty(list: Option<StringList>) -> Vec<String> {
    list.map(StringList::into_vec).unwrap_or_default()
}

/// Treats blank strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_accepts_single_and_many() {
        let one: StringList = serde_json::from_str(r#""a@x.com, b@x.com""#).unwrap();
        assert_eq!(one.into_vec(), vec!["a@x.com", "b@x.com"]);

        let many: StringList = serde_json::from_str(r#"["a@x.com", " "]"#).unwrap();
        assert_eq!(many.into_vec(), vec!["a@x.com"]);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" id ")), Some("id"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
