//! JSON whitespace stripping.

use crate::error::{GenError, Result};
use std::path::Path;

/// Returns `true` if the file name marks a JSON asset.
#[must_use]
pub fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Re-encodes a JSON document without insignificant whitespace.
///
/// Object keys come out sorted and the output ends with a newline.
///
/// # Errors
///
/// Returns `GenError::CompactJson` naming `path` if `input` is not valid JSON.
///
/// # Examples
///
/// ```
/// use essence_gen::compact::compact_json;
/// use std::path::Path;
///
/// let out = compact_json(Path::new("a.json"), b"{ \"b\": 1,\n  \"a\": [1, 2] }")?;
/// assert_eq!(out, b"{\"a\":[1,2],\"b\":1}\n");
/// # Ok::<(), essence_gen::GenError>(())
/// ```
pub fn compact_json(path: &Path, input: &[u8]) -> Result<Vec<u8>> {
    let error = |source| GenError::CompactJson {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_slice(input).map_err(error)?;
    let mut out = serde_json::to_vec(&value).map_err(error)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        assert!(is_json(Path::new("/static/data.json")));
        assert!(!is_json(Path::new("/static/data.json.txt")));
        assert!(!is_json(Path::new("/static/json")));
    }

    #[test]
    fn test_strips_whitespace() {
        let input = b"{\n  \"name\": \"essence\",\n  \"tags\": [ \"a\", \"b\" ]\n}\n";
        let out = compact_json(Path::new("x.json"), input).unwrap();
        assert_eq!(out, b"{\"name\":\"essence\",\"tags\":[\"a\",\"b\"]}\n");
    }

    #[test]
    fn test_keeps_string_whitespace() {
        let out = compact_json(Path::new("x.json"), br#"{ "text": "a  b" }"#).unwrap();
        assert_eq!(out, b"{\"text\":\"a  b\"}\n");
    }

    #[test]
    fn test_malformed_names_path() {
        let err = compact_json(Path::new("/static/bad.json"), b"{ \"a\": ").unwrap_err();
        assert!(err.is_source_error());
        assert!(err.to_string().contains("/static/bad.json"));
    }
}
