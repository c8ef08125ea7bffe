//! Stored cache entries

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Return value and captured side output of one invocation
///
/// The value may be `null`; an entry holding `null` is still a hit. The output is
/// omitted entirely when output capture is disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "output_encoding"
    )]
    pub output: Option<Vec<u8>>,
}

impl CacheEntry {
    /// Entry without captured output
    pub fn new(value: Value) -> Self {
        Self {
            value,
            output: None,
        }
    }

    /// Entry with captured output
    pub fn with_output(value: Value, output: impl Into<Vec<u8>>) -> Self {
        Self {
            value,
            output: Some(output.into()),
        }
    }
}

/// Side output is arbitrary bytes; it is stored base64 encoded
mod output_encoding {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(output: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match output {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|data| STANDARD.decode(data).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_without_output_omits_field() {
        let json = serde_json::to_string(&CacheEntry::new(json!(42))).unwrap();
        assert_eq!(json, r#"{"value":42}"#);
    }

    #[test]
    fn test_null_entry_survives_storage() {
        let json = serde_json::to_string(&CacheEntry::new(Value::Null)).unwrap();
        assert_eq!(json, r#"{"value":null}"#);

        let entry: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry.value, Value::Null);
        assert_eq!(entry.output, None);
    }

    #[test]
    fn test_binary_output_is_preserved() {
        let entry = CacheEntry::with_output(json!("ok"), vec![0u8, 159, 146, 150, b'\n']);
        let json = serde_json::to_string(&entry).unwrap();
        let decoded: CacheEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_empty_output_is_kept() {
        let entry = CacheEntry::with_output(json!(1), Vec::new());
        let decoded: CacheEntry =
            serde_json::from_str(&serde_json::to_string(&entry).unwrap()).unwrap();
        assert_eq!(decoded.output, Some(Vec::new()));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let result: Result<CacheEntry, _> = serde_json::from_str(r#"{"output":""}"#);
        assert!(result.is_err());
    }
}
