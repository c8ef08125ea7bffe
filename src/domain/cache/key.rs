//! Cache key generation
//!
//! Keys are two truncated SHA-256 digests written back to back as lowercase hex:
//! one over the canonical callable identity and one over the canonical argument
//! list. The canonical encoding is type tagged so values that only compare
//! equal under coercion (`"1"`, `1`, `1.0`, `true`) never collide, and object
//! members are visited in sorted key order.

use std::fmt::{self, Debug};

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::domain::callable::CallableIdentity;

/// Length in hex characters of each half of a key
const DIGEST_HEX_LENGTH: usize = 32;

/// Length of every generated cache key
pub const CACHE_KEY_LENGTH: usize = DIGEST_HEX_LENGTH * 2;

/// Opaque, fixed-length cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Hex digest of the callable identity
    pub fn callable_part(&self) -> &str {
        &self.0[..DIGEST_HEX_LENGTH]
    }

    /// Hex digest of the argument list
    pub fn arguments_part(&self) -> &str {
        &self.0[DIGEST_HEX_LENGTH..]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Trait for generating cache keys from a resolved callable and its arguments
pub trait KeyGenerator: Send + Sync + Debug {
    /// Generates the key for one invocation. Must be pure.
    fn generate(&self, identity: &CallableIdentity, args: &[Value]) -> CacheKey;
}

/// Default key generator using SHA-256 over a canonical encoding
#[derive(Debug, Clone, Default)]
pub struct DigestKeyGenerator {
    /// Optional namespace mixed into the callable digest
    namespace: Option<String>,
}

impl DigestKeyGenerator {
    /// Creates a new key generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Separates keys of otherwise identical invocations, e.g. per application
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn digest_identity(&self, identity: &CallableIdentity) -> String {
        let mut hasher = Sha256::new();

        if let Some(namespace) = &self.namespace {
            hasher.put(b"ns:");
            encode_str(&mut hasher, namespace);
        }

        encode_identity(&mut hasher, identity);
        truncated_hex(hasher)
    }

    fn digest_arguments(args: &[Value]) -> String {
        let mut hasher = Sha256::new();
        encode_sequence(&mut hasher, args);
        truncated_hex(hasher)
    }
}

impl KeyGenerator for DigestKeyGenerator {
    fn generate(&self, identity: &CallableIdentity, args: &[Value]) -> CacheKey {
        let mut key = self.digest_identity(identity);
        key.push_str(&Self::digest_arguments(args));
        CacheKey(key)
    }
}

fn truncated_hex(hasher: Sha256) -> String {
    let mut hex = hex::encode(hasher.finalize());
    hex.truncate(DIGEST_HEX_LENGTH);
    hex
}

/// Receives canonical bytes
trait Sink {
    fn put(&mut self, bytes: &[u8]);
}

impl Sink for Sha256 {
    fn put(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

impl Sink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Canonical byte form of a value, exposed for diagnostics
pub fn canonical_form(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    encode_value(&mut out, value);
    out
}

fn encode_identity(sink: &mut impl Sink, identity: &CallableIdentity) {
    match identity {
        CallableIdentity::Named(name) => {
            sink.put(b"n:");
            encode_str(sink, name);
        }
        CallableIdentity::Bound {
            owner,
            method,
            state,
        } => {
            sink.put(b"m:");
            encode_str(sink, owner);
            encode_str(sink, method);
            encode_value(sink, state);
        }
        CallableIdentity::Closure(id) => {
            sink.put(b"c:");
            encode_str(sink, id);
        }
    }
}

fn encode_value(sink: &mut impl Sink, value: &Value) {
    match value {
        Value::Null => sink.put(b"N;"),
        Value::Bool(true) => sink.put(b"b:1;"),
        Value::Bool(false) => sink.put(b"b:0;"),
        Value::Number(number) => encode_number(sink, number),
        Value::String(s) => encode_str(sink, s),
        Value::Array(items) => encode_sequence(sink, items),
        Value::Object(map) => encode_map(sink, map),
    }
}

fn encode_number(sink: &mut impl Sink, number: &Number) {
    let encoded = if let Some(i) = number.as_i64() {
        format!("i:{};", i)
    } else if let Some(u) = number.as_u64() {
        format!("i:{};", u)
    } else if let Some(f) = number.as_f64() {
        // Display for f64 is locale independent and round-trips
        format!("d:{};", f)
    } else {
        format!("n:{};", number)
    };
    sink.put(encoded.as_bytes());
}

fn encode_str(sink: &mut impl Sink, s: &str) {
    sink.put(format!("s:{}:", s.len()).as_bytes());
    sink.put(s.as_bytes());
    sink.put(b";");
}

fn encode_sequence(sink: &mut impl Sink, items: &[Value]) {
    sink.put(format!("a:{}:{{", items.len()).as_bytes());
    for item in items {
        encode_value(sink, item);
    }
    sink.put(b"}");
}

fn encode_map(sink: &mut impl Sink, map: &Map<String, Value>) {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    sink.put(format!("o:{}:{{", entries.len()).as_bytes());
    for (key, value) in entries {
        encode_str(sink, key);
        encode_value(sink, value);
    }
    sink.put(b"}");
}
