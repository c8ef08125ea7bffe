//! Storage capability descriptors

use serde::Serialize;

use crate::domain::cache::CACHE_KEY_LENGTH;

/// What a storage adapter is able to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Entries can be read back
    pub readable: bool,
    /// Entries can be written
    pub writable: bool,
    /// Entries can be removed
    pub removable: bool,
    /// Longest key the backend accepts, `None` when unbounded
    pub max_key_length: Option<usize>,
    /// Entries survive a process restart
    pub persistent: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            readable: true,
            writable: true,
            removable: true,
            max_key_length: None,
            persistent: false,
        }
    }
}

impl Capabilities {
    /// Capabilities of a fully featured, non-persistent backend
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_key_length(mut self, length: usize) -> Self {
        self.max_key_length = Some(length);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self.removable = false;
        self
    }

    /// Lists every way in which these capabilities fall short of what the
    /// call cache needs. Empty when the contract is satisfied.
    pub fn missing_requirements(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if !self.readable {
            missing.push("entries cannot be read".to_string());
        }

        if !self.writable {
            missing.push("entries cannot be written".to_string());
        }

        if !self.removable {
            missing.push("entries cannot be removed".to_string());
        }

        if let Some(max) = self.max_key_length {
            if max < CACHE_KEY_LENGTH {
                missing.push(format!(
                    "keys are limited to {} characters, {} required",
                    max, CACHE_KEY_LENGTH
                ));
            }
        }

        missing
    }

    /// Whether the minimum storage contract is met
    pub fn satisfies_contract(&self) -> bool {
        self.missing_requirements().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capabilities_satisfy_contract() {
        assert!(Capabilities::new().satisfies_contract());
        assert!(Capabilities::new().with_max_key_length(250).satisfies_contract());
    }

    #[test]
    fn test_read_only_fails_contract() {
        let missing = Capabilities::new().read_only().missing_requirements();
        assert_eq!(missing.len(), 2);
        assert!(missing[0].contains("written"));
    }

    #[test]
    fn test_short_keys_fail_contract() {
        let caps = Capabilities::new().with_max_key_length(32);
        assert!(!caps.satisfies_contract());
        assert!(caps.missing_requirements()[0].contains("32"));
    }
}
