//! Error registry - stores custom error signatures by selector

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An error parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

/// A custom error signature with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSignature {
    /// 4-byte error selector
    pub selector: [u8; 4],
    /// Error name
    pub name: String,
    /// Full signature string (e.g., "InsufficientBalance(uint256,uint256)")
    pub signature: String,
    /// Input parameters
    pub inputs: Vec<ParamSpec>,
}

/// Registry of error signatures indexed by selector
#[derive(Debug, Default, Clone)]
pub struct ErrorRegistry {
    errors: HashMap<[u8; 4], ErrorSignature>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an error signature
    ///
    /// Note: First error for a given selector wins (no overwrite)
    pub fn insert(&mut self, error: ErrorSignature) {
        self.errors.entry(error.selector).or_insert(error);
    }

    pub fn lookup(&self, selector: [u8; 4]) -> Option<&ErrorSignature> {
        self.errors.get(&selector)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ErrorSignature> {
        self.errors.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insufficient_balance() -> ErrorSignature {
        ErrorSignature {
            selector: [0xde, 0xad, 0xbe, 0xef],
            name: "InsufficientBalance".to_string(),
            signature: "InsufficientBalance(uint256)".to_string(),
            inputs: vec![ParamSpec {
                name: "needed".to_string(),
                kind: "uint256".to_string(),
            }],
        }
    }

    #[test]
    fn test_registry_insert_lookup() {
        let mut registry = ErrorRegistry::new();
        registry.insert(insufficient_balance());

        assert_eq!(registry.len(), 1);
        assert!(registry.lookup([0xde, 0xad, 0xbe, 0xef]).is_some());
        assert!(registry.lookup([0xa9, 0x05, 0x9c, 0xbb]).is_none());
    }

    #[test]
    fn test_first_wins() {
        let mut registry = ErrorRegistry::new();
        let mut shadow = insufficient_balance();
        shadow.name = "Shadowed".to_string();

        registry.insert(insufficient_balance());
        registry.insert(shadow);

        assert_eq!(registry.len(), 1);
        let found = registry.lookup([0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(found.name, "InsufficientBalance");
    }
}
