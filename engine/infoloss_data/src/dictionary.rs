use std::collections::HashMap;

/// Bidirectional mapping between the strings of one column and dense integer codes.
///
/// Codes are handed out in registration order, so registering the leaf values of a
/// hierarchy first guarantees that leaves occupy `0..leaves`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    values: Vec<String>,
    index: HashMap<String, i32>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `value`, registering it if it is new.
    pub fn register(&mut self, value: &str) -> i32 {
        if let Some(code) = self.index.get(value) {
            return *code;
        }
        let code = self.values.len() as i32;
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), code);
        code
    }

    pub fn code(&self, value: &str) -> Option<i32> {
        self.index.get(value).copied()
    }

    pub fn value(&self, code: i32) -> Option<&str> {
        if code < 0 {
            return None;
        }
        self.values.get(code as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All registered strings, indexed by code.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}
