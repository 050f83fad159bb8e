use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Result of one successful text extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub page_count: usize,
    /// Document information dictionary entries (Title, Author, Producer, ...)
    pub metadata: BTreeMap<String, String>,
}

impl ExtractedDocument {
    /// True when the document produced no usable text (scanned pages, non-PDF input)
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        let doc = ExtractedDocument {
            text: " \n\t".to_string(),
            page_count: 1,
            metadata: BTreeMap::new(),
        };
        assert!(doc.is_blank());

        let doc = ExtractedDocument {
            text: "Week 1".to_string(),
            ..doc
        };
        assert!(!doc.is_blank());
    }
}
