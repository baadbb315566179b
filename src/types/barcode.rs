//! Barcode Validation
//!
//! A barcode is valid when it is all ASCII digits and its length is one of
//! the EAN/UPC family lengths (8, 12, 13, 14). Surrounding whitespace is
//! stripped before validation.

use std::fmt;

/// Accepted barcode lengths (EAN-8, UPC-A, EAN-13, GTIN-14)
pub const VALID_BARCODE_LENGTHS: [usize; 4] = [8, 12, 13, 14];

/// GS1 company-code prefixes assigned to India
const INDIA_COMPANY_PREFIXES: [&str; 6] = ["890", "891", "892", "893", "894", "895"];

/// A validated product barcode
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Barcode(String);

impl Barcode {
    /// Parse and validate a raw barcode string
    ///
    /// Returns `None` when the trimmed input contains non-digit characters
    /// or has an unsupported length.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !VALID_BARCODE_LENGTHS.contains(&trimmed.len()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Check validity without constructing a barcode
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check whether the company-code prefix belongs to the India range
    pub fn has_india_prefix(&self) -> bool {
        INDIA_COMPANY_PREFIXES
            .iter()
            .any(|prefix| self.0.starts_with(prefix))
    }

    /// Human-readable barcode type label, e.g. "13-digit barcode"
    pub fn type_label(&self) -> String {
        format!("{}-digit barcode", self.0.len())
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
