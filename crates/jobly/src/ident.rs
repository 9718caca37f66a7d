//! Safe SQL identifier handling and external-to-internal field name mapping.
//!
//! [`Ident`] is a single column identifier, either bare or quoted:
//!
//! - Bare names are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted names allow any characters except NUL and escape `"` as `""`
//!
//! [`ColumnMap`] translates API-facing field names (`firstName`) to column
//! names (`first_name`), passing unmapped names through unchanged.
//!
//! # Example
//! ```ignore
//! use jobly::{ColumnMap, Ident};
//!
//! const USER_COLUMNS: ColumnMap = ColumnMap::new(&[("firstName", "first_name")]);
//!
//! assert_eq!(USER_COLUMNS.column("firstName"), "first_name");
//! assert_eq!(USER_COLUMNS.column("email"), "email");
//! let c = Ident::quoted(USER_COLUMNS.column("firstName"))?;
//! assert_eq!(c.to_sql(), r#""first_name""#);
//! # Ok::<(), jobly::JoblyError>(())
//! ```

use crate::error::{JoblyError, JoblyResult};

/// A single SQL column identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ident {
    /// Bare identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Bare(String),
    /// Quoted identifier: any characters except NUL.
    Quoted(String),
}

impl Ident {
    /// Validate a bare identifier.
    pub fn bare(name: &str) -> JoblyResult<Self> {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(JoblyError::validation("Identifier cannot be empty"));
        };
        if first != '_' && !first.is_ascii_alphabetic() {
            return Err(JoblyError::validation(format!(
                "Invalid identifier start character: '{first}'"
            )));
        }
        if let Some(c) = chars.find(|&c| c != '_' && c != '$' && !c.is_ascii_alphanumeric()) {
            return Err(JoblyError::validation(format!(
                "Invalid character in identifier: '{c}'"
            )));
        }
        Ok(Self::Bare(name.to_string()))
    }

    /// Create a quoted identifier.
    pub fn quoted(name: &str) -> JoblyResult<Self> {
        if name.is_empty() {
            return Err(JoblyError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(JoblyError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self::Quoted(name.to_string()))
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Self::Bare(s) => out.push_str(s),
            Self::Quoted(s) => {
                out.push('"');
                for ch in s.chars() {
                    if ch == '"' {
                        out.push('"');
                    }
                    out.push(ch);
                }
                out.push('"');
            }
        }
    }
}

/// Maps external (API-facing) field names to internal column names.
///
/// The table is fixed at compile time; lookups never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pairs: &'static [(&'static str, &'static str)],
}

impl ColumnMap {
    /// Create a mapping from `(external, internal)` pairs.
    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self { pairs }
    }

    /// A mapping that passes every name through unchanged.
    pub const fn identity() -> Self {
        Self { pairs: &[] }
    }

    /// Resolve `field` to its column name, or return it unchanged when unmapped.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        self.pairs
            .iter()
            .find(|(external, _)| *external == field)
            .map(|(_, internal)| *internal)
            .unwrap_or(field)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::identity()
    }
}
