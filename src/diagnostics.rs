//! Diagnostics
//!
//! Collects warnings produced while classifying a symbol table. The
//! collection is owned by the caller and returned alongside the snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Symbol kind has no snapshot representation (label, package name, builtin, nil)
    UnsupportedSymbol,
    /// Named type whose underlying type is neither a record nor an interface
    UnsupportedUnderlying,
    /// Same exported name seen twice in one symbol table
    DuplicateSymbol,
    /// Unexported field or method dropped from a composite
    UnexportedMember,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedSymbol => "W001",
            Self::UnsupportedUnderlying => "W002",
            Self::DuplicateSymbol => "W003",
            Self::UnexportedMember => "I001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnsupportedSymbol | Self::UnsupportedUnderlying | Self::DuplicateSymbol => {
                Severity::Warning
            }
            Self::UnexportedMember => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Symbol that caused this diagnostic
    pub symbol: String,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (e.g., the unsupported type)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(symbol: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.symbol
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one classification run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        if item.severity() >= Severity::Warning {
            tracing::warn!(symbol = %item.symbol, code = %item.code, "{}", item.message);
        } else {
            tracing::debug!(symbol = %item.symbol, code = %item.code, "{}", item.message);
        }
        self.items.push(item);
    }

    pub fn record(&mut self, symbol: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(symbol, code, message));
    }

    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter()
    }

    /// Items at or above `severity`
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |d| d.severity() >= severity)
    }

    pub fn has_warnings(&self) -> bool {
        self.at_least(Severity::Warning).next().is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
