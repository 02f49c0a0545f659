//! Resolved symbol tables
//!
//! Input handed to the classifier by an external, language-specific
//! resolver. Everything here is already type-checked; nothing in this crate
//! parses source code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};

/// Exported symbols of one module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    /// Module path (e.g., "example.com/pkg")
    pub module: String,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

/// A top-level declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    #[serde(default = "default_true")]
    pub exported: bool,
    #[serde(flatten)]
    pub kind: SymbolKind,
}

/// Resolved symbol variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolKind {
    Func {
        signature: Signature,
    },
    Var {
        #[serde(rename = "type")]
        type_expr: String,
    },
    Const {
        #[serde(rename = "type")]
        type_expr: String,
    },
    /// Named type declaration
    TypeName {
        #[serde(rename = "type")]
        type_expr: String,
        underlying: Underlying,
        /// Full method set, including methods promoted through embedding
        #[serde(default)]
        method_set: Vec<MethodSymbol>,
    },
    Label,
    PkgName,
    Builtin,
    Nil,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Func { .. } => "func",
            SymbolKind::Var { .. } => "var",
            SymbolKind::Const { .. } => "const",
            SymbolKind::TypeName { .. } => "type_name",
            SymbolKind::Label => "label",
            SymbolKind::PkgName => "pkg_name",
            SymbolKind::Builtin => "builtin",
            SymbolKind::Nil => "nil",
        }
    }
}

/// Resolved function signature
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signature {
    /// Parameter descriptors, optionally prefixed by the parameter name
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub variadic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

/// Underlying structure of a named type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Underlying {
    Struct {
        #[serde(default)]
        fields: Vec<FieldSymbol>,
    },
    Interface {
        #[serde(default)]
        methods: Vec<MethodSymbol>,
    },
    /// Anything else (basic types, slices, maps, func types, ...)
    Other { description: String },
}

/// A record field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSymbol {
    pub name: String,
    #[serde(rename = "type")]
    pub type_expr: String,
    #[serde(default = "default_true")]
    pub exported: bool,
}

/// A method in a method set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodSymbol {
    pub name: String,
    #[serde(default = "default_true")]
    pub exported: bool,
    pub signature: Signature,
}

fn default_true() -> bool {
    true
}

/// Source of resolved symbols for a module
pub trait SymbolSource {
    fn load(&self) -> Result<SymbolTable>;
}

/// A symbol table serialized as JSON on disk
#[derive(Debug, Clone)]
pub struct SymbolFile {
    path: PathBuf,
}

impl SymbolFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SymbolSource for SymbolFile {
    fn load(&self) -> Result<SymbolTable> {
        let content = fs::read_to_string(&self.path)?;
        let table: SymbolTable = serde_json::from_str(&content)?;
        if table.module.is_empty() {
            return Err(ApiError::InvalidFormat(format!(
                "{}: symbol table has no module name",
                self.path.display()
            )));
        }
        Ok(table)
    }
}

impl SymbolSource for SymbolTable {
    fn load(&self) -> Result<SymbolTable> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_symbol_kinds() {
        let table: SymbolTable = serde_json::from_value(json!({
            "module": "example.com/pkg",
            "symbols": [
                { "name": "New", "kind": "func", "signature": { "params": ["n int"], "results": ["*pkg.T"] } },
                { "name": "Max", "kind": "const", "type": "untyped int" },
                { "name": "T", "kind": "type_name", "type": "pkg.T",
                  "underlying": { "shape": "struct", "fields": [{ "name": "A", "type": "int" }] } },
                { "name": "_", "kind": "nil", "exported": false }
            ]
        }))
        .unwrap();

        assert_eq!(table.symbols.len(), 4);
        assert!(matches!(table.symbols[0].kind, SymbolKind::Func { .. }));
        assert!(table.symbols[0].exported);
        assert!(!table.symbols[3].exported);
        match &table.symbols[2].kind {
            SymbolKind::TypeName { underlying: Underlying::Struct { fields }, method_set, .. } => {
                assert_eq!(fields[0].name, "A");
                assert!(method_set.is_empty());
            }
            other => panic!("Expected struct type name, got {:?}", other),
        }
    }

    #[test]
    fn test_symbol_file_requires_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.json");
        fs::write(&path, r#"{ "module": "", "symbols": [] }"#).unwrap();

        let err = SymbolFile::new(&path).load().unwrap_err();
        assert!(matches!(err, ApiError::InvalidFormat(_)));
    }
}
