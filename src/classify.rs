//! Item classification
//!
//! Walks a resolved symbol table once and produces one [`Item`] per
//! exported name. Symbols with no snapshot representation are skipped and
//! reported through [`Diagnostics`]; classification never aborts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics};
use crate::item::{Composite, Func, Item, MethodSet, Snapshot};
use crate::normalize::type_names;
use crate::symbols::{FieldSymbol, MethodSymbol, Signature, Symbol, SymbolKind, SymbolTable, Underlying};

/// Output of classifying one module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Classification {
    pub module: String,
    pub snapshot: Snapshot,
    pub diagnostics: Diagnostics,
}

/// Converts resolved symbols into snapshot items
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    diagnostics: Diagnostics,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every exported symbol of a table
    pub fn classify_table(mut self, table: &SymbolTable) -> Classification {
        let mut snapshot = Snapshot::new();

        for symbol in table.symbols.iter().filter(|s| s.exported) {
            let Some(item) = self.classify_symbol(symbol) else {
                continue;
            };
            if !snapshot.insert(symbol.name.clone(), item) {
                self.diagnostics.push(
                    DiagnosticItem::new(
                        &symbol.name,
                        DiagnosticCode::DuplicateSymbol,
                        "exported name declared more than once, keeping the first",
                    )
                    .with_context(format!("module: {}", table.module)),
                );
            }
        }

        tracing::info!(
            module = %table.module,
            items = snapshot.len(),
            diagnostics = self.diagnostics.len(),
            "classified symbol table"
        );

        Classification {
            module: table.module.clone(),
            snapshot,
            diagnostics: self.diagnostics,
        }
    }

    /// Produce the item for one symbol, or `None` if it has no representation
    pub fn classify_symbol(&mut self, symbol: &Symbol) -> Option<Item> {
        tracing::debug!(name = %symbol.name, kind = symbol.kind.as_str(), "classifying symbol");

        match &symbol.kind {
            SymbolKind::Func { signature } => Some(Item::function(classify_signature(signature, false))),
            SymbolKind::Var { type_expr } => Some(Item::variable(type_expr.as_str())),
            SymbolKind::Const { type_expr } => Some(Item::constant(type_expr.as_str())),
            SymbolKind::TypeName {
                type_expr,
                underlying,
                method_set,
            } => self.classify_type_name(&symbol.name, type_expr, underlying, method_set),
            SymbolKind::Label | SymbolKind::PkgName | SymbolKind::Builtin | SymbolKind::Nil => {
                self.diagnostics.record(
                    &symbol.name,
                    DiagnosticCode::UnsupportedSymbol,
                    format!("{} symbols are not part of the API surface", symbol.kind.as_str()),
                );
                None
            }
        }
    }

    fn classify_type_name(
        &mut self,
        name: &str,
        type_expr: &str,
        underlying: &Underlying,
        method_set: &[MethodSymbol],
    ) -> Option<Item> {
        match underlying {
            Underlying::Struct { fields } => {
                let composite = Composite {
                    fields: self.classify_fields(name, fields),
                    methods: self.classify_methods(name, method_set),
                };
                Some(Item::composite(type_expr, composite))
            }
            Underlying::Interface { methods } => {
                let methods = MethodSet {
                    methods: self.classify_methods(name, methods),
                };
                Some(Item::interface(type_expr, methods))
            }
            Underlying::Other { description } => {
                self.diagnostics.push(
                    DiagnosticItem::new(
                        name,
                        DiagnosticCode::UnsupportedUnderlying,
                        format!("named type {} is neither a struct nor an interface", type_expr),
                    )
                    .with_context(format!("underlying: {}", description)),
                );
                None
            }
        }
    }

    fn classify_fields(&mut self, owner: &str, fields: &[FieldSymbol]) -> BTreeMap<String, Item> {
        let mut out = BTreeMap::new();
        for field in fields {
            if !field.exported {
                self.note_unexported(owner, "field", &field.name);
                continue;
            }
            out.insert(field.name.clone(), Item::variable(field.type_expr.as_str()));
        }
        out
    }

    fn classify_methods(&mut self, owner: &str, methods: &[MethodSymbol]) -> BTreeMap<String, Item> {
        let mut out = BTreeMap::new();
        for method in methods {
            if !method.exported {
                self.note_unexported(owner, "method", &method.name);
                continue;
            }
            out.insert(
                method.name.clone(),
                Item::function(classify_signature(&method.signature, true)),
            );
        }
        out
    }

    fn note_unexported(&mut self, owner: &str, what: &str, member: &str) {
        self.diagnostics.record(
            owner,
            DiagnosticCode::UnexportedMember,
            format!("unexported {} {} dropped", what, member),
        );
    }
}

/// Build a [`Func`] from a resolved signature.
///
/// The receiver is kept only when `is_method` is set.
pub fn classify_signature(signature: &Signature, is_method: bool) -> Func {
    Func {
        arg_types: type_names(&signature.params),
        res_types: type_names(&signature.results),
        variadic: signature.variadic,
        receiver: if is_method {
            signature.receiver.clone()
        } else {
            None
        },
    }
}

/// Classify a whole table with a fresh [`Classifier`]
pub fn classify(table: &SymbolTable) -> Classification {
    Classifier::new().classify_table(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use serde_json::json;

    fn table(value: serde_json::Value) -> SymbolTable {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_function_params_are_normalized() {
        let result = classify(&table(json!({
            "module": "example.com/pkg",
            "symbols": [
                { "name": "Open", "kind": "func",
                  "signature": { "params": ["name string", "flags ...int"], "results": ["*pkg.File", "error"], "variadic": true } }
            ]
        })));

        assert_eq!(
            result.snapshot.get("Open"),
            Some(&Item::function(Func::new(["string", "...int"], ["*pkg.File", "error"]).variadic()))
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_vars_and_consts() {
        let result = classify(&table(json!({
            "module": "m",
            "symbols": [
                { "name": "Debug", "kind": "var", "type": "bool" },
                { "name": "Version", "kind": "const", "type": "untyped string" }
            ]
        })));

        assert_eq!(result.snapshot.get("Debug"), Some(&Item::variable("bool")));
        assert_eq!(result.snapshot.get("Version"), Some(&Item::constant("untyped string")));
    }

    #[test]
    fn test_struct_with_promoted_methods() {
        let result = classify(&table(json!({
            "module": "m",
            "symbols": [{
                "name": "Server", "kind": "type_name", "type": "m.Server",
                "underlying": { "shape": "struct", "fields": [
                    { "name": "Addr", "type": "string" },
                    { "name": "mu", "type": "sync.Mutex", "exported": false }
                ]},
                "method_set": [
                    { "name": "Serve", "signature": { "params": ["l net.Listener"], "results": ["error"], "receiver": "*m.Server" } },
                    { "name": "Lock", "signature": { "receiver": "*m.Server" } }
                ]
            }]
        })));

        let expected = Item::composite(
            "m.Server",
            Composite::new()
                .with_field("Addr", "string")
                .with_method("Serve", Func::new(["net.Listener"], ["error"]).with_receiver("*m.Server"))
                .with_method("Lock", Func::default().with_receiver("*m.Server")),
        );
        assert_eq!(result.snapshot.get("Server"), Some(&expected));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics.items()[0].code, DiagnosticCode::UnexportedMember);
    }

    #[test]
    fn test_interface_methods() {
        let result = classify(&table(json!({
            "module": "m",
            "symbols": [{
                "name": "Reader", "kind": "type_name", "type": "m.Reader",
                "underlying": { "shape": "interface", "methods": [
                    { "name": "Read", "signature": { "params": ["p []byte"], "results": ["n int", "err error"], "receiver": "m.Reader" } }
                ]}
            }]
        })));

        let expected = Item::interface(
            "m.Reader",
            MethodSet::new().with_method("Read", Func::new(["[]byte"], ["int", "error"]).with_receiver("m.Reader")),
        );
        assert_eq!(result.snapshot.get("Reader"), Some(&expected));
    }

    #[test]
    fn test_unsupported_symbols_are_skipped_with_warnings() {
        let result = classify(&table(json!({
            "module": "m",
            "symbols": [
                { "name": "Mode", "kind": "type_name", "type": "m.Mode",
                  "underlying": { "shape": "other", "description": "int" } },
                { "name": "Loop", "kind": "label" },
                { "name": "Keep", "kind": "var", "type": "int" }
            ]
        })));

        assert_eq!(result.snapshot.len(), 1);
        assert!(result.snapshot.contains("Keep"));
        let codes: Vec<_> = result.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::UnsupportedUnderlying, DiagnosticCode::UnsupportedSymbol]);
        assert!(result.diagnostics.iter().all(|d| d.severity() == Severity::Warning));
    }

    #[test]
    fn test_unexported_symbols_and_duplicates() {
        let result = classify(&table(json!({
            "module": "m",
            "symbols": [
                { "name": "helper", "kind": "func", "exported": false, "signature": {} },
                { "name": "X", "kind": "var", "type": "int" },
                { "name": "X", "kind": "var", "type": "string" }
            ]
        })));

        assert!(!result.snapshot.contains("helper"));
        assert_eq!(result.snapshot.get("X"), Some(&Item::variable("int")));
        assert_eq!(result.diagnostics.items()[0].code, DiagnosticCode::DuplicateSymbol);
    }

    #[test]
    fn test_top_level_func_drops_receiver() {
        let sig = Signature {
            params: vec![],
            results: vec![],
            variadic: false,
            receiver: Some("T".to_string()),
        };
        assert_eq!(classify_signature(&sig, false).receiver, None);
        assert_eq!(classify_signature(&sig, true).receiver.as_deref(), Some("T"));
    }
}
