//! API compatibility checking
//!
//! Compares two snapshots item by item and folds the per-item bumps into
//! one module-level [`RequiredBump`].
//!
//! Every name is classified three ways:
//! - only in the old snapshot: removal, `Major`
//! - only in the new snapshot: addition, `Minor`
//! - in both: structural comparison by kind
//!
//! Structural comparison stops at the first `Major` it finds, so the
//! changes recorded for a breaking item end with the change that broke it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::bump::RequiredBump;
use crate::error::{ApiError, Result};
use crate::item::{Composite, Func, Item, Snapshot};

/// Type of API change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// A top-level item was added
    ItemAdded,
    /// A top-level item was removed
    ItemRemoved,
    /// An item changed kind (e.g., function became a variable)
    KindChanged,
    ParamCountChanged,
    ParamTypeChanged,
    ResultCountChanged,
    ResultTypeChanged,
    ReceiverChanged,
    VariadicChanged,
    /// Variable or constant type changed
    TypeChanged,
    FieldAdded,
    FieldRemoved,
    MethodAdded,
    MethodRemoved,
}

impl ChangeType {
    /// Bump this change requires on its own
    pub fn bump(&self) -> RequiredBump {
        match self {
            ChangeType::ItemAdded | ChangeType::FieldAdded | ChangeType::MethodAdded => {
                RequiredBump::Minor
            }
            _ => RequiredBump::Major,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::ItemAdded => "item added",
            ChangeType::ItemRemoved => "item removed",
            ChangeType::KindChanged => "kind changed",
            ChangeType::ParamCountChanged => "parameter count changed",
            ChangeType::ParamTypeChanged => "parameter type changed",
            ChangeType::ResultCountChanged => "result count changed",
            ChangeType::ResultTypeChanged => "result type changed",
            ChangeType::ReceiverChanged => "receiver changed",
            ChangeType::VariadicChanged => "variadic changed",
            ChangeType::TypeChanged => "type changed",
            ChangeType::FieldAdded => "field added",
            ChangeType::FieldRemoved => "field removed",
            ChangeType::MethodAdded => "method added",
            ChangeType::MethodRemoved => "method removed",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected change between two versions of an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemChange {
    pub change_type: ChangeType,
    /// Path to the changed element (e.g., "T.methods.Close.args[0]")
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    pub bump: RequiredBump,
}

impl ItemChange {
    fn new(
        change_type: ChangeType,
        path: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            change_type,
            path: path.into(),
            old_value,
            new_value,
            bump: change_type.bump(),
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match (&self.old_value, &self.new_value) {
            (Some(old), Some(new)) => format!("{}: {} ({} -> {})", self.path, self.change_type, old, new),
            (Some(old), None) => format!("{}: {} (was {})", self.path, self.change_type, old),
            (None, Some(new)) => format!("{}: {} ({})", self.path, self.change_type, new),
            (None, None) => format!("{}: {}", self.path, self.change_type),
        }
    }
}

impl fmt::Display for ItemChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Result of comparing one top-level name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFinding {
    pub name: String,
    pub bump: RequiredBump,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<ItemChange>,
}

/// Result of comparing two snapshots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleReport {
    /// Required bump for the whole module
    pub bump: RequiredBump,
    /// Number of names examined (ignored names excluded)
    pub compared: usize,
    /// Findings for every name whose comparison was not `Patch`, sorted by name
    pub findings: Vec<ItemFinding>,
}

impl ModuleReport {
    pub fn is_breaking(&self) -> bool {
        self.bump.is_breaking()
    }

    /// Names whose individual comparison was not `Patch`
    pub fn flagged_names(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter(|f| f.bump != RequiredBump::Patch)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn finding(&self, name: &str) -> Option<&ItemFinding> {
        self.findings.iter().find(|f| f.name == name)
    }

    pub fn summary(&self) -> String {
        let breaking = self.findings.iter().filter(|f| f.bump.is_breaking()).count();
        let compatible = self.findings.len() - breaking;
        match (breaking, compatible) {
            (0, 0) => format!("No changes detected in {} items", self.compared),
            (0, n) => format!("{} compatible changes detected", n),
            (b, n) => format!("{} breaking and {} compatible changes detected", b, n),
        }
    }
}

/// Compatibility checker for API snapshots
#[derive(Debug, Clone, Default)]
pub struct CompatibilityChecker {
    /// Strict mode - any change is considered breaking
    strict_mode: bool,
    /// Top-level names excluded from comparison
    ignore: Vec<Regex>,
}

impl CompatibilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable strict mode
    pub fn strict(mut self) -> Self {
        self.strict_mode = true;
        self
    }

    /// Exclude top-level names matching any of the given regular expressions
    pub fn ignoring<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let re = Regex::new(pattern).map_err(|source| ApiError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            self.ignore.push(re);
        }
        Ok(self)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|re| re.is_match(name))
    }

    /// Required bump between two versions of the same item
    pub fn compare_items(&self, old: &Item, new: &Item) -> RequiredBump {
        let mut changes = Vec::new();
        self.effective(diff_item("", old, new, &mut changes))
    }

    /// Compare two versions of a named item, recording what changed
    pub fn check_item(&self, name: &str, old: &Item, new: &Item) -> ItemFinding {
        let mut changes = Vec::new();
        let bump = self.effective(diff_item(name, old, new, &mut changes));
        ItemFinding {
            name: name.to_string(),
            bump,
            old: Some(old.clone()),
            new: Some(new.clone()),
            changes,
        }
    }

    /// Compare two snapshots and aggregate the module-level bump
    pub fn check(&self, old: &Snapshot, new: &Snapshot) -> ModuleReport {
        let mut report = ModuleReport::default();

        for (name, old_item) in old.iter() {
            if self.is_ignored(name) {
                tracing::debug!(name, "ignoring item");
                continue;
            }
            report.compared += 1;

            let finding = match new.get(name) {
                Some(new_item) => self.check_item(name, old_item, new_item),
                None => self.removed(name, old_item),
            };
            self.record(&mut report, finding);
        }

        for (name, new_item) in new.iter() {
            if old.contains(name) || self.is_ignored(name) {
                continue;
            }
            report.compared += 1;
            self.record(&mut report, self.added(name, new_item));
        }

        report.findings.sort_by(|a, b| a.name.cmp(&b.name));

        tracing::info!(
            bump = %report.bump,
            compared = report.compared,
            flagged = report.findings.len(),
            "compared snapshots"
        );

        report
    }

    fn record(&self, report: &mut ModuleReport, finding: ItemFinding) {
        report.bump = report.bump.join(finding.bump);
        if finding.bump != RequiredBump::Patch {
            tracing::debug!(name = %finding.name, bump = %finding.bump, "item changed");
            report.findings.push(finding);
        }
    }

    fn removed(&self, name: &str, old: &Item) -> ItemFinding {
        let change = ItemChange::new(ChangeType::ItemRemoved, name, Some(old.summary()), None);
        ItemFinding {
            name: name.to_string(),
            bump: self.effective(change.bump),
            old: Some(old.clone()),
            new: None,
            changes: vec![change],
        }
    }

    fn added(&self, name: &str, new: &Item) -> ItemFinding {
        let change = ItemChange::new(ChangeType::ItemAdded, name, None, Some(new.summary()));
        ItemFinding {
            name: name.to_string(),
            bump: self.effective(change.bump),
            old: None,
            new: Some(new.clone()),
            changes: vec![change],
        }
    }

    fn effective(&self, bump: RequiredBump) -> RequiredBump {
        if self.strict_mode && bump != RequiredBump::Patch {
            RequiredBump::Major
        } else {
            bump
        }
    }
}

fn child(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

/// Dispatch on item kind. Items of different kinds are always `Major`.
fn diff_item(path: &str, old: &Item, new: &Item, changes: &mut Vec<ItemChange>) -> RequiredBump {
    match (old, new) {
        (Item::Function { function: a }, Item::Function { function: b }) => diff_func(path, a, b, changes),
        (Item::Variable { type_name: a }, Item::Variable { type_name: b })
        | (Item::Constant { type_name: a }, Item::Constant { type_name: b }) => diff_type(path, a, b, changes),
        (Item::Composite { composite: a, .. }, Item::Composite { composite: b, .. }) => {
            diff_composite(path, a, b, changes)
        }
        (Item::Interface { interface: a, .. }, Item::Interface { interface: b, .. }) => diff_members(
            &child(path, "methods"),
            &a.methods,
            &b.methods,
            (ChangeType::MethodRemoved, ChangeType::MethodAdded),
            changes,
        ),
        _ => {
            changes.push(ItemChange::new(
                ChangeType::KindChanged,
                path,
                Some(old.kind().to_string()),
                Some(new.kind().to_string()),
            ));
            RequiredBump::Major
        }
    }
}

/// Signatures are either identical or breaking; this never yields `Minor`.
fn diff_func(path: &str, old: &Func, new: &Func, changes: &mut Vec<ItemChange>) -> RequiredBump {
    let change = if old.arg_types.len() != new.arg_types.len() {
        Some(ItemChange::new(
            ChangeType::ParamCountChanged,
            child(path, "args"),
            Some(old.arg_types.len().to_string()),
            Some(new.arg_types.len().to_string()),
        ))
    } else if let Some(i) = first_mismatch(&old.arg_types, &new.arg_types) {
        Some(ItemChange::new(
            ChangeType::ParamTypeChanged,
            format!("{}[{}]", child(path, "args"), i),
            Some(old.arg_types[i].clone()),
            Some(new.arg_types[i].clone()),
        ))
    } else if old.res_types.len() != new.res_types.len() {
        Some(ItemChange::new(
            ChangeType::ResultCountChanged,
            child(path, "results"),
            Some(old.res_types.len().to_string()),
            Some(new.res_types.len().to_string()),
        ))
    } else if let Some(i) = first_mismatch(&old.res_types, &new.res_types) {
        Some(ItemChange::new(
            ChangeType::ResultTypeChanged,
            format!("{}[{}]", child(path, "results"), i),
            Some(old.res_types[i].clone()),
            Some(new.res_types[i].clone()),
        ))
    } else if old.receiver != new.receiver {
        Some(ItemChange::new(
            ChangeType::ReceiverChanged,
            child(path, "receiver"),
            old.receiver.clone(),
            new.receiver.clone(),
        ))
    } else if old.variadic != new.variadic {
        Some(ItemChange::new(
            ChangeType::VariadicChanged,
            child(path, "variadic"),
            Some(old.variadic.to_string()),
            Some(new.variadic.to_string()),
        ))
    } else {
        None
    };

    match change {
        Some(change) => {
            changes.push(change);
            RequiredBump::Major
        }
        None => RequiredBump::Patch,
    }
}

fn first_mismatch(a: &[String], b: &[String]) -> Option<usize> {
    a.iter().zip(b).position(|(x, y)| x != y)
}

fn diff_type(path: &str, old: &str, new: &str, changes: &mut Vec<ItemChange>) -> RequiredBump {
    if old == new {
        return RequiredBump::Patch;
    }
    changes.push(ItemChange::new(
        ChangeType::TypeChanged,
        path,
        Some(old.to_string()),
        Some(new.to_string()),
    ));
    RequiredBump::Major
}

/// Fields first, then methods; a breaking field change skips the methods.
fn diff_composite(path: &str, old: &Composite, new: &Composite, changes: &mut Vec<ItemChange>) -> RequiredBump {
    let fields = diff_members(
        &child(path, "fields"),
        &old.fields,
        &new.fields,
        (ChangeType::FieldRemoved, ChangeType::FieldAdded),
        changes,
    );
    if fields.is_breaking() {
        return fields;
    }
    let methods = diff_members(
        &child(path, "methods"),
        &old.methods,
        &new.methods,
        (ChangeType::MethodRemoved, ChangeType::MethodAdded),
        changes,
    );
    fields.join(methods)
}

/// Diff two member maps by name set: removals and changed members are
/// checked before additions, and the first `Major` ends the scan.
fn diff_members(
    path: &str,
    old: &BTreeMap<String, Item>,
    new: &BTreeMap<String, Item>,
    (removed, added): (ChangeType, ChangeType),
    changes: &mut Vec<ItemChange>,
) -> RequiredBump {
    let mut bump = RequiredBump::Patch;

    for (name, old_member) in old {
        let member_path = child(path, name);
        let member_bump = match new.get(name) {
            Some(new_member) => diff_item(&member_path, old_member, new_member, changes),
            None => {
                changes.push(ItemChange::new(removed, member_path, Some(old_member.summary()), None));
                removed.bump()
            }
        };
        if member_bump.is_breaking() {
            return member_bump;
        }
        bump = bump.join(member_bump);
    }

    for (name, new_member) in new {
        if !old.contains_key(name) {
            let change = ItemChange::new(added, child(path, name), None, Some(new_member.summary()));
            bump = bump.join(change.bump);
            changes.push(change);
        }
    }

    bump
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::MethodSet;

    fn func(args: &[&str], res: &[&str]) -> Item {
        Item::function(Func::new(args.iter().copied(), res.iter().copied()))
    }

    fn record(fields: &[(&str, &str)]) -> Composite {
        fields
            .iter()
            .fold(Composite::new(), |c, (name, ty)| c.with_field(*name, *ty))
    }

    #[test]
    fn test_function_reflexive() {
        let checker = CompatibilityChecker::new();
        let items = [
            func(&[], &[]),
            func(&["int", "string"], &["error"]),
            Item::function(Func::new(["[]string"], ["int"]).variadic().with_receiver("*T")),
        ];
        for item in &items {
            assert_eq!(checker.compare_items(item, &item.clone()), RequiredBump::Patch);
        }
    }

    #[test]
    fn test_function_rules_are_major() {
        let checker = CompatibilityChecker::new();
        let base = Func::new(["int"], ["error"]);
        let cases = [
            (Func::new(["int", "string"], ["error"]), ChangeType::ParamCountChanged),
            (Func::new(["int64"], ["error"]), ChangeType::ParamTypeChanged),
            (Func::new(["int"], Vec::<String>::new()), ChangeType::ResultCountChanged),
            (Func::new(["int"], ["bool"]), ChangeType::ResultTypeChanged),
            (base.clone().with_receiver("T"), ChangeType::ReceiverChanged),
            (base.clone().variadic(), ChangeType::VariadicChanged),
        ];

        for (new, expected) in cases {
            let finding = checker.check_item("F", &Item::function(base.clone()), &Item::function(new));
            assert_eq!(finding.bump, RequiredBump::Major);
            assert_eq!(finding.changes.len(), 1);
            assert_eq!(finding.changes[0].change_type, expected);
        }
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let checker = CompatibilityChecker::new();
        // Both a parameter and a result changed; only the parameter is reported.
        let finding = checker.check_item("F", &func(&["int"], &["error"]), &func(&["uint"], &["bool"]));
        assert_eq!(finding.changes.len(), 1);
        assert_eq!(finding.changes[0].change_type, ChangeType::ParamTypeChanged);
        assert_eq!(finding.changes[0].path, "F.args[0]");
    }

    #[test]
    fn test_variable_and_constant_types() {
        let checker = CompatibilityChecker::new();
        assert_eq!(checker.compare_items(&Item::variable("int"), &Item::variable("int")), RequiredBump::Patch);
        assert_eq!(checker.compare_items(&Item::variable("int"), &Item::variable("int64")), RequiredBump::Major);
        assert_eq!(checker.compare_items(&Item::constant("string"), &Item::constant("string")), RequiredBump::Patch);
        assert_eq!(checker.compare_items(&Item::variable("int"), &Item::constant("int")), RequiredBump::Major);
    }

    #[test]
    fn test_composite_field_added_is_minor() {
        let checker = CompatibilityChecker::new();
        let old = Item::composite("T", record(&[("A", "int")]));
        let new = Item::composite("T", record(&[("A", "int"), ("B", "string")]));

        let finding = checker.check_item("T", &old, &new);
        assert_eq!(finding.bump, RequiredBump::Minor);
        assert_eq!(finding.changes[0].change_type, ChangeType::FieldAdded);
        assert_eq!(finding.changes[0].path, "T.fields.B");
    }

    #[test]
    fn test_composite_type_change_dominates_additions() {
        let checker = CompatibilityChecker::new();
        let old = Item::composite("T", record(&[("A", "int")]));
        let new = Item::composite("T", record(&[("A", "uint"), ("B", "string"), ("C", "bool")]));
        assert_eq!(checker.compare_items(&old, &new), RequiredBump::Major);
    }

    #[test]
    fn test_composite_removal_with_same_count_is_major() {
        let checker = CompatibilityChecker::new();
        let old = Item::composite("T", record(&[("A", "int")]));
        let new = Item::composite("T", record(&[("B", "int")]));

        let finding = checker.check_item("T", &old, &new);
        assert_eq!(finding.bump, RequiredBump::Major);
        assert_eq!(finding.changes.last().unwrap().change_type, ChangeType::FieldRemoved);
    }

    #[test]
    fn test_breaking_field_skips_methods() {
        let checker = CompatibilityChecker::new();
        let old = Item::composite(
            "T",
            record(&[("A", "int")]).with_method("M", Func::new(["int"], Vec::<String>::new())),
        );
        let new = Item::composite(
            "T",
            record(&[("A", "string")]).with_method("M", Func::new(["string"], Vec::<String>::new())),
        );

        let finding = checker.check_item("T", &old, &new);
        assert_eq!(finding.bump, RequiredBump::Major);
        assert_eq!(finding.changes.len(), 1);
        assert_eq!(finding.changes[0].path, "T.fields.A");
    }

    #[test]
    fn test_composite_methods() {
        let checker = CompatibilityChecker::new();
        let close = Func::new(Vec::<String>::new(), ["error"]).with_receiver("*T");
        let old = Item::composite("T", Composite::new().with_method("Close", close.clone()));

        let added = Item::composite(
            "T",
            Composite::new()
                .with_method("Close", close.clone())
                .with_method("Flush", Func::new(Vec::<String>::new(), ["error"]).with_receiver("*T")),
        );
        assert_eq!(checker.compare_items(&old, &added), RequiredBump::Minor);

        let changed = Item::composite(
            "T",
            Composite::new().with_method("Close", Func::default().with_receiver("*T")),
        );
        let finding = checker.check_item("T", &old, &changed);
        assert_eq!(finding.bump, RequiredBump::Major);
        assert_eq!(finding.changes[0].path, "T.methods.Close.results");

        let removed = Item::composite("T", Composite::new());
        assert_eq!(checker.compare_items(&old, &removed), RequiredBump::Major);
    }

    #[test]
    fn test_interface_methods_follow_composite_rule() {
        let checker = CompatibilityChecker::new();
        let read = Func::new(["[]byte"], ["int", "error"]).with_receiver("R");
        let old = Item::interface("R", MethodSet::new().with_method("Read", read.clone()));
        let added = Item::interface(
            "R",
            MethodSet::new()
                .with_method("Read", read.clone())
                .with_method("Close", Func::new(Vec::<String>::new(), ["error"]).with_receiver("R")),
        );

        assert_eq!(checker.compare_items(&old, &old.clone()), RequiredBump::Patch);
        assert_eq!(checker.compare_items(&old, &added), RequiredBump::Minor);
        assert_eq!(checker.compare_items(&added, &old), RequiredBump::Major);
    }

    #[test]
    fn test_module_three_way_classification() {
        let checker = CompatibilityChecker::new();
        let old = Snapshot::new()
            .with("Keep", func(&["int"], &["error"]))
            .with("Gone", Item::variable("int"));
        let new = Snapshot::new()
            .with("Keep", func(&["int"], &["error"]))
            .with("Fresh", Item::constant("string"));

        let report = checker.check(&old, &new);
        assert_eq!(report.bump, RequiredBump::Major);
        assert_eq!(report.compared, 3);
        assert_eq!(report.flagged_names(), vec!["Fresh", "Gone"]);
        assert_eq!(report.finding("Gone").unwrap().changes[0].change_type, ChangeType::ItemRemoved);
        assert_eq!(report.finding("Fresh").unwrap().bump, RequiredBump::Minor);
    }

    #[test]
    fn test_module_addition_only_is_minor() {
        let checker = CompatibilityChecker::new();
        let old = Snapshot::new().with("F", func(&[], &[]));
        let new = old.clone().with("G", func(&[], &[]));
        let report = checker.check(&old, &new);
        assert_eq!(report.bump, RequiredBump::Minor);
        assert!(!report.is_breaking());
    }

    #[test]
    fn test_strict_mode_promotes_minor() {
        let checker = CompatibilityChecker::new().strict();
        let old = Snapshot::new().with("F", func(&[], &[]));
        let new = old.clone().with("G", func(&[], &[]));
        assert_eq!(checker.check(&old, &new).bump, RequiredBump::Major);
        assert_eq!(checker.check(&old, &old).bump, RequiredBump::Patch);
    }

    #[test]
    fn test_ignore_patterns() {
        let checker = CompatibilityChecker::new().ignoring(["^Internal", "Deprecated$"]).unwrap();
        let old = Snapshot::new()
            .with("InternalHook", func(&[], &[]))
            .with("OldDeprecated", Item::variable("int"));
        let new = Snapshot::new();

        let report = checker.check(&old, &new);
        assert_eq!(report.bump, RequiredBump::Patch);
        assert_eq!(report.compared, 0);

        assert!(matches!(
            CompatibilityChecker::new().ignoring(["("]),
            Err(ApiError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_summary() {
        let checker = CompatibilityChecker::new();
        let snap = Snapshot::new().with("F", func(&[], &[]));
        assert_eq!(checker.check(&snap, &snap).summary(), "No changes detected in 1 items");
    }
}
