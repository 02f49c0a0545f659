//! Snapshot model
//!
//! One [`Snapshot`] is the exported surface of a module at a point in time,
//! keyed by exported identifier. Type names are opaque strings: two types
//! are the same iff their names are equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind tag of an [`Item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Function,
    Variable,
    Constant,
    Composite,
    Interface,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Function => "function",
            ItemKind::Variable => "variable",
            ItemKind::Constant => "constant",
            ItemKind::Composite => "composite",
            ItemKind::Interface => "interface",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single exported API element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    Function {
        function: Func,
    },
    Variable {
        #[serde(rename = "type")]
        type_name: String,
    },
    Constant {
        #[serde(rename = "type")]
        type_name: String,
    },
    /// Named record type with its fields and full method set
    Composite {
        #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
        type_name: String,
        #[serde(default, skip_serializing_if = "Composite::is_empty")]
        composite: Composite,
    },
    /// Named interface type with its method set
    Interface {
        #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
        type_name: String,
        #[serde(default, skip_serializing_if = "MethodSet::is_empty")]
        interface: MethodSet,
    },
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Function { .. } => ItemKind::Function,
            Item::Variable { .. } => ItemKind::Variable,
            Item::Constant { .. } => ItemKind::Constant,
            Item::Composite { .. } => ItemKind::Composite,
            Item::Interface { .. } => ItemKind::Interface,
        }
    }

    pub fn function(func: Func) -> Self {
        Item::Function { function: func }
    }

    pub fn variable(type_name: impl Into<String>) -> Self {
        Item::Variable {
            type_name: type_name.into(),
        }
    }

    pub fn constant(type_name: impl Into<String>) -> Self {
        Item::Constant {
            type_name: type_name.into(),
        }
    }

    pub fn composite(type_name: impl Into<String>, composite: Composite) -> Self {
        Item::Composite {
            type_name: type_name.into(),
            composite,
        }
    }

    pub fn interface(type_name: impl Into<String>, methods: MethodSet) -> Self {
        Item::Interface {
            type_name: type_name.into(),
            interface: methods,
        }
    }

    /// The type name carried by this item, if any
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Item::Function { .. } => None,
            Item::Variable { type_name }
            | Item::Constant { type_name }
            | Item::Composite { type_name, .. }
            | Item::Interface { type_name, .. } => Some(type_name),
        }
    }

    /// One-line rendering used in reports
    pub fn summary(&self) -> String {
        match self {
            Item::Function { function } => function.signature(),
            Item::Variable { type_name } => format!("var {}", type_name),
            Item::Constant { type_name } => format!("const {}", type_name),
            Item::Composite {
                type_name,
                composite,
            } => format!(
                "struct {} ({} fields, {} methods)",
                type_name,
                composite.fields.len(),
                composite.methods.len()
            ),
            Item::Interface {
                type_name,
                interface,
            } => format!(
                "interface {} ({} methods)",
                type_name,
                interface.methods.len()
            ),
        }
    }
}

/// Function or method signature, with parameter names already stripped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Func {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arg_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub res_types: Vec<String>,
    /// Accepts a variable-length trailing argument list
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
    /// Receiver type, present only for methods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl Func {
    pub fn new<A, R>(arg_types: A, res_types: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            arg_types: arg_types.into_iter().map(Into::into).collect(),
            res_types: res_types.into_iter().map(Into::into).collect(),
            variadic: false,
            receiver: None,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    /// Render as `func (recv) (args) (results)`
    pub fn signature(&self) -> String {
        let mut out = String::from("func ");
        if let Some(recv) = &self.receiver {
            out.push_str(&format!("({}) ", recv));
        }
        let mut args = self.arg_types.clone();
        if self.variadic {
            if let Some(last) = args.last_mut() {
                *last = format!("...{}", last.trim_start_matches("[]"));
            }
        }
        out.push_str(&format!("({})", args.join(", ")));
        match self.res_types.len() {
            0 => {}
            1 => out.push_str(&format!(" {}", self.res_types[0])),
            _ => out.push_str(&format!(" ({})", self.res_types.join(", "))),
        }
        out
    }
}

/// Fields and methods of a named record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composite {
    /// Field name -> `Item::Variable`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Item>,
    /// Method name -> `Item::Function`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, Item>,
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Item::variable(type_name));
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, func: Func) -> Self {
        self.methods.insert(name.into(), Item::function(func));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.methods.is_empty()
    }
}

/// Method set of an interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub methods: BTreeMap<String, Item>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, name: impl Into<String>, func: Func) -> Self {
        self.methods.insert(name.into(), Item::function(func));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Exported surface of a module: exported name -> item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    items: BTreeMap<String, Item>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item. Returns false and leaves the snapshot unchanged if
    /// the name is already present.
    pub fn insert(&mut self, name: impl Into<String>, item: Item) -> bool {
        use std::collections::btree_map::Entry;
        match self.items.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(item);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn with(mut self, name: impl Into<String>, item: Item) -> Self {
        self.insert(name, item);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Exported names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Item)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, Item)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Item)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (name, item) in iter {
            snapshot.insert(name, item);
        }
        snapshot
    }
}
