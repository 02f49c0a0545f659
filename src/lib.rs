//! api-semver
//!
//! Snapshots the exported API surface of a module and compares two
//! snapshots to find the smallest semantic-versioning increment the change
//! requires.
//!
//! ## Pipeline
//!
//! ```text
//! resolver output (SymbolTable) ──classify──▶ Snapshot (new) ─┐
//!                                                             ├─ CompatibilityChecker ─▶ ModuleReport
//! stored SnapshotFile ─────────────────────▶ Snapshot (old) ─┘
//! ```
//!
//! - **Classification** turns already-resolved symbols into [`Item`]s. No
//!   source code is parsed here; a language front-end provides the
//!   [`SymbolTable`].
//! - **Comparison** dispatches on item kind and joins per-item
//!   [`RequiredBump`]s over `Patch < Minor < Major`.
//! - **Storage** persists snapshots as checksummed JSON and can read a
//!   baseline from a git revision.

pub mod bump;
pub mod checksum;
pub mod classify;
pub mod compatibility;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod item;
pub mod normalize;
pub mod report;
pub mod store;
pub mod symbols;
pub mod version;

pub use bump::RequiredBump;
pub use checksum::Checksum;
pub use classify::{classify, Classification, Classifier};
pub use compatibility::{ChangeType, CompatibilityChecker, ItemChange, ItemFinding, ModuleReport};
pub use config::{ApiSemverConfig, OutputFormat};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{ApiError, Result};
pub use item::{Composite, Func, Item, ItemKind, MethodSet, Snapshot};
pub use report::DiffReport;
pub use store::SnapshotFile;
pub use symbols::{SymbolFile, SymbolSource, SymbolTable};
pub use version::ModuleVersion;
