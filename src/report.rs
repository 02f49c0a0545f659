//! Human-readable and JSON renderings of a [`ModuleReport`]

use semver::Version;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;

use crate::bump::RequiredBump;
use crate::compatibility::{ItemFinding, ModuleReport};
use crate::error::Result;
use crate::item::Item;

/// Report plus the context it was produced in
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport<'a> {
    pub module: &'a str,
    pub bump: RequiredBump,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<&'a Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_version: Option<Version>,
    pub flagged: Vec<&'a str>,
    pub findings: &'a [ItemFinding],
}

impl<'a> DiffReport<'a> {
    pub fn new(module: &'a str, report: &'a ModuleReport, current_version: Option<&'a Version>) -> Self {
        Self {
            module,
            bump: report.bump,
            summary: report.summary(),
            current_version,
            next_version: current_version.map(|v| report.bump.apply(v)),
            flagged: report.flagged_names(),
            findings: &report.findings,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering; `verbose` adds a line diff of each changed item
    pub fn to_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Module: {}", self.module);
        let _ = writeln!(out, "Required bump: {} ({})", self.bump, self.summary);
        if let (Some(current), Some(next)) = (self.current_version, &self.next_version) {
            let _ = writeln!(out, "Next version: {} -> {}", current, next);
        }

        for finding in self.findings {
            let marker = match finding.bump {
                RequiredBump::Major => "✗",
                RequiredBump::Minor => "+",
                RequiredBump::Patch => " ",
            };
            let _ = writeln!(out, "\n{} {:<5} {}", marker, finding.bump, finding.name);
            for change in &finding.changes {
                let _ = writeln!(out, "    {}", change);
            }
            if verbose {
                if let (Some(old), Some(new)) = (&finding.old, &finding.new) {
                    for line in item_diff(old, new) {
                        let _ = writeln!(out, "      {}", line);
                    }
                }
            }
        }

        out
    }
}

/// Changed lines between the pretty JSON forms of two items, prefixed `-`/`+`
pub fn item_diff(old: &Item, new: &Item) -> Vec<String> {
    let old_text = serde_json::to_string_pretty(old).unwrap_or_default();
    let new_text = serde_json::to_string_pretty(new).unwrap_or_default();

    TextDiff::from_lines(&old_text, &new_text)
        .iter_all_changes()
        .filter_map(|change| {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => return None,
            };
            Some(format!("{} {}", sign, change.value().trim_end()))
        })
        .collect()
}
