//! Agreement classification over a merged two-rater table.
//!
//! A rater lists the components they flagged; an item written as `(n)` is
//! flagged but uncertain. For each component mentioned by either rater,
//! every rater casts one vote:
//!
//! | rater's cell    | vote      |
//! |-----------------|-----------|
//! | `n`             | exclude   |
//! | `(n)`           | uncertain |
//! | absent          | include   |
//!
//! A component is *agreed* when both vote exclude, and *disputed* when any
//! vote is uncertain or the raters split between include and exclude.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use thiserror::Error;

use crate::core::loaders;
use crate::core::writers;

/// Default report name, written next to the merged table.
pub const REPORT_FILE: &str = "agreement.tsv";

/// Errors that can occur while building the agreement report.
#[derive(Debug, Error)]
pub enum AgreementError {
    #[error("Merged table not found: {0}")]
    InputNotFound(PathBuf),
}

/// Components named in one rater cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentList {
    /// Every component id, certain or not
    pub components: BTreeSet<u32>,
    /// Ids written as `(n)`
    pub uncertain: BTreeSet<u32>,
}

impl ComponentList {
    fn vote(&self, id: u32) -> Vote {
        if self.uncertain.contains(&id) {
            Vote::Uncertain
        } else if self.components.contains(&id) {
            Vote::Exclude
        } else {
            Vote::Include
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vote {
    Include,
    Uncertain,
    Exclude,
}

/// Vote tally for one component across both raters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentStatus {
    pub include: u8,
    pub uncertain: u8,
    pub exclude: u8,
}

impl ComponentStatus {
    fn add(&mut self, vote: Vote) {
        match vote {
            Vote::Include => self.include += 1,
            Vote::Uncertain => self.uncertain += 1,
            Vote::Exclude => self.exclude += 1,
        }
    }

    pub fn is_disputed(&self) -> bool {
        self.uncertain > 0 || (self.include > 0 && self.exclude > 0)
    }

    pub fn is_agreed(&self) -> bool {
        self.exclude == 2
    }
}

/// Classification of one (Subject, Session) row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemAgreement {
    pub subject: String,
    pub session: String,
    pub statuses: BTreeMap<u32, ComponentStatus>,
}

impl ItemAgreement {
    pub fn agreed(&self) -> Vec<u32> {
        self.filter_ids(ComponentStatus::is_agreed)
    }

    pub fn disputed(&self) -> Vec<u32> {
        self.filter_ids(ComponentStatus::is_disputed)
    }

    fn filter_ids(&self, pred: fn(&ComponentStatus) -> bool) -> Vec<u32> {
        self.statuses
            .iter()
            .filter(|(_, status)| pred(status))
            .map(|(&id, _)| id)
            .collect()
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.subject.clone(),
            self.session.clone(),
            join_ids(&self.agreed()),
            join_ids(&self.disputed()),
        ]
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Leading integer of `s`, skipping leading whitespace and ignoring any
/// trailing text: `"12abc"` is 12, `"1.5"` is 1, `"3)"` is 3.
///
/// Negative numbers and values past `u32::MAX` are not component ids and
/// yield `None`.
fn leading_component_id(s: &str) -> Option<u32> {
    let s = s.trim_start();
    let s = s.strip_prefix('+').unwrap_or(s);
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

/// Parse a rater cell such as `"1, (2), 3"`.
///
/// Double quotes are dropped. An item wrapped in parentheses is uncertain.
/// Each item contributes its leading integer, so `3)` and `12abc` still
/// name components 3 and 12; items with no leading digits are ignored.
pub fn parse_component_list(cell: &str) -> ComponentList {
    let mut list = ComponentList::default();
    let cleaned = cell.replace('"', "");

    for item in cleaned.split(',').map(str::trim) {
        if let Some(inner) = item.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            if let Some(id) = leading_component_id(inner) {
                list.components.insert(id);
                list.uncertain.insert(id);
            }
        } else if let Some(id) = leading_component_id(item) {
            list.components.insert(id);
        }
    }

    list
}

/// Tally both raters' votes for every component either of them mentions.
pub fn classify(a: &ComponentList, b: &ComponentList) -> BTreeMap<u32, ComponentStatus> {
    a.components
        .union(&b.components)
        .map(|&id| {
            let mut status = ComponentStatus::default();
            status.add(a.vote(id));
            status.add(b.vote(id));
            (id, status)
        })
        .collect()
}

/// Classify every row of a merged pairing table.
///
/// Rows with fewer than four columns are skipped with a warning.
pub fn build_agreement_report(merged_tsv: &Path) -> Result<Vec<ItemAgreement>> {
    if !merged_tsv.is_file() {
        return Err(AgreementError::InputNotFound(merged_tsv.to_path_buf()).into());
    }

    let records = loaders::read_tsv_records(merged_tsv)
        .with_context(|| format!("Failed to read merged table: {}", merged_tsv.display()))?;

    let mut items = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        if record.len() < 4 {
            // +2: header row and 1-based numbering
            warn!(
                "Skipping line {} of {}: expected 4 columns, found {}",
                idx + 2,
                merged_tsv.display(),
                record.len()
            );
            continue;
        }

        let a = parse_component_list(&record[2]);
        let b = parse_component_list(&record[3]);

        items.push(ItemAgreement {
            subject: record[0].clone(),
            session: record[1].clone(),
            statuses: classify(&a, &b),
        });
    }

    Ok(items)
}

/// `agreement.tsv` in the same directory as `merged_tsv`.
pub fn default_report_path(merged_tsv: &Path) -> PathBuf {
    merged_tsv
        .parent()
        .map(|dir| dir.join(REPORT_FILE))
        .unwrap_or_else(|| PathBuf::from(REPORT_FILE))
}

/// Build the agreement report and write it as a TSV with columns
/// `Subject`, `Session`, `agreed`, `disputed`.
pub fn write_agreement_report(merged_tsv: &Path, output: &Path) -> Result<Vec<ItemAgreement>> {
    let items = build_agreement_report(merged_tsv)?;
    let rows: Vec<Vec<String>> = items.iter().map(ItemAgreement::to_row).collect();

    writers::write_tsv(output, &["Subject", "Session", "agreed", "disputed"], &rows)
        .with_context(|| format!("Failed to write agreement report: {}", output.display()))?;

    info!("Wrote agreement for {} items to {}", items.len(), output.display());

    Ok(items)
}
