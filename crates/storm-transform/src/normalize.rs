//! Column name canonicalization.
//!
//! Canonical names are lowercase ASCII tokens over `[a-z0-9_]`. Removed
//! characters never leave an underscore behind, so `"Begin Lat (°)"` becomes
//! `begin_lat`, while underscores already in the header are kept.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use storm_model::{Defect, Result, Table};
use unicode_normalization::UnicodeNormalization;

static NON_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s]").expect("Invalid token regex"));

/// Canonicalize a raw column name. Idempotent.
///
/// Each whitespace character becomes one `_`; whitespace next to removed
/// characters at either end is trimmed first.
pub fn normalize_column_name(name: &str) -> String {
    let decomposed: String = name.nfkd().collect::<String>().to_lowercase();
    let ascii: String = decomposed.chars().filter(char::is_ascii).collect();
    let token = NON_TOKEN.replace_all(&ascii, "");
    token
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Normalize every header of `table`.
///
/// Headers that collapse onto an earlier name get a numeric suffix
/// (`name_2`, `name_3`, ...); headers that collapse to nothing become
/// `column_<position>`. Each such rename is reported.
pub fn normalize_table_columns(table: &mut Table) -> Result<Vec<Defect>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(table.width());
    let mut defects = Vec::new();

    for (idx, original) in table.column_names().into_iter().enumerate() {
        let mut base = normalize_column_name(original);
        let mut collided = false;
        if base.is_empty() {
            base = format!("column_{}", idx + 1);
            collided = true;
        }
        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
            collided = true;
        }
        if collided {
            defects.push(Defect::ColumnRenamed {
                from: original.to_string(),
                to: candidate.clone(),
            });
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    table.set_column_names(names)?;
    Ok(defects)
}
