use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::charset::{AMHARIC_TABLE, UNKNOWN_GLYPH};
use super::{RecognizerError, Result};

/// Glyphs laid out root by order. Only row-major traversal order is significant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphTable {
    rows: Vec<Vec<String>>,
}

impl GlyphTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        GlyphTable { rows }
    }

    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GlyphTable {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// The 34 x 7 Amharic table.
    pub fn amharic() -> Self {
        GlyphTable::from_rows(AMHARIC_TABLE.iter().map(|row| row.iter().copied()))
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn total_cells(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    pub fn is_rectangular(&self) -> bool {
        match self.rows.first() {
            Some(first) => self.rows.iter().all(|row| row.len() == first.len()),
            None => true,
        }
    }

    /// Row-major traversal of every cell.
    pub fn flatten(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().flat_map(|row| row.iter().map(String::as_str))
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        GlyphTable::amharic()
    }
}

/// Class identifier to glyph, paired by position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMap {
    entries: HashMap<String, String>,
}

impl GlyphMap {
    /// Pairs `class_ids[i]` with the i-th glyph of `table` in row-major order.
    ///
    /// Pairing stops as soon as either side runs out. A repeated identifier keeps the glyph
    /// of its last position.
    pub fn build<S: AsRef<str>>(table: &GlyphTable, class_ids: &[S]) -> Self {
        let entries: HashMap<String, String> = class_ids
            .iter()
            .zip(table.flatten())
            .map(|(id, glyph)| (id.as_ref().to_owned(), glyph.to_owned()))
            .collect();
        debug!(
            entries = entries.len(),
            classes = class_ids.len(),
            glyphs = table.total_cells(),
            "built glyph map"
        );
        GlyphMap { entries }
    }

    /// Never fails: identifiers without a glyph resolve to [`UNKNOWN_GLYPH`].
    pub fn lookup(&self, class_id: &str) -> &str {
        self.get(class_id).unwrap_or(UNKNOWN_GLYPH)
    }

    pub fn get(&self, class_id: &str) -> Option<&str> {
        self.entries.get(class_id).map(String::as_str)
    }

    pub fn contains(&self, class_id: &str) -> bool {
        self.entries.contains_key(class_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// How a class identifier list lines up against a glyph table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub glyphs: usize,
    pub classes: usize,
    pub mapped: usize,
    /// Identifiers past the end of the table, in model order.
    pub unmapped_classes: Vec<String>,
    pub unused_glyphs: usize,
    pub duplicate_classes: Vec<String>,
}

impl Alignment {
    pub fn is_exact(&self) -> bool {
        self.glyphs == self.classes && self.duplicate_classes.is_empty()
    }

    /// Duplicates are always rejected. In strict mode the two lengths must also agree.
    pub fn validate(&self, strict: bool) -> Result<()> {
        if !self.duplicate_classes.is_empty() {
            return Err(RecognizerError::Alignment {
                message: format!(
                    "duplicate class identifiers: {}",
                    self.duplicate_classes.join(", ")
                ),
            });
        }
        if self.glyphs != self.classes {
            if strict {
                return Err(RecognizerError::Alignment {
                    message: format!(
                        "{} class identifiers for {} glyphs",
                        self.classes, self.glyphs
                    ),
                });
            }
            warn!(
                classes = self.classes,
                glyphs = self.glyphs,
                unmapped = self.unmapped_classes.len(),
                unused = self.unused_glyphs,
                "class identifiers and glyph table differ in length"
            );
        }
        Ok(())
    }
}

pub fn check_alignment<S: AsRef<str>>(table: &GlyphTable, class_ids: &[S]) -> Alignment {
    let glyphs = table.total_cells();
    let classes = class_ids.len();
    let mapped = glyphs.min(classes);

    let mut seen = HashSet::new();
    let mut duplicate_classes = Vec::new();
    for id in class_ids {
        let id = id.as_ref();
        if !seen.insert(id) && !duplicate_classes.iter().any(|d: &String| d == id) {
            duplicate_classes.push(id.to_owned());
        }
    }

    Alignment {
        glyphs,
        classes,
        mapped,
        unmapped_classes: class_ids[mapped..]
            .iter()
            .map(|id| id.as_ref().to_owned())
            .collect(),
        unused_glyphs: glyphs - mapped,
        duplicate_classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> GlyphTable {
        GlyphTable::from_rows([["ሀ", "ሁ"], ["ለ", "ሉ"]])
    }

    #[test]
    fn pairs_row_major() {
        let map = GlyphMap::build(&small_table(), &["c0", "c1", "c2"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("c0"), Some("ሀ"));
        assert_eq!(map.get("c1"), Some("ሁ"));
        assert_eq!(map.get("c2"), Some("ለ"));
        assert!(!map.iter().any(|(_, glyph)| glyph == "ሉ"));
    }

    #[test]
    fn extra_identifiers_are_unmapped() {
        let ids = ["a", "b", "c", "d", "e", "f"];
        let map = GlyphMap::build(&small_table(), &ids);
        assert_eq!(map.len(), 4);
        assert!(!map.contains("e"));
        assert_eq!(map.lookup("f"), UNKNOWN_GLYPH);
    }

    #[test]
    fn size_is_min_of_both_lengths() {
        let table = GlyphTable::amharic();
        for n in [0, 1, 7, 100, 238, 300] {
            let ids: Vec<String> = (0..n).map(|i| format!("class_{i}")).collect();
            assert_eq!(GlyphMap::build(&table, &ids).len(), n.min(238));
        }
    }

    #[test]
    fn lookup_is_total() {
        let map = GlyphMap::build(&small_table(), &["c0"]);
        assert_eq!(map.lookup("c0"), "ሀ");
        assert_eq!(map.lookup(""), UNKNOWN_GLYPH);
        assert_eq!(map.lookup("not-a-class"), UNKNOWN_GLYPH);
    }

    #[test]
    fn duplicate_identifier_last_write_wins() {
        let map = GlyphMap::build(&small_table(), &["x", "y", "x"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("x"), "ለ");
    }

    #[test]
    fn ragged_table_flattens_in_order() {
        let table = GlyphTable::from_rows(vec![vec!["ሀ"], vec!["ለ", "ሉ", "ሊ"]]);
        assert!(!table.is_rectangular());
        assert_eq!(table.flatten().collect::<Vec<_>>(), ["ሀ", "ለ", "ሉ", "ሊ"]);
    }

    #[test]
    fn amharic_table_shape() {
        let table = GlyphTable::amharic();
        assert!(table.is_rectangular());
        assert_eq!(table.total_cells(), 238);
        assert_eq!(table.flatten().nth(7), Some("ለ"));
    }

    #[test]
    fn alignment_reports_both_sides() {
        let short = check_alignment(&small_table(), &["c0", "c1", "c2"]);
        assert_eq!(short.mapped, 3);
        assert_eq!(short.unused_glyphs, 1);
        assert!(short.unmapped_classes.is_empty());
        assert!(short.validate(false).is_ok());
        assert!(matches!(
            short.validate(true),
            Err(RecognizerError::Alignment { .. })
        ));

        let long = check_alignment(&small_table(), &["a", "b", "c", "d", "e"]);
        assert_eq!(long.unmapped_classes, vec!["e".to_string()]);
        assert_eq!(long.unused_glyphs, 0);
    }

    #[test]
    fn alignment_rejects_duplicates() {
        let report = check_alignment(&small_table(), &["a", "b", "a", "a"]);
        assert_eq!(report.duplicate_classes, vec!["a".to_string()]);
        assert!(!report.is_exact());
        assert!(report.validate(false).is_err());
    }

    #[test]
    fn exact_alignment() {
        let report = check_alignment(&small_table(), &["a", "b", "c", "d"]);
        assert!(report.is_exact());
        assert!(report.validate(true).is_ok());
    }
}
