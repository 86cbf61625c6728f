//! Tabular-row adapter.
//!
//! Builds transaction items of the form `column<sep>value` from rows
//! of column/value pairs, so tabular datasets can be mined without a
//! hand-written conversion step. The separator is declared once and
//! neither columns nor values may contain it, which keeps items
//! unambiguous.

use crate::index::RuleIndex;
use am_common::{Error, Result};
use std::collections::HashMap;

/// Converts column/value rows into transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularInserter {
    separator: char,
    columns: Vec<String>,
}

impl TabularInserter {
    /// Build an inserter over the given input columns with the
    /// default `=` separator.
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            separator: '=',
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Declare a different separator.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// The declared separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Build the item string for one cell.
    ///
    /// Fails with [`Error::InvalidItem`] when the column or the
    /// value contains the separator.
    pub fn item(&self, column: &str, value: &str) -> Result<String> {
        if column.contains(self.separator) {
            return Err(Error::invalid_item(
                column,
                format!("column name contains the separator {:?}", self.separator),
            ));
        }
        if value.contains(self.separator) {
            return Err(Error::invalid_item(
                value,
                format!("value contains the separator {:?}", self.separator),
            ));
        }
        Ok(format!("{column}{}{value}", self.separator))
    }

    /// Insert one row as a transaction; columns absent from the row
    /// are skipped. Returns the number of subsets inserted.
    pub fn insert_row(
        &self,
        index: &mut RuleIndex,
        row: &HashMap<String, String>,
    ) -> Result<usize> {
        let mut items = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if let Some(value) = row.get(column) {
                items.push(self.item(column, value)?);
            }
        }
        index.insert_transaction(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_common::{IndexOptions, ItemsetQuery};

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_item_building() {
        let inserter = TabularInserter::new(["smoker"]);
        assert_eq!(inserter.item("smoker", "yes").unwrap(), "smoker=yes");

        let piped = TabularInserter::new(["smoker"]).with_separator('|');
        assert_eq!(piped.item("smoker", "yes").unwrap(), "smoker|yes");
    }

    #[test]
    fn test_separator_collision_is_rejected() {
        let inserter = TabularInserter::new(["a"]);
        assert!(matches!(
            inserter.item("a=b", "x"),
            Err(Error::InvalidItem { .. })
        ));
        assert!(matches!(
            inserter.item("a", "x=y"),
            Err(Error::InvalidItem { .. })
        ));
    }

    #[test]
    fn test_insert_rows_builds_transactions() {
        let mut index =
            RuleIndex::new(IndexOptions::new(["smoker=yes"])).unwrap();
        let inserter = TabularInserter::new(["smoker", "sport"]);

        inserter
            .insert_row(&mut index, &row(&[("smoker", "yes"), ("sport", "no")]))
            .unwrap();
        inserter
            .insert_row(&mut index, &row(&[("smoker", "yes"), ("ignored", "x")]))
            .unwrap();

        let itemsets = index.frequent_itemsets(&ItemsetQuery::default()).unwrap();
        let find = |items: &[&str]| {
            itemsets
                .iter()
                .find(|r| r.items == items)
                .map(|r| r.occurrences)
        };
        assert_eq!(find(&["smoker=yes"]), Some(2));
        assert_eq!(find(&["smoker=yes", "sport=no"]), Some(1));
        assert_eq!(index.stats().transactions, 2);
    }

    #[test]
    fn test_rows_missing_all_columns_still_count() {
        let mut index = RuleIndex::new(IndexOptions::new(["x=1"])).unwrap();
        let inserter = TabularInserter::new(["x"]);
        inserter.insert_row(&mut index, &row(&[("other", "v")])).unwrap();
        assert_eq!(index.stats().transactions, 1);
        assert_eq!(index.stats().nodes, 1);
    }
}
