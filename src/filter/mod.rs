//! Substring filtering over rendered table rows.
//!
//! The first row of a [`Table`] is its header. It stays visible and is never
//! matched against the query.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<String>,
    pub visible: bool,
}

impl Row {
    pub fn new<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: cells.into_iter().map(Into::into).collect(),
            visible: true,
        }
    }

    /// Cell text joined with single spaces, the way the row reads on screen.
    pub fn text(&self) -> String {
        self.cells.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(header: Row) -> Self {
        Self { rows: vec![header] }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Body rows that are currently shown.
    pub fn visible_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().skip(1).filter(|row| row.visible)
    }
}

/// Visibility after one filter pass, header included at index 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityReport {
    pub query: String,
    pub visible: Vec<bool>,
}

impl VisibilityReport {
    pub fn shown(&self) -> usize {
        self.visible.iter().skip(1).filter(|v| **v).count()
    }

    pub fn hidden(&self) -> usize {
        self.visible.iter().skip(1).filter(|v| !**v).count()
    }
}

/// Case-insensitive substring match of a row's text against `query`.
///
/// The query is not trimmed: `" "` only matches rows containing a space.
pub fn row_matches(row: &Row, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    row.text().to_uppercase().contains(&query.to_uppercase())
}

pub fn filter_rows(query: &str, rows: &mut [Row]) -> VisibilityReport {
    let needle = query.to_uppercase();
    let mut visible = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter_mut().enumerate() {
        row.visible =
            index == 0 || needle.is_empty() || row.text().to_uppercase().contains(&needle);
        visible.push(row.visible);
    }
    let report = VisibilityReport {
        query: query.to_string(),
        visible,
    };
    tracing::debug!(
        query,
        shown = report.shown(),
        hidden = report.hidden(),
        "filtered table rows"
    );
    report
}

/// Filters `table` when both the query source and the table exist.
///
/// A page without the search box or the table is not an error; the call
/// simply does nothing.
pub fn filter_table(query: Option<&str>, table: Option<&mut Table>) -> Option<VisibilityReport> {
    match (query, table) {
        (Some(query), Some(table)) => Some(filter_rows(query, &mut table.rows)),
        (query, table) => {
            tracing::debug!(
                has_query = query.is_some(),
                has_table = table.is_some(),
                "filter target missing, skipping"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pantry() -> Table {
        let mut table = Table::new(Row::new(["Item Qty"]));
        table.push(Row::new(["Apples 3"]));
        table.push(Row::new(["Bananas 5"]));
        table
    }

    #[test]
    fn matches_case_insensitively() {
        let mut table = pantry();
        let report = filter_table(Some("apple"), Some(&mut table)).unwrap();
        assert_eq!(report.visible, vec![true, true, false]);
        assert_eq!(report.shown(), 1);
    }

    #[test]
    fn empty_query_shows_everything() {
        let mut table = pantry();
        filter_rows("ZZZ", &mut table.rows);
        let report = filter_rows("", &mut table.rows);
        assert_eq!(report.visible, vec![true, true, true]);
    }

    #[test]
    fn no_match_leaves_only_the_header() {
        let mut table = pantry();
        let report = filter_rows("ZZZ", &mut table.rows);
        assert_eq!(report.visible, vec![true, false, false]);
        assert_eq!(table.visible_rows().count(), 0);
    }

    #[test]
    fn header_is_never_matched() {
        let mut table = pantry();
        let report = filter_rows("Qty", &mut table.rows);
        assert_eq!(report.visible, vec![true, false, false]);
    }

    #[test]
    fn cells_are_joined_with_spaces() {
        let mut table = Table::new(Row::new(["Item", "Qty"]));
        table.push(Row::new(["Milk", "2"]));
        table.push(Row::new(["Bread", "10"]));
        let report = filter_rows("milk 2", &mut table.rows);
        assert_eq!(report.visible, vec![true, true, false]);
    }

    #[test]
    fn whitespace_queries_are_literal() {
        let mut table = Table::new(Row::new(["Item"]));
        table.push(Row::new(["Sourdough"]));
        table.push(Row::new(["Rye bread"]));
        let report = filter_rows(" ", &mut table.rows);
        assert_eq!(report.visible, vec![true, false, true]);
    }

    #[test]
    fn unicode_case_folding() {
        let mut table = Table::new(Row::new(["Item"]));
        table.push(Row::new(["Crème fraîche"]));
        let report = filter_rows("CRÈME", &mut table.rows);
        assert_eq!(report.visible, vec![true, true]);
        assert!(row_matches(&table.rows[1], "fraîche"));
    }

    #[test]
    fn missing_targets_are_a_no_op() {
        let mut table = pantry();
        assert!(filter_table(None, Some(&mut table)).is_none());
        assert!(table.rows.iter().all(|row| row.visible));
        assert!(filter_table(Some("apple"), None).is_none());
    }
}
