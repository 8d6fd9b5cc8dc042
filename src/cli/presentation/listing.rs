//! Child listing table for `ls`.

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

/// One row of a child listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRow {
    pub name: String,
    pub kind: String,
    pub value: String,
}

pub fn format_children_table(path: &str, rows: &[ChildRow]) -> String {
    if rows.is_empty() {
        return format!("{} has no children.", path);
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Name", "Type", "Value"]);
    for row in rows {
        table.add_row(vec![row.name.as_str(), row.kind.as_str(), row.value.as_str()]);
    }
    format!("{}\n{}", path, table)
}
