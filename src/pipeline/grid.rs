//! Table reshaping: `<table>` → column-break-safe grid structure.
//!
//! A real `<table>` cannot break across CSS columns or printed pages; the
//! whole element moves as one block and overflows the column. Replacing it
//! with block-level rows of inline-block cells (`div.gridtable` >
//! `div.gt-row` > `div.gt-cell`) lets the renderer split it anywhere
//! between rows while the stylesheet keeps the two-column table look.
//!
//! Every grid is normalized to exactly two cells per row. Digest tables are
//! two-column by convention ("Category" / "Fact / Detail"); extra cells are
//! dropped, missing cells filled with an empty cell so the width rules hold.

use tracing::debug;

use crate::dom::{Dom, NodeId};

/// Default header texts used when a table has no `<thead>`.
const DEFAULT_HEADERS: [&str; 2] = ["Category", "Fact / Detail"];

/// Replace every `<table>` under `root` with a grid structure, in document
/// order. Returns the number of tables reshaped. A tree without tables is
/// left untouched.
pub fn reshape_tables(dom: &mut Dom, root: NodeId) -> usize {
    let tables = dom.find_all(root, "table");
    for &table in &tables {
        let grid = build_grid(dom, table);
        dom.insert_before(table, grid);
        dom.detach(table);
    }
    if !tables.is_empty() {
        debug!("Reshaped {} table(s) into gridtables", tables.len());
    }
    tables.len()
}

/// Build the replacement grid for one table. The source table's cell content
/// is moved (not copied) into the grid cells, preserving inline markup.
fn build_grid(dom: &mut Dom, table: NodeId) -> NodeId {
    let grid = dom.create_div_with_class("gridtable");

    // Header row: first two <th> texts from <thead>, or the defaults.
    let header_texts: Vec<String> = match dom.find_first(table, "thead") {
        Some(thead) => dom
            .find_all(thead, "th")
            .iter()
            .map(|&th| dom.text_content(th))
            .take(2)
            .collect(),
        None => Vec::new(),
    };
    let header_texts = if header_texts.is_empty() {
        DEFAULT_HEADERS.iter().map(|s| s.to_string()).collect()
    } else {
        header_texts
    };

    let head = dom.create_div_with_class("gt-row gt-head");
    for text in &header_texts {
        let cell = dom.create_div_with_class("gt-cell");
        let t = dom.create_text(text);
        dom.append(cell, t);
        dom.append(head, cell);
    }
    dom.append(grid, head);

    // Body rows: every <tr> outside <thead>, clipped/padded to 2 cells.
    let body_rows: Vec<NodeId> = dom
        .find_all(table, "tr")
        .into_iter()
        .filter(|&tr| !dom.ancestors(tr).any(|a| dom.tag_name(a) == Some("thead")))
        .collect();

    for tr in body_rows {
        let cells: Vec<NodeId> = dom
            .children(tr)
            .filter(|&c| matches!(dom.tag_name(c), Some("td" | "th")))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let row = dom.create_div_with_class("gt-row");
        for slot in 0..2 {
            let cell = dom.create_div_with_class("gt-cell");
            if let Some(&src) = cells.get(slot) {
                dom.reparent_children(src, cell);
                dom.trim_edge_whitespace(cell);
            }
            dom.append(row, cell);
        }
        dom.append(grid, row);
    }

    grid
}
