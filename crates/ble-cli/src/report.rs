//! Plain-text tables for the terminal.

use ble_core::{BasicLevel, OverviewRow};
use std::fmt::Write;

/// Left-align the first column, right-align the rest.
fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for cells in std::iter::once(&headers).chain(rows) {
        out.push_str(&line(cells, &widths));
        out.push('\n');
    }
    out
}

fn line(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i == 0 {
            let _ = write!(out, "{cell:<width$}");
        } else {
            let _ = write!(out, "  {cell:>width$}");
        }
    }
    out.trim_end().to_string()
}

pub fn basic_level_table(basic_levels: &[&BasicLevel]) -> String {
    if basic_levels.is_empty() {
        return "(no basic levels)\n".to_string();
    }

    let rows: Vec<Vec<String>> = basic_levels
        .iter()
        .map(|bl| {
            vec![
                format!("{} ({})", bl.label, bl.id),
                bl.weight_value.to_string(),
                bl.depth.to_string(),
                bl.num_descendants.to_string(),
                bl.cumulative_weight.to_string(),
            ]
        })
        .collect();

    render(
        &[
            "Node label",
            "weight_value",
            "depth",
            "num_descendants",
            "cumulative_weight",
        ],
        &rows,
    )
}

pub fn overview_table(rows: &[OverviewRow]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let stats = &row.stats;
            vec![
                row.subsumer_threshold.to_string(),
                stats.nodes_with_bl.to_string(),
                stats.nodes_without_bl.to_string(),
                stats.unique_bls.to_string(),
                stats.weight_value.to_string(),
                stats.depth.to_string(),
                stats.num_descendants.to_string(),
                stats.cumulative_weight.to_string(),
            ]
        })
        .collect();

    render(
        &[
            "Threshold",
            "# of nodes with bl",
            "# of nodes without bl",
            "# of unique bls",
            "weight_value",
            "depth",
            "num_descendants",
            "cumulative_weight",
        ],
        &rows,
    )
}
