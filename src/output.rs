use crate::model::Item;

const HEADERS: [&str; 4] = ["ID", "state", "owner", "summary"];

fn row_cells(item: &Item) -> [String; 4] {
    [
        item.id.map(|id| id.to_string()).unwrap_or_default(),
        item.state.clone(),
        item.owner().to_string(),
        item.summary.clone(),
    ]
}

/// Render items as a padded table with a header and an underline row.
pub fn format_item_table(items: &[Item]) -> String {
    let rows: Vec<[String; 4]> = items.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    push_line(&mut out, &widths.map(|w| "─".repeat(w)), &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let line = format!("  {}", padded.join("  "));
    out.push_str(line.trim_end());
    out.push('\n');
}
