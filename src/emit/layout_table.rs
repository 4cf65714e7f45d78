//! Human-readable bit-layout tables, one row per field: boxed ASCII grid and
//! GitHub-flavored Markdown.

use crate::field::FieldVariant;
use crate::layout::FieldLayout;

fn bit_range(layout: &FieldLayout) -> String {
    if layout.bits == 0 {
        format!("{}:{}", layout.offset, layout.offset)
    } else {
        format!(
            "{}:{}",
            layout.offset,
            layout.offset + layout.bits - 1
        )
    }
}

fn constraints(layout: &FieldLayout) -> String {
    let base = match &layout.variant {
        FieldVariant::Boolean => "-".to_string(),
        FieldVariant::Integer { min, max, .. } => format!("[{min}..{max}]"),
        FieldVariant::Enum { values } => format!("{} values", values.len()),
        FieldVariant::Date {
            resolution,
            min_date,
            max_date,
        } => format!(
            "{}..{} ({:?})",
            min_date,
            max_date,
            resolution
        )
        .to_lowercase(),
        FieldVariant::Bitmask { flags } => {
            let names: Vec<&str> = flags.keys().map(String::as_str).collect();
            format!("{} flags: {}", flags.len(), names.join(", "))
        }
    };

    if layout.nullable {
        format!("{base} (nullable)")
    } else {
        base
    }
}

struct Row {
    field: String,
    ty: &'static str,
    bit_range: String,
    bits: String,
    constraints: String,
}

fn rows(layouts: &[FieldLayout]) -> Vec<Row> {
    layouts
        .iter()
        .map(|l| Row {
            field: l.name.clone(),
            ty: l.variant.tag(),
            bit_range: bit_range(l),
            bits: l.bits.to_string(),
            constraints: constraints(l),
        })
        .collect()
}

const HEADERS: [&str; 5] = ["Field", "Type", "Bit Range", "Bits", "Constraints"];

/// Renders `layouts` as a boxed ASCII grid, columns sized to their widest cell.
pub fn emit_ascii_table(layouts: &[FieldLayout]) -> String {
    let rows = rows(layouts);

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();
    for row in &rows {
        let cells = [&row.field, row.ty, &row.bit_range, &row.bits, &row.constraints];
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let sep = |l: char, mid: char, r: char| {
        let mut s = String::new();
        s.push(l);
        for (i, w) in widths.iter().enumerate() {
            s.push_str(&"─".repeat(w + 2));
            s.push(if i + 1 == widths.len() { r } else { mid });
        }
        s
    };

    let format_row = |cells: [&str; 5]| {
        let mut s = String::from("│");
        for (cell, w) in cells.iter().zip(&widths) {
            s.push_str(&format!(" {cell:<w$} │", w = w));
        }
        s
    };

    let mut out = String::new();
    out.push_str(&sep('┌', '┬', '┐'));
    out.push('\n');
    out.push_str(&format_row(HEADERS));
    out.push('\n');
    out.push_str(&sep('├', '┼', '┤'));
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row([
            &row.field,
            row.ty,
            &row.bit_range,
            &row.bits,
            &row.constraints,
        ]));
        out.push('\n');
    }
    out.push_str(&sep('└', '┴', '┘'));
    out
}

/// Renders `layouts` as a GitHub-flavored Markdown table.
pub fn emit_markdown_table(layouts: &[FieldLayout]) -> String {
    let rows = rows(layouts);

    let mut out = String::new();
    out.push_str(&format!("| {} |\n", HEADERS.join(" | ")));
    out.push_str(&format!(
        "|{}|\n",
        HEADERS.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in &rows {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.field, row.ty, row.bit_range, row.bits, row.constraints
        ));
    }
    out
}
