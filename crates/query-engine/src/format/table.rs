use protocol::ResultRow;

use super::schema::FieldSchema;

pub(crate) const MAX_COLUMN_WIDTH: usize = 50;
const ELLIPSIS: &str = "...";

pub(crate) fn render(schema: &FieldSchema, rows: &[ResultRow]) -> String {
    let mut widths: Vec<usize> = schema
        .fields()
        .iter()
        .map(|field| field.chars().count())
        .collect();
    for row in rows {
        for (width, value) in widths.iter_mut().zip(schema.materialize(row)) {
            *width = (*width).max(value.chars().count());
        }
    }
    for width in &mut widths {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(
        schema.fields().iter().map(String::as_str),
        &widths,
    ));
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    lines.push(rule.join("-+-"));
    for row in rows {
        lines.push(render_line(schema.materialize(row), &widths));
    }
    lines.join("\n")
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", clip(value), width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_COLUMN_WIDTH {
        return value.to_string();
    }
    let kept: String = value
        .chars()
        .take(MAX_COLUMN_WIDTH - ELLIPSIS.len())
        .collect();
    format!("{kept}{ELLIPSIS}")
}
