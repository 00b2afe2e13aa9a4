use protocol::ResultRow;

use super::schema::FieldSchema;

pub(crate) fn render(schema: &FieldSchema, rows: &[ResultRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(render_record(schema.fields().iter().map(String::as_str)));
    for row in rows {
        lines.push(render_record(schema.materialize(row)));
    }
    lines.join("\n")
}

fn render_record<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let fields: Vec<String> = values.map(escape).collect();
    if fields.len() == 1 && fields[0].is_empty() {
        // A lone empty field would otherwise be an empty line.
        return "\"\"".to_string();
    }
    fields.join(",")
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
