use protocol::ResultRow;
use serde_json::{Map, Value};

use super::schema::FieldSchema;

pub(crate) fn render(schema: &FieldSchema, rows: &[ResultRow]) -> serde_json::Result<String> {
    let objects: Vec<Value> = rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = schema
                .fields()
                .iter()
                .zip(schema.materialize(row))
                .map(|(field, value)| (field.clone(), Value::String(value.to_string())))
                .collect();
            Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> ResultRow {
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn objects_follow_schema_order() {
        let rows = vec![
            row(&[("zone", "eu"), ("@message", "boom"), ("@timestamp", "t1")]),
            row(&[("@timestamp", "t2")]),
        ];
        let schema = FieldSchema::from_rows(&rows, false);
        let rendered = render(&schema, &rows).unwrap();

        let parsed: Vec<Map<String, Value>> = serde_json::from_str(&rendered).unwrap();
        let keys: Vec<&str> = parsed[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["@timestamp", "@message", "zone"]);
        assert_eq!(parsed[1]["zone"], Value::String(String::new()));
        assert!(!rendered.ends_with('\n'));
    }
}
