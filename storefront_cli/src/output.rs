use anyhow::Result;
use serde_json::Value;
use storefront_lib::ApiError;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled, Debug, PartialEq)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl FieldRow {
    fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// One row per top-level field (objects) or element (arrays).
fn build_value_rows(value: &Value) -> Vec<FieldRow> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| FieldRow::new(key.as_str(), format_cell(v)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| FieldRow::new(format!("[{}]", i), format_cell(v)))
            .collect(),
        Value::Null => Vec::new(),
        scalar => vec![FieldRow::new("value", format_cell(scalar))],
    }
}

fn build_error_rows(err: &ApiError) -> Vec<FieldRow> {
    let mut rows = vec![
        FieldRow::new("Status", err.status.to_string()),
        FieldRow::new("Message", err.message.as_str()),
    ];
    if let Some(code) = &err.code {
        rows.push(FieldRow::new("Code", code.as_str()));
    }
    if let Some(request_id) = &err.request_id {
        rows.push(FieldRow::new("Request ID", request_id.as_str()));
    }
    rows.push(FieldRow::new("URL", err.url.as_str()));
    if let Some(details) = &err.details {
        rows.push(FieldRow::new("Details", format_cell(details)));
    }
    rows
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn print_value_table(value: &Value) {
    let rows = build_value_rows(value);
    if rows.is_empty() {
        eprintln!("(empty response)");
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn print_api_error(err: &ApiError) {
    let mut table = Table::new(build_error_rows(err));
    table.with(Style::rounded());
    eprintln!("{}", table);
}

pub async fn print_raw_response(resp: reqwest::Response) -> Result<()> {
    println!("{:?} {}", resp.version(), resp.status());
    for (name, value) in resp.headers() {
        println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    println!();
    let bytes = resp.bytes().await?;
    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_rows_follow_keys() {
        let rows = build_value_rows(&json!({"id": 3, "nome": "Camiseta", "tags": ["verao"]}));
        assert_eq!(
            rows,
            vec![
                FieldRow::new("id", "3"),
                FieldRow::new("nome", "Camiseta"),
                FieldRow::new("tags", r#"["verao"]"#),
            ]
        );
    }

    #[test]
    fn array_rows_are_indexed() {
        let rows = build_value_rows(&json!([{"id": 1}, "x"]));
        assert_eq!(
            rows,
            vec![FieldRow::new("[0]", r#"{"id":1}"#), FieldRow::new("[1]", "x")]
        );
    }

    #[test]
    fn null_has_no_rows_and_scalars_have_one() {
        assert!(build_value_rows(&Value::Null).is_empty());
        assert_eq!(build_value_rows(&json!(true)), vec![FieldRow::new("value", "true")]);
    }

    #[test]
    fn error_rows_skip_missing_fields() {
        let err = ApiError {
            status: 404,
            message: "HTTP 404".to_string(),
            code: None,
            details: None,
            request_id: Some("req-9".to_string()),
            url: "http://localhost:5000/produtos/9".to_string(),
        };
        let fields: Vec<String> = build_error_rows(&err).into_iter().map(|r| r.field).collect();
        assert_eq!(fields, vec!["Status", "Message", "Request ID", "URL"]);
    }

    #[test]
    fn table_renders_headers() {
        let table = Table::new(build_value_rows(&json!({"id": 1}))).to_string();
        assert!(table.contains("Field"));
        assert!(table.contains("Value"));
    }
}
