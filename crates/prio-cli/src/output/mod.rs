use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

use table::{Cell, TableOptions, TableRow};

/// Render a serializable response to a string in the requested format.
///
/// Table output lists the response's top-level fields, one per line.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_fields(&serde_json::to_value(value)?, table_options())),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Render `rows` as a table, or `full` as JSON.
///
/// Reports nest too deeply for a readable table, so table output switches to
/// the command's own row type.
pub fn render_rows<T: Serialize, R: TableRow>(
    full: &T,
    rows: &[R],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(table::render_rows(rows, table_options())),
        OutputFormat::Json | OutputFormat::Raw => render(full, format),
    }
}

pub fn output_rows<T: Serialize, R: TableRow>(
    full: &T,
    rows: &[R],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rendered = render_rows(full, rows, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> TableOptions {
    let prefs = ui::prefs();
    TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

/// `field | value` listing of a JSON object; scalars get a single row.
fn render_fields(value: &Value, options: TableOptions) -> String {
    let rows: Vec<Vec<Cell>> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| vec![Cell::Key(key.clone()), field_cell(value)])
            .collect(),
        scalar => vec![vec![Cell::Key("value".to_string()), field_cell(scalar)]],
    };
    table::render_cells(&["field", "value"], &rows, options)
}

fn field_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Number(None),
        Value::Number(n) => match n.as_u64() {
            Some(count) => Cell::Count(usize::try_from(count).unwrap_or(usize::MAX)),
            None => Cell::Number(n.as_f64()),
        },
        Value::String(text) => Cell::Text(text.clone()),
        Value::Bool(flag) => Cell::Key(flag.to_string()),
        Value::Array(items) if items.iter().all(Value::is_string) => Cell::Text(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Example {
        id: &'static str,
        value: u32,
        notes: Vec<&'static str>,
        risk: f64,
    }

    fn example() -> Example {
        Example {
            id: "x",
            value: 7,
            notes: vec!["split the epic", "add a spike"],
            risk: 0.25,
        }
    }

    struct Line(&'static str);

    impl TableRow for Line {
        const HEADERS: &'static [&'static str] = &["name"];

        fn cells(&self) -> Vec<Cell> {
            vec![Cell::Key(self.0.to_string())]
        }
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&example(), OutputFormat::Json).expect("json render should work");
        let parsed: Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "x");
        assert_eq!(parsed["value"], 7);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let out = render(&example(), OutputFormat::Raw).expect("raw render should work");
        assert!(!out.contains('\n'));
        let parsed: Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed["id"], "x");
    }

    #[test]
    fn table_render_lists_fields() {
        let out = render(&example(), OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("field"));
        assert!(out.contains("split the epic; add a spike"));
        assert!(out.contains("0.2500"));
        assert!(lines.iter().any(|line| line.starts_with("value") && line.ends_with('7')));
    }

    #[test]
    fn rows_replace_the_full_value_only_in_tables() {
        let rows = [Line("alpha"), Line("beta")];
        let table = render_rows(&example(), &rows, OutputFormat::Table).expect("table");
        assert!(table.starts_with("name"));
        assert!(table.contains("beta"));
        assert!(!table.contains("split the epic"));

        let json = render_rows(&example(), &rows, OutputFormat::Json).expect("json");
        assert!(json.contains("split the epic"));
        assert!(!json.contains("alpha"));
    }
}
