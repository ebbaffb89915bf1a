use crate::config::FormatPreset;
use crate::fuzzy::FlatEntry;
use crate::models::Usage;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use colored::{Color, Colorize};
use prettytable::{format, Cell, Row, Table};
use serde_json::{Map, Value};
use std::fmt::Write;

const UTILIZATION_MARKERS: [&str; 4] = ["utilization", "percent", "usage", "ratio"];

const DATETIME_SUFFIXES: [&str; 10] = [
    "_at",
    "_date",
    "_time",
    "_reset",
    "_start",
    "_end",
    "_expires",
    "_created",
    "_updated",
    "_timestamp",
];

const DATETIME_KEYS: [&str; 10] = [
    "date",
    "time",
    "timestamp",
    "reset",
    "start",
    "end",
    "created",
    "updated",
    "expires",
    "datetime",
];

/// Converts snake_case to Title Case
pub fn format_key(key: &str) -> String {
    key.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a field holds a percentage-like value worth colorizing
pub fn is_utilization_field(key: &str) -> bool {
    let key = key.to_lowercase();
    UTILIZATION_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Red from 95, yellow from 80, green below
pub fn utilization_color(value: f64) -> Color {
    if value >= 95.0 {
        Color::Red
    } else if value >= 80.0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Formats a number, coloring utilization fields when `color` is set
pub fn format_number(value: f64, key: &str, color: bool) -> String {
    let text = number_text(value);
    if color && is_utilization_field(key) {
        text.color(utilization_color(value)).to_string()
    } else {
        text
    }
}

fn is_datetime_field(key: &str) -> bool {
    let key = key.to_lowercase();
    DATETIME_SUFFIXES.iter().any(|suffix| key.ends_with(suffix))
        || DATETIME_KEYS.contains(&key.as_str())
}

/// Renders a delayed chrono format, or `None` if the pattern is invalid.
fn render<T: std::fmt::Display>(formatted: T) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", formatted).ok()?;
    Some(out)
}

/// Shows timestamps in datetime-like fields in local time using the
/// configured formats. Anything that doesn't parse is returned unchanged.
pub fn format_string(value: &str, key: &str, formats: &FormatPreset) -> String {
    if !is_datetime_field(key) {
        return value.to_string();
    }

    let formatted = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        render(dt.with_timezone(&Local).format(&formats.datetime))
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        let utc = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        render(utc.with_timezone(&Local).format(&formats.datetime))
    } else if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        render(date.format(&formats.date))
    } else {
        None
    };

    formatted.unwrap_or_else(|| value.to_string())
}

/// Formats a single matched field for query output
pub fn format_value(entry: &FlatEntry, color: bool) -> String {
    match &entry.value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => format_number(v, &entry.key, color),
            None => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn format_json(usage: &Usage) -> Result<String, serde_json::Error> {
    usage.to_json()
}

/// Builds a two-column table of the usage document, keys sorted, nested
/// objects indented under bold section rows. `None` for non-object data.
pub fn build_table(usage: &Usage, formats: &FormatPreset) -> Option<Table> {
    let data = usage.raw.as_object()?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    add_rows(&mut table, data, "", formats);
    Some(table)
}

fn add_rows(table: &mut Table, data: &Map<String, Value>, indent: &str, formats: &FormatPreset) {
    let mut keys: Vec<&String> = data.keys().collect();
    keys.sort();

    for key in keys {
        let value = &data[key.as_str()];
        let label = format!("{}{}", indent, format_key(key));

        match value {
            Value::Object(inner) => {
                table.add_row(Row::new(vec![
                    Cell::new(&format!("{}:", label)).style_spec("b"),
                    Cell::new(""),
                ]));
                add_rows(table, inner, &format!("{}  ", indent), formats);
            }
            Value::Array(items) => {
                table.add_row(Row::new(vec![
                    Cell::new(&format!("{}:", label)).style_spec("b"),
                    Cell::new(""),
                ]));
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::Object(inner) => {
                            table.add_row(Row::new(vec![
                                Cell::new(&format!("{}  [{}]", indent, i + 1)).style_spec("Fc"),
                                Cell::new(""),
                            ]));
                            add_rows(table, inner, &format!("{}    ", indent), formats);
                        }
                        other => {
                            table.add_row(Row::new(vec![
                                Cell::new(&format!("{}  • {}", indent, scalar_text(other))),
                                Cell::new(""),
                            ]));
                        }
                    }
                }
            }
            Value::Number(n) => {
                let v = n.as_f64().unwrap_or_default();
                let mut cell = Cell::new(&number_text(v));
                if is_utilization_field(key) {
                    cell = cell.style_spec(match utilization_color(v) {
                        Color::Red => "Fr",
                        Color::Yellow => "Fy",
                        _ => "Fg",
                    });
                }
                table.add_row(Row::new(vec![Cell::new(&format!("{}:", label)), cell]));
            }
            Value::String(s) if s.is_empty() => {}
            Value::String(s) => {
                table.add_row(Row::new(vec![
                    Cell::new(&format!("{}:", label)),
                    Cell::new(&format_string(s, key, formats)),
                ]));
            }
            Value::Bool(b) => {
                table.add_row(Row::new(vec![
                    Cell::new(&format!("{}:", label)),
                    Cell::new(&b.to_string()),
                ]));
            }
            Value::Null => {}
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Prints the usage table to stdout, falling back to JSON for data that
/// isn't an object.
pub fn print_table(usage: &Usage, color: bool, formats: &FormatPreset) -> Result<(), serde_json::Error> {
    let Some(table) = build_table(usage, formats) else {
        println!("{}", usage.to_json()?);
        return Ok(());
    };

    let title = "Claude.ai Usage";
    println!();
    if color {
        println!("{}", title.bright_cyan().bold());
    } else {
        println!("{}", title);
    }
    println!("{}", "═".repeat(50));

    if color {
        table.printstd();
    } else {
        print!("{}", table);
    }
    println!();
    Ok(())
}
