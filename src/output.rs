//! Where commands write their results.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;

/// A sink for command results. Commands emit zero, one, or many records.
pub trait Output: Send {
    fn emit(&mut self, record: Value);
}

/// Collects records in memory, in emission order.
#[derive(Debug, Default)]
pub struct Collector {
    records: Vec<Value>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Value> {
        self.records
    }
}

impl Output for Collector {
    fn emit(&mut self, record: Value) {
        self.records.push(record);
    }
}

/// How the CLI prints records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One pretty-printed JSON array.
    #[default]
    Json,
    /// One compact JSON object per line.
    Lines,
    /// Aligned `key  value` blocks separated by blank lines.
    Table,
}

/// Write `records` to `w` in the chosen format.
pub fn render(records: &[Value], format: Format, w: &mut impl Write) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut *w, records)?;
            writeln!(w)?;
        }
        Format::Lines => {
            for record in records {
                serde_json::to_writer(&mut *w, record)?;
                writeln!(w)?;
            }
        }
        Format::Table => {
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    writeln!(w)?;
                }
                write_block(record, w)?;
            }
        }
    }
    Ok(())
}

fn write_block(record: &Value, w: &mut impl Write) -> Result<()> {
    let Value::Object(map) = record else {
        writeln!(w, "{}", scalar(record))?;
        return Ok(());
    };
    let width = map.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in map {
        writeln!(w, "{key:<width$}  {}", scalar(value))?;
    }
    Ok(())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
