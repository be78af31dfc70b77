//! CSV target tables.
//!
//! Row `i` of a target table belongs to record `i` of the accompanying SDF
//! file; the tables carry no key column to join on.

use super::{Format, error::Error};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How cell text is interpreted before it is stored as `f32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Float,
    Integer,
}

/// The contiguous block of CSV columns that holds the targets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TargetLayout {
    #[serde(default)]
    pub first: usize,
    /// Number of target columns; all remaining columns when absent.
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetTable {
    header: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl TargetTable {
    pub fn read(path: impl AsRef<Path>, layout: &TargetLayout) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(file, layout)
    }

    pub fn from_reader<R: Read>(reader: R, layout: &TargetLayout) -> Result<Self, Error> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let full_header = csv.headers()?.clone();
        let end = match layout.count {
            Some(count) => layout.first + count,
            None => full_header.len(),
        };
        if layout.first > end || end > full_header.len() {
            return Err(Error::parse(
                Format::Csv,
                1,
                format!(
                    "target columns {}..{} exceed the {} columns of the header",
                    layout.first,
                    end,
                    full_header.len()
                ),
            ));
        }
        let header = full_header
            .iter()
            .skip(layout.first)
            .take(end - layout.first)
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in csv.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            let mut row = Vec::with_capacity(end - layout.first);
            for col in layout.first..end {
                let cell = record.get(col).ok_or_else(|| {
                    Error::parse(Format::Csv, line, format!("row is missing column {col}"))
                })?;
                row.push(parse_cell(cell, layout.kind, line, col)?);
            }
            rows.push(row);
        }

        Ok(Self { header, rows })
    }

    /// Names of the target columns, in target order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of target columns per row.
    pub fn width(&self) -> usize {
        self.header.len()
    }
}

fn parse_cell(cell: &str, kind: ValueKind, line: usize, col: usize) -> Result<f32, Error> {
    match kind {
        ValueKind::Float if cell.is_empty() => Ok(f32::NAN),
        ValueKind::Float => cell.parse::<f64>().map(|v| v as f32).map_err(|_| {
            Error::parse(
                Format::Csv,
                line,
                format!("invalid number '{cell}' in column {col}"),
            )
        }),
        ValueKind::Integer => cell.parse::<i64>().map(|v| v as f32).map_err(|_| {
            Error::parse(
                Format::Csv,
                line,
                format!("invalid integer '{cell}' in column {col}"),
            )
        }),
    }
}
