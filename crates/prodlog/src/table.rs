//! Presentation of stored records.
//!
//! Renders the in-memory collection as an aligned text table, one-line
//! summaries, JSON, or CSV. Row numbers shown here are the positions
//! accepted by `prodlog delete --index`.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::record::ProductionRecord;
use crate::storage::{self, columns};

/// Output format for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Aligned table with every column.
    #[default]
    Table,
    /// One summary line per record.
    Plain,
    /// Pretty-printed JSON array.
    Json,
    /// The data file format.
    Csv,
}

/// Message printed for an empty collection.
pub const EMPTY_MESSAGE: &str = "No entries.";

const INDEX_HEADER: &str = "#";
const COLUMN_GAP: &str = "  ";

/// Render records in the requested format.
///
/// `first_index` is the row position of `records[0]` in the store, so that a
/// tail of the collection is still numbered as the store numbers it.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render<W: Write>(
    records: &[ProductionRecord],
    first_index: usize,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(records, first_index, out),
        OutputFormat::Plain => render_plain(records, first_index, out),
        OutputFormat::Json => render_json(records, out),
        OutputFormat::Csv => {
            storage::write_csv(out, records)?;
            Ok(())
        }
    }
}

fn display_cells(record: &ProductionRecord) -> Vec<String> {
    let mut cells = columns::encode(record);
    // Reworks %
    if let Some(pct) = cells.get_mut(9) {
        *pct = format!("{:.2}", record.reworks_percent());
    }
    cells
}

fn render_table<W: Write>(records: &[ProductionRecord], first_index: usize, out: &mut W) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "{EMPTY_MESSAGE}")?;
        return Ok(());
    }

    let header: Vec<String> = std::iter::once(INDEX_HEADER.to_string())
        .chain(columns::header())
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(offset, record)| {
            std::iter::once((first_index + offset).to_string())
                .chain(display_cells(record))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let numeric: Vec<bool> = (0..header.len())
        .map(|col| rows.iter().all(|row| row[col].parse::<f64>().is_ok()))
        .collect();

    let format_row = |row: &[String]| {
        row.iter()
            .zip(&widths)
            .zip(&numeric)
            .map(|((cell, &width), &right)| {
                if right {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", format_row(header.as_slice()))?;
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    writeln!(out, "{}", rule.join(COLUMN_GAP))?;
    for row in &rows {
        writeln!(out, "{}", format_row(row.as_slice()))?;
    }
    Ok(())
}

fn render_plain<W: Write>(records: &[ProductionRecord], first_index: usize, out: &mut W) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "{EMPTY_MESSAGE}")?;
        return Ok(());
    }

    for (offset, record) in records.iter().enumerate() {
        let e = &record.entry;
        writeln!(
            out,
            "[{}] id={} {} {} @ {} | {} {} size {} | qty {} reworks {} ({:.2}%) | down {}",
            first_index + offset,
            record.id,
            e.date,
            e.shift,
            e.time,
            e.model,
            e.material,
            e.size,
            e.quantity,
            e.reworks,
            record.reworks_percent(),
            e.down_time,
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(flatten)]
    record: &'a ProductionRecord,
    reworks_percent: f64,
}

fn render_json<W: Write>(records: &[ProductionRecord], out: &mut W) -> Result<()> {
    let views: Vec<RecordView<'_>> = records
        .iter()
        .map(|record| RecordView {
            record,
            reworks_percent: record.reworks_percent(),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &views)?;
    writeln!(out)?;
    Ok(())
}

/// Render one record field by field.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_detail<W: Write>(record: &ProductionRecord, index: usize, out: &mut W) -> Result<()> {
    let e = &record.entry;
    writeln!(out, "Record {} (row {})", record.id, index)?;
    writeln!(out, "  {:<18}{}", "Date", e.date)?;
    writeln!(out, "  {:<18}{}", "Shift", e.shift)?;
    writeln!(out, "  {:<18}{}", "Time", e.time)?;
    writeln!(out, "  {:<18}{}", "Model", e.model)?;
    writeln!(out, "  {:<18}{}", "Material", e.material)?;
    writeln!(out, "  {:<18}{}", "Size", e.size)?;
    writeln!(out, "  {:<18}{}", "Quantity", e.quantity)?;
    writeln!(out, "  {:<18}{}", "Reworks Quantity", e.reworks)?;
    writeln!(out, "  {:<18}{:.2}", "Reworks %", record.reworks_percent())?;
    writeln!(out, "  {:<18}{}", "Down Time", e.down_time)?;
    writeln!(out, "  Production details      P      R      L")?;
    for (category, counts) in e.categories.iter() {
        writeln!(
            out,
            "    {:<18}{:>7}{:>7}{:>7}",
            category.label(),
            counts.planned,
            counts.rework,
            counts.lost
        )?;
    }
    Ok(())
}
