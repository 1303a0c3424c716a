// CSV export - one row per sub-entry

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::dates::format_date;
use crate::entry::Entry;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    date: String,
    person: &'a str,
    bank: &'a str,
    value: i64,
}

pub fn write_csv<W: Write>(writer: W, entries: &[Entry]) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut rows = 0;

    for entry in entries {
        let date = format_date(entry.date);
        for sub in &entry.entries {
            wtr.serialize(ExportRow {
                id: &entry.id,
                date: date.clone(),
                person: entry.person.as_deref().unwrap_or(""),
                bank: &sub.bank,
                value: sub.value,
            })
            .context("Failed to write CSV row")?;
            rows += 1;
        }
    }

    wtr.flush().context("Failed to flush CSV")?;
    Ok(rows)
}

pub fn export_csv(path: &Path, entries: &[Entry]) -> Result<usize> {
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, entries)
}
