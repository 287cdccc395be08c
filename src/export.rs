use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, WriterBuilder};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::dataset::Match;

pub const REFEREE_DELIMITER: &str = " | ";

pub const EXPORT_HEADERS: [&str; 7] = ["date", "home", "away", "series", "arena", "referees", "url"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatRow {
    pub date: String,
    pub home: String,
    pub away: String,
    pub series: String,
    pub arena: String,
    pub referees: String,
    pub url: String,
}

impl FlatRow {
    fn cells(&self) -> [&str; 7] {
        [
            self.date.as_str(),
            self.home.as_str(),
            self.away.as_str(),
            self.series.as_str(),
            self.arena.as_str(),
            self.referees.as_str(),
            self.url.as_str(),
        ]
    }
}

impl From<&Match> for FlatRow {
    fn from(m: &Match) -> Self {
        Self {
            date: m.date_raw.clone(),
            home: m.home.clone(),
            away: m.away.clone(),
            series: m.series.clone(),
            arena: m.arena.clone(),
            referees: m.referees.join(REFEREE_DELIMITER),
            url: m.url.clone().unwrap_or_default(),
        }
    }
}

pub fn to_export_rows(matches: &[&Match]) -> Vec<FlatRow> {
    matches.iter().map(|m| FlatRow::from(*m)).collect()
}

pub fn write_csv_to<W: Write>(out: W, rows: &[FlatRow]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);
    for row in rows {
        writer.serialize(row).context("write csv row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

/// Returns `Ok(false)` without touching the filesystem when there is nothing
/// to export.
pub fn write_csv(path: &Path, rows: &[FlatRow]) -> Result<bool> {
    if rows.is_empty() {
        log::info!("csv export skipped: no rows");
        return Ok(false);
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed creating {}", path.display()))?;
    write_csv_to(file, rows)?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(true)
}

pub fn write_xlsx(path: &Path, rows: &[FlatRow]) -> Result<bool> {
    if rows.is_empty() {
        log::info!("xlsx export skipped: no rows");
        return Ok(false);
    }
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Matches")?;
        write_header(sheet)?;
        for (idx, row) in rows.iter().enumerate() {
            write_cells(sheet, idx + 1, &row.cells())?;
        }
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(true)
}

fn write_header(worksheet: &mut Worksheet) -> Result<()> {
    write_cells(worksheet, 0, &EXPORT_HEADERS)
}

fn write_cells(worksheet: &mut Worksheet, row_idx: usize, cells: &[&str]) -> Result<()> {
    let row = u32::try_from(row_idx).context("too many rows for a worksheet")?;
    for (col_idx, value) in cells.iter().enumerate() {
        worksheet
            .write_string(row, col_idx as u16, *value)
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
    }
    Ok(())
}
