//! Export of the rendered results table.

use crate::error::{DashError, Result};
use crate::results::ResultsTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Tsv];

    pub fn delimiter(self) -> u8 {
        match self {
            ExportFormat::Csv => b',',
            ExportFormat::Tsv => b'\t',
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Tsv => "text/tab-separated-values;charset=utf-8",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Tsv => "TSV",
        }
    }

    pub fn file_name(self) -> String {
        format!("results.{}", self.extension())
    }
}

/// Every line of the table, hidden rows included. Each cell is quoted with
/// inner quotes doubled; lines are joined by `\n` with no trailing newline.
pub fn export_table(table: &ResultsTable, format: ExportFormat) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .delimiter(format.delimiter())
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for line in table.all_lines() {
        writer.write_record(line)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| DashError::Io(err.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|err| DashError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

pub fn write_export(path: &Path, table: &ResultsTable, format: ExportFormat) -> Result<()> {
    std::fs::write(path, export_table(table, format)?)?;
    log::info!("exported {} ({}) to {:?}", format.label(), format.media_type(), path);
    Ok(())
}

/// Asks where to save. `None` when the dialog is dismissed.
pub fn pick_export_path(format: ExportFormat) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(format.file_name())
        .add_filter(format.label(), &[format.extension()])
        .save_file()
}
