//! Read-only summaries of a block's declared outputs in the data directory.

use crate::core::config::InspectConfig;
use crate::core::registry::BlockDescriptor;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::path::Path;

/// Shape and leading rows of one CSV file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub file: String,
    pub rows: usize,
    pub columns: usize,
    /// Leading column names, cut at the display limit.
    pub column_names: Vec<String>,
    /// Columns left out of `column_names`.
    pub hidden_columns: usize,
    /// Leading rows restricted to the displayed columns.
    pub preview: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutputSummary {
    Found(TableSummary),
    NotFound { file: String },
    Unreadable { file: String, reason: String },
}

impl OutputSummary {
    pub fn file(&self) -> &str {
        match self {
            OutputSummary::Found(table) => &table.file,
            OutputSummary::NotFound { file } | OutputSummary::Unreadable { file, .. } => file,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, OutputSummary::Found(_))
    }
}

pub struct Inspector {
    limits: InspectConfig,
}

impl Inspector {
    pub fn new(limits: InspectConfig) -> Self {
        Inspector { limits }
    }

    /// One summary per declared output, in declaration order. A missing or unreadable file
    /// is reported in place and never stops the remaining outputs from being inspected.
    pub fn summarize(&self, block: &BlockDescriptor, data_dir: &Path) -> Vec<OutputSummary> {
        block
            .outputs
            .iter()
            .map(|name| {
                let path = data_dir.join(name);
                if !path.is_file() {
                    tracing::warn!(file = %name, "output not found");
                    return OutputSummary::NotFound { file: name.clone() };
                }
                match self.summarize_file(name, &path) {
                    Ok(table) => OutputSummary::Found(table),
                    Err(err) => {
                        tracing::warn!(file = %name, error = %err, "output unreadable");
                        OutputSummary::Unreadable {
                            file: name.clone(),
                            reason: err.to_string(),
                        }
                    }
                }
            })
            .collect()
    }

    pub fn summarize_file(&self, name: &str, path: &Path) -> Result<TableSummary, csv::Error> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let shown = headers.len().min(self.limits.max_columns);

        let mut rows = 0usize;
        let mut preview = Vec::new();
        for record in reader.records() {
            let record = record?;
            if rows < self.limits.preview_rows {
                preview.push(
                    (0..shown)
                        .map(|i| record.get(i).unwrap_or("").to_string())
                        .collect(),
                );
            }
            rows += 1;
        }

        Ok(TableSummary {
            file: name.to_string(),
            rows,
            columns: headers.len(),
            hidden_columns: headers.len() - shown,
            column_names: headers.into_iter().take(shown).collect(),
            preview,
        })
    }

    pub fn render_text(&self, summaries: &[OutputSummary]) -> String {
        let mut out = String::new();
        for summary in summaries {
            match summary {
                OutputSummary::Found(table) => self.render_table(&mut out, table),
                OutputSummary::NotFound { file } => {
                    let _ = writeln!(out, "  {}: NOT FOUND", file);
                }
                OutputSummary::Unreadable { file, reason } => {
                    let _ = writeln!(out, "  {}: UNREADABLE ({})", file, reason);
                }
            }
        }
        out
    }

    fn render_table(&self, out: &mut String, table: &TableSummary) {
        let _ = writeln!(
            out,
            "  {}: {} rows × {} cols",
            table.file, table.rows, table.columns
        );
        let mut columns = table.column_names.join(", ");
        if table.hidden_columns > 0 {
            let _ = write!(columns, "... +{}", table.hidden_columns);
        }
        let _ = writeln!(out, "  Columns: {}", columns);
        if table.preview.is_empty() {
            return;
        }

        let width = self.limits.max_cell_width;
        let header: Vec<String> = table
            .column_names
            .iter()
            .map(|cell| truncate(cell, width))
            .collect();
        let rows: Vec<Vec<String>> = table
            .preview
            .iter()
            .map(|row| row.iter().map(|cell| truncate(cell, width)).collect())
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                std::iter::once(&header[i])
                    .chain(rows.iter().filter_map(|row| row.get(i)))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let _ = writeln!(out, "  Preview:");
        for line in std::iter::once(&header).chain(rows.iter()) {
            let cells: Vec<String> = line
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
                .collect();
            let _ = writeln!(out, "    {}", cells.join("  ").trim_end());
        }
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new(InspectConfig::default())
    }
}

fn truncate(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let kept: String = cell.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}
