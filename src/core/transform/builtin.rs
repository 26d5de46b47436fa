use super::{Transform, TransformContext};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Transforms shipped with the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinKind {
    /// Byte-for-byte copy of input i to output i.
    Copy,
    /// Trim every field and drop blank or duplicate rows, input i to output i.
    CsvClean,
    /// Stack every input (same header) into the single declared output.
    Concat,
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinKind::Copy => write!(f, "copy"),
            BuiltinKind::CsvClean => write!(f, "csv-clean"),
            BuiltinKind::Concat => write!(f, "concat"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuiltinError {
    #[error("{kind} pairs inputs with outputs: got {inputs} inputs and {outputs} outputs")]
    Arity {
        kind: BuiltinKind,
        inputs: usize,
        outputs: usize,
    },
    #[error("concat needs exactly one output, got {0}")]
    ConcatOutputs(usize),
    #[error("header of {file} does not match {first}")]
    HeaderMismatch { file: String, first: String },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct BuiltinTransform {
    kind: BuiltinKind,
}

impl BuiltinTransform {
    pub fn new(kind: BuiltinKind) -> Self {
        Self { kind }
    }

    fn pairs<'a>(
        &self,
        ctx: &'a TransformContext<'_>,
    ) -> Result<Vec<(&'a String, &'a String)>, BuiltinError> {
        if ctx.inputs.len() != ctx.outputs.len() {
            return Err(BuiltinError::Arity {
                kind: self.kind,
                inputs: ctx.inputs.len(),
                outputs: ctx.outputs.len(),
            });
        }
        Ok(ctx.inputs.iter().zip(ctx.outputs.iter()).collect())
    }

    fn copy(&self, ctx: &TransformContext<'_>) -> Result<(), BuiltinError> {
        for (input, output) in self.pairs(ctx)? {
            let from = ctx.input_path(input);
            fs::copy(&from, ctx.output_path(output))
                .map_err(|source| BuiltinError::Io { path: from, source })?;
        }
        Ok(())
    }

    fn csv_clean(&self, ctx: &TransformContext<'_>) -> Result<(), BuiltinError> {
        for (input, output) in self.pairs(ctx)? {
            let from = ctx.input_path(input);
            let to = ctx.output_path(output);
            let mut reader = open_reader(&from)?;
            let header = trimmed(reader.headers().map_err(|source| BuiltinError::Csv {
                path: from.clone(),
                source,
            })?);

            let mut seen = HashSet::new();
            let mut writer = open_writer(&to)?;
            write_record(&mut writer, &to, &header)?;
            let mut kept = 0usize;
            let mut dropped = 0usize;
            for record in reader.records() {
                let record = record.map_err(|source| BuiltinError::Csv {
                    path: from.clone(),
                    source,
                })?;
                let row = trimmed(&record);
                if row.iter().all(String::is_empty) || !seen.insert(row.clone()) {
                    dropped += 1;
                    continue;
                }
                write_record(&mut writer, &to, &row)?;
                kept += 1;
            }
            writer
                .flush()
                .map_err(|source| BuiltinError::Io { path: to, source })?;
            tracing::debug!(input = %input, output = %output, kept, dropped, "cleaned csv");
        }
        Ok(())
    }

    fn concat(&self, ctx: &TransformContext<'_>) -> Result<(), BuiltinError> {
        let [output] = ctx.outputs else {
            return Err(BuiltinError::ConcatOutputs(ctx.outputs.len()));
        };
        let to = ctx.output_path(output);
        let mut writer = open_writer(&to)?;
        let mut first_header: Option<(String, csv::StringRecord)> = None;

        for input in ctx.inputs {
            let from = ctx.input_path(input);
            let mut reader = open_reader(&from)?;
            let header = reader
                .headers()
                .map_err(|source| BuiltinError::Csv {
                    path: from.clone(),
                    source,
                })?
                .clone();
            if let Some((first, expected)) = &first_header {
                if *expected != header {
                    return Err(BuiltinError::HeaderMismatch {
                        file: input.clone(),
                        first: first.clone(),
                    });
                }
            } else {
                writer
                    .write_record(&header)
                    .map_err(|source| BuiltinError::Csv {
                        path: to.clone(),
                        source,
                    })?;
                first_header = Some((input.clone(), header));
            }
            for record in reader.records() {
                let record = record.map_err(|source| BuiltinError::Csv {
                    path: from.clone(),
                    source,
                })?;
                writer
                    .write_record(&record)
                    .map_err(|source| BuiltinError::Csv {
                        path: to.clone(),
                        source,
                    })?;
            }
        }
        writer
            .flush()
            .map_err(|source| BuiltinError::Io { path: to, source })
    }
}

impl Transform for BuiltinTransform {
    fn kind(&self) -> String {
        format!("builtin:{}", self.kind)
    }

    fn run(&self, ctx: &TransformContext<'_>) -> anyhow::Result<()> {
        match self.kind {
            BuiltinKind::Copy => self.copy(ctx)?,
            BuiltinKind::CsvClean => self.csv_clean(ctx)?,
            BuiltinKind::Concat => self.concat(ctx)?,
        }
        Ok(())
    }
}

fn open_reader(path: &std::path::Path) -> Result<csv::Reader<fs::File>, BuiltinError> {
    let file = fs::File::open(path).map_err(|source| BuiltinError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().has_headers(true).from_reader(file))
}

fn open_writer(path: &std::path::Path) -> Result<csv::Writer<fs::File>, BuiltinError> {
    let file = fs::File::create(path).map_err(|source| BuiltinError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::Writer::from_writer(file))
}

fn write_record(
    writer: &mut csv::Writer<fs::File>,
    path: &std::path::Path,
    row: &[String],
) -> Result<(), BuiltinError> {
    writer.write_record(row).map_err(|source| BuiltinError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

fn trimmed(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(|field| field.trim().to_string()).collect()
}
