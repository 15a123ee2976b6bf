//! Command results written to stdout.

use std::io::{self, Write};

use listing_core::types::{ArchiveBatchResult, ArchiveDestination, FileDisplayModel};
use listing_runtime::{FILE_COLUMNS, FileListSnapshot, UploadBatch};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::OutputFormat;

/// Prints the current file list of a watched store.
pub fn snapshot(snapshot: &FileListSnapshot, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_json(&json!({
            "record": snapshot.record,
            "state": snapshot.state,
            "revision": snapshot.revision,
            "files": &*snapshot.files,
            "error": snapshot.error_text(),
            "channelError": snapshot.channel_error.as_ref().map(|e| e.user_message()),
        })),
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            let record = snapshot.record.as_ref().map_or("-", |r| r.as_str());
            writeln!(
                out,
                "{record} [{}] {} file(s), revision {}",
                snapshot.state,
                snapshot.files.len(),
                snapshot.revision
            )?;
            if let Some(error) = snapshot.error_text() {
                writeln!(out, "error: {error}")?;
            }
            if let Some(error) = &snapshot.channel_error {
                writeln!(out, "channel: {}", error.user_message())?;
            }
            if snapshot.has_files() {
                write!(out, "{}", file_table(&snapshot.files)?)?;
            }
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Prints the service response to a bulk archive request.
pub fn archive(
    result: &ArchiveBatchResult,
    destination: ArchiveDestination,
    output: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_json(result),
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            writeln!(
                out,
                "{}: queued {} of {} file(s)",
                destination.label(),
                result.total_queued,
                result.total_found
            )?;
            if let Some(message) = result.message.as_deref().filter(|m| !m.trim().is_empty()) {
                writeln!(out, "{message}")?;
            }
            Ok(())
        }
    }
}

/// Prints every task of an upload batch followed by its summary.
pub fn batch(batch: &UploadBatch, output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_json(batch),
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            for task in &batch.tasks {
                writeln!(
                    out,
                    "{:>3}  {:<9} {}  {}",
                    task.index,
                    task.status.as_ref(),
                    task.file_name,
                    task.message.as_deref().unwrap_or_default()
                )?;
            }
            writeln!(out, "{}", batch.summary())?;
            Ok(())
        }
    }
}

/// Prints bucket names, one per line.
pub fn buckets(names: &[String], output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Json => print_json(&names),
        OutputFormat::Text => {
            let mut out = io::stdout().lock();
            for name in names {
                writeln!(out, "{name}")?;
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Lays `files` out under the default column headers.
fn file_table(files: &[FileDisplayModel]) -> anyhow::Result<String> {
    let header: Vec<String> = FILE_COLUMNS.iter().map(|c| c.label.to_owned()).collect();
    let mut rows = vec![header];
    for file in files {
        let value = serde_json::to_value(file)?;
        rows.push(
            FILE_COLUMNS
                .iter()
                .map(|column| cell(value.get(column.field)))
                .collect(),
        );
    }

    let widths: Vec<usize> = (0..FILE_COLUMNS.len())
        .map(|i| rows.iter().map(|row| row[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut table = String::new();
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{text:<width$}"))
            .collect();
        table.push_str(line.join("  ").trim_end());
        table.push('\n');
    }
    Ok(table)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "Yes".to_owned(),
        Some(Value::Bool(false)) => "No".to_owned(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
