use crate::constants::COLUMNS;
use crate::error::{EtlError, Result};
use crate::types::EnrichedLaunchRow;
use askama::Template;
use metrics::counter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Missing values in the HTML table, matching the usual dataframe rendering
const HTML_MISSING: &str = "NaN";

/// Renders rows as comma-separated text with a header row and no index
/// column. Missing values are empty fields.
pub fn render_csv(rows: &[EnrichedLaunchRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        let cells = row.cells();
        writer.write_record(cells.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.into_inner().map_err(|e| {
        let cause = e.error();
        EtlError::Io(std::io::Error::new(cause.kind(), cause.to_string()))
    })
}

/// Table layout for the HTML export. Cells are escaped by the template
/// engine.
#[derive(Template)]
#[template(path = "table1.html")]
struct TableTemplate<'a> {
    columns: &'a [&'static str],
    rows: Vec<Vec<String>>,
}

/// Renders rows as an HTML table with the same columns as the CSV and no
/// index column
pub fn render_html(rows: &[EnrichedLaunchRow]) -> Result<String> {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.cells()
                .into_iter()
                .map(|cell| cell.unwrap_or_else(|| HTML_MISSING.to_string()))
                .collect::<Vec<_>>()
        })
        .collect();
    let table = TableTemplate {
        columns: &COLUMNS,
        rows,
    };
    Ok(table.render()?)
}

/// Paths written by [`export`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub csv_path: PathBuf,
    pub html_path: PathBuf,
}

/// Writes the dataset to both files.
///
/// Both documents are rendered before anything touches the disk, and each
/// file is written to a temporary sibling and renamed into place, so a
/// failed export never leaves a half-written dataset behind.
#[instrument(skip(rows), fields(rows = rows.len()))]
pub fn export(rows: &[EnrichedLaunchRow], csv_path: &Path, html_path: &Path) -> Result<ExportedFiles> {
    let csv_bytes = render_csv(rows)?;
    let html = render_html(rows)?;

    let csv_tmp = sibling_path(csv_path, "tmp");
    let html_tmp = sibling_path(html_path, "tmp");

    let staged = write_staged(&csv_tmp, &csv_bytes).and_then(|_| write_staged(&html_tmp, html.as_bytes()));
    if let Err(e) = staged {
        let _ = fs::remove_file(&csv_tmp);
        let _ = fs::remove_file(&html_tmp);
        return Err(e);
    }

    commit(&csv_tmp, csv_path, &html_tmp, html_path)?;

    counter!("launch_etl_rows_exported_total").increment(rows.len() as u64);
    info!(
        "💾 Wrote {} rows to {} and {}",
        rows.len(),
        csv_path.display(),
        html_path.display()
    );

    Ok(ExportedFiles {
        csv_path: csv_path.to_path_buf(),
        html_path: html_path.to_path_buf(),
    })
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

/// Moves both staged files into place. If the second move fails, the CSV
/// is rolled back to whatever was there before the run.
fn commit(csv_tmp: &Path, csv_path: &Path, html_tmp: &Path, html_path: &Path) -> Result<()> {
    let backup = sibling_path(csv_path, "bak");
    let had_previous = csv_path.is_file();
    let discard_staged = || {
        let _ = fs::remove_file(csv_tmp);
        let _ = fs::remove_file(html_tmp);
    };

    if had_previous {
        if let Err(e) = fs::rename(csv_path, &backup) {
            discard_staged();
            return Err(e.into());
        }
    }
    let restore_previous = || {
        if had_previous {
            let _ = fs::rename(&backup, csv_path);
        }
    };

    if let Err(e) = fs::rename(csv_tmp, csv_path) {
        discard_staged();
        restore_previous();
        return Err(e.into());
    }

    if let Err(e) = fs::rename(html_tmp, html_path) {
        discard_staged();
        let _ = fs::remove_file(csv_path);
        restore_previous();
        return Err(e.into());
    }

    if had_previous {
        let _ = fs::remove_file(&backup);
    }
    Ok(())
}

fn write_staged(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
