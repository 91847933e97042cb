use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use repotree_archive::Tree;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

const TIMESTAMP: &str = "%Y%m%d_%H%M%S";

/// `<repo><YYYYMMDD_HHMMSS>.json`
pub fn report_file_name(repo: &str, at: DateTime<Local>) -> String {
    format!("{repo}{}.json", at.format(TIMESTAMP))
}

/// Two-space indented JSON followed by a newline.
pub fn write_json<W: Write>(mut writer: W, tree: &Tree) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    writer.flush().map_err(serde_json::Error::io)
}

/// Write the report into `dir`. The file only appears once fully written.
pub fn save_report(dir: &Path, repo: &str, tree: &Tree) -> Result<PathBuf> {
    let path = dir.join(report_file_name(repo, Local::now()));
    let output_err = |source| Error::Output {
        path: path.clone(),
        source,
    };

    let staged = NamedTempFile::new_in(dir).map_err(output_err)?;
    write_json(BufWriter::new(staged.as_file()), tree).map_err(|source| Error::Encode {
        path: path.clone(),
        source,
    })?;
    staged.persist(&path).map_err(|e| output_err(e.error))?;

    Ok(path)
}
