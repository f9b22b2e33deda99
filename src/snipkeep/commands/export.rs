use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, SnipError};
use crate::model::Library;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use std::fs;
use std::path::Path;

/// The whole library as pretty-printed JSON.
pub fn to_text(library: &Library) -> Result<String> {
    serde_json::to_string_pretty(library).map_err(SnipError::Serialization)
}

/// `<prefix>-2024-01-31T09-15-00-123Z.json`: the timestamp with `:` and `.`
/// replaced so the name is valid on every filesystem.
pub fn export_filename(prefix: &str, at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}-{}.json", prefix, stamp)
}

/// Write the export file into `dir`.
pub fn run(library: &Library, dir: &Path, prefix: &str) -> Result<CmdResult> {
    let text = to_text(library)?;
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(SnipError::Io)?;
    }
    let path = dir.join(export_filename(prefix, Utc::now()));
    fs::write(&path, text).map_err(SnipError::Io)?;

    debug!("Exported library to {}", path.display());
    Ok(CmdResult::default()
        .with_message(CmdMessage::success("Data exported."))
        .with_message(CmdMessage::info(format!("Wrote {}", path.display())))
        .with_paths(vec![path]))
}
