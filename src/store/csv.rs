//! Append-only CSV log of contract call results.
//!
//! The header is treated as a versioned schema: files written before the
//! `FormattedResult` and `PoolName` columns existed are upgraded in place
//! (atomically, via a temp file in the same directory) before a new row is
//! appended. No file handle is held between calls and no locking is done,
//! so a file must only have one writer at a time.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ByteRecord, QuoteStyle, ReaderBuilder, WriterBuilder};
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::{Result, RewardsError};
use crate::utils::{normalize_reward, NOT_AVAILABLE};

pub const FORMATTED_RESULT_COLUMN: &str = "FormattedResult";
pub const POOL_NAME_COLUMN: &str = "PoolName";

/// Placeholder written for rows that carry no pool name.
pub const UNKNOWN_POOL: &str = "Unknown";

/// Columns added by schema upgrades, with the placeholder for pre-existing rows.
const UPGRADE_COLUMNS: [(&str, &str); 2] = [
    (FORMATTED_RESULT_COLUMN, NOT_AVAILABLE),
    (POOL_NAME_COLUMN, UNKNOWN_POOL),
];

/// One call result to be written as a CSV row.
#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    pub function_name: &'a str,
    /// Parameter names from the ABI, used only when the file is created.
    /// Empty or missing names fall back to `InputN`.
    pub input_names: &'a [String],
    pub input_values: &'a [String],
    pub raw_result: &'a str,
    pub pool_name: Option<&'a str>,
}

/// What [`CsvAppender::ensure_schema`] had to do to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaAction {
    Created,
    Migrated { added: Vec<&'static str> },
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct CsvAppender {
    path: PathBuf,
    /// Where rewrites are staged before the rename; the file's own directory
    /// when unset.
    staging_dir: Option<PathBuf>,
}

impl CsvAppender {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            staging_dir: None,
        }
    }

    #[cfg(test)]
    fn staged_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row timestamped now.
    pub fn append(&self, record: &CsvRecord<'_>) -> Result<()> {
        self.append_at(record, Utc::now())
    }

    /// Append one row with an explicit timestamp.
    ///
    /// Fails only on filesystem errors; previously written rows are never
    /// truncated.
    pub fn append_at(&self, record: &CsvRecord<'_>, timestamp: DateTime<Utc>) -> Result<()> {
        let headers = input_headers(record.input_names, record.input_values.len());
        let (action, ends_with_newline) = self.prepare(&headers)?;
        match &action {
            SchemaAction::Created => {
                info!("Created new CSV file with headers at {}", self.path.display())
            }
            SchemaAction::Migrated { added } => {
                info!("CSV file updated with new columns: {}", added.join(", "))
            }
            SchemaAction::Unchanged => {}
        }

        let formatted_result = normalize_reward(record.raw_result);

        let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut fields: Vec<&str> = Vec::with_capacity(record.input_values.len() + 5);
        fields.push(&timestamp);
        fields.push(record.function_name);
        fields.extend(record.input_values.iter().map(String::as_str));
        fields.push(record.raw_result);
        fields.push(&formatted_result);
        fields.push(record.pool_name.unwrap_or(UNKNOWN_POOL));

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        if !ends_with_newline {
            file.write_all(b"\n")?;
        }
        let mut writer = row_writer().from_writer(file);
        writer.write_record(&fields)?;
        writer.flush()?;

        debug!("Result saved to {}", self.path.display());
        Ok(())
    }

    /// Create the file with a full header, or upgrade an older header.
    ///
    /// `input_headers` is only used when the file has to be created.
    /// Running this on an up-to-date file changes nothing.
    pub fn ensure_schema(&self, input_headers: &[String]) -> Result<SchemaAction> {
        self.prepare(input_headers).map(|(action, _)| action)
    }

    fn prepare(&self, input_headers: &[String]) -> Result<(SchemaAction, bool)> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            self.replace_with(&header_line(input_headers)?, false)?;
            return Ok((SchemaAction::Created, true));
        }

        match migrate_content(&content)? {
            Some((migrated, added)) => {
                self.replace_with(&migrated, true)?;
                Ok((SchemaAction::Migrated { added }, migrated.ends_with('\n')))
            }
            None => Ok((SchemaAction::Unchanged, content.ends_with('\n'))),
        }
    }

    fn replace_with(&self, content: &str, keep_permissions: bool) -> Result<()> {
        let dir = match &self.staging_dir {
            Some(dir) => dir.as_path(),
            None => self
                .path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new(".")),
        };
        atomic_write(dir, &self.path, content, keep_permissions)
    }
}

/// Rows are written unquoted unless a field needs it (commas, quotes,
/// line breaks).
fn row_writer() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).quote_style(QuoteStyle::Necessary);
    builder
}

/// Header names for the input columns.
pub fn input_headers(names: &[String], value_count: usize) -> Vec<String> {
    (0..names.len().max(value_count))
        .map(|i| {
            names
                .get(i)
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Input{}", i + 1))
        })
        .collect()
}

fn header_line(input_headers: &[String]) -> Result<String> {
    let mut columns = vec!["Timestamp", "Function"];
    columns.extend(input_headers.iter().map(String::as_str));
    columns.extend(["Result", FORMATTED_RESULT_COLUMN, POOL_NAME_COLUMN]);

    let mut writer = row_writer().from_writer(Vec::new());
    writer.write_record(&columns)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| RewardsError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| RewardsError::Io(std::io::Error::other(e)))
}

/// Add missing upgrade columns to the header and placeholders to every
/// non-blank record. Returns `None` when the header is already current.
///
/// Records are located with a CSV reader, so quoted fields (including ones
/// spanning lines) are respected; the bytes of existing records, blank
/// lines and line endings are kept as they are.
pub fn migrate_content(content: &str) -> Result<Option<(String, Vec<&'static str>)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut record = ByteRecord::new();
    // Byte offset where each record's fields end, header first
    let mut record_ends = Vec::new();
    let mut columns: Vec<String> = Vec::new();

    let mut previous_end = 0;
    while reader.read_byte_record(&mut record)? {
        let end = reader.position().byte() as usize;
        let raw = &content[previous_end..end];
        let fields_end = end - (raw.len() - raw.trim_end_matches(['\n', '\r']).len());
        previous_end = end;

        if record_ends.is_empty() {
            columns = record
                .iter()
                .map(|field| String::from_utf8_lossy(field).trim().to_string())
                .collect();
        } else if record
            .iter()
            .all(|field| field.iter().all(u8::is_ascii_whitespace))
        {
            continue;
        }
        record_ends.push(fields_end);
    }

    let missing: Vec<(&'static str, &'static str)> = UPGRADE_COLUMNS
        .into_iter()
        .filter(|(column, _)| !columns.iter().any(|c| c == column))
        .collect();
    if record_ends.is_empty() || missing.is_empty() {
        return Ok(None);
    }

    let header_suffix: String = missing.iter().map(|(c, _)| format!(",{c}")).collect();
    let row_suffix: String = missing.iter().map(|(_, p)| format!(",{p}")).collect();

    let mut migrated = String::with_capacity(content.len() + record_ends.len() * row_suffix.len());
    let mut copied = 0;
    for (index, end) in record_ends.into_iter().enumerate() {
        migrated.push_str(&content[copied..end]);
        migrated.push_str(if index == 0 { &header_suffix } else { &row_suffix });
        copied = end;
    }
    migrated.push_str(&content[copied..]);

    Ok(Some((migrated, missing.into_iter().map(|(c, _)| c).collect())))
}

/// Replace `path` with `content` via a temp file in `dir` and a rename.
///
/// Nothing is written to `path` unless the rename happens.
fn atomic_write(dir: &Path, path: &Path, content: &str, keep_permissions: bool) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    if keep_permissions {
        if let Ok(metadata) = fs::metadata(path) {
            fs::set_permissions(tmp.path(), metadata.permissions())?;
        }
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
