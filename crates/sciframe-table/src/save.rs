use std::path::Path;

use crate::error::{TableError, WriteError};
use crate::table::{default_headline, Table};
use crate::types::{is_missing, Value};

/// Everything a writer needs to persist a table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableFile {
    pub name: String,
    pub headlines: Vec<String>,
    pub lines: usize,
    pub cols: usize,
    /// Row-major, `lines * cols` cells.
    pub values: Vec<Value>,
    /// Significant digits for text formats.
    pub precision: usize,
}

impl TableFile {
    pub fn row(&self, line: usize) -> &[Value] {
        let start = (line * self.cols).min(self.values.len());
        let end = (start + self.cols).min(self.values.len());
        &self.values[start..end]
    }
}

pub trait TableFileWriter {
    fn write(&self, path: &Path, file: &TableFile) -> Result<(), WriteError>;
}

/// Maps a lowercase file extension to the writer responsible for it.
pub trait WriterRegistry {
    fn writer_for(&self, extension: &str) -> Option<&dyn TableFileWriter>;
}

/// Delimited text with one header record of column headlines. Missing cells are left empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelimitedTextWriter {
    pub delimiter: u8,
}

impl DelimitedTextWriter {
    pub const CSV: Self = Self { delimiter: b',' };
    pub const TAB: Self = Self { delimiter: b'\t' };
}

impl TableFileWriter for DelimitedTextWriter {
    fn write(&self, path: &Path, file: &TableFile) -> Result<(), WriteError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(path)?;
        writer.write_record(&file.headlines)?;
        for line in 0..file.lines {
            writer.write_record(
                file.row(line)
                    .iter()
                    .map(|&v| format_value(v, file.precision)),
            )?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// `csv` is comma separated, `dat` and `txt` are tab separated.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultWriters;

impl WriterRegistry for DefaultWriters {
    fn writer_for(&self, extension: &str) -> Option<&dyn TableFileWriter> {
        match extension {
            "csv" => Some(&DelimitedTextWriter::CSV),
            "dat" | "txt" => Some(&DelimitedTextWriter::TAB),
            _ => None,
        }
    }
}

pub(crate) fn format_value(v: Value, precision: usize) -> String {
    if is_missing(v) {
        return String::new();
    }
    if v.im == 0.0 {
        return format_real(v.re, precision);
    }
    let sign = if v.im.is_sign_negative() { '-' } else { '+' };
    format!(
        "{}{sign}{}i",
        format_real(v.re, precision),
        format_real(v.im.abs(), precision)
    )
}

/// `%g`-style formatting with `precision` significant digits.
fn format_real(x: f64, precision: usize) -> String {
    let precision = precision.max(1);
    if x == 0.0 || !x.is_finite() {
        return if x == 0.0 { "0".into() } else { x.to_string() };
    }
    let exponent = x.abs().log10().floor() as i64;
    if exponent < -4 || exponent >= precision as i64 {
        let s = format!("{:.*e}", precision - 1, x);
        return match s.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{exp}", trim_fraction(mantissa)),
            None => s,
        };
    }
    let decimals = (precision as i64 - 1 - exponent).max(0) as usize;
    trim_fraction(&format!("{x:.decimals$}")).to_owned()
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl Table {
    /// Write the whole table to `path`, choosing the writer by file extension.
    ///
    /// Writing does not change the save status.
    pub fn save(
        &self,
        path: impl AsRef<Path>,
        table_name: &str,
        precision: usize,
        registry: &dyn WriterRegistry,
    ) -> Result<(), TableError> {
        let path = path.as_ref();
        let fail = |source: WriteError| {
            log::warn!("saving table `{table_name}` to {} failed: {source}", path.display());
            TableError::FileWrite {
                path: path.to_path_buf(),
                source,
            }
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let writer = registry
            .writer_for(&extension)
            .ok_or_else(|| fail(WriteError::UnsupportedExtension(extension.clone())))?;

        let (lines, cols) = (self.get_lines(false), self.get_cols(false));
        let headlines = (0..cols)
            .map(|j| match self.column(j) {
                Some(c) if !c.headline().is_empty() => c.headline().to_owned(),
                _ => default_headline(j),
            })
            .collect();
        let mut values = Vec::with_capacity(lines * cols);
        for i in 0..lines {
            values.extend((0..cols).map(|j| self.read_mem(i, j)));
        }
        let file = TableFile {
            name: table_name.to_owned(),
            headlines,
            lines,
            cols,
            values,
            precision,
        };

        writer.write(path, &file).map_err(fail)
    }
}
