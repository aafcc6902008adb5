// ============================================================
// CSV PARSER
// ============================================================
// Turn a question-bank CSV stream into rows keyed by canonical headers

use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

use crate::domain::csv::{CsvField, CsvRow};
use crate::domain::error::AppError;

/// CSV parser for question-bank files
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse a CSV file and return rows
    pub fn parse_file(&self, path: &Path) -> Result<Vec<CsvRow>, AppError> {
        let content = read_decoded(path)?;
        self.parse_content(&content)
    }

    /// Parse CSV content from a string
    pub fn parse_content(&self, content: &str) -> Result<Vec<CsvRow>, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true) // Question banks routinely have ragged rows
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(build_row(index, &headers, &record));
        }

        Ok(rows)
    }

    /// Score candidate delimiters over the first lines of the content and
    /// pick the most consistent one. Comma wins ties.
    pub fn detect_delimiter(content: &str) -> u8 {
        let sample: Vec<&str> = content.lines().take(10).collect();
        if sample.is_empty() {
            return b',';
        }

        let mut best = (b',', 0.0f32);
        for &candidate in &[b',', b';', b'\t', b'|'] {
            let counts: Vec<usize> = sample
                .iter()
                .map(|line| line.bytes().filter(|&b| b == candidate).count())
                .collect();

            let avg = counts.iter().sum::<usize>() as f32 / counts.len() as f32;
            let variance = counts
                .iter()
                .map(|&c| (c as f32 - avg).powi(2))
                .sum::<f32>()
                / counts.len() as f32;

            // Frequent and stable across lines beats merely frequent.
            let score = avg / (1.0 + variance.sqrt());
            if score > best.1 {
                best = (candidate, score);
            }
        }

        best.0
    }

    /// Parse a CSV file with automatic delimiter detection
    pub fn parse_file_auto_detect(path: &Path) -> Result<Vec<CsvRow>, AppError> {
        let content = read_decoded(path)?;
        let delimiter = Self::detect_delimiter(&content);
        Self::default().with_delimiter(delimiter).parse_content(&content)
    }
}

fn build_row(index: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
    let fields = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let value = record.get(idx).unwrap_or("").to_string();
            CsvField::new(header.to_string(), value)
        })
        .collect();
    CsvRow::new(index, fields)
}

/// Read a file and decode it to text. BOM sniffing picks up UTF-16 exports
/// and strips a UTF-8 BOM; undecodable bytes are replaced rather than fatal.
fn read_decoded(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    let (text, _, _) = encoding_rs::UTF_8.decode(&bytes);
    Ok(text.into_owned())
}
