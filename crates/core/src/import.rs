//! CSV parsing for the two bulk-import screens.
//!
//! - Students: one student per line, `nombre;curso;tutor[;correo]`, no header.
//! - Catalog: a header row, `;`-delimited, with several accepted spellings
//!   for the name and creator columns.
//!
//! Parsing is pure. The repositories perform the writes and fold write
//! failures back into the [`ImportReport`].

use std::collections::BTreeMap;

use serde::Serialize;
use validator::ValidateEmail;

use crate::catalog::ProjectTemplate;
use crate::error::CoreError;
use crate::grade::GradeLevel;
use crate::paths::email_account_key;

pub const CSV_DELIMITER: char = ';';

/// Header spellings accepted for the project name column, in priority order.
pub const CATALOG_NAME_HEADERS: &[&str] = &["projecte", "nombre proyecto", "nom projecte", "nombre"];

/// Header spellings accepted for the creator column, in priority order.
pub const CATALOG_CREATOR_HEADERS: &[&str] = &["nom", "nombre creador", "nom creador", "profesor"];

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn record_failure(&mut self, rows: usize, message: impl Into<String>) {
        self.failed += rows;
        self.errors.push(message.into());
    }
}

// ---------------------------------------------------------------------------
// Student CSV
// ---------------------------------------------------------------------------

/// A validated student CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentImportRow {
    /// 1-based line number in the uploaded text.
    pub line: usize,
    pub name: String,
    pub level: GradeLevel,
    pub tutor: String,
    pub email: Option<String>,
}

/// Result of parsing the student CSV before any write happens.
#[derive(Debug, Clone, Default)]
pub struct ParsedStudentCsv {
    /// Non-blank lines seen.
    pub total: usize,
    /// Valid rows grouped by grade, in file order within each grade.
    pub by_level: BTreeMap<GradeLevel, Vec<StudentImportRow>>,
    /// Row-level errors, already formatted.
    pub errors: Vec<String>,
}

impl ParsedStudentCsv {
    pub fn valid_rows(&self) -> usize {
        self.by_level.values().map(Vec::len).sum()
    }

    /// Report with the parse errors counted; writes are added by the caller.
    pub fn report(&self) -> ImportReport {
        ImportReport {
            total: self.total,
            succeeded: 0,
            failed: self.errors.len(),
            errors: self.errors.clone(),
        }
    }
}

/// Parse the student import text.
///
/// Blank lines are skipped but still count toward line numbers.
pub fn parse_student_csv(text: &str) -> ParsedStudentCsv {
    let mut parsed = ParsedStudentCsv::default();

    for (index, line) in text.split('\n').enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        parsed.total += 1;

        let fields: Vec<&str> = line.split(CSV_DELIMITER).map(str::trim).collect();
        if fields.len() < 3 || fields[..3].iter().any(|f| f.is_empty()) {
            parsed.errors.push(format!("Row {line_no}: incomplete fields"));
            continue;
        }

        let Ok(level) = fields[1].parse::<GradeLevel>() else {
            parsed.errors.push(format!("Row {line_no}: invalid grade level"));
            continue;
        };

        let email = fields.get(3).copied().filter(|e| !e.is_empty());
        if let Some(email) = email {
            if !is_account_email(email) {
                parsed.errors.push(format!("Row {line_no}: invalid email"));
                continue;
            }
        }
        let email = email.map(str::to_string);

        parsed.by_level.entry(level).or_default().push(StudentImportRow {
            line: line_no,
            name: fields[0].to_string(),
            level,
            tutor: fields[2].to_string(),
            email,
        });
    }

    parsed
}

/// A syntactically valid email whose sanitized form is a usable account key.
pub fn is_account_email(email: &str) -> bool {
    email.validate_email() && email_account_key(email).is_some()
}

// ---------------------------------------------------------------------------
// Catalog CSV
// ---------------------------------------------------------------------------

/// Parse the catalog import text into templates, in file order.
///
/// Rows missing either field are skipped. Fails when the header lacks
/// both columns or no row yields a template.
pub fn parse_catalog_csv(text: &str) -> Result<Vec<ProjectTemplate>, CoreError> {
    let mut lines = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some(h) => h
            .split(CSV_DELIMITER)
            .map(|c| c.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect(),
        None => return Err(CoreError::Validation("The CSV file is empty".into())),
    };

    let name_cols = column_indices(&header, CATALOG_NAME_HEADERS);
    let creator_cols = column_indices(&header, CATALOG_CREATOR_HEADERS);
    if name_cols.is_empty() || creator_cols.is_empty() {
        return Err(CoreError::Validation(
            "The CSV header must name a project column and a creator column".into(),
        ));
    }

    let mut templates = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.split(CSV_DELIMITER).map(str::trim).collect();
        let (Some(nombre), Some(profesor)) = (
            first_present(&fields, &name_cols),
            first_present(&fields, &creator_cols),
        ) else {
            continue;
        };
        templates.push(ProjectTemplate {
            nombre: nombre.to_string(),
            profesor: profesor.to_string(),
        });
    }

    if templates.is_empty() {
        return Err(CoreError::Validation(
            "No valid projects found in the CSV".into(),
        ));
    }
    Ok(templates)
}

/// Column positions of the accepted spellings that appear in the header,
/// ordered by spelling priority.
fn column_indices(header: &[String], spellings: &[&str]) -> Vec<usize> {
    spellings
        .iter()
        .filter_map(|s| header.iter().position(|h| h == s))
        .collect()
}

fn first_present<'a>(fields: &[&'a str], columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|&i| fields.get(i).copied())
        .find(|v| !v.is_empty())
}
