//! Filtering for the cross-branch student lookup screen.

use serde::{Deserialize, Serialize};

use crate::grade::GradeLevel;
use crate::student::StudentRecord;

/// One student flattened out of its branch, with its key and grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRow {
    pub id: String,
    /// Branch the row was read from; the record carries its own `nivel`.
    #[serde(skip)]
    pub level: GradeLevel,
    #[serde(flatten)]
    pub record: StudentRecord,
}

/// Query parameters of the lookup screen. Both filters are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentQuery {
    pub texto: Option<String>,
    pub nivel: Option<GradeLevel>,
}

impl StudentQuery {
    /// Case-insensitive substring match on the student name, plus an
    /// exact grade match when a level is given.
    pub fn matches(&self, row: &StudentRow) -> bool {
        if let Some(level) = self.nivel {
            if row.level != level {
                return false;
            }
        }
        match self.texto.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => row
                .record
                .name
                .to_lowercase()
                .contains(&text.to_lowercase()),
            _ => true,
        }
    }

    pub fn filter(&self, rows: Vec<StudentRow>) -> Vec<StudentRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}
