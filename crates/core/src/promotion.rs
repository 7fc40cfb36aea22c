//! The year-end promotion plan and the per-record transforms it applies.
//!
//! The plan is an explicit list of steps executed strictly in order by the
//! engine in `ipa-api`. Order matters: the terminal grade is emptied first
//! so each promoted branch lands in a branch that has already been vacated.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grade::GradeLevel;
use crate::student::{GraduateRecord, ProjectMap, StudentRecord};
use crate::types::{Timestamp, Year};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One named step of the promotion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStep {
    /// Archive every record of the terminal grade to the graduates tree,
    /// revoke their accounts, then delete the terminal branch.
    ArchiveTerminal,
    /// Move every record of `from` into `to`, then delete `from`.
    Promote { from: GradeLevel, to: GradeLevel },
}

impl PromotionStep {
    /// Branch this step reads and finally deletes.
    pub fn source(&self) -> GradeLevel {
        match self {
            Self::ArchiveTerminal => GradeLevel::Fourth,
            Self::Promote { from, .. } => *from,
        }
    }

    /// Stable name used in the saga log.
    pub fn name(&self) -> String {
        match self {
            Self::ArchiveTerminal => format!("archivar_{}", GradeLevel::Fourth),
            Self::Promote { from, to } => format!("promover_{from}_{to}"),
        }
    }
}

impl fmt::Display for PromotionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The fixed promotion sequence: archive 4t, then 3r→4t, 2n→3r, 1r→2n.
pub fn promotion_plan() -> Vec<PromotionStep> {
    let mut plan = vec![PromotionStep::ArchiveTerminal];
    for from in GradeLevel::ALL.iter().rev() {
        if let Some(to) = from.next() {
            plan.push(PromotionStep::Promote { from: *from, to });
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Record transforms
// ---------------------------------------------------------------------------

/// Append `year` to the record's history and snapshot its current projects
/// under that year.
pub fn record_history(record: &mut StudentRecord, year: Year) {
    record.years.get_or_insert_with(Vec::new).push(year);
    record
        .projects_by_year
        .get_or_insert_with(BTreeMap::new)
        .insert(year.to_string(), record.projects.clone());
}

/// Build the graduate archive entry for a terminal-grade record.
///
/// Every record field is kept, including the active project map.
pub fn archive_record(mut record: StudentRecord, year: Year, date: &str) -> GraduateRecord {
    record_history(&mut record, year);
    GraduateRecord {
        student: record,
        graduated_on: date.to_string(),
    }
}

/// Build the record as it will be written into the next grade's branch.
pub fn promote_record(mut record: StudentRecord, to: GradeLevel, year: Year) -> StudentRecord {
    record_history(&mut record, year);
    record.level = to;
    record.projects = ProjectMap::default();
    record
}

// ---------------------------------------------------------------------------
// Saga log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    EnCurso,
    Completada,
    Fallida,
}

/// A committed step of a promotion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    #[serde(rename = "paso")]
    pub step: String,
    #[serde(rename = "registros")]
    pub records: usize,
    #[serde(rename = "fecha")]
    pub committed_at: Timestamp,
}

/// The per-year saga log stored at `promociones/<year>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionRun {
    #[serde(rename = "estado")]
    pub status: RunStatus,
    #[serde(rename = "inicio")]
    pub started_at: Timestamp,
    #[serde(rename = "fin", default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    /// Committed steps keyed by their index in the plan.
    #[serde(rename = "pasos", default)]
    pub steps: BTreeMap<String, StepLog>,
    #[serde(rename = "ultimo_paso", default, skip_serializing_if = "Option::is_none")]
    pub last_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "paso_fallido", default, skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
}

impl PromotionRun {
    pub fn started(at: Timestamp) -> Self {
        Self {
            status: RunStatus::EnCurso,
            started_at: at,
            finished_at: None,
            steps: BTreeMap::new(),
            last_step: None,
            error: None,
            failed_step: None,
        }
    }

    pub fn step(&self, index: usize) -> Option<&StepLog> {
        self.steps.get(&index.to_string())
    }

    /// First plan index that has not been committed, for resuming.
    pub fn next_step(&self) -> usize {
        self.last_step.map_or(0, |last| last + 1)
    }
}

/// Outcome of one step in a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub step: String,
    pub records: usize,
}

/// Success report of a promotion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionSummary {
    pub year: Year,
    pub steps: Vec<StepOutcome>,
}

impl PromotionSummary {
    pub fn total_records(&self) -> usize {
        self.steps.iter().map(|s| s.records).sum()
    }
}
