//! Student and graduate record shapes as stored in the grade branches.
//!
//! The store is schema-less, so decoding is where defaults are applied:
//! a missing `proyectos` becomes an empty [`ProjectMap`], missing history
//! fields stay `None`, and unknown sibling fields are carried through
//! untouched so a promotion never drops data it does not understand.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::grade::GradeLevel;
use crate::types::Year;

// ---------------------------------------------------------------------------
// Project statuses and counters
// ---------------------------------------------------------------------------

pub const STATUS_ASSIGNADA: &str = "Assignada";
pub const STATUS_ACABADA: &str = "Acabada";
pub const STATUS_EN_CURS: &str = "En curs";
pub const STATUS_PRIMER_TRIM: &str = "1r trim";
pub const STATUS_SEGON_TRIM: &str = "2n trim";

/// Every status a project entry may carry.
pub const VALID_PROJECT_STATUSES: &[&str] = &[
    STATUS_ASSIGNADA,
    STATUS_ACABADA,
    STATUS_EN_CURS,
    STATUS_PRIMER_TRIM,
    STATUS_SEGON_TRIM,
];

pub const COUNTER_ASSIGNADES: &str = "_assignades";
pub const COUNTER_TOTAL: &str = "_total";
pub const COUNTER_TOTAL_ACABADES: &str = "_total_acabades";

// ---------------------------------------------------------------------------
// ProjectMap
// ---------------------------------------------------------------------------

/// A student's project map: project name -> status, plus bookkeeping
/// counters stored as underscore-prefixed siblings in the same object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMap {
    pub entries: BTreeMap<String, String>,
    pub counters: BTreeMap<String, Value>,
}

impl ProjectMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.counters.is_empty()
    }

    pub fn status(&self, project: &str) -> Option<&str> {
        self.entries.get(project).map(String::as_str)
    }

    /// Read a counter, accepting both numeric and string-encoded values.
    pub fn counter(&self, name: &str) -> Option<u32> {
        match self.counters.get(name)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Serialize for ProjectMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + self.counters.len()))?;
        for (name, status) in &self.entries {
            map.serialize_entry(name, status)?;
        }
        for (name, value) in &self.counters {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProjectMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let object = match raw {
            Value::Null => return Ok(ProjectMap::default()),
            Value::Object(object) => object,
            other => {
                return Err(de::Error::custom(format!(
                    "expected a project map, found {other}"
                )))
            }
        };

        let mut projects = ProjectMap::default();
        for (key, value) in object {
            if key.starts_with('_') {
                projects.counters.insert(key, value);
            } else {
                let status = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                projects.entries.insert(key, status);
            }
        }
        Ok(projects)
    }
}

// ---------------------------------------------------------------------------
// StudentRecord / GraduateRecord
// ---------------------------------------------------------------------------

/// One student's state within a grade branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "alumno")]
    pub name: String,
    #[serde(default)]
    pub tutor: String,
    #[serde(rename = "nivel")]
    pub level: GradeLevel,
    #[serde(rename = "proyectos", default)]
    pub projects: ProjectMap,
    /// Account email, used to revoke the login entry on graduation.
    #[serde(rename = "correo", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Years in which the student was promoted, oldest first.
    #[serde(rename = "años", default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<Year>>,
    /// Project map of each promoted year, keyed by the year as a string.
    #[serde(
        rename = "proyectosPorAño",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub projects_by_year: Option<BTreeMap<String, ProjectMap>>,
    /// Fields this application does not model, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StudentRecord {
    /// A fresh record as created by the add-student form or CSV import.
    pub fn new(name: impl Into<String>, tutor: impl Into<String>, level: GradeLevel) -> Self {
        Self {
            name: name.into(),
            tutor: tutor.into(),
            level,
            projects: ProjectMap::default(),
            email: None,
            years: None,
            projects_by_year: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn projects_for_year(&self, year: Year) -> Option<&ProjectMap> {
        self.projects_by_year.as_ref()?.get(&year.to_string())
    }
}

/// Archival projection of a student who completed the terminal grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraduateRecord {
    #[serde(flatten)]
    pub student: StudentRecord,
    /// Archival date, `YYYY-MM-DD`.
    #[serde(rename = "fecha_egreso")]
    pub graduated_on: String,
}

// ---------------------------------------------------------------------------
// Project editing
// ---------------------------------------------------------------------------

/// One row of the project editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "estado")]
    pub status: String,
}

/// Build the stored project map from an editor submission.
///
/// Requires at least one project, non-empty unique names, and known
/// statuses. Names starting with `_` are rejected because they would be
/// read back as counters.
pub fn build_project_map(
    projects: &[ProjectEntry],
    assignades: u32,
    total: u32,
    total_acabades: u32,
) -> Result<ProjectMap, CoreError> {
    if projects.is_empty() {
        return Err(CoreError::Validation(
            "At least one project is required".into(),
        ));
    }

    let mut seen = BTreeSet::new();
    let mut map = ProjectMap::default();
    for project in projects {
        let name = project.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Every project needs a name".into()));
        }
        if name.starts_with('_') {
            return Err(CoreError::Validation(format!(
                "Project name '{name}' must not start with '_'"
            )));
        }
        if !seen.insert(name.to_string()) {
            return Err(CoreError::Validation(format!(
                "Duplicate project name '{name}'"
            )));
        }
        if !VALID_PROJECT_STATUSES.contains(&project.status.as_str()) {
            return Err(CoreError::Validation(format!(
                "Unknown project status '{}'",
                project.status
            )));
        }
        map.entries.insert(name.to_string(), project.status.clone());
    }

    map.counters.insert(COUNTER_ASSIGNADES.into(), assignades.into());
    map.counters.insert(COUNTER_TOTAL.into(), total.into());
    map.counters
        .insert(COUNTER_TOTAL_ACABADES.into(), total_acabades.into());
    Ok(map)
}
