//! Project catalog templates stored under `CatalogoProyectos/`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const TEMPLATE_ID_PREFIX: &str = "proyecto_";

/// A reusable project definition: its name and the profesor who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTemplate {
    pub nombre: String,
    pub profesor: String,
}

impl ProjectTemplate {
    /// Trimmed template, rejecting empty fields.
    pub fn new(nombre: &str, profesor: &str) -> Result<Self, CoreError> {
        let nombre = nombre.trim();
        let profesor = profesor.trim();
        if nombre.is_empty() || profesor.is_empty() {
            return Err(CoreError::Validation(
                "Project name and profesor are required".into(),
            ));
        }
        Ok(Self {
            nombre: nombre.to_string(),
            profesor: profesor.to_string(),
        })
    }
}

pub fn template_id(number: u64) -> String {
    format!("{TEMPLATE_ID_PREFIX}{number}")
}

/// Number embedded in a `proyecto_<n>` id.
pub fn template_number(id: &str) -> Option<u64> {
    id.strip_prefix(TEMPLATE_ID_PREFIX)?.parse().ok()
}

/// Highest template number in use, `0` for an empty catalog.
pub fn max_template_number<'a, I>(ids: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    ids.into_iter().filter_map(template_number).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn numbering_ignores_foreign_ids() {
        let ids = ["proyecto_3", "proyecto_10", "legacy", "proyecto_x"];
        assert_eq!(max_template_number(ids), 10);
        assert_eq!(max_template_number(std::iter::empty()), 0);
        assert_eq!(template_id(11), "proyecto_11");
    }

    #[test]
    fn new_trims_and_validates() {
        let t = ProjectTemplate::new("  Robot ", "Marta").unwrap();
        assert_eq!(t.nombre, "Robot");
        assert_matches!(ProjectTemplate::new("Robot", " "), Err(CoreError::Validation(_)));
    }
}
