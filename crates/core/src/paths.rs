//! Store path and key naming conventions.
//!
//! Every path the application reads or writes is built here so the
//! repositories and the promotion engine agree on the tree layout:
//!
//! ```text
//! proyectos/proyectos_sanitizado_<level>/<key>   student records
//! alumnos_egresados/<key>_<year>                  graduate archive
//! usuarios/<sanitized email>                      login/role entries
//! CatalogoProyectos/proyecto_<n>                  project templates
//! promociones/<year>                              promotion saga log
//! ```

use crate::grade::GradeLevel;
use crate::types::Year;

pub const PROJECTS_ROOT: &str = "proyectos";
pub const GRADUATES_ROOT: &str = "alumnos_egresados";
pub const USERS_ROOT: &str = "usuarios";
pub const CATALOG_ROOT: &str = "CatalogoProyectos";
pub const PROMOTIONS_ROOT: &str = "promociones";

/// Characters a single path segment may not contain.
pub const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// Separator between the branch name and the sequence number in a student key.
const STUDENT_KEY_INFIX: &str = "_alumno_";

pub fn branch_path(level: GradeLevel) -> String {
    format!("{PROJECTS_ROOT}/{}", level.branch_name())
}

pub fn student_path(level: GradeLevel, key: &str) -> String {
    format!("{}/{key}", branch_path(level))
}

/// Key for a newly created student: `proyectos_sanitizado_<level>_alumno_<seq>`.
///
/// # Examples
///
/// ```
/// use ipa_core::grade::GradeLevel;
/// use ipa_core::paths::student_key;
///
/// assert_eq!(student_key(GradeLevel::Second, 4), "proyectos_sanitizado_2n_alumno_4");
/// ```
pub fn student_key(level: GradeLevel, sequence: u64) -> String {
    format!("{}{STUDENT_KEY_INFIX}{sequence}", level.branch_name())
}

/// Sequence number embedded in a student key, if it follows the convention.
pub fn student_sequence(key: &str) -> Option<u64> {
    let (_, tail) = key.rsplit_once(STUDENT_KEY_INFIX)?;
    tail.parse().ok()
}

/// Next free sequence number for a branch holding `existing_keys`.
///
/// Starts at the branch size, as older keys were numbered, but never
/// reuses a sequence number that is still present after deletions.
pub fn next_student_sequence<'a, I>(existing_keys: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut count = 0u64;
    let mut max_next = 0u64;
    for key in existing_keys {
        count += 1;
        if let Some(seq) = student_sequence(key) {
            max_next = max_next.max(seq + 1);
        }
    }
    count.max(max_next)
}

/// Rewrite a student key from one branch to another by substituting the
/// branch name fragment. Keys that do not contain the fragment are kept.
pub fn rebase_student_key(key: &str, from: GradeLevel, to: GradeLevel) -> String {
    key.replacen(&from.branch_name(), &to.branch_name(), 1)
}

/// Archive key for a graduate: `<student key>_<year>`.
pub fn graduate_key(student_key: &str, year: Year) -> String {
    format!("{student_key}_{year}")
}

pub fn graduate_path(graduate_key: &str) -> String {
    format!("{GRADUATES_ROOT}/{graduate_key}")
}

/// Derive a store-safe key from an email by replacing `.` and `@` with `_`.
///
/// # Examples
///
/// ```
/// use ipa_core::paths::sanitize_email_key;
///
/// assert_eq!(sanitize_email_key("ana.puig@institut.cat"), "ana_puig_institut_cat");
/// ```
pub fn sanitize_email_key(email: &str) -> String {
    email.trim().replace(['.', '@'], "_")
}

/// Whether `key` addresses exactly one child: non-empty, no `/`, none of
/// [`FORBIDDEN_KEY_CHARS`].
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('/') && !key.contains(FORBIDDEN_KEY_CHARS)
}

/// Account key for an email, `None` when the sanitized form is not a
/// usable key.
pub fn email_account_key(email: &str) -> Option<String> {
    let key = sanitize_email_key(email);
    is_valid_key(&key).then_some(key)
}

pub fn user_path(account_key: &str) -> String {
    format!("{USERS_ROOT}/{account_key}")
}

pub fn catalog_path(template_id: &str) -> String {
    format!("{CATALOG_ROOT}/{template_id}")
}

pub fn promotion_path(year: Year) -> String {
    format!("{PROMOTIONS_ROOT}/{year}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_and_student_paths() {
        assert_eq!(
            branch_path(GradeLevel::Third),
            "proyectos/proyectos_sanitizado_3r"
        );
        assert_eq!(
            student_path(GradeLevel::First, "proyectos_sanitizado_1r_alumno_0"),
            "proyectos/proyectos_sanitizado_1r/proyectos_sanitizado_1r_alumno_0"
        );
    }

    #[test]
    fn sequence_parsing() {
        assert_eq!(student_sequence("proyectos_sanitizado_1r_alumno_12"), Some(12));
        assert_eq!(student_sequence("legacy-key"), None);
        assert_eq!(student_sequence("proyectos_sanitizado_1r_alumno_x"), None);
    }

    #[test]
    fn next_sequence_starts_at_branch_size() {
        assert_eq!(next_student_sequence(Vec::<&str>::new()), 0);
        let keys = ["proyectos_sanitizado_1r_alumno_0", "proyectos_sanitizado_1r_alumno_1"];
        assert_eq!(next_student_sequence(keys), 2);
    }

    #[test]
    fn next_sequence_skips_surviving_keys_after_deletion() {
        // alumno_0 was deleted; a count-based id would collide with alumno_1.
        let keys = ["proyectos_sanitizado_1r_alumno_1"];
        assert_eq!(next_student_sequence(keys), 2);
    }

    #[test]
    fn rebase_substitutes_branch_fragment() {
        assert_eq!(
            rebase_student_key(
                "proyectos_sanitizado_3r_alumno_7",
                GradeLevel::Third,
                GradeLevel::Fourth
            ),
            "proyectos_sanitizado_4t_alumno_7"
        );
    }

    #[test]
    fn rebase_keeps_foreign_keys() {
        assert_eq!(
            rebase_student_key("imported-42", GradeLevel::First, GradeLevel::Second),
            "imported-42"
        );
    }

    #[test]
    fn graduate_key_appends_year() {
        let key = graduate_key("proyectos_sanitizado_4t_alumno_0", 2025);
        assert_eq!(key, "proyectos_sanitizado_4t_alumno_0_2025");
        assert_eq!(
            graduate_path(&key),
            "alumnos_egresados/proyectos_sanitizado_4t_alumno_0_2025"
        );
    }

    #[test]
    fn sanitize_replaces_dots_and_at() {
        assert_eq!(sanitize_email_key("a.b@c.d"), "a_b_c_d");
        assert_eq!(sanitize_email_key("  plain "), "plain");
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key("proyectos_sanitizado_1r_alumno_0"));
        assert!(is_valid_key("proyecto_3"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("proyectos_sanitizado_1r_alumno_0/proyectos"));
        for bad in ["a.b", "a#b", "a$b", "a[b", "a]b"] {
            assert!(!is_valid_key(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn email_account_key_rejects_unusable_emails() {
        assert_eq!(email_account_key("ana@ipa.cat").as_deref(), Some("ana_ipa_cat"));
        assert_eq!(email_account_key("ana#1@ipa.cat"), None);
        assert_eq!(email_account_key("a/b@ipa.cat"), None);
        assert_eq!(email_account_key("  "), None);
    }
}
