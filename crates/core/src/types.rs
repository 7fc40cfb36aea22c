/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar year as used in promotion history (`años`, `proyectosPorAño`).
pub type Year = i32;
