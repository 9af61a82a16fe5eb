//! Course catalog import from CSV exports (`Course ID,Title,Semester,Capacity,Fee`).

mod parser;

use crate::enrollment::{CourseId, CourseOffering, Money, SemesterId};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidCapacity { line: usize, value: String },
    InvalidFee { line: usize, value: String },
    MissingSemester { line: usize },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read course catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid course catalog CSV: {}", err),
            CatalogImportError::InvalidCapacity { line, value } => write!(
                f,
                "line {line}: capacity '{value}' must be a positive whole number"
            ),
            CatalogImportError::InvalidFee { line, value } => {
                write!(f, "line {line}: fee '{value}' is not a currency amount")
            }
            CatalogImportError::MissingSemester { line } => {
                write!(f, "line {line}: semester is required")
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CourseCatalogImporter;

impl CourseCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CourseOffering>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CourseOffering>, CatalogImportError> {
        parser::parse_rows(reader)?
            .into_iter()
            .map(|(line, row)| {
                let semester = row.semester.trim();
                if semester.is_empty() {
                    return Err(CatalogImportError::MissingSemester { line });
                }

                let raw_capacity = row.capacity.unwrap_or_default();
                let max_capacity = raw_capacity
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|capacity| *capacity > 0)
                    .ok_or_else(|| CatalogImportError::InvalidCapacity {
                        line,
                        value: raw_capacity.clone(),
                    })?;

                let fee = match row.fee {
                    Some(raw) => Money::parse_decimal(&raw)
                        .ok_or(CatalogImportError::InvalidFee { line, value: raw })?,
                    None => Money::ZERO,
                };

                let course_id = row.course_id.trim().to_string();
                let title = match row.title.trim() {
                    "" => course_id.clone(),
                    title => title.to_string(),
                };

                Ok(CourseOffering {
                    course_id: CourseId(course_id),
                    title,
                    semester_id: SemesterId::new(semester),
                    max_capacity,
                    fee,
                })
            })
            .collect()
    }
}
