use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogRow {
    #[serde(rename = "Course ID")]
    pub(crate) course_id: String,
    #[serde(rename = "Title", default)]
    pub(crate) title: String,
    #[serde(rename = "Semester")]
    pub(crate) semester: String,
    #[serde(rename = "Capacity", default, deserialize_with = "empty_string_as_none")]
    pub(crate) capacity: Option<String>,
    #[serde(rename = "Fee", default, deserialize_with = "empty_string_as_none")]
    pub(crate) fee: Option<String>,
}

impl CatalogRow {
    pub(crate) fn is_blank(&self) -> bool {
        self.course_id.trim().is_empty()
    }
}

/// Parsed rows paired with the 1-based line they start on in the source (header is line 1).
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<(usize, CatalogRow)>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut record = csv::StringRecord::new();
    let mut rows = Vec::new();

    while csv_reader.read_record(&mut record)? {
        let row: CatalogRow = record.deserialize(Some(&headers))?;
        if row.is_blank() {
            continue;
        }
        let line = record
            .position()
            .map_or(0, |position| usize::try_from(position.line()).unwrap_or(usize::MAX));
        rows.push((line, row));
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
