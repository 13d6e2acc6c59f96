use serde::Deserialize;

use crate::FormatError;

/// Tabular form shared by every file boundary of the pipeline: a
/// header row plus string cells, one vector per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    pub fn from_csv(content: &str) -> Result<Self, FormatError> {
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

        let mut rows = vec![];
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn to_csv_string(&self) -> Result<String, FormatError> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| FormatError::Serialize(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| FormatError::Serialize(err.to_string()))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One directed entry of the distance source table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistanceRecord {
    pub from: String,
    pub to: String,
    pub distance: f64,
}
