// The order and distance sources are CSV with headers, the external
// solver results are headerless whitespace tables parsed with chumsky

use chumsky::{prelude::*, Parser};
use structs::{DistanceRecord, Table};
use thiserror::Error;

pub mod structs;

/// Required column of the order source: the unique order key.
pub const ORDER_ID_COLUMN: &str = "order_id";
/// Required column of the order source: the distance lookup key.
pub const LOCATION_COLUMN: &str = "location";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column {0:?}")]
    MissingColumn(&'static str),
    #[error("duplicate order id {0:?}")]
    DuplicateOrderId(String),
    #[error("negative distance {distance} between {from:?} and {to:?}")]
    NegativeDistance {
        from: String,
        to: String,
        distance: f64,
    },
    #[error("solver output parse error")]
    SolverOutput(Vec<Simple<char>>),
    #[error("failed to serialize table: {0}")]
    Serialize(String),
}

/// Parses the order source table. The header row must contain the
/// `order_id` and `location` columns; any further columns are opaque
/// payload carried through the pipeline unchanged.
pub fn parse_order_csv(content: &str) -> Result<Table, FormatError> {
    let table = Table::from_csv(content)?;

    for required in [ORDER_ID_COLUMN, LOCATION_COLUMN] {
        if table.column_index(required).is_none() {
            return Err(FormatError::MissingColumn(required));
        }
    }

    Ok(table)
}

/// Parses the distance source table into directed `(from, to, distance)`
/// records. Costs must be non-negative.
pub fn parse_distance_csv(content: &str) -> Result<Vec<DistanceRecord>, FormatError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    for required in ["from", "to", "distance"] {
        if !headers.iter().any(|header| header == required) {
            return Err(FormatError::MissingColumn(required));
        }
    }

    let mut records = vec![];
    for record in reader.deserialize() {
        let record: DistanceRecord = record?;
        if record.distance < 0.0 {
            return Err(FormatError::NegativeDistance {
                from: record.from,
                to: record.to,
                distance: record.distance,
            });
        }
        records.push(record);
    }

    Ok(records)
}

/// Parses one external solver result file: headerless rows of
/// space-separated fields, one row per line. Blank lines are skipped.
/// Row widths are not checked here; the merger enforces them against
/// the canonical schedule schema.
pub fn parse_solver_output(content: &str) -> Result<Vec<Vec<String>>, FormatError> {
    solver_output_parser()
        .parse(content)
        .map_err(FormatError::SolverOutput)
}

pub(crate) fn solver_output_parser() -> impl Parser<char, Vec<Vec<String>>, Error = Simple<char>> {
    let field = filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("field");

    let row = field
        .separated_by(just(' ').repeated().at_least(1))
        .at_least(1)
        .labelled("row");

    text::whitespace()
        .ignore_then(row.then_ignore(text::whitespace()).repeated())
        .then_ignore(end())
}
