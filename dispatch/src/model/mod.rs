use hashbrown::{HashMap, HashSet};

use order_parser::structs::{DistanceRecord, Table};
use order_parser::{FormatError, LOCATION_COLUMN, ORDER_ID_COLUMN};

use crate::DispatchError;

/// Decision column of the canonical schedule schema.
pub const POSITION_COLUMN: &str = "position";

/// An atomic schedulable unit: a unique key, a location usable for
/// distance lookup, and any extra source columns carried through
/// reduction and merge unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub location: String,
    pub payload: Vec<String>,
}

/// Cost lookup between the locations referenced by orders. Storage is
/// directed; a symmetric source simply lists both directions.
#[derive(Debug, Clone, Default)]
pub struct DistanceMatrix {
    costs: HashMap<String, HashMap<String, f64>>,
    locations: HashSet<String>,
}

impl DistanceMatrix {
    pub fn from_records(records: &[DistanceRecord]) -> Self {
        let mut costs: HashMap<String, HashMap<String, f64>> = HashMap::new();
        let mut locations = HashSet::new();

        for record in records {
            costs
                .entry(record.from.clone())
                .or_default()
                .insert(record.to.clone(), record.distance);
            locations.insert(record.from.clone());
            locations.insert(record.to.clone());
        }

        Self { costs, locations }
    }

    /// Cost of travelling from `from` to `to`; fails if either endpoint
    /// has no entry in that direction.
    pub fn distance(&self, from: &str, to: &str) -> Result<f64, DispatchError> {
        let row = self
            .costs
            .get(from)
            .ok_or_else(|| DispatchError::Lookup(from.to_owned()))?;

        row.get(to)
            .copied()
            .ok_or_else(|| DispatchError::Lookup(to.to_owned()))
    }

    /// Whether the location appears anywhere in the matrix.
    pub fn knows(&self, location: &str) -> bool {
        self.locations.contains(location)
    }
}

/// The scheduling problem: the order set plus its distance matrix.
/// Built once from the two source tables and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ModelInput {
    columns: Vec<String>,
    id_index: usize,
    location_index: usize,
    orders: Vec<Order>,
    distances: DistanceMatrix,
}

impl ModelInput {
    /// Materializes the model from the parsed order table and distance
    /// records. Order ids must be unique and every referenced location
    /// must appear in the distance matrix.
    pub fn from_tables(
        orders: &Table,
        distances: &[DistanceRecord],
    ) -> Result<Self, DispatchError> {
        let id_index = orders
            .column_index(ORDER_ID_COLUMN)
            .ok_or(FormatError::MissingColumn(ORDER_ID_COLUMN))?;
        let location_index = orders
            .column_index(LOCATION_COLUMN)
            .ok_or(FormatError::MissingColumn(LOCATION_COLUMN))?;

        let matrix = DistanceMatrix::from_records(distances);

        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(orders.len());
        for row in &orders.rows {
            let id = row
                .get(id_index)
                .cloned()
                .ok_or(FormatError::MissingColumn(ORDER_ID_COLUMN))?;
            let location = row
                .get(location_index)
                .cloned()
                .ok_or(FormatError::MissingColumn(LOCATION_COLUMN))?;

            if !seen.insert(id.clone()) {
                return Err(FormatError::DuplicateOrderId(id).into());
            }
            if !matrix.knows(&location) {
                return Err(DispatchError::Lookup(location));
            }

            let payload = row
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != id_index && *index != location_index)
                .map(|(_, cell)| cell.clone())
                .collect();

            parsed.push(Order {
                id,
                location,
                payload,
            });
        }

        Ok(Self {
            columns: orders.columns.clone(),
            id_index,
            location_index,
            orders: parsed,
            distances: matrix,
        })
    }

    /// Tabular projection of the order set, in internal iteration
    /// order, with the source column layout. Persisting this table and
    /// loading it back yields an identical model.
    pub fn to_order_table(&self) -> Table {
        let mut table = Table::new(self.columns.clone());

        for order in &self.orders {
            let mut payload = order.payload.iter();
            let mut row = Vec::with_capacity(self.columns.len());
            for index in 0..self.columns.len() {
                if index == self.id_index {
                    row.push(order.id.clone());
                } else if index == self.location_index {
                    row.push(order.location.clone());
                } else {
                    row.push(payload.next().cloned().unwrap_or_default());
                }
            }
            table.rows.push(row);
        }

        table
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn distance(&self, from: &str, to: &str) -> Result<f64, DispatchError> {
        self.distances.distance(from, to)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Independent copy of the model restricted to the given order
    /// indices, keeping their relative order. The distance matrix is
    /// copied as well so the result never aliases the source.
    pub(crate) fn with_orders(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            id_index: self.id_index,
            location_index: self.location_index,
            orders: indices
                .iter()
                .map(|&index| self.orders[index].clone())
                .collect(),
            distances: self.distances.clone(),
        }
    }
}

/// Column layout shared by the partial schedule and every merged
/// result row. The first column is always the order key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSchema {
    columns: Vec<String>,
}

impl ScheduleSchema {
    /// The schema the reducer writes and the merger imposes on
    /// headerless solver results.
    pub fn canonical() -> Self {
        Self {
            columns: vec![ORDER_ID_COLUMN.to_owned(), POSITION_COLUMN.to_owned()],
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// A partial or final assignment from order to scheduling decision.
/// Beyond the leading order key the columns are opaque to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    schema: ScheduleSchema,
    rows: Vec<Vec<String>>,
}

impl Schedule {
    pub fn empty(schema: ScheduleSchema) -> Self {
        Self {
            schema,
            rows: vec![],
        }
    }

    /// Appends a row, enforcing the schema width.
    pub fn push(&mut self, row: Vec<String>) -> Result<(), DispatchError> {
        if row.len() != self.schema.width() {
            return Err(DispatchError::SchemaMismatch {
                expected: self.schema.width(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn schema(&self) -> &ScheduleSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn order_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row[0].as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new(self.schema.columns.clone());
        table.rows = self.rows.clone();
        table
    }

    /// Re-reads a persisted schedule. The table's header becomes the
    /// schema; the leading column must be the order key.
    pub fn from_table(table: &Table) -> Result<Self, DispatchError> {
        if table.columns.first().map(String::as_str) != Some(ORDER_ID_COLUMN) {
            return Err(FormatError::MissingColumn(ORDER_ID_COLUMN).into());
        }

        let schema = ScheduleSchema {
            columns: table.columns.clone(),
        };
        let mut schedule = Schedule::empty(schema);
        for row in &table.rows {
            schedule.push(row.clone())?;
        }

        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use order_parser::structs::{DistanceRecord, Table};
    use order_parser::FormatError;

    use super::{ModelInput, Schedule, ScheduleSchema};
    use crate::DispatchError;

    fn order_table(rows: &[(&str, &str, &str)]) -> Table {
        let mut table = Table::new(vec![
            "order_id".to_owned(),
            "location".to_owned(),
            "weight".to_owned(),
        ]);
        for (id, location, weight) in rows {
            table.rows.push(vec![
                (*id).to_owned(),
                (*location).to_owned(),
                (*weight).to_owned(),
            ]);
        }
        table
    }

    fn full_matrix(locations: &[&str]) -> Vec<DistanceRecord> {
        let mut records = vec![];
        for from in locations {
            for to in locations {
                if from != to {
                    records.push(DistanceRecord {
                        from: (*from).to_owned(),
                        to: (*to).to_owned(),
                        distance: 1.0,
                    });
                }
            }
        }
        records
    }

    #[test]
    fn model_from_tables() {
        let table = order_table(&[("A", "1", "10"), ("B", "2", "20")]);
        let model = ModelInput::from_tables(&table, &full_matrix(&["1", "2"])).unwrap();

        assert_eq!(model.len(), 2);
        assert_eq!(model.orders()[0].id, "A");
        assert_eq!(model.orders()[1].location, "2");
        assert_eq!(model.orders()[1].payload, vec!["20"]);
    }

    #[test]
    fn model_rejects_duplicate_order_id() {
        let table = order_table(&[("A", "1", "10"), ("A", "2", "20")]);
        let result = ModelInput::from_tables(&table, &full_matrix(&["1", "2"]));

        assert!(matches!(
            result,
            Err(DispatchError::Format(FormatError::DuplicateOrderId(id))) if id == "A"
        ));
    }

    #[test]
    fn model_rejects_unknown_location() {
        let table = order_table(&[("A", "1", "10"), ("B", "9", "20")]);
        let result = ModelInput::from_tables(&table, &full_matrix(&["1", "2"]));

        assert!(matches!(result, Err(DispatchError::Lookup(location)) if location == "9"));
    }

    #[test]
    fn distance_lookup_fails_for_missing_pair() {
        let table = order_table(&[("A", "1", "10")]);
        let records = vec![DistanceRecord {
            from: "1".to_owned(),
            to: "2".to_owned(),
            distance: 3.0,
        }];
        let model = ModelInput::from_tables(&table, &records).unwrap();

        assert_eq!(model.distance("1", "2").unwrap(), 3.0);
        assert!(matches!(
            model.distance("2", "1"),
            Err(DispatchError::Lookup(location)) if location == "2"
        ));
    }

    #[test]
    fn order_table_round_trip() {
        let table = order_table(&[("A", "1", "10"), ("B", "2", "20"), ("C", "1", "30")]);
        let model = ModelInput::from_tables(&table, &full_matrix(&["1", "2"])).unwrap();

        assert_eq!(model.to_order_table(), table);
    }

    #[test]
    fn schedule_enforces_schema_width() {
        let mut schedule = Schedule::empty(ScheduleSchema::canonical());

        schedule
            .push(vec!["A".to_owned(), "1".to_owned()])
            .unwrap();
        let result = schedule.push(vec!["B".to_owned()]);

        assert!(matches!(
            result,
            Err(DispatchError::SchemaMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn schedule_table_round_trip() {
        let mut schedule = Schedule::empty(ScheduleSchema::canonical());
        schedule
            .push(vec!["A".to_owned(), "1".to_owned()])
            .unwrap();
        schedule
            .push(vec!["B".to_owned(), "2".to_owned()])
            .unwrap();

        let restored = Schedule::from_table(&schedule.to_table()).unwrap();

        assert_eq!(schedule, restored);
    }
}
