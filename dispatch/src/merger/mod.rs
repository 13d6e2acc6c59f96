use hashbrown::HashMap;
use log::debug;

use crate::model::{ModelInput, Schedule};
use crate::DispatchError;

/// Reconciles the reducer's partial schedule with the externally
/// solved shard tables into one complete schedule. Pure and
/// deterministic; merging the same inputs twice yields the same rows.
pub struct ResultMerger;

impl ResultMerger {
    /// Imposes the partial schedule's schema onto every headerless
    /// shard row by position, concatenates everything, and checks that
    /// the result covers the original model's order keys exactly once
    /// each. Row order is partial rows first, then the shards as
    /// supplied; callers wanting source order re-sort by order key.
    pub fn merge(
        &self,
        original: &ModelInput,
        partial: &Schedule,
        shards: &[Vec<Vec<String>>],
    ) -> Result<Schedule, DispatchError> {
        let mut merged = Schedule::empty(partial.schema().clone());

        for row in partial.rows() {
            merged.push(row.clone())?;
        }
        for shard in shards {
            for row in shard {
                merged.push(row.clone())?;
            }
        }

        debug!(
            "merged {} partial rows with {} shard rows from {} shards",
            partial.len(),
            merged.len() - partial.len(),
            shards.len()
        );

        verify_coverage(original, &merged)?;

        Ok(merged)
    }
}

/// The merged key multiset must equal the original model's key set.
/// Any omission, duplicate or unknown key is surfaced, never repaired:
/// silent repair could mask a lost or double-scheduled order.
fn verify_coverage(original: &ModelInput, merged: &Schedule) -> Result<(), DispatchError> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in merged.order_ids() {
        *counts.entry(id).or_insert(0) += 1;
    }

    let mut missing = vec![];
    let mut duplicated = vec![];
    for order in original.orders() {
        match counts.remove(order.id.as_str()) {
            None => missing.push(order.id.clone()),
            Some(1) => {}
            Some(_) => duplicated.push(order.id.clone()),
        }
    }

    let mut unknown: Vec<String> = counts.keys().map(|id| (*id).to_owned()).collect();
    unknown.sort_unstable();

    if missing.is_empty() && duplicated.is_empty() && unknown.is_empty() {
        Ok(())
    } else {
        Err(DispatchError::Consistency {
            missing,
            duplicated,
            unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use order_parser::structs::{DistanceRecord, Table};

    use super::ResultMerger;
    use crate::model::{ModelInput, Schedule, ScheduleSchema};
    use crate::reducer::{Heuristic, ReducerOptions, SearchSpaceReducer};
    use crate::DispatchError;

    /// Orders {A,B,C,D} over locations {1,2,3,4} with a full distance
    /// matrix; location 2 sits close to the anchor, 3 and 4 do not.
    fn abcd_model() -> ModelInput {
        let mut table = Table::new(vec!["order_id".to_owned(), "location".to_owned()]);
        for (id, location) in [("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")] {
            table
                .rows
                .push(vec![id.to_owned(), location.to_owned()]);
        }

        let mut records = vec![];
        for (index, from) in ["1", "2", "3", "4"].iter().enumerate() {
            for (jndex, to) in ["1", "2", "3", "4"].iter().enumerate() {
                if index != jndex {
                    let distance = if index + jndex == 1 { 2.0 } else { 25.0 };
                    records.push(DistanceRecord {
                        from: (*from).to_owned(),
                        to: (*to).to_owned(),
                        distance,
                    });
                }
            }
        }

        ModelInput::from_tables(&table, &records).unwrap()
    }

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
            .collect()
    }

    fn sorted_ids(schedule: &Schedule) -> Vec<&str> {
        let mut ids: Vec<&str> = schedule.order_ids().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn merge_reassembles_the_full_order_set() {
        let model = abcd_model();
        let reducer = SearchSpaceReducer::new(
            Heuristic::AnchorRadius,
            ReducerOptions {
                distance_threshold: 10.0,
                max_resolved: None,
            },
        );
        let (reduced, partial) = reducer.reduce(&model).unwrap();

        // A and B resolved directly; the solver returns C and D split
        // over two headerless shards.
        assert_eq!(reduced.len(), 2);
        let shards = vec![rows(&[&["C", "1"]]), rows(&[&["D", "2"]])];

        let merged = ResultMerger.merge(&model, &partial, &shards).unwrap();

        assert_eq!(merged.len(), 4);
        assert_eq!(sorted_ids(&merged), vec!["A", "B", "C", "D"]);
        assert_eq!(merged.schema(), partial.schema());
    }

    #[test]
    fn merge_coerces_headerless_rows_to_the_canonical_schema() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        partial.push(vec!["A".to_owned(), "1".to_owned()]).unwrap();

        let shards = vec![rows(&[&["B", "2"], &["C", "3"]]), rows(&[&["D", "4"]])];
        let merged = ResultMerger.merge(&model, &partial, &shards).unwrap();

        assert_eq!(merged.schema().columns(), ["order_id", "position"]);
        assert_eq!(merged.rows()[3], vec!["D", "4"]);
    }

    #[test]
    fn merge_accepts_zero_shards_when_partial_is_complete() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        for (id, position) in [("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")] {
            partial
                .push(vec![id.to_owned(), position.to_owned()])
                .unwrap();
        }

        let merged = ResultMerger.merge(&model, &partial, &[]).unwrap();

        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn merge_is_idempotent() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        partial.push(vec!["A".to_owned(), "1".to_owned()]).unwrap();
        let shards = vec![rows(&[&["B", "2"], &["C", "3"], &["D", "4"]])];

        let first = ResultMerger.merge(&model, &partial, &shards).unwrap();
        let second = ResultMerger.merge(&model, &partial, &shards).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_key_across_shards_is_a_consistency_error() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        partial.push(vec!["A".to_owned(), "1".to_owned()]).unwrap();

        let shards = vec![
            rows(&[&["B", "2"], &["C", "3"]]),
            rows(&[&["C", "9"], &["D", "4"]]),
        ];
        let result = ResultMerger.merge(&model, &partial, &shards);

        assert!(matches!(
            result,
            Err(DispatchError::Consistency { missing, duplicated, unknown })
                if missing.is_empty() && duplicated == ["C"] && unknown.is_empty()
        ));
    }

    #[test]
    fn missing_key_is_a_consistency_error() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        partial.push(vec!["A".to_owned(), "1".to_owned()]).unwrap();

        let shards = vec![rows(&[&["B", "2"]])];
        let result = ResultMerger.merge(&model, &partial, &shards);

        assert!(matches!(
            result,
            Err(DispatchError::Consistency { missing, duplicated, unknown })
                if missing == ["C", "D"] && duplicated.is_empty() && unknown.is_empty()
        ));
    }

    #[test]
    fn unknown_key_is_a_consistency_error() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        for (id, position) in [("A", "1"), ("B", "2"), ("C", "3"), ("D", "4")] {
            partial
                .push(vec![id.to_owned(), position.to_owned()])
                .unwrap();
        }

        let shards = vec![rows(&[&["E", "5"]])];
        let result = ResultMerger.merge(&model, &partial, &shards);

        assert!(matches!(
            result,
            Err(DispatchError::Consistency { missing, duplicated, unknown })
                if missing.is_empty() && duplicated.is_empty() && unknown == ["E"]
        ));
    }

    #[test]
    fn ragged_shard_row_is_a_schema_mismatch() {
        let model = abcd_model();
        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        partial.push(vec!["A".to_owned(), "1".to_owned()]).unwrap();

        let shards = vec![rows(&[&["B", "2", "extra"]])];
        let result = ResultMerger.merge(&model, &partial, &shards);

        assert!(matches!(
            result,
            Err(DispatchError::SchemaMismatch {
                expected: 2,
                found: 3
            })
        ));
    }
}
