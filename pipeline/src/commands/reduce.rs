use std::fs;

use anyhow::Result;
use dispatch::model::ModelInput;
use dispatch::reducer::{ReducerOptions, SearchSpaceReducer};
use log::{debug, info, trace};
use order_parser::{parse_distance_csv, parse_order_csv};

use crate::Reduce;

pub fn reduce(args: Reduce) -> Result<()> {
    let order_contents = fs::read_to_string(&args.model_input)?;
    let distance_contents = fs::read_to_string(&args.distance)?;
    trace!("order file contents: {order_contents}");

    let orders = parse_order_csv(&order_contents)?;
    let distances = parse_distance_csv(&distance_contents)?;
    let model = ModelInput::from_tables(&orders, &distances)?;
    debug!("loaded model with {} orders", model.len());

    let reducer = SearchSpaceReducer::new(
        args.heuristic.into(),
        ReducerOptions {
            distance_threshold: args.distance_threshold,
            max_resolved: args.max_resolved,
        },
    );
    let (reduced, partial) = reducer.reduce(&model)?;

    info!(
        "resolved {} orders directly, deferred {} for external solving",
        partial.len(),
        reduced.len()
    );

    fs::create_dir_all(&args.model_input_reduced)?;
    fs::create_dir_all(&args.model_result_partial)?;

    let reduced_path = args.model_input_reduced.join("order_reduced.csv");
    fs::write(&reduced_path, reduced.to_order_table().to_csv_string()?)?;

    let partial_path = args.model_result_partial.join("model_result_partial.csv");
    fs::write(&partial_path, partial.to_table().to_csv_string()?)?;

    info!("Wrote reduced model to: {reduced_path:?} and partial result to: {partial_path:?}");

    Ok(())
}
