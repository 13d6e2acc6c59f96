use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use dispatch::merger::ResultMerger;
use dispatch::model::{ModelInput, Schedule};
use log::{debug, info, trace};
use order_parser::structs::Table;
use order_parser::{parse_distance_csv, parse_order_csv, parse_solver_output};

use crate::Merge;

pub fn merge(args: Merge) -> Result<()> {
    let orders = parse_order_csv(&fs::read_to_string(&args.model_input)?)?;
    let distances = parse_distance_csv(&fs::read_to_string(&args.distance)?)?;
    let model = ModelInput::from_tables(&orders, &distances)?;
    debug!("loaded model with {} orders", model.len());

    let partial_path = args.model_result_partial.join("model_result_partial.csv");
    let partial = Schedule::from_table(&Table::from_csv(&fs::read_to_string(&partial_path)?)?)?;
    debug!("partial result covers {} orders", partial.len());

    if !args.model_result_list.is_dir() {
        anyhow::bail!("model_result_list is not a directory")
    }

    // Shard completion order is arbitrary; sort by file name so the
    // merged row order is reproducible.
    let mut shard_paths: Vec<PathBuf> = args
        .model_result_list
        .read_dir()?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |extension| extension == "txt"))
        .collect();
    shard_paths.sort();

    let mut shards = Vec::with_capacity(shard_paths.len());
    for path in &shard_paths {
        trace!("reading solver result: {path:?}");
        shards.push(parse_solver_output(&fs::read_to_string(path)?)?);
    }
    debug!("collected {} solver result files", shards.len());

    let final_schedule = ResultMerger.merge(&model, &partial, &shards)?;

    fs::create_dir_all(&args.model_result_final)?;
    let final_path = args.model_result_final.join("schedule.csv");
    fs::write(&final_path, final_schedule.to_table().to_csv_string()?)?;

    info!("Wrote final schedule to: {final_path:?}");

    Ok(())
}
