use log::debug;

use crate::model::{ModelInput, Schedule, ScheduleSchema};
use crate::DispatchError;

pub mod anchor_radius;
pub mod nearest_chain;

pub use anchor_radius::AnchorRadius;
pub use nearest_chain::NearestChain;

/// Selector for the shipped reduction strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    AnchorRadius,
    NearestChain,
}

/// Tunables shared by every strategy.
#[derive(Debug, Clone)]
pub struct ReducerOptions {
    /// Orders farther than this from the resolution frontier stay in
    /// the reduced problem.
    pub distance_threshold: f64,
    /// Upper bound on directly resolved orders; the anchor order is
    /// always resolved.
    pub max_resolved: Option<usize>,
}

impl Default for ReducerOptions {
    fn default() -> Self {
        Self {
            distance_threshold: 10.0,
            max_resolved: None,
        }
    }
}

/// Disjoint split of the order list produced by a strategy. Indices
/// refer into the model's order slice; the ordering of `resolved` is
/// the assignment, rank k becomes sequence position k + 1.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Partition {
    pub resolved: Vec<usize>,
    pub deferred: Vec<usize>,
}

/// One interchangeable reduction heuristic. Implementations must place
/// every order into exactly one group and must be deterministic; the
/// reducer re-checks the partition after the call.
pub trait ReduceStrategy {
    fn partition(
        &self,
        model: &ModelInput,
        options: &ReducerOptions,
    ) -> Result<Partition, DispatchError>;
}

/// Shrinks a problem into a cheaper one for the external solver while
/// resolving what can be decided up front. Pure: no I/O, the input
/// model is never mutated, the outputs are independent copies.
pub struct SearchSpaceReducer {
    options: ReducerOptions,
    strategy: Box<dyn ReduceStrategy>,
}

impl SearchSpaceReducer {
    pub fn new(heuristic: Heuristic, options: ReducerOptions) -> Self {
        let strategy: Box<dyn ReduceStrategy> = match heuristic {
            Heuristic::AnchorRadius => Box::new(AnchorRadius),
            Heuristic::NearestChain => Box::new(NearestChain),
        };

        Self::with_strategy(strategy, options)
    }

    pub fn with_strategy(strategy: Box<dyn ReduceStrategy>, options: ReducerOptions) -> Self {
        Self { options, strategy }
    }

    /// Splits the model into a reduced model for external solving and
    /// a partial schedule of the directly resolved orders. An empty
    /// model yields an empty reduced model and an empty schedule.
    pub fn reduce(&self, model: &ModelInput) -> Result<(ModelInput, Schedule), DispatchError> {
        if model.is_empty() {
            return Ok((model.clone(), Schedule::empty(ScheduleSchema::canonical())));
        }

        let partition = self.strategy.partition(model, &self.options)?;
        verify_partition(model, &partition)?;

        debug!(
            "reduced {} orders to {} deferred, {} resolved directly",
            model.len(),
            partition.deferred.len(),
            partition.resolved.len()
        );

        let reduced = model.with_orders(&partition.deferred);

        let mut partial = Schedule::empty(ScheduleSchema::canonical());
        for (rank, &index) in partition.resolved.iter().enumerate() {
            partial.push(vec![
                model.orders()[index].id.clone(),
                (rank + 1).to_string(),
            ])?;
        }

        Ok((reduced, partial))
    }
}

/// Every order index must land in exactly one group; anything else is
/// a strategy defect and is surfaced, never repaired.
fn verify_partition(model: &ModelInput, partition: &Partition) -> Result<(), DispatchError> {
    let mut placed = vec![false; model.len()];

    for &index in partition.resolved.iter().chain(partition.deferred.iter()) {
        match placed.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => {
                return Err(DispatchError::InternalInvariant(format!(
                    "order index {index} placed in both groups"
                )))
            }
            None => {
                return Err(DispatchError::InternalInvariant(format!(
                    "order index {index} out of range"
                )))
            }
        }
    }

    if let Some(index) = placed.iter().position(|slot| !slot) {
        return Err(DispatchError::InternalInvariant(format!(
            "order index {index} left out of both groups"
        )));
    }

    Ok(())
}
