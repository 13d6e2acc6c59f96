use log::trace;

use super::{Partition, ReduceStrategy, ReducerOptions};
use crate::model::ModelInput;
use crate::DispatchError;

/// Greedy nearest-neighbor heuristic: starting at the first order,
/// repeatedly resolve the closest unresolved order as long as the
/// chain step stays within `distance_threshold` and the resolved group
/// stays under `max_resolved`. The visit order is the assignment, so
/// the resolved part of the schedule is already a short route. Ties
/// keep the earlier input position.
pub struct NearestChain;

impl ReduceStrategy for NearestChain {
    fn partition(
        &self,
        model: &ModelInput,
        options: &ReducerOptions,
    ) -> Result<Partition, DispatchError> {
        let orders = model.orders();

        if orders.is_empty() {
            return Ok(Partition::default());
        }

        let mut resolved = vec![0];
        // Stays sorted by input position, `Vec::remove` keeps order.
        let mut remaining: Vec<usize> = (1..orders.len()).collect();
        let mut current = 0;

        loop {
            let capped = options
                .max_resolved
                .map_or(false, |cap| resolved.len() >= cap);
            if capped || remaining.is_empty() {
                break;
            }

            let mut nearest: Option<(usize, f64)> = None;
            for (slot, &candidate) in remaining.iter().enumerate() {
                let cost =
                    model.distance(&orders[current].location, &orders[candidate].location)?;
                let closer = match nearest {
                    None => true,
                    Some((_, best)) => cost < best,
                };
                if closer {
                    nearest = Some((slot, cost));
                }
            }

            match nearest {
                Some((slot, cost)) if cost <= options.distance_threshold => {
                    current = remaining.remove(slot);
                    trace!("chained order {} at cost {cost}", orders[current].id);
                    resolved.push(current);
                }
                _ => break,
            }
        }

        Ok(Partition {
            resolved,
            deferred: remaining,
        })
    }
}
