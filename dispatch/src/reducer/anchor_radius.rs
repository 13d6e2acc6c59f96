use log::trace;

use super::{Partition, ReduceStrategy, ReducerOptions};
use crate::model::ModelInput;
use crate::DispatchError;

/// First-fit heuristic: the first order's location anchors the
/// resolved group; every later order within `distance_threshold` of
/// the anchor joins it, in input order, until `max_resolved` is hit.
pub struct AnchorRadius;

impl ReduceStrategy for AnchorRadius {
    fn partition(
        &self,
        model: &ModelInput,
        options: &ReducerOptions,
    ) -> Result<Partition, DispatchError> {
        let orders = model.orders();

        let Some(anchor) = orders.first() else {
            return Ok(Partition::default());
        };
        let anchor_location = anchor.location.as_str();

        let mut partition = Partition::default();
        partition.resolved.push(0);

        for index in 1..orders.len() {
            let capped = options
                .max_resolved
                .map_or(false, |cap| partition.resolved.len() >= cap);
            if capped {
                partition.deferred.push(index);
                continue;
            }

            let cost = model.distance(anchor_location, &orders[index].location)?;
            trace!("order {} is {cost} away from the anchor", orders[index].id);

            if cost <= options.distance_threshold {
                partition.resolved.push(index);
            } else {
                partition.deferred.push(index);
            }
        }

        Ok(partition)
    }
}
