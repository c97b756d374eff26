use std::collections::BTreeMap;

use anyhow::Result;

use feed::{Direction, RouteStop, ScheduledStops, StopID};

use crate::{NodeID, StopChain, StopNode};

/// Seeds one chain per schedule entry, with nodes in published order. Fails if any scheduled stop
/// can't be named; the caller should just try again later with fresher data.
pub fn build_chains(schedules: &[ScheduledStops], stops: &[RouteStop]) -> Result<Vec<StopChain>> {
    if schedules.is_empty() {
        bail!("No schedule");
    }
    if stops.is_empty() {
        bail!("No stops");
    }
    let names: BTreeMap<&StopID, &str> = stops
        .iter()
        .map(|stop| (&stop.stop_id, stop.name.as_str()))
        .collect();

    let mut chains = Vec::new();
    for schedule in schedules {
        if schedule.stops.is_empty() {
            bail!(
                "Schedule from {} to {} has no stops",
                schedule.dates.begin,
                schedule.dates.end
            );
        }
        let mut chain = StopChain::new(schedule.dates.clone(), schedule.hours.clone());
        let mut order: Vec<NodeID> = Vec::new();
        for stop in &schedule.stops {
            let name = match names.get(&stop.id) {
                Some(x) => x.to_string(),
                None => bail!("Scheduled stop {} isn't in the route's stops", stop.id),
            };
            let id = chain.add(StopNode::new(name, true, Some(stop.id.clone()), None));
            if let Some(prev) = order.last() {
                chain.set_upstream(id, *prev, true);
            }
            order.push(id);
        }
        assign_directions(&mut chain, &order)?;
        chains.push(chain);
    }
    Ok(chains)
}

/// A stop visited twice in one schedule is assumed to be passed outbound, then inbound. Stops
/// visited once have no inherent direction.
fn assign_directions(chain: &mut StopChain, order: &[NodeID]) -> Result<()> {
    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, id) in order.iter().enumerate() {
        if let Some(node) = chain.get(*id) {
            positions
                .entry(node.name.clone())
                .or_insert_with(Vec::new)
                .push(idx);
        }
    }
    if let Some((name, list)) = positions.iter().find(|(_, list)| list.len() > 2) {
        bail!(
            "{name} is scheduled {} times; only out-and-back is supported",
            list.len()
        );
    }

    let last_idx = order.len().saturating_sub(1);
    for (idx, id) in order.iter().enumerate() {
        let node = match chain.get_mut(*id) {
            Some(node) => node,
            None => continue,
        };
        let same_name = &positions[&node.name];
        if same_name.len() < 2 {
            continue;
        }
        node.direction = if idx == 0 {
            Direction::Outbound
        } else if idx == last_idx {
            Direction::Inbound
        } else if Some(&idx) == same_name.iter().min() {
            Direction::Outbound
        } else if Some(&idx) == same_name.iter().max() {
            Direction::Inbound
        } else {
            Direction::Unknown
        };
    }
    Ok(())
}
