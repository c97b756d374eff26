use abstutil::Counter;

use crate::policy::prefer_closer_to_origin;
use crate::{StopChain, StopEntry, StopNode};

// Folding a finished trip into a chain. Vehicles only report the last stop they passed, so a trip
// is a sequence of observations, some matching the schedule and some not. Each consecutive pair
// either confirms what the chain already knows, or teaches it about a stop or link it didn't have.
//
// Everything here is best-effort. A pair that doesn't line up with the chain is skipped, and the
// chain converges over many trips.

/// Merges one trip's observations, sorted by creation time, into the chain.
pub fn fold_trip(chain: &mut StopChain, entries: &[StopEntry], stats: &mut Counter<&'static str>) {
    if entries.iter().all(|e| e.scheduled) {
        stats.inc("trips matching the schedule");
        return;
    }
    stats.inc("trips with unscheduled stops");

    for pair in entries.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        if prev.scheduled && current.scheduled {
            continue;
        }
        if current.scheduled {
            link_to_scheduled(chain, prev, current, stats);
        } else {
            insert_inferred(chain, prev, current, stats);
        }
    }
}

// The vehicle came off an unscheduled stop and rejoined the schedule
fn link_to_scheduled(
    chain: &mut StopChain,
    prev: &StopEntry,
    current: &StopEntry,
    stats: &mut Counter<&'static str>,
) {
    let (prev_id, current_id) = match (
        chain.find(&prev.node_name()),
        chain.find(&current.node_name()),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            debug!(
                "Can't link {} to {}; one isn't in the chain",
                prev.node_name(),
                current.node_name()
            );
            stats.inc("lookup misses");
            return;
        }
    };

    match chain.get(prev_id).and_then(|node| node.downstream) {
        None => {
            chain.set_downstream(prev_id, current_id, false);
            stats.inc("links to the schedule");
        }
        Some(existing) => {
            let (kept, _) = prefer_closer_to_origin(chain, existing, current_id);
            if kept != existing {
                chain.set_downstream(prev_id, kept, false);
                stats.inc("links replaced");
            }
        }
    }
}

fn insert_inferred(
    chain: &mut StopChain,
    prev: &StopEntry,
    current: &StopEntry,
    stats: &mut Counter<&'static str>,
) {
    let prev_id = match chain.find(&prev.node_name()) {
        Some(id) => id,
        None => {
            let first = chain.first();
            let id = chain.add(StopNode::new(
                prev.name.clone(),
                prev.scheduled,
                prev.id.clone(),
                Some(prev.direction),
            ));
            if let Some(first) = first {
                chain.set_upstream(id, first, false);
            }
            stats.inc("inferred stops");
            id
        }
    };

    let id = chain.add(StopNode::new(
        current.name.clone(),
        false,
        current.id.clone(),
        Some(current.direction),
    ));
    chain.set_upstream(id, prev_id, false);
    stats.inc("inferred stops");

    let merged = chain.merge_duplicates();
    if merged > 0 {
        stats.inc("duplicates merged");
    }
}
