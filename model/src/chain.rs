use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use feed::{DateRange, HourRange};

use crate::policy::prefer_farther_from_origin;
use crate::{NodeID, StopNode};

/// The sequence of stops for one schedule window of a route.
///
/// Nodes live in an arena and refer to each other by NodeID. The arena keeps insertion order,
/// which says nothing about upstream/downstream order; walk the links for that.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopChain {
    pub dates: DateRange,
    pub hours: HourRange,
    // Removed nodes leave a hole, so IDs stay stable
    nodes: Vec<Option<StopNode>>,
}

impl StopChain {
    pub fn new(dates: DateRange, hours: HourRange) -> Self {
        Self {
            dates,
            hours,
            nodes: Vec::new(),
        }
    }

    pub fn add(&mut self, node: StopNode) -> NodeID {
        self.nodes.push(Some(node));
        NodeID(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeID) -> Option<&StopNode> {
        self.nodes.get(id.0).and_then(|x| x.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeID) -> Option<&mut StopNode> {
        self.nodes.get_mut(id.0).and_then(|x| x.as_mut())
    }

    /// Live nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeID, &StopNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| node.as_ref().map(|n| (NodeID(idx), n)))
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        self.dates.contains(now.date()) && self.hours.contains(now.time())
    }

    /// Sets the upstream of `id`. If `replace_downstream`, also points `target` back downstream to
    /// `id`. Missing nodes are ignored.
    pub fn set_upstream(&mut self, id: NodeID, target: NodeID, replace_downstream: bool) -> NodeID {
        if self.get(target).is_none() {
            return id;
        }
        if let Some(node) = self.get_mut(id) {
            node.upstream = Some(target);
            if replace_downstream {
                if let Some(other) = self.get_mut(target) {
                    other.downstream = Some(id);
                }
            }
        }
        id
    }

    pub fn set_downstream(&mut self, id: NodeID, target: NodeID, replace_upstream: bool) -> NodeID {
        if self.get(target).is_none() {
            return id;
        }
        if let Some(node) = self.get_mut(id) {
            node.downstream = Some(target);
            if replace_upstream {
                if let Some(other) = self.get_mut(target) {
                    other.upstream = Some(id);
                }
            }
        }
        id
    }

    /// How many hops upstream until reaching the start of the route, or until the links run out.
    /// Only meaningful as a tie-breaker; a partial chain undercounts.
    pub fn upstream_count(&self, id: NodeID) -> usize {
        let mut count = 0;
        let mut current = id;
        // Chains shouldn't have cycles, but don't hang if one sneaks in
        let limit = self.nodes.len();
        while let Some(node) = self.get(current) {
            if node.is_first() || count >= limit {
                break;
            }
            match node.upstream {
                Some(up) if self.get(up).is_some() => {
                    count += 1;
                    current = up;
                }
                _ => break,
            }
        }
        count
    }

    pub fn first(&self) -> Option<NodeID> {
        self.nodes()
            .find(|(_, node)| node.is_first())
            .map(|(id, _)| id)
    }

    pub fn find(&self, node_name: &str) -> Option<NodeID> {
        self.nodes()
            .find(|(_, node)| node.node_name() == node_name)
            .map(|(id, _)| id)
    }

    /// Ignores direction. With a stop visited in both directions, returns the first inserted.
    pub fn find_by_name(&self, name: &str) -> Option<NodeID> {
        self.nodes()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Walks downstream from the start of the route. If no node qualifies as the start yet (no
    /// directions are known), begins from the earliest scheduled node without an upstream.
    pub fn ordered(&self) -> Vec<(NodeID, &StopNode)> {
        let start = self.first().or_else(|| {
            self.nodes()
                .find(|(_, node)| node.scheduled && node.upstream.is_none())
                .map(|(id, _)| id)
        });
        let mut result = Vec::new();
        let mut visited = BTreeSet::new();
        let mut current = start;
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            let node = match self.get(id) {
                Some(node) => node,
                None => break,
            };
            result.push((id, node));
            if node.is_last() {
                break;
            }
            current = node.downstream;
        }
        result
    }

    /// The next scheduled node strictly downstream of `id`.
    pub fn next_scheduled(&self, id: NodeID) -> Option<NodeID> {
        let mut visited = BTreeSet::new();
        let mut current = self.get(id)?.downstream;
        while let Some(next) = current {
            if !visited.insert(next) {
                return None;
            }
            let node = self.get(next)?;
            if node.scheduled {
                return Some(next);
            }
            current = node.downstream;
        }
        None
    }

    /// Removes `removed`, pointing everything that referred to it at `kept` instead.
    pub fn replace(&mut self, removed: NodeID, kept: NodeID) {
        if removed == kept || self.get(kept).is_none() {
            return;
        }
        let old = match self.nodes.get_mut(removed.0).and_then(|x| x.take()) {
            Some(node) => node,
            None => return,
        };

        let ids: Vec<NodeID> = self.nodes().map(|(id, _)| id).collect();
        for id in ids {
            let (upstream, downstream) = match self.get(id) {
                Some(node) => (node.upstream, node.downstream),
                None => continue,
            };

            if upstream == Some(removed) {
                if id == kept {
                    // Skip over the removed node instead of pointing at ourselves
                    if let Some(node) = self.get_mut(id) {
                        node.upstream = old.upstream.filter(|x| *x != kept);
                    }
                } else {
                    // Carry over the forward link too, if the removed node led here
                    self.set_upstream(id, kept, old.downstream == Some(id));
                }
            }

            if downstream == Some(removed) {
                if let Some(node) = self.get_mut(id) {
                    node.downstream = if id == kept {
                        old.downstream.filter(|x| *x != kept)
                    } else {
                        Some(kept)
                    };
                }
            }
        }
    }

    /// Collapses nodes sharing a node name, keeping the one farthest from the start of the route.
    /// Returns how many nodes were removed.
    pub fn merge_duplicates(&mut self) -> usize {
        let mut removed = 0;
        while let Some((a, b)) = self.find_duplicate() {
            let (kept, dropped) = prefer_farther_from_origin(self, a, b);
            debug!(
                "Merging duplicate {:?} into {:?} ({})",
                dropped,
                kept,
                self.get(kept).map(|n| n.node_name()).unwrap_or_default()
            );
            self.replace(dropped, kept);
            removed += 1;
        }
        removed
    }

    fn find_duplicate(&self) -> Option<(NodeID, NodeID)> {
        let mut seen: BTreeMap<String, NodeID> = BTreeMap::new();
        for (id, node) in self.nodes() {
            let name = node.node_name();
            if let Some(other) = seen.get(&name) {
                return Some((*other, id));
            }
            seen.insert(name, id);
        }
        None
    }

    // The stop was reported with a direction, and the chain didn't know it yet. The newly
    // directed node may now share a node name with another, so duplicates get merged right away.
    pub(crate) fn backfill_direction(&mut self, name: &str, direction: feed::Direction) -> usize {
        if !direction.is_known() {
            return 0;
        }
        let mut changed = 0;
        for node in self.nodes.iter_mut().flatten() {
            if node.name == name && !node.direction.is_known() {
                node.direction = direction;
                changed += 1;
            }
        }
        if changed > 0 {
            self.merge_duplicates();
        }
        changed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use feed::Direction;

    use super::*;

    pub fn empty_chain() -> StopChain {
        StopChain::new(
            DateRange {
                begin: NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2022, 9, 30).unwrap(),
            },
            HourRange {
                first: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
                last: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            },
        )
    }

    /// Each name becomes a scheduled node linked to the one before. The first is outbound.
    pub fn linear(names: &[&str]) -> (StopChain, Vec<NodeID>) {
        let mut chain = empty_chain();
        let mut ids: Vec<NodeID> = Vec::new();
        for (idx, name) in names.iter().enumerate() {
            let direction = if idx == 0 {
                Some(Direction::Outbound)
            } else {
                None
            };
            let id = chain.add(StopNode::new(name.to_string(), true, None, direction));
            if let Some(prev) = ids.last() {
                chain.set_upstream(id, *prev, true);
            }
            ids.push(id);
        }
        (chain, ids)
    }

    #[test]
    fn upstream_count() {
        let (chain, ids) = linear(&["A", "B", "C", "D"]);
        assert!(chain.get(ids[0]).unwrap().is_first());
        assert_eq!(chain.upstream_count(ids[3]), 3);
        assert_eq!(chain.upstream_count(ids[0]), 0);
    }

    #[test]
    fn upstream_count_partial_chain() {
        let (mut chain, ids) = linear(&["A", "B", "C", "D"]);
        // Cut B off from A
        chain.get_mut(ids[1]).unwrap().upstream = None;
        assert_eq!(chain.upstream_count(ids[3]), 2);
    }

    #[test]
    fn upstream_count_survives_cycle() {
        let (mut chain, ids) = linear(&["A", "B", "C"]);
        chain.get_mut(ids[0]).unwrap().direction = Direction::Unknown;
        chain.set_upstream(ids[0], ids[2], false);
        assert!(chain.upstream_count(ids[2]) <= 3);
    }

    #[test]
    fn bidirectional_setters() {
        let mut chain = empty_chain();
        let a = chain.add(StopNode::new("A".to_string(), true, None, None));
        let b = chain.add(StopNode::new("B".to_string(), true, None, None));
        let c = chain.add(StopNode::new("C".to_string(), true, None, None));

        chain.set_upstream(b, a, true);
        assert_eq!(chain.get(b).unwrap().upstream, Some(a));
        assert_eq!(chain.get(a).unwrap().downstream, Some(b));

        chain.set_downstream(b, c, false);
        assert_eq!(chain.get(b).unwrap().downstream, Some(c));
        assert_eq!(chain.get(c).unwrap().upstream, None);
    }

    #[test]
    fn ordered_walk() {
        let (mut chain, ids) = linear(&["A", "B", "C"]);
        chain.get_mut(ids[2]).unwrap().direction = Direction::Inbound;
        let names: Vec<&str> = chain
            .ordered()
            .into_iter()
            .map(|(_, n)| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(chain.get(ids[2]).unwrap().is_last());
    }

    #[test]
    fn next_scheduled_skips_inferred() {
        let (mut chain, ids) = linear(&["A", "B"]);
        let x = chain.add(StopNode::new(
            "X".to_string(),
            false,
            None,
            Some(Direction::Outbound),
        ));
        chain.set_upstream(x, ids[0], true);
        chain.set_downstream(x, ids[1], false);
        assert_eq!(chain.next_scheduled(ids[0]), Some(ids[1]));
        assert_eq!(chain.next_scheduled(ids[1]), None);
    }

    #[test]
    fn merge_keeps_farther_node() {
        // A -> B -> X (2 hops) and A -> B -> C -> D -> E -> X (5 hops)
        let (mut chain, ids) = linear(&["A", "B", "C", "D", "E"]);
        let near = chain.add(StopNode::new(
            "X".to_string(),
            false,
            None,
            Some(Direction::Outbound),
        ));
        chain.set_upstream(near, ids[1], false);
        let far = chain.add(StopNode::new(
            "X".to_string(),
            false,
            None,
            Some(Direction::Outbound),
        ));
        chain.set_upstream(far, ids[4], false);
        assert_eq!(chain.upstream_count(near), 2);
        assert_eq!(chain.upstream_count(far), 5);

        // Something inferred after the near copy
        let after = chain.add(StopNode::new(
            "Y".to_string(),
            false,
            None,
            Some(Direction::Outbound),
        ));
        chain.set_upstream(after, near, true);

        assert_eq!(chain.merge_duplicates(), 1);
        assert!(chain.get(near).is_none());
        assert!(chain.get(far).is_some());
        assert_eq!(chain.get(after).unwrap().upstream, Some(far));
        // The removed node led to Y, so the kept one does now
        assert_eq!(chain.get(far).unwrap().downstream, Some(after));
        assert_eq!(chain.find("X-outbound"), Some(far));
    }

    #[test]
    fn backfill_merges_new_duplicate() {
        let (mut chain, ids) = linear(&["A", "B", "C", "D"]);
        let near = chain.add(StopNode::new("X".to_string(), false, None, None));
        chain.set_upstream(near, ids[0], false);
        let far = chain.add(StopNode::new(
            "X".to_string(),
            false,
            None,
            Some(Direction::Outbound),
        ));
        chain.set_upstream(far, ids[3], false);

        assert_eq!(chain.backfill_direction("X", Direction::Outbound), 1);
        assert!(chain.get(near).is_none());
        assert_eq!(chain.find("X-outbound"), Some(far));
        assert_eq!(chain.len(), 5);

        // Nothing left to fill in
        assert_eq!(chain.backfill_direction("X", Direction::Inbound), 0);
        assert_eq!(chain.len(), 5);
    }

    #[test]
    fn replace_redirects_downstream_links() {
        let (mut chain, ids) = linear(&["A", "B", "C"]);
        let copy = chain.add(StopNode::new("C2".to_string(), true, None, None));
        chain.set_downstream(ids[0], copy, false);
        chain.replace(copy, ids[2]);
        assert_eq!(chain.get(ids[0]).unwrap().downstream, Some(ids[2]));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn replace_never_self_links() {
        let (mut chain, ids) = linear(&["A", "B", "C"]);
        // Drop B in favor of C; C used to point upstream at B
        chain.replace(ids[1], ids[2]);
        let c = chain.get(ids[2]).unwrap();
        assert_eq!(c.upstream, Some(ids[0]));
        assert_eq!(chain.get(ids[0]).unwrap().downstream, Some(ids[2]));
    }

    #[test]
    fn serializes_with_indices() {
        let (chain, _) = linear(&["A", "B"]);
        let json = serde_json::to_string(&chain).unwrap();
        let back: StopChain = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.upstream_count(NodeID(1)), 1);
    }
}
