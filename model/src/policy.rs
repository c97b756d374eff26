//! Tie-breakers used when folding observations into a chain disagrees with what's already there.
//! Both return `(kept, dropped)`, and keep `a` when the upstream counts are equal.

use crate::{NodeID, StopChain};

/// Two candidates for the same downstream link: keep the one closer to the start of the route. The
/// shorter path is assumed to be the more precise one.
pub fn prefer_closer_to_origin(chain: &StopChain, a: NodeID, b: NodeID) -> (NodeID, NodeID) {
    if chain.upstream_count(b) < chain.upstream_count(a) {
        (b, a)
    } else {
        (a, b)
    }
}

/// Two nodes claim the same name and direction: keep the one farther from the start of the route,
/// assuming it's better established.
pub fn prefer_farther_from_origin(chain: &StopChain, a: NodeID, b: NodeID) -> (NodeID, NodeID) {
    if chain.upstream_count(b) > chain.upstream_count(a) {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::linear;

    #[test]
    fn policies_disagree() {
        let (chain, ids) = linear(&["A", "B", "C", "D"]);
        assert_eq!(prefer_closer_to_origin(&chain, ids[3], ids[1]), (ids[1], ids[3]));
        assert_eq!(
            prefer_farther_from_origin(&chain, ids[1], ids[3]),
            (ids[3], ids[1])
        );
    }

    #[test]
    fn ties_keep_the_existing_node() {
        let (chain, ids) = linear(&["A", "B"]);
        assert_eq!(prefer_closer_to_origin(&chain, ids[1], ids[1]), (ids[1], ids[1]));
        assert_eq!(
            prefer_farther_from_origin(&chain, ids[0], ids[0]),
            (ids[0], ids[0])
        );
    }
}
