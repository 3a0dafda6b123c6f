//! Joins the outer ways of a multipolygon relation into one ring.
//!
//! Outer ways come in any order and either direction. Starting from the first outer way, the
//! walk repeatedly looks for an unused way that begins or ends at the current end node, and
//! flips it when it has to be walked backwards. The walk stops when it returns to the first
//! way's start node, or when nothing connects.

use std::collections::BTreeMap;

use log::warn;

use crate::data::osm::{MemberRef, MultigonCache, OsmId, Relation, Segment, Way};

/// Returns `None` when the relation has no usable outer way.
pub fn stitch_outer_ring(relation: &Relation, ways: &BTreeMap<OsmId, Way>) -> Option<MultigonCache> {
    let mut unmatched: Vec<&Way> = relation.members.iter()
        .filter(|member| member.is_outer())
        .filter_map(|member| match member.component {
            MemberRef::Way(id) => ways.get(&id),
            _ => None,
        })
        .filter(|way| !way.nodes.is_empty())
        .collect();
    let inner_count = relation.members.iter().filter(|member| member.is_inner()).count();

    if unmatched.is_empty() {
        return None;
    }

    let start = unmatched.remove(0);
    let ring_start = start.start_node()?;
    let mut outer_segments = vec![Segment { way: start.info.id, reversed: false }];
    let mut current = start;
    let mut reversed = false;
    let mut is_closed = false;

    // Every pass either closes the ring, consumes a way or stops.
    for _ in 0..=unmatched.len() {
        let target = if reversed { current.start_node() } else { current.end_node() };
        let Some(target) = target else { break };
        if target == ring_start {
            is_closed = true;
            break;
        }
        let Some(idx) = unmatched.iter()
            .position(|way| way.start_node() == Some(target) || way.end_node() == Some(target))
        else {
            break;
        };
        let next = unmatched.remove(idx);
        reversed = next.start_node() != Some(target);
        outer_segments.push(Segment { way: next.info.id, reversed });
        current = next;
    }

    let cache = MultigonCache {
        outer_segments,
        is_closed,
        leftover_outer: unmatched.len(),
        inner_count,
    };
    if cache.is_partial() {
        warn!(
            relation_id = relation.info.id,
            leftover_outer = cache.leftover_outer,
            is_closed = cache.is_closed;
            "Partial outer ring reconstruction"
        );
    }
    Some(cache)
}

/// Node ids of the stitched ring in walk order. Nodes shared by consecutive ways appear once,
/// and a closed ring does not repeat its first node at the end.
pub fn ring_node_ids(cache: &MultigonCache, ways: &BTreeMap<OsmId, Way>) -> Vec<OsmId> {
    let mut ids: Vec<OsmId> = Vec::new();
    for segment in &cache.outer_segments {
        let Some(way) = ways.get(&segment.way) else { continue };
        let mut push = |id: OsmId| {
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        };
        if segment.reversed {
            way.nodes.iter().rev().copied().for_each(&mut push);
        } else {
            way.nodes.iter().copied().for_each(&mut push);
        }
    }
    if cache.is_closed && ids.len() > 1 && ids.first() == ids.last() {
        ids.pop();
    }
    ids
}
