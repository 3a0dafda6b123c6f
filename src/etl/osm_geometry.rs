//! Builds tile-local geometry for cached OSM elements.

use std::collections::BTreeSet;

use log::debug;

use crate::data::geometry::{Coordinate, Geometry, Line, Polygon};
use crate::data::osm::{Component, Node, OsmId, OsmMapData, Relation, Way};
use crate::etl::multigon;
use crate::tile::TileBounds;

pub struct GeometryBuilder<'a> {
    data: &'a OsmMapData,
    bounds: &'a TileBounds,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a OsmMapData, bounds: &'a TileBounds) -> Self {
        GeometryBuilder { data, bounds }
    }

    /// `None` for elements with nothing to draw: ways without nodes, multipolygons without a
    /// usable outer way. Every relation below `component` is expanded at most once, so repeated
    /// and cyclic references contribute nothing after the first.
    pub fn build(&self, component: Component) -> Option<Geometry> {
        let mut expanded = BTreeSet::new();
        self.build_component(component, &mut expanded)
    }

    fn build_component(&self, component: Component, expanded: &mut BTreeSet<OsmId>) -> Option<Geometry> {
        match component {
            Component::Node(node) => Some(Geometry::Point(self.project(node))),
            Component::Way(way) => self.way_ring(way).map(Geometry::Ring),
            Component::Relation(relation) if relation.is_multigon => self.multigon(relation),
            Component::Relation(relation) => {
                if !expanded.insert(relation.info.id) {
                    debug!(relation_id = relation.info.id; "Relation already expanded, skipping member");
                    return None;
                }
                let components = relation.members.iter()
                    .filter_map(|member| self.data.resolve(member.component))
                    .filter_map(|member| self.build_component(member, expanded))
                    .collect();
                Some(Geometry::composite(components))
            }
        }
    }

    fn project(&self, node: &Node) -> Coordinate {
        self.bounds.project(node.coordinate)
    }

    fn project_ids(&self, ids: &[OsmId]) -> Vec<Coordinate> {
        ids.iter()
            .filter_map(|id| self.data.nodes.get(id))
            .map(|node| self.project(node))
            .collect()
    }

    fn way_ring(&self, way: &Way) -> Option<Line> {
        if way.nodes.is_empty() {
            return None;
        }
        Some(Line::new(self.project_ids(&way.nodes), way.is_closed()))
    }

    fn multigon(&self, relation: &Relation) -> Option<Geometry> {
        let cache = relation.multigon_cache.as_ref()?;
        let ids = multigon::ring_node_ids(cache, &self.data.ways);
        if ids.is_empty() {
            return None;
        }
        let outer = Line::new(self.project_ids(&ids), cache.is_closed);
        Some(Geometry::Polygon(Polygon {
            outer,
            inner: Vec::new(),
            unstitched_fragments: (cache.leftover_outer + cache.inner_count) as u32,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::LatLong;
    use crate::data::osm::{ElementInfo, Member, MemberRef};
    use crate::shape::{self, Space};

    fn arena() -> OsmMapData {
        let mut data = OsmMapData::default();
        let positions = [(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0), (4, 1.0, 0.0)];
        for (id, lat, lon) in positions {
            data.nodes.insert(id, Node { info: ElementInfo::new(id), coordinate: LatLong::new(lat, lon) });
        }
        data.ways.insert(10, Way { info: ElementInfo::new(10), nodes: vec![1, 2, 3] });
        data.ways.insert(11, Way { info: ElementInfo::new(11), nodes: vec![1, 4, 3] });
        data.ways.insert(12, Way { info: ElementInfo::new(12), nodes: vec![1, 2, 3, 4, 1] });
        data
    }

    fn bounds() -> TileBounds {
        TileBounds::new(LatLong::new(2.0, -1.0), LatLong::new(-1.0, 2.0))
    }

    fn relation(id: OsmId, members: &[(MemberRef, &str)]) -> Relation {
        let mut relation = Relation::new(ElementInfo::new(id));
        for (component, role) in members {
            relation.add_member(Member { component: *component, role: role.to_string() });
        }
        relation
    }

    #[test]
    fn nodes_and_ways() {
        let data = arena();
        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);

        let point = builder.build(Component::Node(&data.nodes[&1])).unwrap();
        assert!(matches!(point, Geometry::Point(c) if c.global == LatLong::new(0.0, 0.0)));

        let open = builder.build(Component::Way(&data.ways[&10])).unwrap();
        let line = open.main_segment().unwrap();
        assert!(!line.is_closed());
        assert_eq!(line.len(), 3);

        let closed = builder.build(Component::Way(&data.ways[&12])).unwrap();
        let line = closed.main_segment().unwrap();
        assert!(line.is_closed());
        assert_eq!(line.len(), 4);
        assert_eq!(line.is_clockwise(), shape::shoelace_sum(line.coordinates(), Space::Local) > 0.0);
    }

    #[test]
    fn multigon_becomes_polygon() {
        let mut data = arena();
        let mut outer = relation(20, &[(MemberRef::Way(10), "outer"), (MemberRef::Way(11), "outer")]);
        outer.multigon_cache = multigon::stitch_outer_ring(&outer, &data.ways);
        data.relations.insert(20, outer);

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);
        let geometry = builder.build(Component::Relation(&data.relations[&20])).unwrap();
        let Geometry::Polygon(polygon) = &geometry else { panic!("expected polygon") };
        assert!(polygon.outer.is_closed());
        assert_eq!(polygon.outer.len(), 4);
        assert_eq!(polygon.unstitched_fragments, 0);
    }

    #[test]
    fn multigon_without_outer_has_no_geometry() {
        let mut data = arena();
        let mut holes = relation(20, &[(MemberRef::Way(12), "inner")]);
        holes.multigon_cache = multigon::stitch_outer_ring(&holes, &data.ways);
        data.relations.insert(20, holes);

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);
        assert!(builder.build(Component::Relation(&data.relations[&20])).is_none());
    }

    #[test]
    fn plain_relation_keeps_member_order() {
        let mut data = arena();
        data.relations.insert(30, relation(30, &[(MemberRef::Way(12), ""), (MemberRef::Node(2), "label")]));

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);
        let geometry = builder.build(Component::Relation(&data.relations[&30])).unwrap();
        let Geometry::Composite { components, .. } = &geometry else { panic!("expected composite") };
        assert_eq!(components.len(), 2);
        assert!(matches!(components[0], Geometry::Ring(_)));
        assert!(matches!(components[1], Geometry::Point(_)));
    }

    #[test]
    fn relation_cycles_terminate() {
        let mut data = arena();
        data.relations.insert(40, relation(40, &[(MemberRef::Relation(41), ""), (MemberRef::Node(1), "")]));
        data.relations.insert(41, relation(41, &[(MemberRef::Relation(40), "")]));
        data.relations.insert(42, relation(42, &[(MemberRef::Relation(42), "")]));

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);

        let geometry = builder.build(Component::Relation(&data.relations[&40])).unwrap();
        let Geometry::Composite { components, .. } = &geometry else { panic!("expected composite") };
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].component_count(), 0);

        let own = builder.build(Component::Relation(&data.relations[&42])).unwrap();
        assert_eq!(own.component_count(), 0);
    }

    #[test]
    fn shared_members_expand_once() {
        let mut data = arena();
        data.relations.insert(50, relation(50, &[(MemberRef::Node(1), "")]));
        data.relations.insert(51, relation(51, &[(MemberRef::Relation(50), ""), (MemberRef::Relation(50), "")]));

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);
        let geometry = builder.build(Component::Relation(&data.relations[&51])).unwrap();
        let Geometry::Composite { components, .. } = &geometry else { panic!("expected composite") };
        assert_eq!(components.iter().map(Geometry::component_count).collect::<Vec<_>>(), vec![1]);

        // Each build starts over, so the shared relation is not lost for the next element.
        let again = builder.build(Component::Relation(&data.relations[&50])).unwrap();
        assert_eq!(again.component_count(), 1);
    }

    fn point_count(geometry: &Geometry) -> usize {
        match geometry {
            Geometry::Point(_) => 1,
            Geometry::Composite { components, .. } => components.iter().map(point_count).sum(),
            _ => 0,
        }
    }

    #[test]
    fn doubled_member_chain_stays_linear() {
        let mut data = arena();
        data.relations.insert(100, relation(100, &[(MemberRef::Node(1), "")]));
        for depth in 1..=40 {
            let child = MemberRef::Relation(100 + depth - 1);
            data.relations.insert(100 + depth, relation(100 + depth, &[(child, ""), (child, "")]));
        }

        let bounds = bounds();
        let builder = GeometryBuilder::new(&data, &bounds);
        let geometry = builder.build(Component::Relation(&data.relations[&140])).unwrap();
        assert_eq!(point_count(&geometry), 1);
    }
}
