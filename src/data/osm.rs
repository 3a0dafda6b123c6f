use std::collections::BTreeMap;

use crate::data::geometry::LatLong;

pub type OsmId = i64;
pub type Tags = BTreeMap<String, String>;

/// Fields every OSM element carries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ElementInfo {
    pub id: OsmId,
    pub tags: Tags,
}

impl ElementInfo {
    pub fn new(id: OsmId) -> Self {
        ElementInfo { id, tags: Tags::new() }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn has_kv_pair(&self, key: &str, value: &str) -> bool {
        self.tags.get(key).is_some_and(|tag| tag.split(';').any(|part| part.trim() == value))
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn is_path(&self) -> bool {
        self.has_key("highway")
    }

    pub fn is_landuse(&self) -> bool {
        self.has_key("landuse")
    }

    pub fn is_building(&self) -> bool {
        self.has_key("building") || self.has_key("building:part")
    }

    pub fn is_water(&self) -> bool {
        self.has_kv_pair("natural", "water") || self.has_key("waterway") || self.has_key("water")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub info: ElementInfo,
    pub coordinate: LatLong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub info: ElementInfo,
    /// Node ids in order. After loading, every id resolves in the node cache.
    pub nodes: Vec<OsmId>,
}

impl Way {
    pub fn start_node(&self) -> Option<OsmId> {
        self.nodes.first().copied()
    }

    pub fn end_node(&self) -> Option<OsmId> {
        self.nodes.last().copied()
    }

    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.nodes.first() == self.nodes.last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberRef {
    Node(OsmId),
    Way(OsmId),
    Relation(OsmId),
}

impl MemberRef {
    pub fn from_type(member_type: &str, id: OsmId) -> Option<Self> {
        match member_type {
            "node" => Some(MemberRef::Node(id)),
            "way" => Some(MemberRef::Way(id)),
            "relation" => Some(MemberRef::Relation(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub component: MemberRef,
    pub role: String,
}

impl Member {
    pub fn is_outer(&self) -> bool {
        self.role == "outer"
    }

    pub fn is_inner(&self) -> bool {
        self.role == "inner"
    }
}

/// One way of a stitched ring, walked backwards when `reversed` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub way: OsmId,
    pub reversed: bool,
}

/// Result of stitching a multipolygon's outer ways.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MultigonCache {
    pub outer_segments: Vec<Segment>,
    /// The walk came back to the first way's start node.
    pub is_closed: bool,
    /// Outer ways that did not join the ring, e.g. separate islands.
    pub leftover_outer: usize,
    pub inner_count: usize,
}

impl MultigonCache {
    pub fn is_partial(&self) -> bool {
        !self.is_closed || self.leftover_outer > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub info: ElementInfo,
    pub members: Vec<Member>,
    pub is_multigon: bool,
    pub multigon_cache: Option<MultigonCache>,
}

impl Relation {
    pub fn new(info: ElementInfo) -> Self {
        Relation {
            info,
            members: Vec::new(),
            is_multigon: false,
            multigon_cache: None,
        }
    }

    pub fn add_member(&mut self, member: Member) {
        if member.is_outer() || member.is_inner() {
            self.is_multigon = true;
        }
        self.members.push(member);
    }
}

/// Borrowed view of any cached element, for code that treats the three kinds alike.
#[derive(Debug, Clone, Copy)]
pub enum Component<'a> {
    Node(&'a Node),
    Way(&'a Way),
    Relation(&'a Relation),
}

impl<'a> Component<'a> {
    pub fn info(&self) -> &'a ElementInfo {
        match self {
            Component::Node(node) => &node.info,
            Component::Way(way) => &way.info,
            Component::Relation(relation) => &relation.info,
        }
    }
}

/// Everything read from one OSM document, keyed by id. Ways and relations refer to other
/// elements by id only.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OsmMapData {
    pub nodes: BTreeMap<OsmId, Node>,
    pub ways: BTreeMap<OsmId, Way>,
    pub relations: BTreeMap<OsmId, Relation>,
}

impl OsmMapData {
    pub fn resolve(&self, member: MemberRef) -> Option<Component<'_>> {
        match member {
            MemberRef::Node(id) => self.nodes.get(&id).map(Component::Node),
            MemberRef::Way(id) => self.ways.get(&id).map(Component::Way),
            MemberRef::Relation(id) => self.relations.get(&id).map(Component::Relation),
        }
    }

    pub fn contains(&self, member: MemberRef) -> bool {
        match member {
            MemberRef::Node(id) => self.nodes.contains_key(&id),
            MemberRef::Way(id) => self.ways.contains_key(&id),
            MemberRef::Relation(id) => self.relations.contains_key(&id),
        }
    }

    /// Relations first, then ways, then nodes.
    pub fn components(&self) -> impl Iterator<Item = Component<'_>> {
        self.relations.values().map(Component::Relation)
            .chain(self.ways.values().map(Component::Way))
            .chain(self.nodes.values().map(Component::Node))
    }
}
