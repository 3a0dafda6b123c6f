use std::str;

use log::{debug, info};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::data::geometry::LatLong;
use crate::data::osm::{ElementInfo, Member, MemberRef, Node, OsmId, OsmMapData, Relation, Way};
use crate::errors::Result;
use crate::etl::multigon;

/// Element currently open while streaming through the document.
enum ParserState {
    Top,
    Node(Node),
    Way(Way),
    Relation(RawRelation),
}

/// A relation as written, before its members are checked against the caches.
struct RawRelation {
    info: ElementInfo,
    members: Vec<Member>,
}

fn attribute(el: &BytesStart, key: &[u8]) -> Option<String> {
    for attribute_res in el.attributes() {
        let attribute = match attribute_res {
            Ok(attribute) => attribute,
            Err(err) => {
                debug!(err = err.to_string().as_str(); "Skipping malformed attribute");
                continue;
            }
        };
        if attribute.key.as_ref() == key {
            return attribute.unescape_value().ok().map(|value| value.into_owned());
        }
    }
    None
}

fn parsed_attribute<T: str::FromStr>(el: &BytesStart, key: &[u8]) -> Option<T> {
    attribute(el, key)?.trim().parse().ok()
}

fn parse_node(el: &BytesStart) -> Option<Node> {
    let id: OsmId = parsed_attribute(el, b"id")?;
    let lat: f64 = parsed_attribute(el, b"lat")?;
    let lon: f64 = parsed_attribute(el, b"lon")?;
    Some(Node {
        info: ElementInfo::new(id),
        coordinate: LatLong::new(lat, lon),
    })
}

fn parse_way(el: &BytesStart) -> Option<Way> {
    Some(Way {
        info: ElementInfo::new(parsed_attribute(el, b"id")?),
        nodes: Vec::new(),
    })
}

fn parse_relation(el: &BytesStart) -> Option<RawRelation> {
    Some(RawRelation {
        info: ElementInfo::new(parsed_attribute(el, b"id")?),
        members: Vec::new(),
    })
}

fn parse_member(el: &BytesStart) -> Option<Member> {
    let member_type = attribute(el, b"type")?;
    let id: OsmId = parsed_attribute(el, b"ref")?;
    Some(Member {
        component: MemberRef::from_type(&member_type, id)?,
        role: attribute(el, b"role").unwrap_or_default(),
    })
}

fn add_tag(info: &mut ElementInfo, el: &BytesStart) {
    if let (Some(key), Some(value)) = (attribute(el, b"k"), attribute(el, b"v")) {
        info.tags.insert(key, value);
    }
}

/// Streams the elements of an OSM document into raw caches, then drops references to
/// elements the document does not contain.
pub fn load_osm_document(text: &str) -> Result<OsmMapData> {
    if text.trim().is_empty() {
        return Err("Empty OSM document".into());
    }

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut nodes: Vec<Node> = Vec::new();
    let mut ways: Vec<Way> = Vec::new();
    let mut relations: Vec<RawRelation> = Vec::new();
    let mut state = ParserState::Top;
    let mut saw_root = false;

    loop {
        let (el, is_empty) = match reader.read_event()? {
            Event::Eof => break,
            Event::Start(el) => (el, false),
            Event::Empty(el) => (el, true),
            Event::End(el) => {
                let finished = matches!(
                    (el.name().as_ref(), &state),
                    (b"node", ParserState::Node(_))
                        | (b"way", ParserState::Way(_))
                        | (b"relation", ParserState::Relation(_))
                );
                if finished {
                    match std::mem::replace(&mut state, ParserState::Top) {
                        ParserState::Node(node) => nodes.push(node),
                        ParserState::Way(way) => ways.push(way),
                        ParserState::Relation(relation) => relations.push(relation),
                        ParserState::Top => (),
                    }
                }
                continue;
            }
            _ => continue,
        };

        if !saw_root {
            if el.name().as_ref() != b"osm" {
                return Err(format!(
                    "Expected <osm> root element, found <{}>",
                    String::from_utf8_lossy(el.name().as_ref())
                ).into());
            }
            saw_root = true;
            continue;
        }

        if matches!(state, ParserState::Top) {
            state = match el.name().as_ref() {
                b"node" => match parse_node(&el) {
                    Some(node) if is_empty => {
                        nodes.push(node);
                        ParserState::Top
                    }
                    Some(node) => ParserState::Node(node),
                    None => {
                        debug!("Skipping node with missing or invalid attributes");
                        ParserState::Top
                    }
                },
                b"way" => match parse_way(&el) {
                    Some(way) if is_empty => {
                        ways.push(way);
                        ParserState::Top
                    }
                    Some(way) => ParserState::Way(way),
                    None => {
                        debug!("Skipping way with missing or invalid id");
                        ParserState::Top
                    }
                },
                b"relation" => match parse_relation(&el) {
                    Some(relation) if is_empty => {
                        relations.push(relation);
                        ParserState::Top
                    }
                    Some(relation) => ParserState::Relation(relation),
                    None => {
                        debug!("Skipping relation with missing or invalid id");
                        ParserState::Top
                    }
                },
                _ => ParserState::Top,
            };
            continue;
        }

        match (el.name().as_ref(), &mut state) {
            (b"tag", ParserState::Node(node)) => add_tag(&mut node.info, &el),
            (b"tag", ParserState::Way(way)) => add_tag(&mut way.info, &el),
            (b"tag", ParserState::Relation(relation)) => add_tag(&mut relation.info, &el),
            (b"nd", ParserState::Way(way)) => {
                if let Some(id) = parsed_attribute(&el, b"ref") {
                    way.nodes.push(id);
                }
            }
            (b"member", ParserState::Relation(relation)) => {
                if let Some(member) = parse_member(&el) {
                    relation.members.push(member);
                }
            }
            _ => (),
        }
    }

    if !saw_root {
        return Err("OSM document has no root element".into());
    }

    let data = build_caches(nodes, ways, relations);
    info!(
        nodes = data.nodes.len(),
        ways = data.ways.len(),
        relations = data.relations.len();
        "Loaded OSM document"
    );
    Ok(data)
}

fn build_caches(nodes: Vec<Node>, ways: Vec<Way>, relations: Vec<RawRelation>) -> OsmMapData {
    let mut data = OsmMapData::default();
    for node in nodes {
        data.nodes.insert(node.info.id, node);
    }

    for mut way in ways {
        let before = way.nodes.len();
        way.nodes.retain(|id| data.nodes.contains_key(id));
        if way.nodes.len() != before {
            debug!(way_id = way.info.id, dropped = before - way.nodes.len(); "Way references missing nodes");
        }
        data.ways.insert(way.info.id, way);
    }

    // Insert every relation before resolving members so relations may refer to later ones.
    let mut pending = Vec::with_capacity(relations.len());
    for raw in relations {
        pending.push((raw.info.id, raw.members));
        data.relations.insert(raw.info.id, Relation::new(raw.info));
    }
    for (id, members) in pending {
        let members: Vec<Member> = members.into_iter()
            .filter(|member| {
                let known = data.contains(member.component);
                if !known {
                    debug!(relation_id = id; "Relation references missing member");
                }
                known
            })
            .collect();
        if let Some(relation) = data.relations.get_mut(&id) {
            for member in members {
                relation.add_member(member);
            }
        }
    }

    let caches: Vec<_> = data.relations.values()
        .filter(|relation| relation.is_multigon)
        .map(|relation| (relation.info.id, multigon::stitch_outer_ring(relation, &data.ways)))
        .collect();
    for (id, cache) in caches {
        if let Some(relation) = data.relations.get_mut(&id) {
            relation.multigon_cache = cache;
        }
    }

    data
}
