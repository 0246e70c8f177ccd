//! Deep search for fixture-shaped records inside arbitrarily wrapped JSON.
//!
//! Feeds and exported files nest fixtures under a zoo of envelopes
//! (`response`, `data`, stringified bodies, ...). The extractor walks a
//! [`Graph`] of [`Node`]s and collects every mapping that looks like a
//! fixture, no matter how deep it sits.
//!
//! Graphs built by hand may share nodes or contain cycles; the walk keeps a
//! visited set of [`NodeId`]s so it always terminates.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

/// Wrapper keys that hold the actual payload. When a mapping has any of them,
/// only those keys are followed, in this order.
pub const ENVELOPE_KEYS: &[&str] = &[
    "response", "fixtures", "result", "data", "matches", "items", "events", "body",
];

/// Index of a node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Closed set of shapes a value can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    /// Booleans, numbers and plain strings.
    Scalar(Value),
    Sequence(Vec<NodeId>),
    /// Entries in insertion order.
    Mapping(Vec<(String, NodeId)>),
    /// A string whose text looks like serialized JSON.
    EncodedString(String),
}

impl Node {
    /// Classify a string: text starting with `{` or `[` is treated as encoded JSON.
    pub fn string(s: impl Into<String>) -> Node {
        let s = s.into();
        let t = s.trim_start();
        if t.starts_with('{') || t.starts_with('[') {
            Node::EncodedString(s)
        } else {
            Node::Scalar(Value::String(s))
        }
    }
}

/// Arena of nodes. Children refer to each other by [`NodeId`], so a node may
/// be reachable from several parents or from itself.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Set `key` on a mapping node, replacing an existing entry in place.
    /// Does nothing when `map` is not a mapping.
    pub fn insert(&mut self, map: NodeId, key: impl Into<String>, child: NodeId) {
        let key = key.into();
        if let Some(Node::Mapping(entries)) = self.nodes.get_mut(map.0) {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = child,
                None => entries.push((key, child)),
            }
        }
    }

    /// Append to a sequence node. Does nothing when `seq` is not a sequence.
    pub fn push(&mut self, seq: NodeId, child: NodeId) {
        if let Some(Node::Sequence(items)) = self.nodes.get_mut(seq.0) {
            items.push(child);
        }
    }

    /// Import a JSON value, returning the id of its root.
    pub fn import(&mut self, value: &Value) -> NodeId {
        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(_) | Value::Number(_) => Node::Scalar(value.clone()),
            Value::String(s) => Node::string(s.as_str()),
            Value::Array(items) => {
                let ids = items.iter().map(|v| self.import(v)).collect();
                Node::Sequence(ids)
            }
            Value::Object(map) => {
                let entries = map.iter().map(|(k, v)| (k.clone(), self.import(v))).collect();
                Node::Mapping(entries)
            }
        };
        self.add(node)
    }

    /// Build a graph holding `value`; returns the graph and the root id.
    pub fn from_value(value: &Value) -> (Graph, NodeId) {
        let mut graph = Graph::new();
        let root = graph.import(value);
        (graph, root)
    }

    /// Convert the subtree at `id` back to JSON. A reference to a node that is
    /// already being converted higher up becomes `null`.
    pub fn to_value(&self, id: NodeId) -> Value {
        let mut path = HashSet::new();
        self.to_value_inner(id, &mut path)
    }

    fn to_value_inner(&self, id: NodeId, path: &mut HashSet<NodeId>) -> Value {
        if !path.insert(id) {
            return Value::Null;
        }
        let value = match self.get(id) {
            None | Some(Node::Null) => Value::Null,
            Some(Node::Scalar(v)) => v.clone(),
            Some(Node::EncodedString(s)) => Value::String(s.clone()),
            Some(Node::Sequence(items)) => Value::Array(
                items
                    .iter()
                    .map(|child| self.to_value_inner(*child, path))
                    .collect(),
            ),
            Some(Node::Mapping(entries)) => {
                let mut map = Map::new();
                for (key, child) in entries {
                    map.insert(key.clone(), self.to_value_inner(*child, path));
                }
                Value::Object(map)
            }
        };
        path.remove(&id);
        value
    }

    fn has_key(entries: &[(String, NodeId)], key: &str) -> bool {
        entries.iter().any(|(k, _)| k == key)
    }

    fn child(entries: &[(String, NodeId)], key: &str) -> Option<NodeId> {
        entries.iter().find(|(k, _)| k == key).map(|(_, id)| *id)
    }
}

/// A record qualifies when it has a `fixture` key, or both `teams` and `goals`.
pub fn is_fixture_shaped(entries: &[(String, NodeId)]) -> bool {
    Graph::has_key(entries, "fixture")
        || (Graph::has_key(entries, "teams") && Graph::has_key(entries, "goals"))
}

/// Collect every fixture-shaped record reachable from `root`, in traversal
/// order. Qualifying records are not searched further.
pub fn extract_fixtures(graph: &Graph, root: NodeId) -> Vec<Value> {
    let mut walker = Walker::default();
    walker.walk(graph, root);
    walker.found
}

/// Convenience wrapper over [`extract_fixtures`] for plain JSON.
pub fn extract_fixtures_from_value(value: &Value) -> Vec<Value> {
    let (graph, root) = Graph::from_value(value);
    extract_fixtures(&graph, root)
}

#[derive(Default)]
struct Walker {
    found: Vec<Value>,
}

impl Walker {
    fn walk(&mut self, graph: &Graph, root: NodeId) {
        let mut visited = HashSet::new();
        self.visit(graph, root, &mut visited);
    }

    fn visit(&mut self, graph: &Graph, id: NodeId, visited: &mut HashSet<NodeId>) {
        match graph.get(id) {
            None | Some(Node::Null) | Some(Node::Scalar(_)) => {}
            Some(Node::EncodedString(text)) => self.visit_encoded(text),
            Some(Node::Sequence(items)) => {
                if !visited.insert(id) {
                    return;
                }
                for child in items {
                    self.visit(graph, *child, visited);
                }
            }
            Some(Node::Mapping(entries)) => {
                if !visited.insert(id) {
                    return;
                }
                if is_fixture_shaped(entries) {
                    self.found.push(graph.to_value(id));
                    return;
                }
                let envelopes: Vec<NodeId> = ENVELOPE_KEYS
                    .iter()
                    .filter_map(|key| Graph::child(entries, key))
                    .collect();
                if envelopes.is_empty() {
                    for (_, child) in entries {
                        self.visit(graph, *child, visited);
                    }
                } else {
                    for child in envelopes {
                        self.visit(graph, child, visited);
                    }
                }
            }
        }
    }

    /// Decoded JSON lives in its own graph: it is a fresh tree with no links
    /// back into the outer one.
    fn visit_encoded(&mut self, text: &str) {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value) => {
                let (graph, root) = Graph::from_value(&value);
                self.walk(&graph, root);
            }
            Err(e) => debug!(error = %e, "skipping string that is not valid JSON"),
        }
    }
}
