//! Owned, index-based DOM arena.
//!
//! The primary path copies the parsed `<body>` into a [`DomTree`] so it can
//! score and prune nodes by index. Every arena node remembers the scraper
//! node it came from, so pruning can be replayed on a copy of the parsed
//! document and serialized by html5ever. The arena is built and dropped
//! inside a single extraction call.

use scraper::{ElementRef, Html, Node};

use crate::article::collapse_whitespace;
use crate::parse::Element;

/// Index of a node inside its [`DomTree`]
pub type NodeId = usize;

/// Elements that start a new block of text when flattened
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "dialog", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul", "br",
];

/// Returns true for tags that break text flow
pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Payload of a node in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// An element with its lowercase tag name and attributes in source order
    Element { tag: String, attrs: Vec<(String, String)> },
    /// A text node, entities already decoded
    Text(String),
}

/// A node in the DOM tree
#[derive(Debug, Clone)]
pub struct DomNode {
    /// Element or text payload
    pub data: NodeData,
    /// Parent node ID (`None` for the root and for detached nodes)
    pub parent_id: Option<NodeId>,
    /// Child node IDs in document order
    pub child_ids: Vec<NodeId>,
    /// The scraper node this one was copied from
    pub source: ego_tree::NodeId,
}

/// A DOM tree structure that tracks parent-child relationships
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<DomNode>,
}

impl DomTree {
    /// Copies `root` and everything below it into a new arena.
    ///
    /// Returns `None` when the subtree holds more than `max_nodes` nodes
    /// (`0` means unlimited). Comments, doctypes and processing
    /// instructions are not copied.
    pub fn build(root: &Element<'_>, max_nodes: usize) -> Option<Self> {
        let root = root.as_ref();
        let mut tree = Self { nodes: Vec::new() };
        let root_id = tree.push(element_data(root), root.id(), None);

        let mut stack: Vec<(ElementRef<'_>, NodeId)> = vec![(root, root_id)];
        while let Some((element, id)) = stack.pop() {
            for child in element.children() {
                if max_nodes > 0 && tree.nodes.len() >= max_nodes {
                    return None;
                }
                match child.value() {
                    Node::Text(text) => {
                        tree.push(NodeData::Text(text.to_string()), child.id(), Some(id));
                    }
                    Node::Element(_) => {
                        if let Some(child_element) = ElementRef::wrap(child) {
                            let child_id = tree.push(element_data(child_element), child.id(), Some(id));
                            stack.push((child_element, child_id));
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(tree)
    }

    fn push(&mut self, data: NodeData, source: ego_tree::NodeId, parent_id: Option<NodeId>) -> NodeId {
        let node_id = self.nodes.len();
        self.nodes.push(DomNode { data, parent_id, child_ids: Vec::new(), source });
        if let Some(parent) = parent_id.and_then(|id| self.nodes.get_mut(id)) {
            parent.child_ids.push(node_id);
        }
        node_id
    }

    /// The node the tree was built from
    pub fn root(&self) -> NodeId {
        0
    }

    /// Lowercase tag name, `None` for text nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    /// Attribute value of an element node
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.data {
            NodeData::Element { attrs, .. } => attrs.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    /// Get the parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent_id
    }

    /// Child IDs in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|node| node.child_ids.as_slice()).unwrap_or_default()
    }

    /// Element children in document order
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).iter().copied().filter(|child| self.tag(*child).is_some()).collect()
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            ancestors.push(ancestor);
            current = self.parent(ancestor);
        }
        ancestors
    }

    /// The node and all attached descendants in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut ordered = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ordered.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        ordered
    }

    /// Descendant elements (excluding the node itself) with the given tag
    pub fn descendants_by_tag(&self, id: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .skip(1)
            .filter(|node| self.tag(*node) == Some(tag))
            .collect()
    }

    /// Unlinks a node (and its subtree) from its parent
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent_id) = self.parent(id) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.child_ids.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = None;
        }
    }

    /// Whether the node is still reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).last() == Some(&self.root())
    }

    /// Text of the subtree with a separator at block boundaries
    ///
    /// Text nodes are concatenated in document order. Entering or leaving a
    /// block-level element (and every `<br>`) emits a single space so words
    /// from adjacent paragraphs do not run together.
    pub fn flatten_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.flatten_into(id, &mut out);
        out
    }

    fn flatten_into(&self, id: NodeId, out: &mut String) {
        let mut stack: Vec<(NodeId, bool)> = vec![(id, false)];
        while let Some((current, closing)) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            match &node.data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Element { tag, .. } => {
                    let block = is_block_tag(tag);
                    if block {
                        out.push(' ');
                    }
                    if !closing {
                        if block {
                            stack.push((current, true));
                        }
                        stack.extend(node.child_ids.iter().rev().map(|child| (*child, false)));
                    }
                }
            }
        }
    }

    /// Flattened, whitespace-collapsed text of a subtree
    pub fn inner_text(&self, id: NodeId) -> String {
        collapse_whitespace(&self.flatten_text(id))
    }

    /// Character count of the collapsed inner text
    pub fn text_len(&self, id: NodeId) -> usize {
        self.inner_text(id).chars().count()
    }

    /// Character count of text inside `<a>` descendants
    pub fn link_text_len(&self, id: NodeId) -> usize {
        let mut total = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current != id && self.tag(current) == Some("a") {
                total += self.text_len(current);
                continue;
            }
            stack.extend(self.children(current).iter().copied());
        }
        if self.tag(id) == Some("a") { self.text_len(id) } else { total }
    }

    /// A copy of `source` with every detached arena node and every comment
    /// under the root removed.
    ///
    /// `source` must be the document the arena was built from.
    pub fn pruned_copy(&self, source: &Html) -> Html {
        let mut copy = source.clone();

        let mut doomed: Vec<ego_tree::NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(id, node)| *id != self.root() && node.parent_id.is_none())
            .map(|(_, node)| node.source)
            .collect();
        if let Some(root) = self.nodes.first().and_then(|node| copy.tree.get(node.source)) {
            doomed.extend(root.descendants().filter(|node| node.value().is_comment()).map(|node| node.id()));
        }

        for id in doomed {
            if let Some(mut node) = copy.tree.get_mut(id) {
                node.detach();
            }
        }
        copy
    }

    /// The element in `doc` that `id` was copied from
    pub fn source_element<'a>(&self, doc: &'a Html, id: NodeId) -> Option<ElementRef<'a>> {
        let source = self.nodes.get(id)?.source;
        doc.tree.get(source).and_then(ElementRef::wrap)
    }

    /// Get the total number of nodes, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn element_data(element: ElementRef<'_>) -> NodeData {
    let value = element.value();
    NodeData::Element {
        tag: value.name().to_lowercase(),
        attrs: value.attrs().map(|(name, value)| (name.to_string(), value.to_string())).collect(),
    }
}
