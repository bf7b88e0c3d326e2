use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::geometry::ArcGeometry;
use crate::model::{Document, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(0)
    }
}

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the partitioned hierarchy.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    /// Resolved weight: the declared value for leaves, the sum of the
    /// children otherwise.
    pub weight: f64,
    pub depth: u32,
    /// Sorted by descending weight, ties in document order.
    pub children: Vec<NodeId>,
    /// Unzoomed geometry.
    pub base: ArcGeometry,
}

impl LayoutNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Weighted, sorted and partitioned tree, stored as an arena indexed by
/// [`NodeId`]. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    pub root: NodeId,
    pub nodes: Vec<LayoutNode>,
}

impl Hierarchy {
    pub fn build(doc: &Document) -> Self {
        let mut nodes = Vec::with_capacity(doc.node_count());
        let root = insert(doc.root(), None, 0, &mut nodes);
        let mut h = Hierarchy { root, nodes };
        h.partition();
        tracing::debug!(
            nodes = h.nodes.len(),
            total = h.total_weight(),
            "hierarchy partitioned"
        );
        h
    }

    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.node(self.root).map(|n| n.weight).unwrap_or(0.0)
    }

    pub fn parent_or_root(&self, id: NodeId) -> NodeId {
        self.node(id).and_then(|n| n.parent).unwrap_or(self.root)
    }

    /// `id` followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).map(|n| n.id);
        while let Some(n) = cur {
            out.push(n);
            cur = self.node(n).and_then(|n| n.parent);
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        ancestor != of && self.ancestors(of).contains(&ancestor)
    }

    /// The depth-1 node above `id` (or `id` itself at depth 1). `None` for
    /// the root.
    pub fn top_level(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.node(*a).map(|n| n.depth == 1).unwrap_or(false))
    }

    /// Names from the root down to `id`, joined with `/`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.node(a).map(|n| n.name.as_str()))
            .collect();
        names.reverse();
        names.join("/")
    }

    /// Splits each node's angular span among its children in proportion to
    /// weight; ring bands follow depth.
    fn partition(&mut self) {
        let root = self.root.index();
        self.nodes[root].base = ArcGeometry::new(0.0, TAU, 0.0, 1.0);
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let parent = &self.nodes[id.index()];
            let (x0, x1, weight) = (parent.base.x0, parent.base.x1, parent.weight);
            let k = if weight > 0.0 { (x1 - x0) / weight } else { 0.0 };
            let children = parent.children.clone();
            let mut x = x0;
            for child in children {
                let node = &mut self.nodes[child.index()];
                let start = x;
                x += node.weight * k;
                let depth = node.depth as f64;
                node.base = ArcGeometry::new(start, x, depth, depth + 1.0);
                stack.push(child);
            }
        }
    }
}

fn insert(
    src: &TreeNode,
    parent: Option<NodeId>,
    depth: u32,
    nodes: &mut Vec<LayoutNode>,
) -> NodeId {
    let id = NodeId(nodes.len() as u64);
    nodes.push(LayoutNode {
        id,
        parent,
        name: src.name.clone(),
        weight: 0.0,
        depth,
        children: Vec::with_capacity(src.children.len()),
        base: ArcGeometry::default(),
    });

    let mut children: Vec<NodeId> = src
        .children
        .iter()
        .map(|c| insert(c, Some(id), depth + 1, nodes))
        .collect();

    let weight = if children.is_empty() {
        src.value.unwrap_or(0.0)
    } else {
        children.iter().map(|c| nodes[c.index()].weight).sum::<f64>()
    } + 0.0;
    // Stable: equal weights keep document order. `+ 0.0` above folds `-0.0`
    // into `0.0` so `total_cmp` sees zero weights as ties.
    children.sort_by(|a, b| nodes[b.index()].weight.total_cmp(&nodes[a.index()].weight));

    let node = &mut nodes[id.index()];
    node.weight = weight;
    node.children = children;
    id
}
