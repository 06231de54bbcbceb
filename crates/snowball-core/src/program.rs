//! The program arena: nodes, names, routines and grouping definitions.

use indexmap::IndexMap;
use serde::Serialize;

use crate::encoding::Encoding;
use crate::grouping::GroupingDef;
use crate::name::{GroupingId, Name, NameId, NameKind};
use crate::node::{Node, NodeId, NodeKind};

/// An `among` as handed over by the front end, before its table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmongSite {
    pub node: NodeId,
    /// Routine or external the among appears in.
    pub routine: Option<NameId>,
}

/// A parsed Snowball program.
///
/// All nodes are owned by one arena and freed together. Links between nodes
/// are plain indices, so a subtree can be shared (merged among actions refer
/// to the same node) without ownership concerns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Program {
    nodes: Vec<Node>,
    /// Keyed by name text, in declaration order.
    names: IndexMap<String, Name>,
    /// `Define` nodes in source order.
    pub routines: Vec<NodeId>,
    pub groupings: Vec<GroupingDef>,
    /// Amongs in the order the front end completed them.
    pub among_sites: Vec<AmongSite>,
    /// `maxint` or `minint` appears somewhere.
    pub int_limits_used: bool,
    /// The `?` debug command appears somewhere.
    pub debug_used: bool,
    pub encoding: Encoding,
}

impl Program {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a name; a name with the same text is replaced in place.
    pub fn add_name(&mut self, name: Name) -> NameId {
        let (index, _) = self.names.insert_full(name.text.clone(), name);
        NameId::new(index)
    }

    pub fn name(&self, id: NameId) -> &Name {
        &self.names[id.index()]
    }

    pub fn name_mut(&mut self, id: NameId) -> &mut Name {
        &mut self.names[id.index()]
    }

    /// All names in declaration order, pruned ones included.
    pub fn names(&self) -> impl Iterator<Item = (NameId, &Name)> {
        self.names
            .values()
            .enumerate()
            .map(|(i, n)| (NameId::new(i), n))
    }

    pub fn name_ids(&self) -> impl Iterator<Item = NameId> + use<> {
        (0..self.names.len()).map(NameId::new)
    }

    /// Names that survived analysis, in declaration order.
    pub fn live_names(&self) -> impl Iterator<Item = (NameId, &Name)> {
        self.names().filter(|(_, n)| n.is_live())
    }

    pub fn lookup(&self, text: &str) -> Option<NameId> {
        self.names.get_index_of(text).map(NameId::new)
    }

    pub fn add_grouping(&mut self, def: GroupingDef) -> GroupingId {
        let id = GroupingId::new(self.groupings.len());
        self.groupings.push(def);
        id
    }

    pub fn grouping(&self, id: GroupingId) -> &GroupingDef {
        &self.groupings[id.index()]
    }

    /// Number of live names of one kind.
    pub fn count_live(&self, kind: NameKind) -> usize {
        self.live_names().filter(|(_, n)| n.kind == kind).count()
    }

    /// Iterates a sequence by following `right` links from `first`.
    pub fn chain(&self, first: Option<NodeId>) -> Chain<'_> {
        Chain {
            program: self,
            next: first,
        }
    }

    /// Collects a sequence so the caller can mutate nodes while walking it.
    pub fn chain_ids(&self, first: Option<NodeId>) -> Vec<NodeId> {
        self.chain(first).collect()
    }

    pub fn last_in_chain(&self, first: NodeId) -> NodeId {
        self.chain(Some(first)).last().unwrap_or(first)
    }

    /// Copies the node into a fresh slot and returns it.
    ///
    /// The copy has no `right` link: the original slot keeps its place in the
    /// enclosing sequence and can then be overwritten with a wrapper around
    /// the copy.
    pub fn relocate(&mut self, id: NodeId) -> NodeId {
        let mut moved = self.node(id).clone();
        moved.right = None;
        self.alloc(moved)
    }

    /// Structural equality of two sequences, following `right` links.
    ///
    /// Two subtrees are equivalent when they have the same shape, kinds,
    /// modes, names, literals and numeric constants.
    pub fn equivalent(&self, a: Option<NodeId>, b: Option<NodeId>) -> bool {
        let (a, b) = match (a, b) {
            (None, None) => return true,
            (Some(a), Some(b)) => (a, b),
            _ => return false,
        };
        if a == b {
            return true;
        }

        let (p, q) = (self.node(a), self.node(b));
        if p.kind != q.kind || p.mode != q.mode {
            return false;
        }
        if p.kind == NodeKind::Number && p.number != q.number {
            return false;
        }
        if p.name != q.name || p.literal != q.literal {
            return false;
        }

        self.equivalent(p.left, q.left)
            && self.equivalent(p.ae, q.ae)
            && self.equivalent(p.aux, q.aux)
            && self.equivalent(p.right, q.right)
    }

    /// A command list equivalent to `()`: only `true`s and nested empty lists.
    pub fn is_just_true(&self, first: Option<NodeId>) -> bool {
        let Some(id) = first else {
            return true;
        };
        let node = self.node(id);
        if !matches!(node.kind, NodeKind::Bra | NodeKind::True) {
            return false;
        }
        self.is_just_true(node.left) && self.is_just_true(node.right)
    }
}

pub struct Chain<'a> {
    program: &'a Program,
    next: Option<NodeId>,
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.program.node(id).right;
        Some(id)
    }
}
