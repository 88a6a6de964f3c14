//! Constraint forest stored as an index arena.
//!
//! Node 0 is the root. Every other node is one anchor. A node's parent is
//! the fixed anchor of its single incoming constraint, or the root when it
//! is unconstrained. Children keep insertion order.
//!
//! The forest alone does not fix the resolution order. An unconstrained
//! edge is carried along by its element's opposite edge, so an edge hanging
//! off it must resolve after whatever constraint moves that opposite edge:
//!
//! ```text
//!   A.W ← container.W      A.E is unconstrained, follows A.W
//!   B.W ← A.E              must run after A.W ← container.W
//! ```
//!
//! [`ConstraintTree::resolution_order`] follows those source links;
//! [`ConstraintTree::would_cycle`] rejects edges that close a loop through
//! them.

use std::collections::HashMap;

use crate::constraint::{Anchor, Constraint, Location};

const ROOT: usize = 0;

#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    /// Incoming edge label. `None` for the root and for unconstrained nodes.
    constraint: Option<Constraint>,
    children: Vec<usize>,
}

/// Arena of anchor nodes.
#[derive(Debug, Clone)]
pub(crate) struct ConstraintTree {
    nodes: Vec<Node>,
    index: HashMap<Anchor, usize>,
    edges: usize,
}

impl ConstraintTree {
    /// Root plus one placeholder per container location.
    pub(crate) fn new() -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                parent: None,
                constraint: None,
                children: Vec::new(),
            }],
            index: HashMap::new(),
            edges: 0,
        };
        for location in Location::ALL {
            tree.find_or_create(Anchor::container(location));
        }
        tree
    }

    /// Number of nodes, root included.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of constraint edges.
    pub(crate) const fn edge_count(&self) -> usize {
        self.edges
    }

    /// The constraint already moving `anchor`, if any.
    pub(crate) fn incoming(&self, anchor: &Anchor) -> Option<Constraint> {
        self.index.get(anchor).and_then(|&node| self.nodes[node].constraint)
    }

    /// `true` if, with `added` in place, its fixed anchor would take its
    /// position from its moving anchor, directly or through the opposite
    /// edges of unconstrained anchors.
    pub(crate) fn would_cycle(&self, added: &Constraint) -> bool {
        let moving = added.moving();
        let mut current = Some(added.fixed());
        // Each step visits a distinct anchor unless a loop exists.
        let mut budget = 2 * self.nodes.len() + 2;

        while let Some(anchor) = current {
            if anchor == moving || budget == 0 {
                return true;
            }
            budget -= 1;
            current = self.source_with(anchor, added);
        }
        false
    }

    /// Adds a single-axis constraint. The caller has validated it.
    pub(crate) fn attach(&mut self, constraint: Constraint) {
        let fixed = self.find_or_create(constraint.fixed());
        let moving = self.find_or_create(constraint.moving());

        if let Some(old_parent) = self.nodes[moving].parent {
            self.nodes[old_parent].children.retain(|&child| child != moving);
        }
        self.nodes[fixed].children.push(moving);

        let node = &mut self.nodes[moving];
        node.parent = Some(fixed);
        node.constraint = Some(constraint);
        self.edges += 1;
    }

    /// Visits every edge, parents before children.
    pub(crate) fn visit<E>(&self, mut apply: impl FnMut(&Constraint) -> Result<(), E>) -> Result<(), E> {
        for node in self.preorder() {
            if let Some(constraint) = &self.nodes[node].constraint {
                apply(constraint)?;
            }
        }
        Ok(())
    }

    /// All edges, parents before children.
    pub(crate) fn constraints(&self) -> Vec<Constraint> {
        let mut edges = Vec::with_capacity(self.edges);
        let _ = self.visit(|constraint| {
            edges.push(*constraint);
            Ok::<(), ()>(())
        });
        edges
    }

    /// All edges ordered so that each one runs after the edge that
    /// positions its fixed anchor. Ties keep forest order, so container
    /// placeholders come first and siblings keep insertion order.
    pub(crate) fn resolution_order(&self) -> Vec<Constraint> {
        let mut placed = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.edges);
        let mut pending = Vec::new();

        for start in self.preorder() {
            let mut current = Some(start);
            while let Some(node) = current {
                if placed[node] || self.nodes[node].constraint.is_none() {
                    break;
                }
                placed[node] = true;
                pending.push(node);
                current = self.prerequisite(node);
            }

            order.extend(pending.drain(..).rev().filter_map(|node| self.nodes[node].constraint));
        }
        order
    }

    /// Node whose edge has to run before the edge into `node`.
    fn prerequisite(&self, node: usize) -> Option<usize> {
        let fixed = self.nodes[node].constraint?.fixed();
        let fixed_node = *self.index.get(&fixed)?;
        if self.nodes[fixed_node].constraint.is_some() {
            return Some(fixed_node);
        }
        if fixed.is_container() {
            return None;
        }

        let opposite = *self.index.get(&fixed.opposite())?;
        self.nodes[opposite].constraint.map(|_| opposite)
    }

    /// The anchor `anchor` takes its position from, pretending `added` is
    /// already attached. `None` once the chain reaches a seed or container
    /// edge.
    fn source_with(&self, anchor: Anchor, added: &Constraint) -> Option<Anchor> {
        let is_moved = |candidate: &Anchor| *candidate == added.moving() || self.incoming(candidate).is_some();

        if anchor == added.moving() {
            return Some(added.fixed());
        }
        if let Some(constraint) = self.incoming(&anchor) {
            return Some(constraint.fixed());
        }
        if anchor.is_container() {
            return None;
        }

        let opposite = anchor.opposite();
        is_moved(&opposite).then_some(opposite)
    }

    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.nodes[ROOT].children.iter().rev().copied().collect();

        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.nodes[node].children.iter().rev().copied());
        }
        order
    }

    fn find_or_create(&mut self, anchor: Anchor) -> usize {
        if let Some(&node) = self.index.get(&anchor) {
            return node;
        }

        let node = self.nodes.len();
        self.nodes.push(Node {
            parent: Some(ROOT),
            constraint: None,
            children: Vec::new(),
        });
        self.nodes[ROOT].children.push(node);
        self.index.insert(anchor, node);
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementId;

    fn edge(moving: Anchor, fixed: Anchor) -> Constraint {
        Constraint::new(moving, fixed, 0)
    }

    fn order(tree: &ConstraintTree) -> Vec<Anchor> {
        tree.resolution_order().iter().map(Constraint::moving).collect()
    }

    #[test]
    fn test_new_tree_has_placeholders() {
        let tree = ConstraintTree::new();
        assert_eq!(tree.node_count(), 9);
        assert_eq!(tree.edge_count(), 0);
        assert!(tree.resolution_order().is_empty());
    }

    #[test]
    fn test_attach_reparents() {
        let (a, b) = (ElementId::next(), ElementId::next());
        let a_east = Anchor::new(a, Location::East);
        let b_west = Anchor::new(b, Location::West);
        let mut tree = ConstraintTree::new();

        tree.attach(edge(a_east, Anchor::container(Location::East)));
        tree.attach(edge(b_west, a_east));

        assert_eq!(tree.incoming(&b_west).map(|c| c.fixed()), Some(a_east));
        assert_eq!(tree.node_count(), 11);
        assert_eq!(tree.edge_count(), 2);
        // b.W now hangs off a.E, so closing the loop is refused.
        assert!(tree.would_cycle(&edge(a_east, b_west)));
        assert!(!tree.would_cycle(&edge(Anchor::new(b, Location::East), a_east)));
    }

    #[test]
    fn test_visit_is_parent_first() {
        let (a, b, c) = (ElementId::next(), ElementId::next(), ElementId::next());
        let west = |e| Anchor::new(e, Location::West);
        let mut tree = ConstraintTree::new();

        // Built leaf-first: c depends on b before b depends on a.
        tree.attach(edge(west(c), west(b)));
        tree.attach(edge(west(b), west(a)));
        tree.attach(edge(west(a), Anchor::container(Location::West)));

        let visited: Vec<Anchor> = tree.constraints().iter().map(Constraint::moving).collect();
        assert_eq!(visited, vec![west(a), west(b), west(c)]);
        assert_eq!(order(&tree), visited);
    }

    #[test]
    fn test_resolution_follows_opposite_edges() {
        let (a, b, c) = (ElementId::next(), ElementId::next(), ElementId::next());
        let west = |e| Anchor::new(e, Location::West);
        let east = |e| Anchor::new(e, Location::East);
        let mut tree = ConstraintTree::new();

        tree.attach(edge(west(c), east(b)));
        tree.attach(edge(west(b), east(a)));
        tree.attach(edge(west(a), Anchor::container(Location::West)));

        // Forest order would visit c before b; the opposite-edge links fix it.
        assert_eq!(order(&tree), vec![west(a), west(b), west(c)]);
    }

    #[test]
    fn test_resolution_keeps_constrained_fixed_edge() {
        let (a, b) = (ElementId::next(), ElementId::next());
        let mut tree = ConstraintTree::new();

        tree.attach(edge(Anchor::new(b, Location::West), Anchor::new(a, Location::East)));
        tree.attach(edge(Anchor::new(a, Location::West), Anchor::container(Location::West)));
        tree.attach(edge(Anchor::new(a, Location::East), Anchor::container(Location::East)));

        let resolved = order(&tree);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.last(), Some(&Anchor::new(b, Location::West)));
    }

    #[test]
    fn test_would_cycle_through_opposite_edge() {
        let (a, b) = (ElementId::next(), ElementId::next());
        let mut tree = ConstraintTree::new();
        tree.attach(edge(Anchor::new(b, Location::West), Anchor::new(a, Location::East)));

        // a.W would follow b.E, which follows b.W, which follows a.E, which
        // follows a.W.
        let back = edge(Anchor::new(a, Location::West), Anchor::new(b, Location::East));
        assert!(tree.would_cycle(&back));

        let sideways = edge(Anchor::new(a, Location::West), Anchor::container(Location::West));
        assert!(!tree.would_cycle(&sideways));
    }

    #[test]
    fn test_would_cycle_on_own_free_edge() {
        let a = ElementId::next();
        let mut tree = ConstraintTree::new();

        let own = edge(Anchor::new(a, Location::West), Anchor::new(a, Location::East));
        assert!(tree.would_cycle(&own));

        tree.attach(edge(Anchor::new(a, Location::East), Anchor::container(Location::East)));
        assert!(!tree.would_cycle(&own));
    }
}
