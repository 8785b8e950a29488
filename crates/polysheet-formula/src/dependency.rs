//! Per-cell dependency trees.
//!
//! Every cell owns a tree whose root carries the cell's own coordinates and
//! whose descendants are the cells its expression was built from. Nodes live
//! in an arena; combining cells grafts copies of the operand trees, so no two
//! cells ever share nodes.

use polysheet_core::CellCoord;
use tracing::trace;

/// Grid change propagated through a dependency tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// A single cell is removed; nothing is renumbered.
    Cell(CellCoord),
    /// A whole row is removed; later rows shift up by one.
    Row(u32),
    /// A whole column is removed; later columns shift left by one.
    Column(u32),
}

impl Deletion {
    fn matches(&self, coords: CellCoord) -> bool {
        match self {
            Deletion::Cell(target) => *target == coords,
            Deletion::Row(row) => coords.row == *row,
            Deletion::Column(col) => coords.col == *col,
        }
    }

    fn shift(&self, coords: CellCoord) -> CellCoord {
        match self {
            Deletion::Row(row) if coords.row > *row => CellCoord::new(coords.row - 1, coords.col),
            Deletion::Column(col) if coords.col > *col => CellCoord::new(coords.row, coords.col - 1),
            _ => coords,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    coords: Option<CellCoord>,
    children: Vec<usize>,
}

/// N-ary tree of cell coordinates, rooted at index 0
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyTree {
    nodes: Vec<Node>,
}

const ROOT: usize = 0;

impl DependencyTree {
    /// Single-node tree. `None` marks an unanchored cell.
    pub fn new(coords: Option<CellCoord>) -> Self {
        Self {
            nodes: vec![Node {
                coords,
                children: Vec::new(),
            }],
        }
    }

    /// New root whose children are copies of the given trees, in order
    pub fn construct(coords: Option<CellCoord>, operands: &[&DependencyTree]) -> Self {
        let mut tree = Self::new(coords);
        for operand in operands {
            tree.graft(operand);
        }
        tree
    }

    /// Copy `other` under the root as its last child
    pub fn graft(&mut self, other: &DependencyTree) {
        let index = self.copy_node(other, ROOT);
        self.nodes[ROOT].children.push(index);
    }

    fn copy_node(&mut self, other: &DependencyTree, source: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            coords: other.nodes[source].coords,
            children: Vec::new(),
        });
        for &child in &other.nodes[source].children {
            let copied = self.copy_node(other, child);
            self.nodes[index].children.push(copied);
        }
        index
    }

    pub fn coordinates(&self) -> Option<CellCoord> {
        self.nodes[ROOT].coords
    }

    pub fn set_coordinates(&mut self, coords: Option<CellCoord>) {
        self.nodes[ROOT].coords = coords;
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            index: ROOT,
        }
    }

    /// Coordinates of every reachable anchored node, root first
    pub fn all_coordinates(&self) -> Vec<CellCoord> {
        let mut out = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            out.extend(node.coords);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Apply a deletion to the whole tree.
    ///
    /// Children that lie on the deleted cell, row, or column are detached
    /// together with their subtrees. Surviving coordinates past a deleted
    /// row or column move back by one. The result lists the touched nodes
    /// (matched, or with a matched descendant) in child-before-parent order,
    /// with their post-shift coordinates; the deleted cell itself is left out.
    pub fn delete(&mut self, deletion: Deletion) -> Vec<CellCoord> {
        let mut touched = Vec::new();
        self.visit(ROOT, deletion, &mut touched);
        if let Deletion::Cell(target) = deletion {
            touched.retain(|coords| *coords != target);
        }
        trace!(?deletion, touched = touched.len(), "applied deletion to dependency tree");
        touched
    }

    pub fn delete_cell(&mut self, coords: CellCoord) -> Vec<CellCoord> {
        self.delete(Deletion::Cell(coords))
    }

    pub fn delete_row(&mut self, row: u32) -> Vec<CellCoord> {
        self.delete(Deletion::Row(row))
    }

    pub fn delete_column(&mut self, col: u32) -> Vec<CellCoord> {
        self.delete(Deletion::Column(col))
    }

    /// Returns whether the node at `index` was touched.
    fn visit(&mut self, index: usize, deletion: Deletion, touched: &mut Vec<CellCoord>) -> bool {
        let mut any_child = false;
        let children = std::mem::take(&mut self.nodes[index].children);
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            let matched = self.nodes[child]
                .coords
                .is_some_and(|coords| deletion.matches(coords));
            any_child |= self.visit(child, deletion, touched);
            if !matched {
                kept.push(child);
            }
        }
        self.nodes[index].children = kept;

        let node = &mut self.nodes[index];
        let matched = node.coords.is_some_and(|coords| deletion.matches(coords));
        node.coords = node.coords.map(|coords| deletion.shift(coords));
        let is_touched = matched || any_child;
        if is_touched {
            touched.extend(node.coords);
        }
        is_touched
    }
}

/// Borrowed view of one node
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a DependencyTree,
    index: usize,
}

impl<'a> NodeRef<'a> {
    pub fn coordinates(&self) -> Option<CellCoord> {
        self.tree.nodes[self.index].coords
    }

    pub fn len(&self) -> usize {
        self.tree.nodes[self.index].children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.nodes[self.index]
            .children
            .iter()
            .map(move |&index| NodeRef { tree, index })
    }

    /// First child anchored at `coords`
    pub fn child(&self, coords: CellCoord) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.coordinates() == Some(coords))
    }
}
