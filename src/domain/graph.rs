//! Relation graph for work items
//!
//! Holds an arena of items plus two kinds of edges:
//! - hierarchy: parent -> ordered children
//! - precedence: successor -> ordered `(predecessor, lag)` list
//!
//! Both are mirrored into a petgraph `DiGraph` in *dependency direction*
//! (child -> parent, predecessor -> successor) for cycle detection and
//! topological ordering. Node index `i` is always arena slot `i`; nodes are
//! never removed, so indices stay stable while edges come and go.

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

use super::id::WorkItemId;
use super::item::{HierarchyEdge, Relation, WorkItem};

/// Position of an item in the graph's arena
pub type Slot = usize;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Relation from {from} to {to} would create a cycle")]
    CycleDetected {
        from: WorkItemId,
        to: WorkItemId,
    },

    #[error("Work item not found: {0}")]
    ItemNotFound(WorkItemId),

    #[error("Work item listed twice: {0}")]
    DuplicateItem(WorkItemId),

    #[error("Work item {child} has two parents: {first} and {second}")]
    ConflictingParent {
        child: WorkItemId,
        first: WorkItemId,
        second: WorkItemId,
    },
}

/// Kind of a dependency edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// child -> parent
    Hierarchy,
    /// predecessor -> successor
    Precedes,
}

/// Outcome of [`RelationGraph::add_child`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// Already a child of that parent
    Unchanged,
    /// Newly attached, had no parent
    Attached,
    /// Moved away from the given previous parent
    Moved(Slot),
}

/// Arena-backed hierarchy + precedence graph
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    items: Vec<WorkItem>,
    index: HashMap<WorkItemId, Slot>,
    parent: Vec<Option<Slot>>,
    children: Vec<Vec<Slot>>,
    predecessors: Vec<Vec<(Slot, i32)>>,
    successors: Vec<Vec<Slot>>,
    deps: DiGraph<Slot, Edge>,
}

impl RelationGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from items and their edges
    ///
    /// Hierarchy comes from `hierarchy` first (its order is the children's
    /// insertion order), then from each item's `parent_id`. Every edge is
    /// cycle-checked as it is added. A `parent_id` naming an item outside
    /// `items` is left as is: that parent is not part of this subgraph.
    pub fn build(
        items: impl IntoIterator<Item = WorkItem>,
        hierarchy: &[HierarchyEdge],
        relations: &[Relation],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        // First pass: add all nodes
        for item in items {
            graph.add_item(item)?;
        }

        // Second pass: explicit hierarchy, then parent references
        let mut declared: HashMap<WorkItemId, WorkItemId> = HashMap::new();
        for edge in hierarchy {
            if let Some(first) = declared.insert(edge.child, edge.parent) {
                if first != edge.parent {
                    return Err(GraphError::ConflictingParent {
                        child: edge.child,
                        first,
                        second: edge.parent,
                    });
                }
            }
        }

        let referenced: Vec<HierarchyEdge> = graph
            .items
            .iter()
            .filter_map(|item| {
                let parent = item.parent_id?;
                if !graph.index.contains_key(&parent) {
                    debug!(child = %item.id, %parent, "parent not loaded, skipping");
                    return None;
                }
                Some(HierarchyEdge {
                    parent,
                    child: item.id,
                })
            })
            .collect();

        for edge in &referenced {
            if let Some(&first) = declared.get(&edge.child) {
                if first != edge.parent {
                    return Err(GraphError::ConflictingParent {
                        child: edge.child,
                        first,
                        second: edge.parent,
                    });
                }
            }
        }

        for edge in hierarchy.iter().chain(referenced.iter()) {
            let parent = graph.require(edge.parent)?;
            let child = graph.require(edge.child)?;
            graph.add_child(parent, child)?;
        }

        // Third pass: precedence
        for relation in relations {
            let pred = graph.require(relation.predecessor)?;
            let succ = graph.require(relation.successor)?;
            graph.add_relation(pred, succ, relation.lag)?;
        }

        Ok(graph)
    }

    /// Adds an item without edges
    pub fn add_item(&mut self, item: WorkItem) -> Result<Slot, GraphError> {
        if self.index.contains_key(&item.id) {
            return Err(GraphError::DuplicateItem(item.id));
        }

        let slot = self.items.len();
        let node = self.deps.add_node(slot);
        debug_assert_eq!(node.index(), slot);

        self.index.insert(item.id, slot);
        self.items.push(item);
        self.parent.push(None);
        self.children.push(Vec::new());
        self.predecessors.push(Vec::new());
        self.successors.push(Vec::new());
        Ok(slot)
    }

    /// Returns the slot of an item
    pub fn index_of(&self, id: WorkItemId) -> Option<Slot> {
        self.index.get(&id).copied()
    }

    /// Returns the slot of an item, or `ItemNotFound`
    pub fn require(&self, id: WorkItemId) -> Result<Slot, GraphError> {
        self.index_of(id).ok_or(GraphError::ItemNotFound(id))
    }

    pub fn item(&self, slot: Slot) -> &WorkItem {
        &self.items[slot]
    }

    pub fn item_mut(&mut self, slot: Slot) -> &mut WorkItem {
        &mut self.items[slot]
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn id(&self, slot: Slot) -> WorkItemId {
        self.items[slot].id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn parent(&self, slot: Slot) -> Option<Slot> {
        self.parent[slot]
    }

    /// Direct children in insertion order
    pub fn children(&self, slot: Slot) -> &[Slot] {
        &self.children[slot]
    }

    /// Direct predecessors with their lag, in insertion order
    pub fn predecessors(&self, slot: Slot) -> &[(Slot, i32)] {
        &self.predecessors[slot]
    }

    pub fn successors(&self, slot: Slot) -> &[Slot] {
        &self.successors[slot]
    }

    pub fn has_children(&self, slot: Slot) -> bool {
        !self.children[slot].is_empty()
    }

    pub fn has_predecessors(&self, slot: Slot) -> bool {
        !self.predecessors[slot].is_empty()
    }

    /// Ancestors from the direct parent up to the root
    pub fn ancestors(&self, slot: Slot) -> Vec<Slot> {
        let mut chain = Vec::new();
        let mut current = self.parent[slot];
        while let Some(p) = current {
            chain.push(p);
            current = self.parent[p];
        }
        chain
    }

    /// Returns true if adding the dependency `source -> dependent` closes a cycle
    ///
    /// That is the case when `dependent` already leads to `source`.
    pub fn would_create_cycle(&self, source: Slot, dependent: Slot) -> bool {
        source == dependent
            || has_path_connecting(
                &self.deps,
                NodeIndex::new(dependent),
                NodeIndex::new(source),
                None,
            )
    }

    fn cycle_error(&self, source: Slot, dependent: Slot) -> GraphError {
        GraphError::CycleDetected {
            from: self.id(source),
            to: self.id(dependent),
        }
    }

    /// Makes `child` a child of `parent`
    ///
    /// Adding an existing child is a no-op and reports `Unchanged`.
    pub fn add_child(&mut self, parent: Slot, child: Slot) -> Result<Attachment, GraphError> {
        let previous = self.parent[child];
        if previous == Some(parent) {
            return Ok(Attachment::Unchanged);
        }

        // The child feeds the parent's dates
        if self.would_create_cycle(child, parent) {
            return Err(self.cycle_error(child, parent));
        }

        let attachment = match previous {
            Some(old) => {
                self.remove_child(old, child);
                Attachment::Moved(old)
            }
            None => Attachment::Attached,
        };

        self.parent[child] = Some(parent);
        self.children[parent].push(child);
        self.items[child].parent_id = Some(self.items[parent].id);
        self.deps
            .add_edge(NodeIndex::new(child), NodeIndex::new(parent), Edge::Hierarchy);

        Ok(attachment)
    }

    /// Detaches `child` from `parent`
    pub fn remove_child(&mut self, parent: Slot, child: Slot) -> bool {
        if self.parent[child] != Some(parent) {
            return false;
        }

        self.parent[child] = None;
        self.children[parent].retain(|c| *c != child);
        self.items[child].parent_id = None;
        self.remove_edge(child, parent, Edge::Hierarchy);
        true
    }

    /// Makes `succ` follow `pred` with the given lag
    ///
    /// An existing relation between the pair has its lag updated.
    /// Returns true if anything changed.
    pub fn add_relation(&mut self, pred: Slot, succ: Slot, lag: i32) -> Result<bool, GraphError> {
        if let Some(entry) = self.predecessors[succ].iter_mut().find(|(p, _)| *p == pred) {
            let changed = entry.1 != lag;
            entry.1 = lag;
            return Ok(changed);
        }

        if self.would_create_cycle(pred, succ) {
            return Err(self.cycle_error(pred, succ));
        }

        self.predecessors[succ].push((pred, lag));
        self.successors[pred].push(succ);
        self.deps
            .add_edge(NodeIndex::new(pred), NodeIndex::new(succ), Edge::Precedes);
        Ok(true)
    }

    /// Removes the relation `succ` follows `pred`
    pub fn remove_relation(&mut self, pred: Slot, succ: Slot) -> bool {
        let before = self.predecessors[succ].len();
        self.predecessors[succ].retain(|(p, _)| *p != pred);
        if self.predecessors[succ].len() == before {
            return false;
        }

        self.successors[pred].retain(|s| *s != succ);
        self.remove_edge(pred, succ, Edge::Precedes);
        true
    }

    fn remove_edge(&mut self, from: Slot, to: Slot, kind: Edge) {
        let edge = self
            .deps
            .edges_connecting(NodeIndex::new(from), NodeIndex::new(to))
            .find(|e| *e.weight() == kind)
            .map(|e| e.id());
        if let Some(edge) = edge {
            self.deps.remove_edge(edge);
        }
    }

    /// Seeds plus every item whose dates transitively derive from them
    ///
    /// Follows dependency edges: parents, successors, and in turn their
    /// parents and successors.
    pub fn dependents_closure(&self, seeds: impl IntoIterator<Item = Slot>) -> HashSet<Slot> {
        let mut visited: HashSet<Slot> = HashSet::new();
        let mut queue: VecDeque<Slot> = VecDeque::new();

        for seed in seeds {
            if visited.insert(seed) {
                queue.push_back(seed);
            }
        }

        while let Some(current) = queue.pop_front() {
            let next = self.parent[current]
                .into_iter()
                .chain(self.successors[current].iter().copied());
            for slot in next {
                if visited.insert(slot) {
                    queue.push_back(slot);
                }
            }
        }

        visited
    }

    /// All slots with every dependency before its dependents
    pub fn dependency_order(&self) -> Result<Vec<Slot>, GraphError> {
        toposort(&self.deps, None)
            .map(|order| order.into_iter().map(|idx| idx.index()).collect())
            .map_err(|cycle| {
                let slot = cycle.node_id().index();
                self.cycle_error(slot, slot)
            })
    }

    /// Consumes the graph, returning the items in arena order
    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }
}
