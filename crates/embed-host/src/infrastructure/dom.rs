//! DOM attach points.
//!
//! A session is given a target that is either an element id or a node.  The
//! [`AttachPoints`] trait resolves ids and attaches or detaches surfaces;
//! [`MemoryDocument`] implements it for the demo binary and the tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::infrastructure::surface::EmbedSurface;

/// Identity of one node in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Document,
}

/// A handle to a node.  Only element nodes can hold a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl NodeRef {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
        }
    }

    pub fn element() -> Self {
        Self::new(NodeKind::Element)
    }

    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}

/// Where a session should attach its surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// An element id, looked up at construction time.
    Id(String),
    /// A node the host already holds.
    Node(NodeRef),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => f.write_str(id),
            Target::Node(node) => write!(f, "{:?} node", node.kind),
        }
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Id(id.to_string())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Id(id)
    }
}

impl From<NodeRef> for Target {
    fn from(node: NodeRef) -> Self {
        Target::Node(node)
    }
}

/// Resolves targets and attaches surfaces to them.
pub trait AttachPoints: Send + Sync {
    fn element_by_id(&self, id: &str) -> Option<NodeRef>;

    fn append_child(&self, parent: &NodeRef, surface: &EmbedSurface);

    /// Removes `surface` from wherever it is attached.  Returns `false` if it
    /// was not attached.
    fn detach(&self, surface: &EmbedSurface) -> bool;
}

// ── In-memory document ────────────────────────────────────────────────────────

#[derive(Default)]
struct DocumentState {
    by_id: HashMap<String, NodeRef>,
    children: HashMap<NodeId, Vec<EmbedSurface>>,
}

/// A flat in-memory document: named nodes, each with a list of attached
/// surfaces.
#[derive(Default)]
pub struct MemoryDocument {
    state: Mutex<DocumentState>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an element with the given id and returns its handle.
    pub fn insert_element(&self, id: &str) -> NodeRef {
        self.insert_node(id, NodeKind::Element)
    }

    pub fn insert_node(&self, id: &str, kind: NodeKind) -> NodeRef {
        let node = NodeRef::new(kind);
        self.state().by_id.insert(id.to_string(), node);
        node
    }

    /// Surfaces currently attached under `parent`, in attach order.
    pub fn children_of(&self, parent: &NodeRef) -> Vec<EmbedSurface> {
        self.state()
            .children
            .get(&parent.id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of surfaces attached anywhere in the document.
    pub fn attached_count(&self) -> usize {
        self.state().children.values().map(Vec::len).sum()
    }
}

impl AttachPoints for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<NodeRef> {
        self.state().by_id.get(id).copied()
    }

    fn append_child(&self, parent: &NodeRef, surface: &EmbedSurface) {
        self.state()
            .children
            .entry(parent.id)
            .or_default()
            .push(surface.clone());
    }

    fn detach(&self, surface: &EmbedSurface) -> bool {
        let mut state = self.state();
        let mut removed = false;
        state.children.retain(|_, attached| {
            let before = attached.len();
            attached.retain(|s| s.content_window != surface.content_window);
            removed |= attached.len() != before;
            !attached.is_empty()
        });
        removed
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("MemoryDocument")
            .field("nodes", &state.by_id.len())
            .field("attached", &state.children.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
