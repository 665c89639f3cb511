//! Height-balanced binary search tree (AVL) with stable node handles.
//!
//! Purpose
//! - Ordered container for the beachline, whose ordering key is not stored but
//!   evaluated on demand. The tree therefore never owns a comparator: every
//!   keyed operation takes one, so the caller decides what state (e.g. the
//!   sweep position) it reads.
//! - Positional operations (`insert_before`, `insert_after`, `remove_node`,
//!   `replace`) for callers that already know where a value belongs.
//!
//! Invariants
//! - In-order sequence is sorted under the comparator last used to build it.
//! - `|height(right) - height(left)| <= 1` at every node after each public call.
//! - `NodeId`s stay valid until their node is removed; rotations and deletions
//!   relink nodes and never move values between slots.
//!
//! Comparator hazard
//! - Comparators must be pure for a fixed snapshot of whatever external state
//!   they read. Changing that state between a search and an insert that relies
//!   on it silently breaks the BST order. Nothing here detects that.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// Handle of a tree node. Valid until the node is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Child structure of a node reported by `AvlTree::leaf_classified`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    /// Only a left child.
    LeftChildOnly,
    /// Only a right child.
    RightChildOnly,
    /// No children.
    Childless,
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    height: i32,
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

/// Arena-backed AVL tree.
#[derive(Clone, Debug)]
pub struct AvlTree<T> {
    slots: Vec<Slot<T>>,
    free: Option<usize>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            root: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Height of the whole tree (0 when empty).
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Value behind `id`, or `None` for a removed node.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(n)) => Some(&n.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(n)) => Some(&mut n.value),
            _ => None,
        }
    }

    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    // ---------------------------------------------------------------- search

    /// Exact match. `probe_cmp(v)` orders the probe relative to node value `v`.
    pub fn search_by<F>(&self, mut probe_cmp: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            let n = self.node(id);
            cur = match probe_cmp(&n.value) {
                Ordering::Less => n.left,
                Ordering::Greater => n.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Exact match of `probe` under `cmp`.
    pub fn search<F>(&self, probe: &T, mut cmp: F) -> Option<NodeId>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.search_by(|v| cmp(probe, v))
    }

    /// Where the probe would be inserted.
    ///
    /// Returns `(true, node)` on an exact match; otherwise `(false, node)` with the
    /// last node on the search path, which is the in-order predecessor or
    /// successor of the insertion point. `(false, None)` for an empty tree.
    pub fn search_candidate_location_by<F>(&self, mut probe_cmp: F) -> (bool, Option<NodeId>)
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut cur = match self.root {
            Some(r) => r,
            None => return (false, None),
        };
        loop {
            let n = self.node(cur);
            let next = match probe_cmp(&n.value) {
                Ordering::Less => n.left,
                Ordering::Greater => n.right,
                Ordering::Equal => return (true, Some(cur)),
            };
            match next {
                Some(child) => cur = child,
                None => return (false, Some(cur)),
            }
        }
    }

    pub fn search_candidate_location<F>(&self, probe: &T, mut cmp: F) -> (bool, Option<NodeId>)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.search_candidate_location_by(|v| cmp(probe, v))
    }

    // ------------------------------------------------------------ navigation

    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|r| self.leftmost(r))
    }

    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|r| self.rightmost(r))
    }

    /// In-order predecessor.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.node(id).left {
            return Some(self.rightmost(l));
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            if self.node(p).right == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// In-order successor.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.node(id).right {
            return Some(self.leftmost(r));
        }
        let mut child = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// In-order iterator over `(handle, value)`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    /// In-order list of the nodes with at most one child, classified by which
    /// child they have. Nodes with two children are skipped.
    pub fn leaf_classified(&self) -> Vec<(LeafKind, NodeId)> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = self.root;
        while cur.is_some() || !stack.is_empty() {
            while let Some(id) = cur {
                stack.push(id);
                cur = self.node(id).left;
            }
            let Some(id) = stack.pop() else { break };
            let n = self.node(id);
            let kind = match (n.left, n.right) {
                (None, None) => Some(LeafKind::Childless),
                (Some(_), None) => Some(LeafKind::LeftChildOnly),
                (None, Some(_)) => Some(LeafKind::RightChildOnly),
                (Some(_), Some(_)) => None,
            };
            if let Some(kind) = kind {
                out.push((kind, id));
            }
            cur = n.right;
        }
        out
    }

    // ------------------------------------------------------------- mutation

    /// Keyed insert. An equal value already present leaves the tree untouched
    /// and hands `value` back as `Err`.
    pub fn insert<F>(&mut self, value: T, mut cmp: F) -> Result<NodeId, T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let Some(mut cur) = self.root else {
            let id = self.alloc(value, None);
            self.root = Some(id);
            return Ok(id);
        };
        loop {
            let n = self.node(cur);
            let (ord, left, right) = (cmp(&value, &n.value), n.left, n.right);
            match ord {
                Ordering::Less => match left {
                    Some(l) => cur = l,
                    None => return Ok(self.attach(cur, true, value)),
                },
                Ordering::Greater => match right {
                    Some(r) => cur = r,
                    None => return Ok(self.attach(cur, false, value)),
                },
                Ordering::Equal => return Err(value),
            }
        }
    }

    /// Insert `value` immediately before `id` in in-order sequence.
    pub fn insert_before(&mut self, id: NodeId, value: T) -> NodeId {
        match self.node(id).left {
            None => self.attach(id, true, value),
            Some(l) => {
                let at = self.rightmost(l);
                self.attach(at, false, value)
            }
        }
    }

    /// Insert `value` immediately after `id` in in-order sequence.
    pub fn insert_after(&mut self, id: NodeId, value: T) -> NodeId {
        match self.node(id).right {
            None => self.attach(id, false, value),
            Some(r) => {
                let at = self.leftmost(r);
                self.attach(at, true, value)
            }
        }
    }

    /// Swap the value stored at `id`. The caller keeps the order valid.
    pub fn replace(&mut self, id: NodeId, value: T) -> T {
        std::mem::replace(&mut self.node_mut(id).value, value)
    }

    /// Keyed removal; `None` if nothing compares equal to `probe`.
    pub fn remove<F>(&mut self, probe: &T, cmp: F) -> Option<T>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let id = self.search(probe, cmp)?;
        Some(self.remove_node(id))
    }

    /// Remove the node `id` and return its value. Other handles stay valid.
    ///
    /// Panics if `id` was already removed.
    pub fn remove_node(&mut self, id: NodeId) -> T {
        let (left, right, parent) = {
            let n = self.node(id);
            (n.left, n.right, n.parent)
        };
        let retrace_from = match (left, right) {
            (None, _) | (_, None) => {
                self.replace_child(parent, id, left.or(right));
                parent
            }
            (Some(l), Some(r)) => {
                // Successor `s` takes the place of `id`; it has no left child.
                let s = self.leftmost(r);
                let from = if s == r {
                    s
                } else {
                    let s_parent = self.node(s).parent;
                    let s_right = self.node(s).right;
                    self.replace_child(s_parent, s, s_right);
                    self.node_mut(s).right = Some(r);
                    self.node_mut(r).parent = Some(s);
                    s_parent.unwrap_or(s)
                };
                self.replace_child(parent, id, Some(s));
                self.node_mut(s).left = Some(l);
                self.node_mut(l).parent = Some(s);
                Some(from)
            }
        };
        let value = self.release(id);
        self.retrace(retrace_from);
        value
    }

    /// Drop all nodes.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.root = None;
        self.len = 0;
    }

    /// Check BST order (under `cmp`), parent links, cached heights and balance.
    pub fn check_invariants<F>(&self, mut cmp: F) -> Result<(), String>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if let Some(r) = self.root {
            if self.node(r).parent.is_some() {
                return Err("root has a parent".into());
            }
            self.check_subtree(r)?;
        }
        let ids: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        if ids.len() != self.len {
            return Err(format!("len {} but {} reachable", self.len, ids.len()));
        }
        for w in ids.windows(2) {
            if cmp(&self[w[0]], &self[w[1]]) != Ordering::Less {
                return Err(format!("order violated between {:?} and {:?}", w[0], w[1]));
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------- internals

    #[inline]
    fn node(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.0] {
            Slot::Occupied(n) => n,
            Slot::Vacant { .. } => panic!("use of removed tree node {id:?}"),
        }
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.0] {
            Slot::Occupied(n) => n,
            Slot::Vacant { .. } => panic!("use of removed tree node {id:?}"),
        }
    }

    fn alloc(&mut self, value: T, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            value,
            left: None,
            right: None,
            parent,
            height: 1,
        };
        self.len += 1;
        match self.free {
            Some(i) => {
                if let Slot::Vacant { next_free } = self.slots[i] {
                    self.free = next_free;
                }
                self.slots[i] = Slot::Occupied(node);
                NodeId(i)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> T {
        let slot = std::mem::replace(
            &mut self.slots[id.0],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(id.0);
        self.len -= 1;
        match slot {
            Slot::Occupied(n) => n.value,
            Slot::Vacant { .. } => panic!("double removal of tree node {id:?}"),
        }
    }

    /// New leaf under `parent` (as left child if `left`), then rebalance.
    fn attach(&mut self, parent: NodeId, left: bool, value: T) -> NodeId {
        let id = self.alloc(value, Some(parent));
        if left {
            self.node_mut(parent).left = Some(id);
        } else {
            self.node_mut(parent).right = Some(id);
        }
        self.retrace(Some(parent));
        id
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(l) = self.node(id).left {
            id = l;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(r) = self.node(id).right {
            id = r;
        }
        id
    }

    #[inline]
    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map_or(0, |i| self.node(i).height)
    }

    fn update_height(&mut self, id: NodeId) {
        let n = self.node(id);
        let h = self.height_of(n.left).max(self.height_of(n.right)) + 1;
        self.node_mut(id).height = h;
    }

    #[inline]
    fn balance(&self, id: NodeId) -> i32 {
        let n = self.node(id);
        self.height_of(n.right) - self.height_of(n.left)
    }

    /// Point `parent`'s link (or the root) that referenced `old` at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            Some(p) => {
                let pn = self.node_mut(p);
                if pn.left == Some(old) {
                    pn.left = new;
                } else {
                    pn.right = new;
                }
            }
            None => self.root = new,
        }
        if let Some(n) = new {
            self.node_mut(n).parent = parent;
        }
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.node(x).right else {
            return x;
        };
        let parent = self.node(x).parent;
        let inner = self.node(y).left;
        self.replace_child(parent, x, Some(y));
        self.node_mut(x).right = inner;
        if let Some(i) = inner {
            self.node_mut(i).parent = Some(x);
        }
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.node(x).left else {
            return x;
        };
        let parent = self.node(x).parent;
        let inner = self.node(y).right;
        self.replace_child(parent, x, Some(y));
        self.node_mut(x).left = inner;
        if let Some(i) = inner {
            self.node_mut(i).parent = Some(x);
        }
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Walk from `start` to the root, refreshing heights and rotating where
    /// `|balance| > 1`.
    fn retrace(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            self.update_height(id);
            let bal = self.balance(id);
            let top = if bal > 1 {
                if let Some(r) = self.node(id).right {
                    if self.balance(r) < 0 {
                        self.rotate_right(r);
                    }
                }
                self.rotate_left(id)
            } else if bal < -1 {
                if let Some(l) = self.node(id).left {
                    if self.balance(l) > 0 {
                        self.rotate_left(l);
                    }
                }
                self.rotate_right(id)
            } else {
                id
            };
            cur = self.node(top).parent;
        }
    }

    fn check_subtree(&self, id: NodeId) -> Result<i32, String> {
        let n = self.node(id);
        let mut hs = [0, 0];
        for (k, child) in [n.left, n.right].into_iter().enumerate() {
            if let Some(c) = child {
                if self.node(c).parent != Some(id) {
                    return Err(format!("broken parent link at {c:?}"));
                }
                hs[k] = self.check_subtree(c)?;
            }
        }
        let h = hs[0].max(hs[1]) + 1;
        if h != n.height {
            return Err(format!("stale height at {id:?}: {} vs {h}", n.height));
        }
        if (hs[1] - hs[0]).abs() > 1 {
            return Err(format!("unbalanced at {id:?}: {hs:?}"));
        }
        Ok(h)
    }
}

impl<T> Index<NodeId> for AvlTree<T> {
    type Output = T;

    /// Panics on a removed node.
    fn index(&self, id: NodeId) -> &T {
        &self.node(id).value
    }
}

impl<T> IndexMut<NodeId> for AvlTree<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).value
    }
}

/// In-order iterator, see `AvlTree::iter`.
pub struct Iter<'a, T> {
    tree: &'a AvlTree<T>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        Some((id, &self.tree[id]))
    }
}
