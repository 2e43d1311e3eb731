//! Arena-backed AVL mechanics shared by [`crate::avl::map::AvlMap`] (plain
//! key-ordered descent) and [`crate::status::StatusMap`] (descent driven by
//! the segment comparator instead of the node's own key).
//!
//! Nodes live in a `Vec` and are addressed by `NodeId` (a plain index)
//! rather than by `Rc`/`RefCell` pointers, per the arena-allocation
//! recommendation for this structure: rotations and structural deletion
//! only ever rewrite parent/child indices, so a node's `NodeId` stays valid
//! for as long as the node is in the tree, which lets callers (in
//! particular the status structure) keep an auxiliary index from a
//! segment back to its node.

pub(crate) type NodeId = usize;

pub(crate) struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub height: i32,
}

/// Arena of AVL nodes plus the mechanics that operate on raw node
/// structure: rotation, height bookkeeping, and leaf/branch/two-child
/// removal. Insertion *descent* (how to find where a new node goes) is left
/// to callers, since that's the one place `AvlMap` and `StatusMap` differ.
pub(crate) struct Arena<K, V> {
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    len: usize,
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn key(&self, id: NodeId) -> &K {
        &self.node(id).key
    }

    pub fn value(&self, id: NodeId) -> &V {
        &self.node(id).value
    }

    pub fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.node_mut(id).value
    }

    /// Overwrites a node's key in place. Used by the status structure's
    /// key-rebalancing pass, which reassigns synthetic keys without
    /// touching tree shape.
    pub fn set_key(&mut self, id: NodeId, key: K) {
        self.node_mut(id).key = key;
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn height(&self, id: NodeId) -> i32 {
        self.node(id).height
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes[id].as_ref().expect("access of a freed AVL node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes[id].as_mut().expect("access of a freed AVL node")
    }

    fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        };
        let id = if let Some(id) = self.free.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        };
        self.len += 1;
        id
    }

    fn dealloc(&mut self, id: NodeId) -> (K, V) {
        let node = self.nodes[id].take().expect("dealloc of a freed AVL node");
        self.free.push(id);
        self.len -= 1;
        (node.key, node.value)
    }

    /// Inserts the first node of an empty tree.
    pub fn insert_root(&mut self, key: K, value: V) -> NodeId {
        debug_assert!(self.root.is_none());
        let id = self.alloc(key, value, None);
        self.root = Some(id);
        id
    }

    /// Attaches a new leaf under `parent`, without rebalancing. Callers
    /// that need to compute the new node's key from its topological
    /// neighbors (the status structure's synthetic keys) do that between
    /// this and [`Arena::rebalance_after_insert`]; callers that don't
    /// (a plain key-ordered map) should use [`Arena::insert_child`].
    pub fn attach_child(&mut self, parent: NodeId, is_left: bool, key: K, value: V) -> NodeId {
        let id = self.alloc(key, value, Some(parent));
        if is_left {
            self.node_mut(parent).left = Some(id);
        } else {
            self.node_mut(parent).right = Some(id);
        }
        id
    }

    /// Attaches a new leaf under `parent` and rebalances from there up.
    pub fn insert_child(&mut self, parent: NodeId, is_left: bool, key: K, value: V) -> NodeId {
        let id = self.attach_child(parent, is_left, key, value);
        self.rebalance_after_insert(parent);
        id
    }

    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map(|i| self.node(i).height).unwrap_or(-1)
    }

    fn max_children_height(&self, id: NodeId) -> i32 {
        let n = self.node(id);
        self.height_of(n.left).max(self.height_of(n.right))
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        let n = self.node(id);
        self.height_of(n.left) - self.height_of(n.right)
    }

    fn recompute_heights(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            let has_children = self.node(id).left.is_some() || self.node(id).right.is_some();
            let new_height = if has_children {
                self.max_children_height(id) + 1
            } else {
                0
            };
            let node = self.node_mut(id);
            if node.height == new_height {
                break;
            }
            node.height = new_height;
            cur = node.parent;
        }
    }

    pub fn rebalance_after_insert(&mut self, start: NodeId) {
        self.recompute_heights(Some(start));
        let mut cur = Some(start);
        while let Some(id) = cur {
            let bf = self.balance_factor(id);
            if bf == -2 || bf == 2 {
                self.rebalance(id);
                break;
            }
            cur = self.node(id).parent;
        }
    }

    /// Replaces `old`'s slot in its parent (or the tree root) with `new`.
    fn reattach(&mut self, old: NodeId, new: NodeId) {
        let parent = self.node(old).parent;
        match parent {
            None => {
                self.root = Some(new);
                self.node_mut(new).parent = None;
            }
            Some(p) => {
                if self.node(p).right == Some(old) {
                    self.node_mut(p).right = Some(new);
                } else {
                    self.node_mut(p).left = Some(new);
                }
                self.node_mut(new).parent = Some(p);
            }
        }
    }

    fn rebalance(&mut self, a: NodeId) {
        if self.balance_factor(a) == -2 {
            let b = self.node(a).right.expect("RC imbalance without a right child");
            if self.balance_factor(b) <= 0 {
                self.rotate_rrc(a, b);
            } else {
                self.rotate_rlc(a, b);
            }
        } else {
            let b = self.node(a).left.expect("LC imbalance without a left child");
            if self.balance_factor(b) >= 0 {
                self.rotate_llc(a, b);
            } else {
                self.rotate_lrc(a, b);
            }
        }
    }

    /// Right-right case: single left rotation of `a` around `b`.
    fn rotate_rrc(&mut self, a: NodeId, b: NodeId) {
        let b_left = self.node(b).left;
        self.node_mut(a).right = b_left;
        if let Some(bl) = b_left {
            self.node_mut(bl).parent = Some(a);
        }
        self.node_mut(b).left = Some(a);
        self.node_mut(a).parent = Some(b);
        self.reattach(a, b);
        self.recompute_heights(Some(a));
        let bp = self.node(b).parent;
        self.recompute_heights(bp);
    }

    /// Right-left case: rotate right around `b`, then left around `a`.
    fn rotate_rlc(&mut self, a: NodeId, b: NodeId) {
        let c = self.node(b).left.expect("RL imbalance without an inner child");
        let c_right = self.node(c).right;
        let c_left = self.node(c).left;
        self.node_mut(b).left = c_right;
        if let Some(cr) = c_right {
            self.node_mut(cr).parent = Some(b);
        }
        self.node_mut(a).right = c_left;
        if let Some(cl) = c_left {
            self.node_mut(cl).parent = Some(a);
        }
        self.node_mut(c).right = Some(b);
        self.node_mut(b).parent = Some(c);
        self.node_mut(c).left = Some(a);
        self.node_mut(a).parent = Some(c);
        self.reattach(a, c);
        self.recompute_heights(Some(a));
        self.recompute_heights(Some(b));
    }

    /// Left-left case: single right rotation of `a` around `b`.
    fn rotate_llc(&mut self, a: NodeId, b: NodeId) {
        let b_right = self.node(b).right;
        self.node_mut(a).left = b_right;
        if let Some(br) = b_right {
            self.node_mut(br).parent = Some(a);
        }
        self.node_mut(b).right = Some(a);
        self.node_mut(a).parent = Some(b);
        self.reattach(a, b);
        self.recompute_heights(Some(a));
        let bp = self.node(b).parent;
        self.recompute_heights(bp);
    }

    /// Left-right case: rotate left around `b`, then right around `a`.
    fn rotate_lrc(&mut self, a: NodeId, b: NodeId) {
        let c = self.node(b).right.expect("LR imbalance without an inner child");
        let c_right = self.node(c).right;
        let c_left = self.node(c).left;
        self.node_mut(a).left = c_right;
        if let Some(cr) = c_right {
            self.node_mut(cr).parent = Some(a);
        }
        self.node_mut(b).right = c_left;
        if let Some(cl) = c_left {
            self.node_mut(cl).parent = Some(b);
        }
        self.node_mut(c).left = Some(b);
        self.node_mut(b).parent = Some(c);
        self.node_mut(c).right = Some(a);
        self.node_mut(a).parent = Some(c);
        self.reattach(a, c);
        self.recompute_heights(Some(a));
        self.recompute_heights(Some(b));
    }

    pub fn find_smallest(&self, start: NodeId) -> NodeId {
        let mut node = start;
        while let Some(l) = self.node(node).left {
            node = l;
        }
        node
    }

    pub fn find_biggest(&self, start: NodeId) -> NodeId {
        let mut node = start;
        while let Some(r) = self.node(node).right {
            node = r;
        }
        node
    }

    pub fn min(&self) -> Option<NodeId> {
        self.root.map(|r| self.find_smallest(r))
    }

    pub fn max(&self) -> Option<NodeId> {
        self.root.map(|r| self.find_biggest(r))
    }

    /// Topological (parent-pointer) in-order successor.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.node(id).right {
            return Some(self.find_smallest(r));
        }
        let mut cur = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Topological (parent-pointer) in-order predecessor.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(l) = self.node(id).left {
            return Some(self.find_biggest(l));
        }
        let mut cur = id;
        let mut parent = self.node(id).parent;
        while let Some(p) = parent {
            if self.node(p).right == Some(cur) {
                return Some(p);
            }
            cur = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// In-order traversal, topological (not value-ordered, though for a
    /// valid BST the two coincide).
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(r) = self.root {
            self.traverse_from(r, &mut out);
        }
        out
    }

    fn traverse_from(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(l) = self.node(id).left {
            self.traverse_from(l, out);
        }
        out.push(id);
        if let Some(r) = self.node(id).right {
            self.traverse_from(r, out);
        }
    }

    /// Removes `id` from the tree, returning its stored key/value.
    ///
    /// The reference implementation swaps a two-children node's position
    /// with its successor's but leaves the *key/value* payload on the
    /// original node object, so the identity a caller holds (here,
    /// `NodeId`) always denotes the same payload until this call removes
    /// it — only its place in the tree, and sometimes another node's place,
    /// changes first.
    pub fn remove(&mut self, id: NodeId) -> (K, V) {
        let left = self.node(id).left;
        let right = self.node(id).right;
        match (left, right) {
            (None, None) => self.remove_leaf(id),
            (Some(_), None) | (None, Some(_)) => self.remove_branch(id),
            (Some(_), Some(_)) => self.remove_two_children(id),
        }
        self.dealloc(id)
    }

    fn remove_leaf(&mut self, id: NodeId) {
        let parent = self.node(id).parent;
        match parent {
            Some(p) => {
                if self.node(p).left == Some(id) {
                    self.node_mut(p).left = None;
                } else {
                    self.node_mut(p).right = None;
                }
                self.recompute_heights(Some(p));
            }
            None => self.root = None,
        }
        self.rebalance_walk_up(parent);
    }

    fn remove_branch(&mut self, id: NodeId) {
        let parent = self.node(id).parent;
        let child = self.node(id).right.or(self.node(id).left);
        match parent {
            Some(p) => {
                if self.node(p).left == Some(id) {
                    self.node_mut(p).left = child;
                } else {
                    self.node_mut(p).right = child;
                }
                if let Some(c) = child {
                    self.node_mut(c).parent = Some(p);
                }
                self.recompute_heights(Some(p));
            }
            None => {
                self.root = child;
                if let Some(c) = child {
                    self.node_mut(c).parent = None;
                }
            }
        }
        self.rebalance_walk_up(parent);
    }

    fn remove_two_children(&mut self, id: NodeId) {
        let right = self.node(id).right.expect("two-children removal without a right child");
        let successor = self.find_smallest(right);
        self.swap_nodes(id, successor);
        debug_assert!(self.node(id).left.is_none());
        if self.node(id).height == 0 {
            self.remove_leaf(id);
        } else {
            self.remove_branch(id);
        }
    }

    /// Swaps two nodes' tree positions (and heights) but not their
    /// key/value payloads. `node2` must be the in-order successor of
    /// `node1` and so have no left child.
    fn swap_nodes(&mut self, node1: NodeId, node2: NodeId) {
        let parent1 = self.node(node1).parent;
        let left1 = self.node(node1).left;
        let right1 = self.node(node1).right;
        let parent2 = self.node(node2).parent;
        let right2 = self.node(node2).right;
        debug_assert!(self.node(node2).left.is_none());

        let h1 = self.node(node1).height;
        let h2 = self.node(node2).height;
        self.node_mut(node1).height = h2;
        self.node_mut(node2).height = h1;

        match parent1 {
            Some(p1) => {
                if self.node(p1).left == Some(node1) {
                    self.node_mut(p1).left = Some(node2);
                } else {
                    self.node_mut(p1).right = Some(node2);
                }
                self.node_mut(node2).parent = Some(p1);
            }
            None => {
                self.root = Some(node2);
                self.node_mut(node2).parent = None;
            }
        }

        self.node_mut(node2).left = left1;
        let l1 = left1.expect("node1 has two children, so its left child exists");
        self.node_mut(l1).parent = Some(node2);

        self.node_mut(node1).left = None;
        self.node_mut(node1).right = right2;
        if let Some(r2) = right2 {
            self.node_mut(r2).parent = Some(node1);
        }

        if parent2 != Some(node1) {
            let p2 = parent2.expect("the successor always has a parent here");
            self.node_mut(node2).right = right1;
            if let Some(r1) = right1 {
                self.node_mut(r1).parent = Some(node2);
            }
            self.node_mut(p2).left = Some(node1);
            self.node_mut(node1).parent = Some(p2);
        } else {
            self.node_mut(node2).right = Some(node1);
            self.node_mut(node1).parent = Some(node2);
        }
    }

    fn rebalance_walk_up(&mut self, start: Option<NodeId>) {
        let mut cur = start;
        while let Some(id) = cur {
            let next = self.node(id).parent;
            let bf = self.balance_factor(id);
            if !(-1..=1).contains(&bf) {
                self.rebalance(id);
            }
            cur = next;
        }
    }
}

impl<K: Ord, V> Arena<K, V> {
    pub fn search(&self, key: &K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let n = self.node(id);
            cur = match key.cmp(&n.key) {
                std::cmp::Ordering::Equal => return Some(id),
                std::cmp::Ordering::Less => n.left,
                std::cmp::Ordering::Greater => n.right,
            };
        }
        None
    }

    /// Value-based (not topological) search for the highest node strictly
    /// below `value`.
    pub fn lo_neighbor(&self, value: &K) -> Option<NodeId> {
        let mut node = self.root?;
        let mut best: Option<NodeId> = None;
        loop {
            if &self.node(node).key < value {
                best = match best {
                    Some(b) if self.node(b).key >= self.node(node).key => Some(b),
                    _ => Some(node),
                };
                match self.node(node).right {
                    Some(r) => node = r,
                    None => break,
                }
            } else {
                match self.node(node).left {
                    Some(l) => node = l,
                    None => break,
                }
            }
        }
        best
    }

    /// Value-based (not topological) search for the lowest node strictly
    /// above `value`.
    pub fn hi_neighbor(&self, value: &K) -> Option<NodeId> {
        let mut node = self.root?;
        let mut best: Option<NodeId> = None;
        loop {
            if &self.node(node).key > value {
                best = match best {
                    Some(b) if self.node(b).key <= self.node(node).key => Some(b),
                    _ => Some(node),
                };
                match self.node(node).left {
                    Some(l) => node = l,
                    None => break,
                }
            } else {
                match self.node(node).right {
                    Some(r) => node = r,
                    None => break,
                }
            }
        }
        best
    }

    /// Nodes with keys in `[lo, hi]`, pruning subtrees that provably fall
    /// outside the range.
    pub fn range(&self, lo: &K, hi: &K) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(r) = self.root {
            self.range_from(r, lo, hi, &mut out);
        }
        out
    }

    fn range_from(&self, id: NodeId, lo: &K, hi: &K, out: &mut Vec<NodeId>) {
        let n = self.node(id);
        if lo < &n.key {
            if let Some(l) = n.left {
                self.range_from(l, lo, hi, out);
            }
        }
        if lo <= &n.key && &n.key <= hi {
            out.push(id);
        }
        if &n.key < hi {
            if let Some(r) = n.right {
                self.range_from(r, lo, hi, out);
            }
        }
    }
}
