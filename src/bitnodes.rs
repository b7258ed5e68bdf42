// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Bit Nodes
//!
//! And-inverter style DAG over boolean terms. Bit-vector logic buffers keep one [`NodeRef`]
//! per bit. Nodes only turn into terms once a buffer is committed.

use crate::term::TermRef;
use rustc_hash::FxHashMap;
use std::ops::Not;

/// `2 * index + polarity`, node 0 is the constant `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(u32);

impl NodeRef {
    pub const TRUE: NodeRef = NodeRef(0);
    pub const FALSE: NodeRef = NodeRef(1);

    #[inline]
    fn positive(index: u32) -> Self {
        NodeRef(index << 1)
    }

    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        (self.0 >> 1) as usize
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline]
    pub fn unsigned(self) -> Self {
        NodeRef(self.0 & !1)
    }

    #[inline]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::TRUE => Some(true),
            Self::FALSE => Some(false),
            _ => None,
        }
    }
}

impl Not for NodeRef {
    type Output = NodeRef;

    #[inline]
    fn not(self) -> Self::Output {
        NodeRef(self.0 ^ 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BitNode {
    Const,
    /// a positive boolean term
    Leaf(TermRef),
    Or(NodeRef, NodeRef),
    Xor(NodeRef, NodeRef),
}

#[derive(Debug, Clone)]
pub struct NodeTable {
    nodes: Vec<BitNode>,
    lookup: FxHashMap<BitNode, u32>,
    /// term of each positive node, once converted
    terms: Vec<Option<TermRef>>,
}

impl Default for NodeTable {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl NodeTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut out = Self {
            nodes: Vec::with_capacity(capacity),
            lookup: FxHashMap::default(),
            terms: Vec::with_capacity(capacity),
        };
        let tru = out.add(BitNode::Const);
        debug_assert_eq!(tru, NodeRef::TRUE);
        out.terms[0] = Some(TermRef::TRUE);
        out
    }

    fn add(&mut self, node: BitNode) -> NodeRef {
        if let Some(&index) = self.lookup.get(&node) {
            return NodeRef::positive(index);
        }
        let index = self.nodes.len() as u32;
        tracing::trace!("new bit node {index}: {node:?}");
        self.nodes.push(node.clone());
        self.terms.push(None);
        self.lookup.insert(node, index);
        NodeRef::positive(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, n: NodeRef) -> &BitNode {
        &self.nodes[n.index()]
    }

    /// Node for a boolean term.
    pub fn leaf(&mut self, t: TermRef) -> NodeRef {
        if t.is_bool_const() {
            return NodeRef::from_bool(t == TermRef::TRUE);
        }
        let n = self.add(BitNode::Leaf(t.unsigned()));
        if t.is_negative() {
            !n
        } else {
            n
        }
    }

    /// Returns `t` if `n` is the (positive) leaf of `t`.
    pub fn as_leaf(&self, n: NodeRef) -> Option<TermRef> {
        match self.get(n) {
            BitNode::Leaf(t) if !n.is_negative() => Some(*t),
            _ => None,
        }
    }

    pub fn or(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        // a | true -> true
        if a == NodeRef::TRUE || b == NodeRef::TRUE {
            return NodeRef::TRUE;
        }
        // a | false -> a
        if a == NodeRef::FALSE {
            return b;
        }
        if b == NodeRef::FALSE {
            return a;
        }
        // a | a -> a
        if a == b {
            return a;
        }
        // a | !a -> true
        if a == !b {
            return NodeRef::TRUE;
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        self.add(BitNode::Or(a, b))
    }

    pub fn and(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        !self.or(!a, !b)
    }

    pub fn xor(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        // a ^ false -> a
        if a == NodeRef::FALSE {
            return b;
        }
        if b == NodeRef::FALSE {
            return a;
        }
        // a ^ true -> !a
        if a == NodeRef::TRUE {
            return !b;
        }
        if b == NodeRef::TRUE {
            return !a;
        }
        // a ^ a -> false
        if a == b {
            return NodeRef::FALSE;
        }
        // a ^ !a -> true
        if a == !b {
            return NodeRef::TRUE;
        }
        // !a ^ b -> !(a ^ b)
        let negate = a.is_negative() ^ b.is_negative();
        let (a, b) = (a.unsigned(), b.unsigned());
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        let n = self.add(BitNode::Xor(a, b));
        if negate {
            !n
        } else {
            n
        }
    }

    pub fn xnor(&mut self, a: NodeRef, b: NodeRef) -> NodeRef {
        !self.xor(a, b)
    }

    pub(crate) fn cached_term(&self, n: NodeRef) -> Option<TermRef> {
        self.terms[n.index()].map(|t| if n.is_negative() { !t } else { t })
    }

    pub(crate) fn cache_term(&mut self, n: NodeRef, t: TermRef) {
        debug_assert!(!n.is_negative());
        self.terms[n.index()] = Some(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_simplifications() {
        let mut nodes = NodeTable::default();
        let a = nodes.leaf(TermRef::from_raw(10));
        let b = nodes.leaf(TermRef::from_raw(12));
        assert_eq!(nodes.or(a, NodeRef::FALSE), a);
        assert_eq!(nodes.or(a, !a), NodeRef::TRUE);
        assert_eq!(nodes.and(a, !a), NodeRef::FALSE);
        assert_eq!(nodes.xor(a, a), NodeRef::FALSE);
        assert_eq!(nodes.xor(a, NodeRef::TRUE), !a);
        assert_eq!(nodes.or(a, b), nodes.or(b, a));
        assert_eq!(nodes.xor(!a, b), !nodes.xor(a, b));
        assert_eq!(nodes.leaf(TermRef::from_raw(11)), !a);
        assert_eq!(nodes.as_leaf(a), Some(TermRef::from_raw(10)));
        assert_eq!(nodes.as_leaf(!a), None);
    }
}
