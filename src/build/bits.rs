// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Conversion between bit-vector terms, bit nodes and bit arrays.

use crate::bitnodes::{BitNode, NodeRef};
use crate::buffers::{BvLogicBuffer, ScratchBuffer};
use crate::context::Context;
use crate::term::{Term, TermRef};
use crate::types::TypeRef;
use baa::WidthInt;

impl Context {
    /// Boolean term of a bit node. Converted nodes are cached in the node table.
    pub(crate) fn node_term(&mut self, n: NodeRef) -> TermRef {
        if let Some(t) = self.nodes.cached_term(n) {
            return t;
        }
        let mut todo = vec![n.unsigned()];
        while let Some(&top) = todo.last() {
            if self.nodes.cached_term(top).is_some() {
                todo.pop();
                continue;
            }
            match self.nodes.get(top).clone() {
                BitNode::Const => unreachable!("constant node is always cached"),
                BitNode::Leaf(t) => {
                    self.nodes.cache_term(top, t);
                    todo.pop();
                }
                BitNode::Or(a, b) | BitNode::Xor(a, b) => {
                    let is_or = matches!(self.nodes.get(top), BitNode::Or(..));
                    match (self.nodes.cached_term(a), self.nodes.cached_term(b)) {
                        (Some(ta), Some(tb)) => {
                            let t = if is_or {
                                self.mk_or2(ta, tb)
                            } else {
                                self.mk_xor2(ta, tb)
                            };
                            self.nodes.cache_term(top, t);
                            todo.pop();
                        }
                        (ta, tb) => {
                            if ta.is_none() {
                                todo.push(a.unsigned());
                            }
                            if tb.is_none() {
                                todo.push(b.unsigned());
                            }
                        }
                    }
                }
            }
        }
        self.nodes
            .cached_term(n)
            .unwrap_or_else(|| unreachable!("node {n:?} was converted"))
    }

    /// `Bit { index: i, arg: t }`, or the bit itself for constants and bit arrays.
    pub(crate) fn mk_bit(&mut self, t: TermRef, i: WidthInt) -> TermRef {
        match self.terms.get(t) {
            Term::BvConst64 { value, .. } => TermRef::from_bool((value >> i) & 1 == 1),
            Term::BvConst { words, .. } => {
                TermRef::from_bool(crate::bvconst::word_bit(words, i))
            }
            Term::BvArray(bits) => bits[i as usize],
            _ => self
                .terms
                .intern(Term::Bit { index: i, arg: t }, TypeRef::BOOL),
        }
    }

    /// One node per bit of `t`, least significant first.
    pub(crate) fn term_bits(&mut self, t: TermRef) -> Vec<NodeRef> {
        let width = self.types.bv_width(self.terms.type_of(t)).unwrap_or(0);
        (0..width)
            .map(|i| {
                let b = self.mk_bit(t, i);
                self.nodes.leaf(b)
            })
            .collect()
    }

    /// Bit-vector term from its bits. Detects constants and the bits of a single term.
    pub(crate) fn bv_array_term(&mut self, bits: Vec<TermRef>) -> TermRef {
        let width = bits.len() as WidthInt;
        if bits.iter().all(|b| b.is_bool_const()) {
            let words = crate::bvconst::words_from_bits(
                bits.iter().map(|b| *b == TermRef::TRUE),
                width,
            );
            return self.mk_bvconst_words(width, &words);
        }
        if let Some(t) = self.bit_source(&bits) {
            return t;
        }
        let tau = self.types.bv(width);
        self.terms.intern(Term::BvArray(bits), tau)
    }

    /// `t` if `bits[i]` is bit `i` of `t` for every `i`
    fn bit_source(&self, bits: &[TermRef]) -> Option<TermRef> {
        let first = *bits.first()?;
        let Term::Bit { index: 0, arg } = self.terms.get(first) else {
            return None;
        };
        let arg = *arg;
        if first.is_negative()
            || self.types.bv_width(self.terms.type_of(arg)) != Some(bits.len() as WidthInt)
        {
            return None;
        }
        let all_match = bits.iter().enumerate().all(|(i, b)| {
            b.is_positive()
                && matches!(self.terms.get(*b), Term::Bit { index, arg: a } if *index as usize == i && *a == arg)
        });
        all_match.then_some(arg)
    }

    /// Commits a logic buffer and leaves it empty.
    pub(crate) fn logic_buffer_term(&mut self, b: &mut BvLogicBuffer) -> TermRef {
        debug_assert!(!b.is_empty());
        let t = if let Some(words) = b.constant_words() {
            self.mk_bvconst_words(b.width(), &words)
        } else {
            let bits = b.bits().iter().map(|n| self.node_term(*n)).collect();
            self.bv_array_term(bits)
        };
        b.reset();
        t
    }

    /// Runs `f` on a scratch logic buffer holding the bits of `t`.
    pub(crate) fn logic_op(
        &mut self,
        t: TermRef,
        f: impl FnOnce(&mut Self, &mut BvLogicBuffer),
    ) -> TermRef {
        self.with_scratch(|ctx, b: &mut BvLogicBuffer| {
            let bits = ctx.term_bits(t);
            b.set_bits(bits);
            f(ctx, b);
            ctx.logic_buffer_term(b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_and_recompose() {
        let mut ctx = Context::default();
        let bv5 = ctx.bv_type(5).unwrap();
        let x = ctx.new_uninterpreted_term(bv5).unwrap();
        assert_eq!(ctx.logic_op(x, |_, _| {}), x);
        let n = ctx.nodes.len();
        assert_eq!(ctx.logic_op(x, |_, _| {}), x);
        assert_eq!(ctx.nodes.len(), n, "bit nodes are shared");
    }

    #[test]
    fn nodes_become_boolean_terms() {
        let mut ctx = Context::default();
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let q = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let (np, nq) = (ctx.nodes.leaf(p), ctx.nodes.leaf(q));
        let and = ctx.nodes.and(np, nq);
        let t = ctx.node_term(and);
        assert_eq!(t, ctx.and2(p, q).unwrap());
        let xor = ctx.nodes.xor(np, !nq);
        let t = ctx.node_term(xor);
        assert_eq!(t, !ctx.xor2(p, q).unwrap());
    }
}
