// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Term, TermRef};
use crate::types::TypeRef;
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use std::ops::Index;

#[derive(Debug, Clone)]
struct TermInfo {
    term: Term,
    tpe: TypeRef,
}

/// Hash-consed store of term nodes.
///
/// Nodes are never removed. A handle stays valid until the table itself is dropped.
#[derive(Debug, Clone)]
pub struct TermTable {
    nodes: Vec<TermInfo>,
    lookup: FxHashMap<Term, u32>,
    /// canonical inhabitant of every type with exactly one element that we have seen so far
    unit_reps: FxHashMap<TypeRef, TermRef>,
    fresh_ids: u32,
}

impl Default for TermTable {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl TermTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut out = Self {
            nodes: Vec::with_capacity(capacity),
            lookup: FxHashMap::default(),
            unit_reps: FxHashMap::default(),
            fresh_ids: 0,
        };
        let tru = out.intern(Term::True, TypeRef::BOOL);
        let zero = out.intern(Term::ArithConst(BigRational::zero()), TypeRef::INT);
        debug_assert_eq!((tru, zero), (TermRef::TRUE, TermRef::ZERO));
        out
    }

    /// Returns the unique node for `term`, creating it on a miss.
    pub(crate) fn intern(&mut self, term: Term, tpe: TypeRef) -> TermRef {
        if let Some(&index) = self.lookup.get(&term) {
            debug_assert_eq!(self.nodes[index as usize].tpe, tpe, "{term:?}");
            return TermRef::positive(index);
        }
        let index = self.nodes.len() as u32;
        tracing::trace!("new term {index}: {term:?} : {tpe:?}");
        self.nodes.push(TermInfo {
            term: term.clone(),
            tpe,
        });
        self.lookup.insert(term, index);
        TermRef::positive(index)
    }

    pub(crate) fn fresh_id(&mut self) -> u32 {
        let id = self.fresh_ids;
        self.fresh_ids += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// In range, and only boolean terms may be negated.
    pub fn is_valid(&self, t: TermRef) -> bool {
        match self.nodes.get(t.index()) {
            Some(info) => t.is_positive() || info.tpe == TypeRef::BOOL,
            None => false,
        }
    }

    /// Payload of the node behind `t`, ignoring polarity.
    #[inline]
    pub fn get(&self, t: TermRef) -> &Term {
        &self.nodes[t.index()].term
    }

    #[inline]
    pub fn type_of(&self, t: TermRef) -> TypeRef {
        self.nodes[t.index()].tpe
    }

    pub fn unit_rep(&self, tau: TypeRef) -> Option<TermRef> {
        self.unit_reps.get(&tau).copied()
    }

    pub(crate) fn set_unit_rep(&mut self, tau: TypeRef, t: TermRef) {
        self.unit_reps.entry(tau).or_insert(t);
    }
}

impl Index<TermRef> for TermTable {
    type Output = Term;

    #[inline]
    fn index(&self, t: TermRef) -> &Self::Output {
        self.get(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut tt = TermTable::default();
        let x = tt.intern(
            Term::Uninterpreted {
                tpe: TypeRef::BOOL,
                id: 0,
            },
            TypeRef::BOOL,
        );
        let y = tt.intern(
            Term::Uninterpreted {
                tpe: TypeRef::BOOL,
                id: 1,
            },
            TypeRef::BOOL,
        );
        let or = tt.intern(Term::Or(vec![x, y]), TypeRef::BOOL);
        let len = tt.len();
        assert_eq!(tt.intern(Term::Or(vec![x, y]), TypeRef::BOOL), or);
        assert_eq!(tt.len(), len);
        assert!(tt.is_valid(!or));
    }

    #[test]
    fn only_booleans_have_a_negative_occurrence() {
        let tt = TermTable::default();
        assert!(tt.is_valid(TermRef::FALSE));
        assert!(tt.is_valid(TermRef::ZERO));
        assert!(!tt.is_valid(!TermRef::ZERO));
        assert!(!tt.is_valid(TermRef::from_raw(1000)));
    }
}
