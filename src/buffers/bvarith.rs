// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Bit-Vector Arithmetic Buffers
//!
//! Polynomials over `Z / 2^width`. Coefficients are plain `u64` for widths up to 64 bits
//! and [`BitVecValue`] for anything wider. The term representation is chosen by width, not by
//! the buffer kind: both buffers produce `BvConst64`/`BvPoly64` payloads up to 64 bits.

use super::pool::ScratchBuffer;
use crate::bvconst::*;
use crate::pprod::{PProdRef, PProdTable};
use crate::term::Term;
use baa::{BitVecOps, BitVecValue, WidthInt};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};
use std::fmt::Debug;

/// Coefficient of a bit-vector polynomial. All operations are modulo `2^width`.
pub trait BvCoeff: Clone + PartialEq + Debug {
    fn from_u64_coeff(value: u64, width: WidthInt) -> Self;
    fn is_zero_coeff(&self) -> bool;
    fn is_one_coeff(&self) -> bool;
    fn plus(&self, other: &Self, width: WidthInt) -> Self;
    fn times(&self, other: &Self, width: WidthInt) -> Self;
    fn negated(&self, width: WidthInt) -> Self;
    /// `k` such that `self == 2^k`
    fn exact_log2(&self) -> Option<WidthInt>;
    fn test_bit(&self, i: WidthInt) -> bool;

    fn const_term(&self, width: WidthInt) -> Term;
    fn poly_term(width: WidthInt, monos: Vec<(Self, PProdRef)>) -> Term;
    /// Monomials of a constant or polynomial payload, `None` for any other term.
    fn term_monomials(term: &Term) -> Option<Vec<(Self, PProdRef)>>;
}

impl BvCoeff for u64 {
    fn from_u64_coeff(value: u64, width: WidthInt) -> Self {
        norm64(value, width)
    }

    fn is_zero_coeff(&self) -> bool {
        *self == 0
    }

    fn is_one_coeff(&self) -> bool {
        *self == 1
    }

    fn plus(&self, other: &Self, width: WidthInt) -> Self {
        norm64(self.wrapping_add(*other), width)
    }

    fn times(&self, other: &Self, width: WidthInt) -> Self {
        norm64(self.wrapping_mul(*other), width)
    }

    fn negated(&self, width: WidthInt) -> Self {
        norm64(self.wrapping_neg(), width)
    }

    fn exact_log2(&self) -> Option<WidthInt> {
        self.is_power_of_two().then(|| self.trailing_zeros())
    }

    fn test_bit(&self, i: WidthInt) -> bool {
        bit64(*self, i)
    }

    fn const_term(&self, width: WidthInt) -> Term {
        debug_assert!(width <= 64);
        Term::BvConst64 {
            width,
            value: *self,
        }
    }

    fn poly_term(width: WidthInt, monomials: Vec<(Self, PProdRef)>) -> Term {
        Term::BvPoly64 { width, monomials }
    }

    fn term_monomials(term: &Term) -> Option<Vec<(Self, PProdRef)>> {
        match term {
            Term::BvConst64 { value: 0, .. } => Some(vec![]),
            Term::BvConst64 { value, .. } => Some(vec![(*value, PProdRef::EMPTY)]),
            Term::BvPoly64 { monomials, .. } => Some(monomials.clone()),
            _ => None,
        }
    }
}

impl BvCoeff for BitVecValue {
    fn from_u64_coeff(value: u64, width: WidthInt) -> Self {
        big_to_value(&BigUint::from(value), width)
    }

    fn is_zero_coeff(&self) -> bool {
        self.is_zero()
    }

    fn is_one_coeff(&self) -> bool {
        value_to_big(self).is_one()
    }

    fn plus(&self, other: &Self, _width: WidthInt) -> Self {
        self.add(other)
    }

    fn times(&self, other: &Self, _width: WidthInt) -> Self {
        self.mul(other)
    }

    fn negated(&self, _width: WidthInt) -> Self {
        self.negate()
    }

    fn exact_log2(&self) -> Option<WidthInt> {
        let n = value_to_big(self);
        if n.count_ones() == 1 {
            n.trailing_zeros().map(|k| k as WidthInt)
        } else {
            None
        }
    }

    fn test_bit(&self, i: WidthInt) -> bool {
        value_bit(self, i)
    }

    fn const_term(&self, width: WidthInt) -> Term {
        if width <= 64 {
            let value = value_to_big(self).to_u64().unwrap_or_default();
            value.const_term(width)
        } else {
            Term::BvConst {
                width,
                words: value_to_words(self),
            }
        }
    }

    fn poly_term(width: WidthInt, monos: Vec<(Self, PProdRef)>) -> Term {
        if width <= 64 {
            let monomials = monos
                .into_iter()
                .map(|(c, p)| (value_to_big(&c).to_u64().unwrap_or_default(), p))
                .collect();
            Term::BvPoly64 { width, monomials }
        } else {
            let monomials = monos
                .into_iter()
                .map(|(c, p)| (value_to_words(&c), p))
                .collect();
            Term::BvPoly { width, monomials }
        }
    }

    fn term_monomials(term: &Term) -> Option<Vec<(Self, PProdRef)>> {
        let wide = |width: WidthInt, c: u64| Self::from_u64_coeff(c, width);
        match term {
            Term::BvConst64 { value: 0, .. } => Some(vec![]),
            Term::BvConst64 { width, value } => {
                Some(vec![(wide(*width, *value), PProdRef::EMPTY)])
            }
            Term::BvPoly64 { width, monomials } => Some(
                monomials
                    .iter()
                    .map(|(c, p)| (wide(*width, *c), *p))
                    .collect(),
            ),
            Term::BvConst { width, words } => {
                let value = words_to_value(words, *width);
                if value.is_zero() {
                    Some(vec![])
                } else {
                    Some(vec![(value, PProdRef::EMPTY)])
                }
            }
            Term::BvPoly { width, monomials } => Some(
                monomials
                    .iter()
                    .map(|(c, p)| (words_to_value(c, *width), *p))
                    .collect(),
            ),
            _ => None,
        }
    }
}

pub type BvMonomial<C> = (C, PProdRef);

#[derive(Debug, Clone)]
pub struct BvArithBuffer<C: BvCoeff> {
    width: WidthInt,
    monos: Vec<BvMonomial<C>>,
}

impl<C: BvCoeff> Default for BvArithBuffer<C> {
    fn default() -> Self {
        Self {
            width: 0,
            monos: Vec::new(),
        }
    }
}

pub type BvArith64Buffer = BvArithBuffer<u64>;
pub type BvArithWideBuffer = BvArithBuffer<BitVecValue>;

impl<C: BvCoeff> ScratchBuffer for BvArithBuffer<C> {
    fn reset(&mut self) {
        self.monos.clear();
    }
}

impl<C: BvCoeff> BvArithBuffer<C> {
    /// Empties the buffer and sets its width.
    pub fn prepare(&mut self, width: WidthInt) {
        debug_assert!(width > 0);
        self.width = width;
        self.monos.clear();
    }

    pub fn width(&self) -> WidthInt {
        self.width
    }

    pub fn monomials(&self) -> &[BvMonomial<C>] {
        &self.monos
    }

    pub fn add_mono(&mut self, a: C, p: PProdRef) {
        if !a.is_zero_coeff() {
            self.monos.push((a, p));
        }
    }

    pub fn sub_mono(&mut self, a: C, p: PProdRef) {
        let neg = a.negated(self.width);
        self.add_mono(neg, p);
    }

    pub fn add_const(&mut self, a: C) {
        self.add_mono(a, PProdRef::EMPTY);
    }

    pub fn add_monos(&mut self, monos: &[BvMonomial<C>]) {
        self.monos
            .extend(monos.iter().filter(|(c, _)| !c.is_zero_coeff()).cloned());
    }

    pub fn sub_monos(&mut self, monos: &[BvMonomial<C>]) {
        for (c, p) in monos.iter() {
            self.sub_mono(c.clone(), *p);
        }
    }

    pub fn negate(&mut self) {
        let w = self.width;
        for (c, _) in self.monos.iter_mut() {
            *c = c.negated(w);
        }
    }

    pub fn mul_const(&mut self, a: &C) {
        let w = self.width;
        let old = std::mem::take(&mut self.monos);
        for (c, p) in old {
            self.add_mono(c.times(a, w), p);
        }
    }

    pub fn mul_monos(&mut self, monos: &[BvMonomial<C>], pprods: &mut PProdTable) {
        let w = self.width;
        let old = std::mem::take(&mut self.monos);
        for (a, p) in old.iter() {
            for (b, q) in monos.iter() {
                let pq = pprods.mul(*p, *q);
                self.add_mono(a.times(b, w), pq);
            }
        }
    }

    pub fn square(&mut self, pprods: &mut PProdTable) {
        self.normalize(pprods);
        let copy = self.monos.clone();
        self.mul_monos(&copy, pprods);
    }

    /// `self := self^d` by repeated squaring
    pub fn power(&mut self, d: u32, pprods: &mut PProdTable) {
        self.normalize(pprods);
        let mut base = std::mem::take(&mut self.monos);
        self.add_const(C::from_u64_coeff(1, self.width));
        let mut d = d;
        while d > 0 {
            if d & 1 == 1 {
                self.mul_monos(&base, pprods);
                self.normalize(pprods);
            }
            d >>= 1;
            if d > 0 {
                let mut sq = BvArithBuffer::<C> {
                    width: self.width,
                    monos: base,
                };
                sq.square(pprods);
                sq.normalize(pprods);
                base = sq.monos;
            }
        }
    }

    pub fn normalize(&mut self, pprods: &PProdTable) {
        let w = self.width;
        self.monos.sort_by(|a, b| pprods.cmp(a.1, b.1));
        let mut out: Vec<BvMonomial<C>> = Vec::with_capacity(self.monos.len());
        for (c, p) in self.monos.drain(..) {
            if let Some((acc, last)) = out.last_mut() {
                if *last == p {
                    *acc = acc.plus(&c, w);
                    continue;
                }
            }
            if out.last().is_some_and(|(acc, _)| acc.is_zero_coeff()) {
                out.pop();
            }
            out.push((c, p));
        }
        if out.last().is_some_and(|(acc, _)| acc.is_zero_coeff()) {
            out.pop();
        }
        self.monos = out;
    }

    pub fn degree(&self, pprods: &PProdTable) -> u64 {
        self.monos
            .iter()
            .map(|(_, p)| pprods.degree(*p))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn take_monos(&mut self) -> Vec<BvMonomial<C>> {
        std::mem::take(&mut self.monos)
    }
}
