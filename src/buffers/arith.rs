// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::pool::ScratchBuffer;
use crate::pprod::{PProdRef, PProdTable};
use num_rational::BigRational;
use num_traits::{One, Zero};

pub type Monomial = (BigRational, PProdRef);

/// Polynomial with rational coefficients under construction.
///
/// Operations only append monomials. [`ArithBuffer::normalize`] merges them into the
/// canonical form: sorted by power product, no repeated product, no zero coefficient.
#[derive(Debug, Clone, Default)]
pub struct ArithBuffer {
    monos: Vec<Monomial>,
}

impl ScratchBuffer for ArithBuffer {
    fn reset(&mut self) {
        self.monos.clear();
    }
}

impl ArithBuffer {
    pub fn monomials(&self) -> &[Monomial] {
        &self.monos
    }

    pub fn add_mono(&mut self, a: BigRational, p: PProdRef) {
        if !a.is_zero() {
            self.monos.push((a, p));
        }
    }

    pub fn sub_mono(&mut self, a: BigRational, p: PProdRef) {
        self.add_mono(-a, p);
    }

    pub fn add_const(&mut self, a: BigRational) {
        self.add_mono(a, PProdRef::EMPTY);
    }

    pub fn add_monos(&mut self, monos: &[Monomial]) {
        self.monos.extend(monos.iter().cloned());
    }

    /// `self += a * monos`
    pub fn add_scaled_monos(&mut self, a: &BigRational, monos: &[Monomial]) {
        if a.is_zero() {
            return;
        }
        self.monos
            .extend(monos.iter().map(|(c, p)| (c * a, *p)));
    }

    pub fn negate(&mut self) {
        for (c, _) in self.monos.iter_mut() {
            *c = -c.clone();
        }
    }

    pub fn mul_const(&mut self, a: &BigRational) {
        if a.is_zero() {
            self.monos.clear();
            return;
        }
        for (c, _) in self.monos.iter_mut() {
            *c *= a;
        }
    }

    /// `a` must not be zero
    pub fn div_const(&mut self, a: &BigRational) {
        debug_assert!(!a.is_zero());
        for (c, _) in self.monos.iter_mut() {
            *c /= a;
        }
    }

    /// `self := self * monos`
    pub fn mul_monos(&mut self, monos: &[Monomial], pprods: &mut PProdTable) {
        let old = std::mem::take(&mut self.monos);
        for (a, p) in old.iter() {
            for (b, q) in monos.iter() {
                let pq = pprods.mul(*p, *q);
                self.add_mono(a * b, pq);
            }
        }
    }

    pub fn square(&mut self, pprods: &mut PProdTable) {
        self.normalize(pprods);
        let copy = self.monos.clone();
        self.mul_monos(&copy, pprods);
    }

    /// `self := self^d`
    pub fn power(&mut self, d: u32, pprods: &mut PProdTable) {
        self.normalize(pprods);
        let mut base = std::mem::take(&mut self.monos);
        self.add_const(BigRational::one());
        let mut d = d;
        while d > 0 {
            if d & 1 == 1 {
                self.mul_monos(&base, pprods);
                self.normalize(pprods);
            }
            d >>= 1;
            if d > 0 {
                let mut sq = ArithBuffer { monos: base };
                sq.square(pprods);
                sq.normalize(pprods);
                base = sq.monos;
            }
        }
    }

    pub fn normalize(&mut self, pprods: &PProdTable) {
        self.monos.sort_by(|a, b| pprods.cmp(a.1, b.1));
        let mut out: Vec<Monomial> = Vec::with_capacity(self.monos.len());
        for (c, p) in self.monos.drain(..) {
            if let Some((acc, last)) = out.last_mut() {
                if *last == p {
                    *acc += c;
                    continue;
                }
            }
            // previous product is complete, drop it if it cancelled out
            if out.last().is_some_and(|(acc, _)| acc.is_zero()) {
                out.pop();
            }
            out.push((c, p));
        }
        if out.last().is_some_and(|(acc, _)| acc.is_zero()) {
            out.pop();
        }
        self.monos = out;
    }

    /// Only meaningful on a normalized buffer.
    pub fn is_zero(&self) -> bool {
        self.monos.is_empty()
    }

    /// Value of a normalized constant buffer.
    pub fn constant(&self) -> Option<BigRational> {
        match self.monos.as_slice() {
            [] => Some(BigRational::zero()),
            [(c, p)] if p.is_empty() => Some(c.clone()),
            _ => None,
        }
    }

    pub fn degree(&self, pprods: &PProdTable) -> u64 {
        self.monos
            .iter()
            .filter(|(c, _)| !c.is_zero())
            .map(|(_, p)| pprods.degree(*p))
            .max()
            .unwrap_or(0)
    }

    /// `true` if every coefficient is an integer
    pub fn has_integer_coeffs(&self) -> bool {
        self.monos.iter().all(|(c, _)| c.is_integer())
    }

    pub(crate) fn take_monos(&mut self) -> Vec<Monomial> {
        std::mem::take(&mut self.monos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermRef;
    use num_bigint::BigInt;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn normalization_merges_and_cancels() {
        let mut pp = PProdTable::default();
        let x = pp.var(TermRef::from_raw(10));
        let y = pp.var(TermRef::from_raw(12));
        let mut b = ArithBuffer::default();
        b.add_mono(q(2), y);
        b.add_mono(q(2), x);
        b.add_const(q(3));
        b.sub_mono(q(2), x);
        b.normalize(&pp);
        assert_eq!(b.monomials(), &[(q(3), PProdRef::EMPTY), (q(2), y)]);
        let before = b.monomials().to_vec();
        b.normalize(&pp);
        assert_eq!(b.monomials(), before.as_slice());
    }

    #[test]
    fn products() {
        let mut pp = PProdTable::default();
        let x = pp.var(TermRef::from_raw(10));
        let mut b = ArithBuffer::default();
        // (x + 1)^2 = x^2 + 2x + 1
        b.add_mono(q(1), x);
        b.add_const(q(1));
        b.square(&mut pp);
        b.normalize(&pp);
        let xx = pp.mul(x, x);
        assert_eq!(
            b.monomials(),
            &[(q(1), PProdRef::EMPTY), (q(2), x), (q(1), xx)]
        );
        assert_eq!(b.degree(&pp), 2);
        let mut c = ArithBuffer::default();
        c.add_mono(q(1), x);
        c.add_const(q(1));
        c.power(2, &mut pp);
        assert_eq!(c.monomials(), b.monomials());
        b.mul_const(&q(0));
        assert!(b.is_zero());
        assert_eq!(b.constant(), Some(q(0)));
    }
}
