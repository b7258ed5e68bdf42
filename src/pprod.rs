// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Power Products
//!
//! A power product is a sorted list of `(variable, exponent)` pairs with positive exponents.
//! Products are hash-consed; [`PProdRef::EMPTY`] is the empty product, i.e., the constant `1`.

use crate::term::TermRef;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PProdRef(u32);

impl PProdRef {
    pub const EMPTY: PProdRef = PProdRef(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

pub type VarExps = SmallVec<[(TermRef, u32); 4]>;

#[derive(Debug, Clone)]
pub struct PProdTable {
    products: Vec<VarExps>,
    degrees: Vec<u64>,
    lookup: FxHashMap<VarExps, PProdRef>,
}

impl Default for PProdTable {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl PProdTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut out = Self {
            products: Vec::with_capacity(capacity),
            degrees: Vec::with_capacity(capacity),
            lookup: FxHashMap::default(),
        };
        let empty = out.add(VarExps::new());
        debug_assert_eq!(empty, PProdRef::EMPTY);
        out
    }

    fn add(&mut self, vars: VarExps) -> PProdRef {
        debug_assert!(vars.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(vars.iter().all(|(_, e)| *e > 0));
        if let Some(&p) = self.lookup.get(&vars) {
            return p;
        }
        let p = PProdRef(self.products.len() as u32);
        tracing::trace!("new power product {p:?} = {vars:?}");
        self.degrees
            .push(vars.iter().map(|(_, e)| *e as u64).sum::<u64>());
        self.products.push(vars.clone());
        self.lookup.insert(vars, p);
        p
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, p: PProdRef) -> &[(TermRef, u32)] {
        &self.products[p.index()]
    }

    pub fn degree(&self, p: PProdRef) -> u64 {
        self.degrees[p.index()]
    }

    /// The product `x^1`.
    pub fn var(&mut self, x: TermRef) -> PProdRef {
        let mut vars = VarExps::new();
        vars.push((x, 1));
        self.add(vars)
    }

    /// Returns `x` if `p` is `x^1`.
    pub fn as_var(&self, p: PProdRef) -> Option<TermRef> {
        match self.get(p) {
            [(x, 1)] => Some(*x),
            _ => None,
        }
    }

    pub fn mul(&mut self, a: PProdRef, b: PProdRef) -> PProdRef {
        if a.is_empty() {
            return b;
        }
        if b.is_empty() {
            return a;
        }
        let (pa, pb) = (self.get(a), self.get(b));
        let mut out = VarExps::with_capacity(pa.len() + pb.len());
        let (mut i, mut j) = (0, 0);
        while i < pa.len() && j < pb.len() {
            match pa[i].0.cmp(&pb[j].0) {
                Ordering::Less => {
                    out.push(pa[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(pb[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push((pa[i].0, pa[i].1 + pb[j].1));
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&pa[i..]);
        out.extend_from_slice(&pb[j..]);
        self.add(out)
    }

    /// `p^d`
    pub fn power(&mut self, p: PProdRef, d: u32) -> PProdRef {
        if d == 0 {
            return PProdRef::EMPTY;
        }
        let vars: VarExps = self.get(p).iter().map(|(x, e)| (*x, e * d)).collect();
        self.add(vars)
    }

    /// Total order on power products: the empty product first, then by degree, then
    /// lexicographically on the variable list.
    pub fn cmp(&self, a: PProdRef, b: PProdRef) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.degree(a)
            .cmp(&self.degree(b))
            .then_with(|| self.get(a).cmp(self.get(b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(i: u32) -> TermRef {
        TermRef::from_raw(2 * i)
    }

    #[test]
    fn products_are_canonical() {
        let mut pp = PProdTable::default();
        let x = pp.var(v(3));
        let y = pp.var(v(5));
        let xy = pp.mul(x, y);
        assert_eq!(pp.mul(y, x), xy);
        assert_eq!(pp.degree(xy), 2);
        let x2y = pp.mul(xy, x);
        assert_eq!(pp.get(x2y), &[(v(3), 2), (v(5), 1)]);
        assert_eq!(pp.power(xy, 2), pp.mul(xy, xy));
        assert_eq!(pp.mul(PProdRef::EMPTY, x), x);
        assert_eq!(pp.as_var(x), Some(v(3)));
        assert_eq!(pp.as_var(xy), None);
    }

    #[test]
    fn ordering() {
        let mut pp = PProdTable::default();
        let x = pp.var(v(3));
        let y = pp.var(v(5));
        let xx = pp.mul(x, x);
        assert_eq!(pp.cmp(PProdRef::EMPTY, x), Ordering::Less);
        assert_eq!(pp.cmp(x, y), Ordering::Less);
        assert_eq!(pp.cmp(xx, y), Ordering::Greater);
    }
}
