// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Arithmetic Terms
//!
//! Every arithmetic constructor decomposes its operands into monomials, accumulates them in a
//! scratch [`ArithBuffer`] and commits the normalized result. Atoms are built from the
//! difference of both sides against zero.

use crate::buffers::{ArithBuffer, Monomial};
use crate::context::Context;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::parse;
use crate::pprod::PProdRef;
use crate::term::{Term, TermRef};
use crate::types::TypeRef;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// `eq(t1, t2)` is `ite(c, eq(l1, r1), eq(l2, r2))`
#[derive(Debug, Clone, Copy)]
struct LiftIf {
    cond: TermRef,
    l1: TermRef,
    r1: TermRef,
    l2: TermRef,
    r2: TermRef,
}

impl Context {
    pub fn int32(&mut self, value: i32) -> Result<TermRef> {
        Ok(self.arith_constant(BigRational::from_integer(value.into())))
    }

    pub fn int64(&mut self, value: i64) -> Result<TermRef> {
        Ok(self.arith_constant(BigRational::from_integer(value.into())))
    }

    pub fn rational32(&mut self, num: i32, den: u32) -> Result<TermRef> {
        self.rational64(num as i64, den as u64)
    }

    pub fn rational64(&mut self, num: i64, den: u64) -> Result<TermRef> {
        if den == 0 {
            return self.fail(ErrorCode::DivisionByZero);
        }
        let q = BigRational::new(BigInt::from(num), BigInt::from(den));
        Ok(self.arith_constant(q))
    }

    pub fn mpq(&mut self, value: &BigRational) -> Result<TermRef> {
        Ok(self.arith_constant(value.clone()))
    }

    pub fn parse_rational(&mut self, inp: &str) -> Result<TermRef> {
        match parse::parse_rational(inp) {
            Ok(q) => Ok(self.arith_constant(q)),
            Err(code) => self.fail(code),
        }
    }

    pub fn parse_float(&mut self, inp: &str) -> Result<TermRef> {
        match parse::parse_float(inp) {
            Ok(q) => Ok(self.arith_constant(q)),
            Err(code) => self.fail(code),
        }
    }

    pub fn add(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_arith_terms(&[t1, t2])?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t1);
            ctx.arith_add_term(b, t2);
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn sub(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_arith_terms(&[t1, t2])?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t1);
            ctx.arith_sub_term(b, t2);
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn neg(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_arith_term(t)?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_sub_term(b, t);
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn mul(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_arith_terms(&[t1, t2])?;
        self.check_degree(self.term_degree(t1) + self.term_degree(t2))?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t1);
            ctx.arith_mul_term(b, t2);
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn square(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_arith_term(t)?;
        self.check_degree(2 * self.term_degree(t))?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t);
            b.square(&mut ctx.pprods);
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn power(&mut self, t: TermRef, d: u32) -> Result<TermRef> {
        self.check_arith_term(t)?;
        self.check_degree(d as u64 * self.term_degree(t))?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t);
            b.power(d, &mut ctx.pprods);
            ctx.arith_buffer_term(b)
        }))
    }

    /// `a[0]*t[0] + ... + a[n-1]*t[n-1]` where [`TermRef::ZERO`] marks the constant monomial.
    pub fn poly_int(&mut self, a: &[i64], t: &[TermRef]) -> Result<TermRef> {
        let coeffs: Vec<BigRational> = a
            .iter()
            .map(|v| BigRational::from_integer((*v).into()))
            .collect();
        self.poly(&coeffs, t)
    }

    /// Like [`Context::poly_int`] with coefficients `num[i]/den[i]`.
    pub fn poly_rational(&mut self, num: &[i64], den: &[u64], t: &[TermRef]) -> Result<TermRef> {
        if num.len() != den.len() {
            return self.fail(
                ErrorReport::new(ErrorCode::WrongNumberOfArguments).badval(den.len() as i64),
            );
        }
        if den.contains(&0) {
            return self.fail(ErrorCode::DivisionByZero);
        }
        let coeffs: Vec<BigRational> = num
            .iter()
            .zip(den.iter())
            .map(|(n, d)| BigRational::new(BigInt::from(*n), BigInt::from(*d)))
            .collect();
        self.poly(&coeffs, t)
    }

    fn poly(&mut self, coeffs: &[BigRational], t: &[TermRef]) -> Result<TermRef> {
        if coeffs.len() != t.len() {
            return self.fail(
                ErrorReport::new(ErrorCode::WrongNumberOfArguments).badval(t.len() as i64),
            );
        }
        self.check_arity(t.len())?;
        self.check_arith_terms(t)?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            for (a, x) in coeffs.iter().zip(t.iter()) {
                if *x == TermRef::ZERO {
                    b.add_const(a.clone());
                } else {
                    let monos = ctx.arith_monomials(*x);
                    b.add_scaled_monos(a, &monos);
                }
            }
            ctx.arith_buffer_term(b)
        }))
    }

    pub fn arith_eq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_arith_terms(&[t1, t2])?;
        Ok(self.mk_arith_eq(t1, t2))
    }

    pub fn arith_neq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.arith_eq(t1, t2).map(|t| !t)
    }

    pub fn arith_geq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_arith_terms(&[t1, t2])?;
        Ok(self.mk_arith_geq(t1, t2))
    }

    pub fn arith_leq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.arith_geq(t2, t1)
    }

    pub fn arith_lt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.arith_geq(t1, t2).map(|t| !t)
    }

    pub fn arith_gt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.arith_lt(t2, t1)
    }

    pub fn arith_eq0(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_arith_term(t)?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t);
            ctx.arith_buffer_eq0(b)
        }))
    }

    pub fn arith_neq0(&mut self, t: TermRef) -> Result<TermRef> {
        self.arith_eq0(t).map(|t| !t)
    }

    pub fn arith_geq0(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_arith_term(t)?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t);
            ctx.arith_buffer_geq0(b)
        }))
    }

    pub fn arith_leq0(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_arith_term(t)?;
        Ok(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t);
            ctx.arith_buffer_leq0(b)
        }))
    }

    pub fn arith_gt0(&mut self, t: TermRef) -> Result<TermRef> {
        self.arith_leq0(t).map(|t| !t)
    }

    pub fn arith_lt0(&mut self, t: TermRef) -> Result<TermRef> {
        self.arith_geq0(t).map(|t| !t)
    }

    pub(crate) fn arith_constant(&mut self, q: BigRational) -> TermRef {
        let tau = if q.is_integer() {
            TypeRef::INT
        } else {
            TypeRef::REAL
        };
        self.terms.intern(Term::ArithConst(q), tau)
    }

    /// Decomposition of an arithmetic term into monomials. Terms that are neither constants,
    /// products nor polynomials are variables.
    pub(crate) fn arith_monomials(&mut self, t: TermRef) -> Vec<Monomial> {
        match self.terms.get(t) {
            Term::ArithConst(q) if q.is_zero() => vec![],
            Term::ArithConst(q) => vec![(q.clone(), PProdRef::EMPTY)],
            Term::ArithPoly(monos) => monos.clone(),
            Term::PowerProduct(p) => vec![(BigRational::one(), *p)],
            _ => vec![(BigRational::one(), self.pprods.var(t))],
        }
    }

    pub(crate) fn arith_add_term(&mut self, b: &mut ArithBuffer, t: TermRef) {
        let monos = self.arith_monomials(t);
        b.add_monos(&monos);
    }

    pub(crate) fn arith_sub_term(&mut self, b: &mut ArithBuffer, t: TermRef) {
        let monos = self.arith_monomials(t);
        b.add_scaled_monos(&-BigRational::one(), &monos);
    }

    pub(crate) fn arith_mul_term(&mut self, b: &mut ArithBuffer, t: TermRef) {
        let monos = self.arith_monomials(t);
        b.mul_monos(&monos, &mut self.pprods);
    }

    /// Degree of an arithmetic or bit-vector term as a polynomial.
    pub(crate) fn term_degree(&self, t: TermRef) -> u64 {
        let pp = &self.pprods;
        match self.terms.get(t) {
            Term::ArithConst(_) | Term::BvConst64 { .. } | Term::BvConst { .. } => 0,
            Term::PowerProduct(p) => pp.degree(*p),
            Term::ArithPoly(m) => m.iter().map(|(_, p)| pp.degree(*p)).max().unwrap_or(0),
            Term::BvPoly64 { monomials, .. } => {
                monomials.iter().map(|(_, p)| pp.degree(*p)).max().unwrap_or(0)
            }
            Term::BvPoly { monomials, .. } => {
                monomials.iter().map(|(_, p)| pp.degree(*p)).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Term for a non-empty power product: the variable itself for `x^1`.
    pub(crate) fn pprod_term(&mut self, p: PProdRef) -> TermRef {
        debug_assert!(!p.is_empty());
        if let Some(x) = self.pprods.as_var(p) {
            return x;
        }
        let vars = self.pprods.get(p);
        let first = self.terms.type_of(vars[0].0);
        let tau = if self.types.bv_width(first).is_some() {
            first
        } else if vars.iter().all(|(x, _)| self.terms.type_of(*x) == TypeRef::INT) {
            TypeRef::INT
        } else {
            TypeRef::REAL
        };
        self.terms.intern(Term::PowerProduct(p), tau)
    }

    fn arith_poly_term(&mut self, monos: Vec<Monomial>) -> TermRef {
        let is_int = monos.iter().all(|(c, p)| {
            c.is_integer()
                && self
                    .pprods
                    .get(*p)
                    .iter()
                    .all(|(x, _)| self.terms.type_of(*x) == TypeRef::INT)
        });
        let tau = if is_int { TypeRef::INT } else { TypeRef::REAL };
        self.terms.intern(Term::ArithPoly(monos), tau)
    }

    /// Commits the buffer and leaves it empty.
    pub(crate) fn arith_buffer_term(&mut self, b: &mut ArithBuffer) -> TermRef {
        b.normalize(&self.pprods);
        let monos = b.take_monos();
        match monos.as_slice() {
            [] => TermRef::ZERO,
            [(c, p)] if p.is_empty() => self.arith_constant(c.clone()),
            [(c, p)] if c.is_one() => self.pprod_term(*p),
            _ => self.arith_poly_term(monos),
        }
    }

    /// `b == 0`, leaves the buffer empty.
    pub(crate) fn arith_buffer_eq0(&mut self, b: &mut ArithBuffer) -> TermRef {
        b.normalize(&self.pprods);
        let monos = b.take_monos();
        match monos.as_slice() {
            [] => TermRef::TRUE,
            // a != 0
            [(_, p)] if p.is_empty() => TermRef::FALSE,
            // a * r == 0 -> r == 0
            [(_, p)] => {
                let r = self.pprod_term(*p);
                self.terms.intern(Term::ArithEq0(r), TypeRef::BOOL)
            }
            // a1 + a2 * r == 0 -> r == -a1/a2
            [(a1, p1), (a2, p2)] if p1.is_empty() => {
                let k = self.arith_constant(-(a1 / a2));
                let r = self.pprod_term(*p2);
                self.mk_arith_bineq(k, r)
            }
            // a * r1 - a * r2 == 0 -> r1 == r2
            [(a1, p1), (a2, p2)] if (a1 + a2).is_zero() => {
                let r1 = self.pprod_term(*p1);
                let r2 = self.pprod_term(*p2);
                self.mk_arith_bineq(r1, r2)
            }
            _ => {
                let poly = self.arith_poly_term(monos);
                self.terms.intern(Term::ArithEq0(poly), TypeRef::BOOL)
            }
        }
    }

    /// `b >= 0`, leaves the buffer empty.
    pub(crate) fn arith_buffer_geq0(&mut self, b: &mut ArithBuffer) -> TermRef {
        b.normalize(&self.pprods);
        let monos = b.take_monos();
        match monos.as_slice() {
            [] => TermRef::TRUE,
            [(a, p)] if p.is_empty() => TermRef::from_bool(a.is_positive()),
            // a * r >= 0 -> r >= 0
            [(a, p)] if a.is_positive() => {
                let r = self.pprod_term(*p);
                self.terms.intern(Term::ArithGe0(r), TypeRef::BOOL)
            }
            // a * r >= 0 -> -r >= 0
            [(_, p)] => {
                let poly = self.arith_poly_term(vec![(-BigRational::one(), *p)]);
                self.terms.intern(Term::ArithGe0(poly), TypeRef::BOOL)
            }
            _ => {
                let poly = self.arith_poly_term(monos);
                self.terms.intern(Term::ArithGe0(poly), TypeRef::BOOL)
            }
        }
    }

    pub(crate) fn arith_buffer_leq0(&mut self, b: &mut ArithBuffer) -> TermRef {
        b.negate();
        self.arith_buffer_geq0(b)
    }

    fn mk_arith_bineq(&mut self, a: TermRef, b: TermRef) -> TermRef {
        if a == b {
            return TermRef::TRUE;
        }
        if let (Term::ArithConst(_), Term::ArithConst(_)) = (self.terms.get(a), self.terms.get(b)) {
            return TermRef::FALSE;
        }
        let (a, b) = if a < b { (a, b) } else { (b, a) };
        self.terms.intern(Term::ArithBinEq(a, b), TypeRef::BOOL)
    }

    fn check_for_lift_if(&self, t1: TermRef, t2: TermRef) -> Option<LiftIf> {
        let ite = |t: TermRef| match self.terms.get(t) {
            Term::Ite { cond, tru, fals } => Some((*cond, *tru, *fals)),
            _ => None,
        };
        match (ite(t1), ite(t2)) {
            // (ite c x y) == (ite c z u)
            (Some((c, x, y)), Some((d, z, u))) if c == d => Some(LiftIf {
                cond: c,
                l1: x,
                r1: z,
                l2: y,
                r2: u,
            }),
            (Some(_), Some(_)) => None,
            // (ite c x y) == z
            (Some((c, x, y)), None) => Some(LiftIf {
                cond: c,
                l1: x,
                r1: t2,
                l2: y,
                r2: t2,
            }),
            // x == (ite c y z)
            (None, Some((c, y, z))) => Some(LiftIf {
                cond: c,
                l1: t1,
                r1: y,
                l2: t1,
                r2: z,
            }),
            (None, None) => None,
        }
    }

    pub(crate) fn mk_arith_eq(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if let Some(l) = self.check_for_lift_if(t1, t2) {
            tracing::trace!("lift {t1:?} == {t2:?} through {:?}", l.cond);
            let a = self.mk_arith_eq_atom(l.l1, l.r1);
            let b = self.mk_arith_eq_atom(l.l2, l.r2);
            return self.mk_bool_ite(l.cond, a, b);
        }
        self.mk_arith_eq_atom(t1, t2)
    }

    fn mk_arith_eq_atom(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t1);
            ctx.arith_sub_term(b, t2);
            ctx.arith_buffer_eq0(b)
        })
    }

    pub(crate) fn mk_arith_geq(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if let Some(l) = self.check_for_lift_if(t1, t2) {
            tracing::trace!("lift {t1:?} >= {t2:?} through {:?}", l.cond);
            let a = self.mk_arith_geq_atom(l.l1, l.r1);
            let b = self.mk_arith_geq_atom(l.l2, l.r2);
            return self.mk_bool_ite(l.cond, a, b);
        }
        self.mk_arith_geq_atom(t1, t2)
    }

    fn mk_arith_geq_atom(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        self.with_scratch(|ctx, b: &mut ArithBuffer| {
            ctx.arith_add_term(b, t1);
            ctx.arith_sub_term(b, t2);
            ctx.arith_buffer_geq0(b)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_constants() {
        let mut ctx = Context::default();
        let a = ctx.int32(3).unwrap();
        let b = ctx.parse_rational("6/2").unwrap();
        assert_eq!(a, b);
        assert_eq!(ctx.arith_eq(a, b).unwrap(), TermRef::TRUE);
        let c = ctx.parse_float("3.5").unwrap();
        assert_eq!(ctx.type_of_term(c).unwrap(), TypeRef::REAL);
        assert_eq!(ctx.arith_eq(a, c).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.arith_lt(a, c).unwrap(), TermRef::TRUE);
        assert!(ctx.rational64(1, 0).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::DivisionByZero);
    }

    #[test]
    fn cancellation_and_types() {
        let mut ctx = Context::default();
        let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let two = ctx.int32(2).unwrap();
        let two_x = ctx.mul(two, x).unwrap();
        assert_eq!(ctx.sub(two_x, two_x).unwrap(), TermRef::ZERO);
        let half = ctx.rational32(1, 2).unwrap();
        let h = ctx.mul(half, two_x).unwrap();
        assert_eq!(h, x);
        let hx = ctx.mul(half, x).unwrap();
        assert_eq!(ctx.type_of_term(hx).unwrap(), TypeRef::REAL);
        assert_eq!(ctx.type_of_term(two_x).unwrap(), TypeRef::INT);
        let xx = ctx.square(x).unwrap();
        assert_eq!(ctx.mul(x, x).unwrap(), xx);
        assert_eq!(ctx.power(x, 2).unwrap(), xx);
        assert!(matches!(ctx[xx], Term::PowerProduct(_)));
    }

    #[test]
    fn atoms() {
        let mut ctx = Context::default();
        let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let y = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let three = ctx.int32(3).unwrap();
        // 2x - 6 == 0 -> x == 3
        let p = ctx.poly_int(&[2, -6], &[x, TermRef::ZERO]).unwrap();
        let e = ctx.arith_eq0(p).unwrap();
        assert_eq!(e, ctx.arith_eq(x, three).unwrap());
        assert_eq!(ctx[e], Term::ArithBinEq(x.min(three), x.max(three)));
        // x - y == 0 -> x == y
        assert_eq!(ctx.arith_eq(x, y).unwrap(), ctx.arith_eq(y, x).unwrap());
        // -3x >= 0 -> -x >= 0
        let m = ctx.poly_int(&[-3], &[x]).unwrap();
        let g = ctx.arith_geq0(m).unwrap();
        let n = ctx.neg(x).unwrap();
        assert_eq!(g, ctx.arith_geq0(n).unwrap());
        assert_eq!(ctx.arith_leq0(x).unwrap(), g);
        assert_eq!(ctx.arith_gt(x, x).unwrap(), TermRef::FALSE);
    }

    #[test]
    fn lift_if_through_equality() {
        let mut ctx = Context::default();
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let one = ctx.int32(1).unwrap();
        let two = ctx.int32(2).unwrap();
        let t = ctx.ite(c, one, two).unwrap();
        // ite(c, 1, 2) == 1 -> ite(c, true, false) -> c
        assert_eq!(ctx.arith_eq(t, one).unwrap(), c);
        // ite(c, 1, 2) >= 2 -> !c
        assert_eq!(ctx.arith_geq(t, two).unwrap(), !c);
        let e = ctx.arith_eq(x, t).unwrap();
        let a = ctx.arith_eq(x, one).unwrap();
        let b = ctx.arith_eq(x, two).unwrap();
        assert_eq!(e, ctx.ite(c, a, b).unwrap());
    }

    #[test]
    fn degree_overflow() {
        let mut ctx = Context::new(crate::Config::default().with_max_degree(3));
        let x = ctx.new_uninterpreted_term(TypeRef::REAL).unwrap();
        let xx = ctx.square(x).unwrap();
        assert!(ctx.mul(xx, x).is_ok());
        assert!(ctx.mul(xx, xx).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::DegreeOverflow);
        assert_eq!(ctx.error_report().badval, 4);
    }
}
