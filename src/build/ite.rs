// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::buffers::ArithBuffer;
use crate::context::Context;
use crate::error::Result;
use crate::term::{Term, TermRef};
use crate::types::TypeRef;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};

impl Context {
    /// `ite(c, t1, t2)` with the least common supertype of `t1` and `t2`.
    pub fn ite(&mut self, c: TermRef, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_boolean_term(c)?;
        let tau = self.check_compatible_terms(t1, t2)?;
        Ok(self.mk_ite(c, t1, t2, tau))
    }

    pub(crate) fn mk_ite(&mut self, c: TermRef, x: TermRef, y: TermRef, tau: TypeRef) -> TermRef {
        if tau == TypeRef::BOOL {
            return self.mk_bool_ite(c, x, y);
        }
        if self.types.bv_width(tau).is_some() {
            return self.mk_bv_ite(c, x, y, tau);
        }
        // ite(c, x, x) -> x
        if x == y {
            return x;
        }
        // ite(true, x, y) -> x
        if c == TermRef::TRUE {
            return x;
        }
        // ite(false, x, y) -> y
        if c == TermRef::FALSE {
            return y;
        }
        // ite(!c, x, y) -> ite(c, y, x)
        let (c, x, y) = if c.is_negative() { (!c, y, x) } else { (c, x, y) };
        if tau == TypeRef::INT {
            if let Some(t) = self.factor_int_ite(c, x, y) {
                return t;
            }
        }
        self.terms.intern(
            Term::Ite {
                cond: c,
                tru: x,
                fals: y,
            },
            tau,
        )
    }

    pub(crate) fn mk_bool_ite(&mut self, c: TermRef, x: TermRef, y: TermRef) -> TermRef {
        // ite(c, x, x) -> x
        if x == y {
            return x;
        }
        if c == TermRef::TRUE {
            return x;
        }
        if c == TermRef::FALSE {
            return y;
        }
        // ite(c, x, !x) -> c <=> x
        if x.is_opposite(y) {
            return self.mk_iff(c, x);
        }
        // ite(c, c, y) -> c | y
        if c == x {
            return self.mk_or2(c, y);
        }
        // ite(c, x, c) -> c & x
        if c == y {
            return self.mk_and2(c, x);
        }
        // ite(c, !c, y) -> !c & y
        if c.is_opposite(x) {
            return self.mk_and2(x, y);
        }
        // ite(c, x, !c) -> x | !c
        if c.is_opposite(y) {
            return self.mk_or2(x, y);
        }
        // ite(c, true, y) -> c | y
        if x == TermRef::TRUE {
            return self.mk_or2(c, y);
        }
        // ite(c, x, false) -> c & x
        if y == TermRef::FALSE {
            return self.mk_and2(c, x);
        }
        // ite(c, false, y) -> !c & y
        if x == TermRef::FALSE {
            return self.mk_and2(!c, y);
        }
        // ite(c, x, true) -> !c | x
        if y == TermRef::TRUE {
            return self.mk_or2(!c, x);
        }
        let (c, x, y) = if c.is_negative() { (!c, y, x) } else { (c, x, y) };
        if let Some(t) = self.lift_bveq_ite(c, x, y) {
            return t;
        }
        self.terms.intern(
            Term::Ite {
                cond: c,
                tru: x,
                fals: y,
            },
            TypeRef::BOOL,
        )
    }

    /// `ite(c, x == y, x == u) -> x == ite(c, y, u)`
    fn lift_bveq_ite(&mut self, c: TermRef, x: TermRef, y: TermRef) -> Option<TermRef> {
        if x.is_negative() || y.is_negative() {
            return None;
        }
        let (Term::BvEq(a, b), Term::BvEq(d, e)) = (self.terms.get(x), self.terms.get(y)) else {
            return None;
        };
        let (a, b, d, e) = (*a, *b, *d, *e);
        let (shared, l, r) = if a == d {
            (a, b, e)
        } else if a == e {
            (a, b, d)
        } else if b == d {
            (b, a, e)
        } else if b == e {
            (b, a, d)
        } else {
            return None;
        };
        tracing::trace!("lift ite({c:?}, {x:?}, {y:?}) over shared operand {shared:?}");
        let tau = self.terms.type_of(l);
        let inner = self.mk_bv_ite(c, l, r, tau);
        Some(self.mk_bveq(shared, inner))
    }

    pub(crate) fn mk_bv_ite(&mut self, c: TermRef, x: TermRef, y: TermRef, tau: TypeRef) -> TermRef {
        if x == y {
            return x;
        }
        if c == TermRef::TRUE {
            return x;
        }
        if c == TermRef::FALSE {
            return y;
        }
        let (c, x, y) = if c.is_negative() { (!c, y, x) } else { (c, x, y) };
        // constants and bit arrays: try bit by bit, all bits must simplify
        if let (Some(xs), Some(ys)) = (self.bv_literal_bits(x), self.bv_literal_bits(y)) {
            let bits: Option<Vec<TermRef>> = xs
                .iter()
                .zip(ys.iter())
                .map(|(a, b)| simplify_bit_ite(c, *a, *b))
                .collect();
            if let Some(bits) = bits {
                return self.bv_array_term(bits);
            }
        }
        self.terms.intern(
            Term::Ite {
                cond: c,
                tru: x,
                fals: y,
            },
            tau,
        )
    }


    /// `ite(c, g*p, g*q) -> g * ite(c, p, q)` for integer polynomials
    fn factor_int_ite(&mut self, c: TermRef, x: TermRef, y: TermRef) -> Option<TermRef> {
        let (Term::ArithPoly(p), Term::ArithPoly(q)) = (self.terms.get(x), self.terms.get(y))
        else {
            return None;
        };
        if !p.iter().chain(q.iter()).all(|(a, _)| a.is_integer()) {
            return None;
        }
        let g = p
            .iter()
            .chain(q.iter())
            .fold(BigInt::zero(), |g, (a, _)| g.gcd(a.numer()));
        if g.is_zero() || g.is_one() {
            return None;
        }
        let (p, q) = (p.clone(), q.clone());
        let g = BigRational::from_integer(g);
        tracing::trace!("factor {g} out of ite({c:?}, {x:?}, {y:?})");
        let inv = g.recip();
        let p = self.with_scratch(|ctx, b: &mut ArithBuffer| {
            b.add_scaled_monos(&inv, &p);
            ctx.arith_buffer_term(b)
        });
        let q = self.with_scratch(|ctx, b: &mut ArithBuffer| {
            b.add_scaled_monos(&inv, &q);
            ctx.arith_buffer_term(b)
        });
        let inner = self.terms.intern(
            Term::Ite {
                cond: c,
                tru: p,
                fals: q,
            },
            TypeRef::INT,
        );
        let v = self.pprods.var(inner);
        Some(self.with_scratch(|ctx, b: &mut ArithBuffer| {
            b.add_mono(g, v);
            ctx.arith_buffer_term(b)
        }))
    }
}

/// Bit `ite(c, a, b)` when it reduces to `a`, `c` or `!c` once `c` is
/// substituted in the branches. `c` is not a constant.
fn simplify_bit_ite(c: TermRef, a: TermRef, b: TermRef) -> Option<TermRef> {
    let a = if a == c {
        TermRef::TRUE
    } else if a == !c {
        TermRef::FALSE
    } else {
        a
    };
    let b = if b == c {
        TermRef::FALSE
    } else if b == !c {
        TermRef::TRUE
    } else {
        b
    };
    if a == b {
        Some(a)
    } else if a == TermRef::TRUE && b == TermRef::FALSE {
        Some(c)
    } else if a == TermRef::FALSE && b == TermRef::TRUE {
        Some(!c)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_condition() {
        let mut ctx = Context::default();
        let bv8 = ctx.bv_type(8).unwrap();
        let a = ctx.new_uninterpreted_term(bv8).unwrap();
        let b = ctx.new_uninterpreted_term(bv8).unwrap();
        assert_eq!(ctx.ite(TermRef::TRUE, a, b).unwrap(), a);
        let u = ctx.new_uninterpreted_type();
        let x = ctx.new_uninterpreted_term(u).unwrap();
        let y = ctx.new_uninterpreted_term(u).unwrap();
        assert_eq!(ctx.ite(TermRef::TRUE, x, y).unwrap(), x);
        assert_eq!(ctx.ite(TermRef::FALSE, x, y).unwrap(), y);
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        assert_eq!(ctx.ite(!c, x, y).unwrap(), ctx.ite(c, y, x).unwrap());
        assert!(ctx.ite(c, x, a).is_err());
    }

    #[test]
    fn boolean_ite_becomes_connective() {
        let mut ctx = Context::default();
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let y = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        assert_eq!(ctx.ite(c, c, y).unwrap(), ctx.or2(c, y).unwrap());
        assert_eq!(ctx.ite(c, y, TermRef::FALSE).unwrap(), ctx.and2(c, y).unwrap());
        assert_eq!(ctx.ite(c, y, !y).unwrap(), ctx.iff(c, y).unwrap());
    }

    #[test]
    fn bit_vector_ite_of_constants() {
        let mut ctx = Context::default();
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let a = ctx.bvconst_u64(2, 0b01).unwrap();
        let b = ctx.bvconst_u64(2, 0b10).unwrap();
        let t = ctx.ite(c, a, b).unwrap();
        assert_eq!(ctx[t], Term::BvArray(vec![c, !c]));
    }

    #[test]
    fn bit_vector_ite_keeps_unresolved_bits() {
        let mut ctx = Context::default();
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let zero = ctx.bvconst_u64(2, 0).unwrap();
        // bit 1 is ite(c, false, p), which is not one of p, c, !c
        let y = ctx.bvarray(&[TermRef::FALSE, p]).unwrap();
        let t = ctx.ite(c, zero, y).unwrap();
        assert_eq!(
            ctx[t],
            Term::Ite {
                cond: c,
                tru: zero,
                fals: y
            }
        );
        // the condition inside the branches is replaced by its value
        let u = ctx.bvarray(&[c, p]).unwrap();
        let v = ctx.bvarray(&[TermRef::FALSE, p]).unwrap();
        let t = ctx.ite(c, u, v).unwrap();
        assert_eq!(ctx[t], Term::BvArray(vec![c, p]));
        let u = ctx.bvarray(&[!c, TermRef::TRUE]).unwrap();
        let v = ctx.bvarray(&[c, !c]).unwrap();
        let t = ctx.ite(c, u, v).unwrap();
        assert_eq!(ctx.bitextract(t, 0).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.bitextract(t, 1).unwrap(), TermRef::TRUE);
    }

    #[test]
    fn integer_factor_is_pulled_out() {
        let mut ctx = Context::default();
        let c = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let y = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        let four = ctx.int64(4).unwrap();
        let two = ctx.int64(2).unwrap();
        let p = ctx.poly_int(&[6, 4], &[x, y]).unwrap();
        let q = ctx.mul(four, y).unwrap();
        let t = ctx.ite(c, p, q).unwrap();
        // 2 * ite(c, 3x + 2y, 2y)
        let p2 = ctx.poly_int(&[3, 2], &[x, y]).unwrap();
        let q2 = ctx.mul(two, y).unwrap();
        let inner = ctx.ite(c, p2, q2).unwrap();
        assert_eq!(ctx.mul(two, inner).unwrap(), t);
    }
}
