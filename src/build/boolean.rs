// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Boolean connectives. Every n-ary connective is reduced to `or` (and `xor`) over a sorted
//! operand list; `and` is `not or not`.

use crate::context::Context;
use crate::error::Result;
use crate::term::{Term, TermRef};
use crate::types::TypeRef;

impl Context {
    pub fn true_term(&self) -> TermRef {
        TermRef::TRUE
    }

    pub fn false_term(&self) -> TermRef {
        TermRef::FALSE
    }

    pub fn not(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_boolean_term(t)?;
        Ok(!t)
    }

    pub fn or2(&mut self, a: TermRef, b: TermRef) -> Result<TermRef> {
        self.check_boolean_terms(&[a, b])?;
        Ok(self.mk_or2(a, b))
    }

    pub fn and2(&mut self, a: TermRef, b: TermRef) -> Result<TermRef> {
        self.check_boolean_terms(&[a, b])?;
        Ok(self.mk_and2(a, b))
    }

    pub fn xor2(&mut self, a: TermRef, b: TermRef) -> Result<TermRef> {
        self.check_boolean_terms(&[a, b])?;
        Ok(self.mk_xor2(a, b))
    }

    pub fn iff(&mut self, a: TermRef, b: TermRef) -> Result<TermRef> {
        self.check_boolean_terms(&[a, b])?;
        Ok(self.mk_iff(a, b))
    }

    pub fn implies(&mut self, a: TermRef, b: TermRef) -> Result<TermRef> {
        self.check_boolean_terms(&[a, b])?;
        Ok(self.mk_or2(!a, b))
    }

    pub fn or(&mut self, args: &[TermRef]) -> Result<TermRef> {
        self.check_arity(args.len())?;
        self.check_boolean_terms(args)?;
        Ok(self.mk_or(args.to_vec()))
    }

    pub fn and(&mut self, args: &[TermRef]) -> Result<TermRef> {
        self.check_arity(args.len())?;
        self.check_boolean_terms(args)?;
        Ok(self.mk_and(args))
    }

    pub fn xor(&mut self, args: &[TermRef]) -> Result<TermRef> {
        self.check_arity(args.len())?;
        self.check_boolean_terms(args)?;
        Ok(self.mk_xor(args))
    }

    pub(crate) fn mk_or2(&mut self, x: TermRef, y: TermRef) -> TermRef {
        // x | x -> x
        if x == y {
            return x;
        }
        // true | y -> true
        if x == TermRef::TRUE || y == TermRef::TRUE {
            return TermRef::TRUE;
        }
        // false | y -> y
        if x == TermRef::FALSE {
            return y;
        }
        if y == TermRef::FALSE {
            return x;
        }
        // x | !x -> true
        if x.is_opposite(y) {
            return TermRef::TRUE;
        }
        let (x, y) = if x < y { (x, y) } else { (y, x) };
        self.terms.intern(Term::Or(vec![x, y]), TypeRef::BOOL)
    }

    pub(crate) fn mk_and2(&mut self, x: TermRef, y: TermRef) -> TermRef {
        !self.mk_or2(!x, !y)
    }

    pub(crate) fn mk_xor2(&mut self, x: TermRef, y: TermRef) -> TermRef {
        self.mk_iff(!x, y)
    }

    /// A positive uninterpreted boolean constant.
    fn is_uninterpreted_literal(&self, t: TermRef) -> bool {
        matches!(self.terms.get(t), Term::Uninterpreted { .. })
    }

    pub(crate) fn mk_iff(&mut self, x: TermRef, y: TermRef) -> TermRef {
        // x <=> x -> true
        if x == y {
            return TermRef::TRUE;
        }
        // true <=> y -> y
        if x == TermRef::TRUE {
            return y;
        }
        if y == TermRef::TRUE {
            return x;
        }
        // false <=> y -> !y
        if x == TermRef::FALSE {
            return !y;
        }
        if y == TermRef::FALSE {
            return !x;
        }
        // x <=> !x -> false
        if x.is_opposite(y) {
            return TermRef::FALSE;
        }
        let (mut x, mut y) = if x < y { (x, y) } else { (y, x) };
        // (!x <=> y) and (x <=> !y) are the same atom; prefer a positive left side
        if x.is_negative()
            && (y.is_negative() || self.is_uninterpreted_literal(x) || !self.is_uninterpreted_literal(y))
        {
            x = !x;
            y = !y;
        }
        self.terms.intern(Term::Eq(x, y), TypeRef::BOOL)
    }

    pub(crate) fn mk_or(&mut self, mut args: Vec<TermRef>) -> TermRef {
        args.sort_unstable();
        // true comes first after sorting
        if args.first() == Some(&TermRef::TRUE) {
            return TermRef::TRUE;
        }
        let mut out: Vec<TermRef> = Vec::with_capacity(args.len());
        for t in args {
            if t == TermRef::FALSE {
                continue;
            }
            match out.last() {
                Some(&last) if last == t => {}
                // x and !x are neighbors after sorting
                Some(&last) if last.is_opposite(t) => return TermRef::TRUE,
                _ => out.push(t),
            }
        }
        match out.as_slice() {
            [] => TermRef::FALSE,
            [x] => *x,
            _ => self.terms.intern(Term::Or(out), TypeRef::BOOL),
        }
    }

    pub(crate) fn mk_and(&mut self, args: &[TermRef]) -> TermRef {
        let negated = args.iter().map(|t| !*t).collect();
        !self.mk_or(negated)
    }

    pub(crate) fn mk_xor(&mut self, args: &[TermRef]) -> TermRef {
        let mut negate = false;
        let mut vars: Vec<TermRef> = Vec::with_capacity(args.len());
        for &t in args {
            if t.is_bool_const() {
                negate ^= t == TermRef::TRUE;
            } else {
                negate ^= t.is_negative();
                vars.push(t.unsigned());
            }
        }
        vars.sort_unstable();
        // x ^ x -> false
        let mut out: Vec<TermRef> = Vec::with_capacity(vars.len());
        for t in vars {
            if out.last() == Some(&t) {
                out.pop();
            } else {
                out.push(t);
            }
        }
        let r = match out.as_slice() {
            [] => TermRef::FALSE,
            [x] => *x,
            [x, y] => self.mk_xor2(*x, *y),
            _ => self.terms.intern(Term::Xor(out), TypeRef::BOOL),
        };
        if negate {
            !r
        } else {
            r
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bools(ctx: &mut Context, n: usize) -> Vec<TermRef> {
        (0..n)
            .map(|_| ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap())
            .collect()
    }

    #[test]
    fn or_is_canonical() {
        let mut ctx = Context::default();
        let v = bools(&mut ctx, 2);
        let (x, y) = (v[0], v[1]);
        let a = ctx.or(&[x, x, y]).unwrap();
        let b = ctx.or(&[y, x]).unwrap();
        assert_eq!(a, b);
        assert_eq!(ctx.or2(y, x).unwrap(), a);
        assert_eq!(ctx.or(&[x, TermRef::FALSE]).unwrap(), x);
        assert_eq!(ctx.or(&[]).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.and(&[x, !x]).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.and(&[]).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.implies(x, x).unwrap(), TermRef::TRUE);
    }

    #[test]
    fn xor_parity() {
        let mut ctx = Context::default();
        let v = bools(&mut ctx, 3);
        let (x, y, z) = (v[0], v[1], v[2]);
        assert_eq!(ctx.xor(&[x, x]).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.xor(&[x, TermRef::TRUE]).unwrap(), !x);
        assert_eq!(ctx.xor(&[!x, y, x]).unwrap(), !y);
        let a = ctx.xor(&[x, y, z]).unwrap();
        let b = ctx.xor(&[!z, y, !x]).unwrap();
        assert_eq!(a, b);
        let c = ctx.xor(&[!z, y, x]).unwrap();
        assert_eq!(c, !a);
        // two operands go through iff
        assert_eq!(ctx.xor(&[x, y]).unwrap(), ctx.xor2(y, x).unwrap());
        assert_eq!(ctx.iff(x, !y).unwrap(), ctx.xor2(x, y).unwrap());
    }

    #[test]
    fn iff_simplifications() {
        let mut ctx = Context::default();
        let x = bools(&mut ctx, 1)[0];
        assert_eq!(ctx.iff(x, x).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.iff(x, !x).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.iff(TermRef::FALSE, x).unwrap(), !x);
        assert!(ctx.not(TermRef::ZERO).is_err());
    }
}
