// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::context::Context;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::term::{Term, TermRef};
use crate::types::TypeRef;

impl Context {
    /// Equality, dispatched on the type of the operands.
    pub fn eq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let tau = self.check_compatible_terms(t1, t2)?;
        Ok(self.mk_eq(t1, t2, tau))
    }

    pub fn neq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let tau = self.check_compatible_terms(t1, t2)?;
        Ok(self.mk_neq(t1, t2, tau))
    }

    pub(crate) fn mk_eq(&mut self, t1: TermRef, t2: TermRef, tau: TypeRef) -> TermRef {
        if tau == TypeRef::BOOL {
            self.mk_iff(t1, t2)
        } else if self.types.is_arithmetic(tau) {
            self.mk_arith_eq(t1, t2)
        } else if self.types.bv_width(tau).is_some() {
            self.mk_bveq(t1, t2)
        } else {
            self.mk_generic_eq(t1, t2)
        }
    }

    pub(crate) fn mk_neq(&mut self, t1: TermRef, t2: TermRef, tau: TypeRef) -> TermRef {
        if tau == TypeRef::BOOL {
            self.mk_xor2(t1, t2)
        } else {
            !self.mk_eq(t1, t2, tau)
        }
    }

    fn mk_generic_eq(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if t1 == t2 {
            return TermRef::TRUE;
        }
        if self.disequal_terms(t1, t2) {
            return TermRef::FALSE;
        }
        let (a, b) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        self.terms.intern(Term::Eq(a, b), TypeRef::BOOL)
    }

    /// `true` if `a` and `b` are known to denote different values.
    pub(crate) fn disequal_terms(&self, a: TermRef, b: TermRef) -> bool {
        if a == b {
            return false;
        }
        if a.is_opposite(b) {
            return true;
        }
        if a.is_negative() || b.is_negative() {
            return false;
        }
        match (self.terms.get(a), self.terms.get(b)) {
            (Term::Constant { .. }, Term::Constant { .. })
            | (Term::ArithConst(_), Term::ArithConst(_)) => true,
            (Term::BvConst64 { .. } | Term::BvConst { .. }, Term::BvConst64 { .. } | Term::BvConst { .. }) => {
                true
            }
            (Term::Tuple(xs), Term::Tuple(ys)) => xs
                .iter()
                .zip(ys.iter())
                .any(|(x, y)| self.disequal_terms(*x, *y)),
            _ => false,
        }
    }

    /// All operands pairwise different.
    pub fn distinct(&mut self, args: &[TermRef]) -> Result<TermRef> {
        if let [a, b] = args {
            return self.neq(*a, *b);
        }
        self.check_positive(args.len() as u64)?;
        self.check_arity(args.len())?;
        self.check_good_terms(args)?;
        let mut tau = self.terms.type_of(args[0]);
        for &t in &args[1..] {
            let sigma = self.terms.type_of(t);
            match self.types.super_type(tau, sigma) {
                Some(s) => tau = s,
                None => {
                    return self.fail(
                        ErrorReport::new(ErrorCode::IncompatibleTypes)
                            .term1(args[0])
                            .type1(tau)
                            .term2(t)
                            .type2(sigma),
                    )
                }
            }
        }
        Ok(self.mk_distinct(args, tau))
    }

    fn mk_distinct(&mut self, args: &[TermRef], tau: TypeRef) -> TermRef {
        if args.len() == 1 {
            return TermRef::TRUE;
        }
        // more arguments than elements in the type
        if let Some(card) = self.types.card(tau).exact() {
            if (card as usize) < args.len() {
                return TermRef::FALSE;
            }
        }
        let mut args = args.to_vec();
        args.sort_unstable();
        if args.windows(2).any(|w| w[0] == w[1]) {
            return TermRef::FALSE;
        }
        let all_disequal = (0..args.len())
            .all(|i| (i + 1..args.len()).all(|j| self.disequal_terms(args[i], args[j])));
        if all_disequal {
            return TermRef::TRUE;
        }
        self.terms.intern(Term::Distinct(args), TypeRef::BOOL)
    }

    /// Bits of a constant or bit-array term as boolean terms.
    pub(crate) fn bv_literal_bits(&self, t: TermRef) -> Option<Vec<TermRef>> {
        match self.terms.get(t) {
            Term::BvConst64 { width, value } => Some(
                (0..*width)
                    .map(|i| TermRef::from_bool((value >> i) & 1 == 1))
                    .collect(),
            ),
            Term::BvConst { width, words } => Some(
                (0..*width)
                    .map(|i| TermRef::from_bool(crate::bvconst::word_bit(words, i)))
                    .collect(),
            ),
            Term::BvArray(bits) => Some(bits.clone()),
            _ => None,
        }
    }

    pub(crate) fn mk_bveq(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if t1 == t2 {
            return TermRef::TRUE;
        }
        let (l1, l2) = (self.terms.get(t1), self.terms.get(t2));
        if l1.is_bv_const() && l2.is_bv_const() {
            return TermRef::FALSE;
        }
        if let (Some(xs), Some(ys)) = (self.bv_literal_bits(t1), self.bv_literal_bits(t2)) {
            if let Some(r) = self.accumulate_biteqs(&xs, &ys) {
                return r;
            }
        }
        let (a, b) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        self.terms.intern(Term::BvEq(a, b), TypeRef::BOOL)
    }

    /// Conjunction of the bitwise equalities, if it reduces to a single literal.
    fn accumulate_biteqs(&self, xs: &[TermRef], ys: &[TermRef]) -> Option<TermRef> {
        let mut acc = TermRef::TRUE;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let eq = simplify_biteq(*x, *y)?;
            acc = if acc == eq {
                acc
            } else if acc.is_opposite(eq) {
                TermRef::FALSE
            } else if acc == TermRef::TRUE {
                eq
            } else if eq == TermRef::TRUE {
                acc
            } else if eq == TermRef::FALSE {
                TermRef::FALSE
            } else {
                return None;
            };
            if acc == TermRef::FALSE {
                break;
            }
        }
        Some(acc)
    }
}

/// `b == c` for two bits, when it is a literal.
fn simplify_biteq(b: TermRef, c: TermRef) -> Option<TermRef> {
    if b == c {
        Some(TermRef::TRUE)
    } else if b.is_opposite(c) {
        Some(TermRef::FALSE)
    } else if b == TermRef::TRUE {
        Some(c)
    } else if b == TermRef::FALSE {
        Some(!c)
    } else if c == TermRef::TRUE {
        Some(b)
    } else if c == TermRef::FALSE {
        Some(!b)
    } else {
        None
    }
}
