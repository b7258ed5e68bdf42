// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Typecheck Gate
//!
//! Argument checks shared by the public constructors. All of them run before any table is
//! touched and record the offending operands in the error slot.

use crate::context::Context;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::term::{Term, TermRef};
use crate::types::{Type, TypeRef};
use baa::WidthInt;

impl Context {
    pub(crate) fn check_good_type(&mut self, tau: TypeRef) -> Result<()> {
        if self.types.is_valid(tau) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::InvalidType).type1(tau))
        }
    }

    pub(crate) fn check_good_types(&mut self, taus: &[TypeRef]) -> Result<()> {
        taus.iter().try_for_each(|tau| self.check_good_type(*tau))
    }

    pub(crate) fn check_good_term(&mut self, t: TermRef) -> Result<()> {
        if self.terms.is_valid(t) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::InvalidTerm).term1(t))
        }
    }

    pub(crate) fn check_good_terms(&mut self, ts: &[TermRef]) -> Result<()> {
        ts.iter().try_for_each(|t| self.check_good_term(*t))
    }

    pub(crate) fn check_positive(&mut self, n: u64) -> Result<()> {
        if n > 0 {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::PosIntRequired).badval(0))
        }
    }

    pub(crate) fn check_arity(&mut self, n: usize) -> Result<()> {
        if n as u64 <= self.config.max_arity as u64 {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::TooManyArguments).badval(n as i64))
        }
    }

    pub(crate) fn check_maxbvsize(&mut self, n: u64) -> Result<()> {
        if n <= self.config.max_bvsize as u64 {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::MaxBvSizeExceeded).badval(n as i64))
        }
    }

    /// A bit-vector width in `1..=max_bvsize`.
    pub(crate) fn check_bv_width(&mut self, n: u64) -> Result<WidthInt> {
        self.check_positive(n)?;
        self.check_maxbvsize(n)?;
        Ok(n as WidthInt)
    }

    pub(crate) fn check_maxvars(&mut self, n: usize) -> Result<()> {
        if n as u64 <= self.config.max_vars as u64 {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::TooManyVars).badval(n as i64))
        }
    }

    pub(crate) fn check_degree(&mut self, d: u64) -> Result<()> {
        if d <= self.config.max_degree as u64 {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::DegreeOverflow).badval(d as i64))
        }
    }

    pub(crate) fn check_boolean_term(&mut self, t: TermRef) -> Result<()> {
        self.check_good_term(t)?;
        let tau = self.terms.type_of(t);
        if tau == TypeRef::BOOL {
            Ok(())
        } else {
            self.fail(
                ErrorReport::new(ErrorCode::TypeMismatch)
                    .term1(t)
                    .type1(TypeRef::BOOL),
            )
        }
    }

    pub(crate) fn check_boolean_terms(&mut self, ts: &[TermRef]) -> Result<()> {
        ts.iter().try_for_each(|t| self.check_boolean_term(*t))
    }

    pub(crate) fn check_arith_term(&mut self, t: TermRef) -> Result<()> {
        self.check_good_term(t)?;
        if self.types.is_arithmetic(self.terms.type_of(t)) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::ArithTermRequired).term1(t))
        }
    }

    pub(crate) fn check_arith_terms(&mut self, ts: &[TermRef]) -> Result<()> {
        ts.iter().try_for_each(|t| self.check_arith_term(*t))
    }

    /// Returns the width of `t`.
    pub(crate) fn check_bv_term(&mut self, t: TermRef) -> Result<WidthInt> {
        self.check_good_term(t)?;
        match self.types.bv_width(self.terms.type_of(t)) {
            Some(w) => Ok(w),
            None => self.fail(ErrorReport::new(ErrorCode::BitvectorRequired).term1(t)),
        }
    }

    /// Both operands are bit-vectors of the same width, which is returned.
    pub(crate) fn check_compatible_bv_terms(&mut self, a: TermRef, b: TermRef) -> Result<WidthInt> {
        let wa = self.check_bv_term(a)?;
        let wb = self.check_bv_term(b)?;
        if wa == wb {
            Ok(wa)
        } else {
            let (ta, tb) = (self.terms.type_of(a), self.terms.type_of(b));
            self.fail(
                ErrorReport::new(ErrorCode::IncompatibleBvSizes)
                    .term1(a)
                    .type1(ta)
                    .term2(b)
                    .type2(tb),
            )
        }
    }

    pub(crate) fn check_bv_term_width(&mut self, t: TermRef, width: WidthInt) -> Result<()> {
        let w = self.check_bv_term(t)?;
        if w == width {
            Ok(())
        } else {
            let tau = self.terms.type_of(t);
            self.fail(
                ErrorReport::new(ErrorCode::IncompatibleBvSizes)
                    .term1(t)
                    .type1(tau)
                    .badval(width),
            )
        }
    }

    /// Returns the least common supertype of the types of `a` and `b`.
    pub(crate) fn check_compatible_terms(&mut self, a: TermRef, b: TermRef) -> Result<TypeRef> {
        self.check_good_term(a)?;
        self.check_good_term(b)?;
        let (ta, tb) = (self.terms.type_of(a), self.terms.type_of(b));
        match self.types.super_type(ta, tb) {
            Some(tau) => Ok(tau),
            None => self.fail(
                ErrorReport::new(ErrorCode::IncompatibleTypes)
                    .term1(a)
                    .type1(ta)
                    .term2(b)
                    .type2(tb),
            ),
        }
    }

    /// `t` must be a good term whose type is a subtype of `tau`.
    pub(crate) fn check_term_has_type(&mut self, t: TermRef, tau: TypeRef) -> Result<()> {
        self.check_good_term(t)?;
        if self.types.is_subtype(self.terms.type_of(t), tau) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::TypeMismatch).term1(t).type1(tau))
        }
    }

    /// A shift or rotation by `amount` of a `width`-bit vector.
    pub(crate) fn check_bitshift(&mut self, amount: u32, width: WidthInt) -> Result<()> {
        if amount <= width {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::InvalidBitShift).badval(amount))
        }
    }

    pub(crate) fn check_bvextract(&mut self, lo: u32, hi: u32, width: WidthInt) -> Result<()> {
        if lo <= hi && hi < width {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::InvalidBvExtract).badval(hi))
        }
    }

    pub(crate) fn check_scalar_or_utype(&mut self, tau: TypeRef) -> Result<()> {
        self.check_good_type(tau)?;
        if self.types.is_scalar_or_uninterpreted(tau) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::ScalarOrUTypeRequired).type1(tau))
        }
    }

    pub(crate) fn check_good_constant(&mut self, tau: TypeRef, index: u32) -> Result<()> {
        self.check_scalar_or_utype(tau)?;
        match self.types.get(tau) {
            Type::Scalar { card, .. } if index >= *card => self.fail(
                ErrorReport::new(ErrorCode::InvalidConstantIndex)
                    .type1(tau)
                    .badval(index),
            ),
            _ => Ok(()),
        }
    }

    pub(crate) fn check_good_variable(&mut self, t: TermRef) -> Result<()> {
        self.check_good_term(t)?;
        if t.is_positive() && matches!(self.terms.get(t), Term::Variable { .. }) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::VariableRequired).term1(t))
        }
    }

    /// `vars` must be sorted
    pub(crate) fn check_no_duplicates(&mut self, vars: &[TermRef]) -> Result<()> {
        match vars.windows(2).find(|w| w[0] == w[1]) {
            Some(w) => self.fail(ErrorReport::new(ErrorCode::DuplicateVariable).term1(w[0])),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_recorded() {
        let mut ctx = Context::default();
        assert!(ctx.check_good_term(TermRef::from_raw(4000)).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::InvalidTerm);
        assert_eq!(ctx.error_report().term1, Some(TermRef::from_raw(4000)));
        assert!(ctx.check_arith_term(TermRef::TRUE).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::ArithTermRequired);
        assert!(ctx.check_arith_term(TermRef::ZERO).is_ok());
        assert!(ctx.check_bvextract(3, 2, 8).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::InvalidBvExtract);
        assert!(ctx.check_bitshift(8, 8).is_ok());
        assert!(ctx.check_bitshift(9, 8).is_err());
    }
}
