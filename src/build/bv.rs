// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Bit-Vector Terms
//!
//! Arithmetic goes through a [`BvArithBuffer`], with `u64` coefficients up to 64 bits and
//! [`BitVecValue`] coefficients for wider vectors. Bitwise operations, shifts by a constant,
//! slicing and extension go through a [`BvLogicBuffer`]. Division and variable shifts are
//! folded when both operands are constants and kept as [`Term::BvBinOp`] otherwise.

use crate::bitnodes::{NodeRef, NodeTable};
use crate::buffers::{BvArithBuffer, BvCoeff, BvLogicBuffer, BvMonomial};
use crate::bvconst::*;
use crate::context::{Context, Pooled};
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::parse;
use crate::term::{BvOp, Term, TermRef};
use crate::types::TypeRef;
use baa::{BitVecValue, WidthInt, Word};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Sub,
    Neg,
    Mul,
    Square,
    Power(u32),
}

impl Context {
    pub fn bvconst_u32(&mut self, n: u32, x: u32) -> Result<TermRef> {
        self.bvconst_u64(n, x as u64)
    }

    /// `x` reduced modulo `2^n`
    pub fn bvconst_u64(&mut self, n: u32, x: u64) -> Result<TermRef> {
        let width = self.check_bv_width(n as u64)?;
        Ok(self.mk_bvconst_big(width, &BigUint::from(x)))
    }

    pub fn bvconst_zero(&mut self, n: u32) -> Result<TermRef> {
        self.bvconst_u64(n, 0)
    }

    pub fn bvconst_one(&mut self, n: u32) -> Result<TermRef> {
        self.bvconst_u64(n, 1)
    }

    pub fn bvconst_minus_one(&mut self, n: u32) -> Result<TermRef> {
        let width = self.check_bv_width(n as u64)?;
        let ones = (BigUint::one() << width) - BigUint::one();
        Ok(self.mk_bvconst_big(width, &ones))
    }

    /// Constant from its bits, least significant first.
    pub fn bvconst_from_array(&mut self, bits: &[bool]) -> Result<TermRef> {
        let width = self.check_bv_width(bits.len() as u64)?;
        let words = words_from_bits(bits.iter().copied(), width);
        Ok(self.mk_bvconst_words(width, &words))
    }

    /// Constant from binary digits, most significant first.
    pub fn parse_bvbin(&mut self, inp: &str) -> Result<TermRef> {
        match parse::parse_bvbin(inp) {
            Ok((value, width)) => {
                let width = self.check_bv_width(width)?;
                Ok(self.mk_bvconst_big(width, &value))
            }
            Err(code) => self.fail(code),
        }
    }

    /// Constant from hexadecimal digits, most significant first.
    pub fn parse_bvhex(&mut self, inp: &str) -> Result<TermRef> {
        match parse::parse_bvhex(inp) {
            Ok((value, width)) => {
                let width = self.check_bv_width(width)?;
                Ok(self.mk_bvconst_big(width, &value))
            }
            Err(code) => self.fail(code),
        }
    }

    pub(crate) fn mk_bvconst64(&mut self, width: WidthInt, value: u64) -> TermRef {
        let tau = self.types.bv(width);
        let value = norm64(value, width);
        self.terms.intern(Term::BvConst64 { width, value }, tau)
    }

    /// Constants up to 64 bits are always stored as [`Term::BvConst64`].
    pub(crate) fn mk_bvconst_words(&mut self, width: WidthInt, words: &[Word]) -> TermRef {
        if width <= 64 {
            return self.mk_bvconst64(width, words.first().copied().unwrap_or(0));
        }
        let words = big_to_words(&words_to_big(words), width);
        let tau = self.types.bv(width);
        self.terms.intern(Term::BvConst { width, words }, tau)
    }

    pub(crate) fn mk_bvconst_big(&mut self, width: WidthInt, value: &BigUint) -> TermRef {
        let words = big_to_words(value, width);
        self.mk_bvconst_words(width, &words)
    }

    pub fn bvadd(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.bvarith(w, ArithOp::Add, t1, t2))
    }

    pub fn bvsub(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.bvarith(w, ArithOp::Sub, t1, t2))
    }

    pub fn bvneg(&mut self, t: TermRef) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        Ok(self.bvarith(w, ArithOp::Neg, t, t))
    }

    pub fn bvmul(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        self.check_degree(self.term_degree(t1) + self.term_degree(t2))?;
        Ok(self.bvarith(w, ArithOp::Mul, t1, t2))
    }

    pub fn bvsquare(&mut self, t: TermRef) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_degree(2 * self.term_degree(t))?;
        Ok(self.bvarith(w, ArithOp::Square, t, t))
    }

    pub fn bvpower(&mut self, t: TermRef, d: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_degree(d as u64 * self.term_degree(t))?;
        Ok(self.bvarith(w, ArithOp::Power(d), t, t))
    }

    fn bvarith(&mut self, width: WidthInt, op: ArithOp, t1: TermRef, t2: TermRef) -> TermRef {
        if width <= 64 {
            self.mk_bvarith::<u64>(width, op, t1, t2)
        } else {
            self.mk_bvarith::<BitVecValue>(width, op, t1, t2)
        }
    }

    fn mk_bvarith<C: BvCoeff>(
        &mut self,
        width: WidthInt,
        op: ArithOp,
        t1: TermRef,
        t2: TermRef,
    ) -> TermRef
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_scratch(|ctx, b: &mut BvArithBuffer<C>| {
            b.prepare(width);
            let m1 = ctx.bv_monomials::<C>(t1, width);
            b.add_monos(&m1);
            match op {
                ArithOp::Add => {
                    let m2 = ctx.bv_monomials::<C>(t2, width);
                    b.add_monos(&m2);
                }
                ArithOp::Sub => {
                    let m2 = ctx.bv_monomials::<C>(t2, width);
                    b.sub_monos(&m2);
                }
                ArithOp::Neg => b.negate(),
                ArithOp::Mul => {
                    let m2 = ctx.bv_monomials::<C>(t2, width);
                    b.mul_monos(&m2, &mut ctx.pprods);
                }
                ArithOp::Square => b.square(&mut ctx.pprods),
                ArithOp::Power(d) => b.power(d, &mut ctx.pprods),
            }
            ctx.bv_buffer_term(b)
        })
    }

    /// Decomposition of a bit-vector term into monomials. Anything but constants, products
    /// and polynomials is a variable.
    pub(crate) fn bv_monomials<C: BvCoeff>(
        &mut self,
        t: TermRef,
        width: WidthInt,
    ) -> Vec<BvMonomial<C>> {
        let term = self.terms.get(t);
        if let Some(monos) = C::term_monomials(term) {
            return monos;
        }
        let one = C::from_u64_coeff(1, width);
        match term {
            Term::PowerProduct(p) => vec![(one, *p)],
            _ => vec![(one, self.pprods.var(t))],
        }
    }

    /// Commits the buffer and leaves it empty.
    pub(crate) fn bv_buffer_term<C: BvCoeff>(&mut self, b: &mut BvArithBuffer<C>) -> TermRef {
        let width = b.width();
        b.normalize(&self.pprods);
        let monos = b.take_monos();
        let tau = self.types.bv(width);
        match monos.as_slice() {
            [] => {
                let zero = C::from_u64_coeff(0, width).const_term(width);
                self.terms.intern(zero, tau)
            }
            [(c, p)] if p.is_empty() => self.terms.intern(c.const_term(width), tau),
            [(c, p)] if c.is_one_coeff() => self.pprod_term(*p),
            _ => {
                if let Some(t) = self.bvarith_to_bits(width, &monos) {
                    tracing::trace!("bit-vector polynomial {monos:?} is the bit array {t:?}");
                    return t;
                }
                self.terms.intern(C::poly_term(width, monos), tau)
            }
        }
    }

    /// Sum of shifted bit arrays whose set bits do not overlap, as a single bit array.
    /// Either every monomial is placed or nothing is built.
    fn bvarith_to_bits<C: BvCoeff>(
        &mut self,
        width: WidthInt,
        monos: &[BvMonomial<C>],
    ) -> Option<TermRef> {
        let w = width as usize;
        let mut acc: Vec<Option<TermRef>> = vec![None; w];
        for (c, p) in monos {
            if p.is_empty() {
                for i in (0..width).filter(|i| c.test_bit(*i)) {
                    if acc[i as usize].replace(TermRef::TRUE).is_some() {
                        return None;
                    }
                }
                continue;
            }
            let k = c.exact_log2()? as usize;
            let x = self.pprods.as_var(*p)?;
            let Term::BvArray(bits) = self.terms.get(x) else {
                return None;
            };
            for (i, b) in bits.iter().enumerate().take(w.saturating_sub(k)) {
                if *b != TermRef::FALSE && acc[i + k].replace(*b).is_some() {
                    return None;
                }
            }
        }
        let bits = acc
            .into_iter()
            .map(|b| b.unwrap_or(TermRef::FALSE))
            .collect();
        Some(self.bv_array_term(bits))
    }

    pub fn bvnot(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_bv_term(t)?;
        Ok(self.logic_op(t, |_, b| b.not()))
    }

    pub fn bvand(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| b.and_bits(other, nodes)))
    }

    pub fn bvor(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| b.or_bits(other, nodes)))
    }

    pub fn bvxor(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| b.xor_bits(other, nodes)))
    }

    pub fn bvnand(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| {
            b.and_bits(other, nodes);
            b.not();
        }))
    }

    pub fn bvnor(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| {
            b.or_bits(other, nodes);
            b.not();
        }))
    }

    pub fn bvxnor(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| {
            b.xor_bits(other, nodes);
            b.not();
        }))
    }

    fn logic_op2(
        &mut self,
        t1: TermRef,
        t2: TermRef,
        f: impl FnOnce(&mut BvLogicBuffer, &[NodeRef], &mut NodeTable),
    ) -> TermRef {
        let other = self.term_bits(t2);
        self.logic_op(t1, |ctx, b| f(b, &other, &mut ctx.nodes))
    }

    fn const_shift(
        &mut self,
        t: TermRef,
        n: u32,
        f: impl FnOnce(&mut BvLogicBuffer, WidthInt),
    ) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_bitshift(n, w)?;
        Ok(self.logic_op(t, |_, b| f(b, n)))
    }

    /// Shift toward the most significant bit by `n`, padding with `0`.
    pub fn shift_left0(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::shift_left0)
    }

    pub fn shift_left1(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::shift_left1)
    }

    pub fn shift_right0(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::shift_right0)
    }

    pub fn shift_right1(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::shift_right1)
    }

    pub fn ashift_right(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::ashift_right)
    }

    pub fn rotate_left(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::rotate_left)
    }

    pub fn rotate_right(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        self.const_shift(t, n, BvLogicBuffer::rotate_right)
    }

    /// Bits `i` to `j` (inclusive) of `t`.
    pub fn bvextract(&mut self, t: TermRef, i: u32, j: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_bvextract(i, j, w)?;
        if i == 0 && j == w - 1 {
            return Ok(t);
        }
        Ok(self.logic_op(t, |_, b| b.extract(i, j)))
    }

    /// `t1` in the high bits, `t2` in the low bits.
    pub fn bvconcat(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvconcat_list(&[t1, t2])
    }

    /// Concatenation of `args`, the first one ending up in the most significant bits.
    pub fn bvconcat_list(&mut self, args: &[TermRef]) -> Result<TermRef> {
        self.check_positive(args.len() as u64)?;
        self.check_arity(args.len())?;
        let mut width = 0u64;
        for &t in args {
            width += self.check_bv_term(t)? as u64;
        }
        self.check_maxbvsize(width)?;
        let (&low, rest) = args.split_last().unwrap_or_else(|| unreachable!("not empty"));
        let highs: Vec<Vec<NodeRef>> = rest.iter().rev().map(|t| self.term_bits(*t)).collect();
        Ok(self.logic_op(low, |_, b| {
            for high in highs.iter() {
                b.concat_high(high);
            }
        }))
    }

    /// `n` copies of `t`.
    pub fn bvrepeat(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_positive(n as u64)?;
        self.check_maxbvsize(w as u64 * n as u64)?;
        if n == 1 {
            return Ok(t);
        }
        Ok(self.logic_op(t, |_, b| b.repeat(n)))
    }

    /// Adds `n` copies of the sign bit.
    pub fn sign_extend(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_maxbvsize(w as u64 + n as u64)?;
        if n == 0 {
            return Ok(t);
        }
        Ok(self.logic_op(t, |_, b| b.sign_extend(w + n)))
    }

    /// Adds `n` zero bits.
    pub fn zero_extend(&mut self, t: TermRef, n: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        self.check_maxbvsize(w as u64 + n as u64)?;
        if n == 0 {
            return Ok(t);
        }
        Ok(self.logic_op(t, |_, b| b.zero_extend(w + n)))
    }

    /// And of all bits, as a vector of width 1.
    pub fn redand(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_bv_term(t)?;
        Ok(self.logic_op(t, |ctx, b| b.redand(&mut ctx.nodes)))
    }

    pub fn redor(&mut self, t: TermRef) -> Result<TermRef> {
        self.check_bv_term(t)?;
        Ok(self.logic_op(t, |ctx, b| b.redor(&mut ctx.nodes)))
    }

    /// `0b1` if both operands are equal, `0b0` otherwise.
    pub fn redcomp(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.logic_op2(t1, t2, |b, other, nodes| b.comp(other, nodes)))
    }

    /// Bit-vector from boolean terms, least significant bit first.
    pub fn bvarray(&mut self, bits: &[TermRef]) -> Result<TermRef> {
        self.check_bv_width(bits.len() as u64)?;
        self.check_boolean_terms(bits)?;
        Ok(self.bv_array_term(bits.to_vec()))
    }

    /// Bit `i` of `t` as a boolean term.
    pub fn bitextract(&mut self, t: TermRef, i: u32) -> Result<TermRef> {
        let w = self.check_bv_term(t)?;
        if i >= w {
            return self.fail(ErrorReport::new(ErrorCode::InvalidBvExtract).badval(i));
        }
        Ok(self.mk_bit(t, i))
    }

    pub fn bvshl(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvshift(BvOp::Shl, w, t1, t2))
    }

    pub fn bvlshr(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvshift(BvOp::LShr, w, t1, t2))
    }

    pub fn bvashr(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvshift(BvOp::AShr, w, t1, t2))
    }

    fn mk_bvshift(&mut self, op: BvOp, w: WidthInt, t1: TermRef, t2: TermRef) -> TermRef {
        if let Some(k) = self.bv_shift_amount(t2, w) {
            return self.logic_op(t1, |_, b| match op {
                BvOp::Shl => b.shift_left0(k),
                BvOp::LShr => b.shift_right0(k),
                BvOp::AShr => b.ashift_right(k),
                _ => unreachable!("not a shift: {op:?}"),
            });
        }
        // 0 << t -> 0, 0 >> t -> 0, -1 >>a t -> -1
        if self.is_bv_zero(t1) || (op == BvOp::AShr && self.is_bv_all_ones(t1)) {
            return t1;
        }
        self.mk_bvbinop(op, w, t1, t2)
    }

    /// Value of a constant shift amount, saturated at the width.
    fn bv_shift_amount(&self, t: TermRef, w: WidthInt) -> Option<WidthInt> {
        let amount = match self.terms.get(t) {
            Term::BvConst64 { value, .. } => BigUint::from(*value),
            Term::BvConst { words, .. } => words_to_big(words),
            _ => return None,
        };
        Some(amount.to_u32().map_or(w, |k| k.min(w)))
    }

    fn is_bv_zero(&self, t: TermRef) -> bool {
        match self.terms.get(t) {
            Term::BvConst64 { value, .. } => *value == 0,
            Term::BvConst { words, .. } => words.iter().all(|w| *w == 0),
            _ => false,
        }
    }

    fn is_bv_all_ones(&self, t: TermRef) -> bool {
        match self.terms.get(t) {
            Term::BvConst64 { width, value } => *value == mask64(*width),
            Term::BvConst { width, words } => {
                words_to_big(words) == (BigUint::one() << *width) - BigUint::one()
            }
            _ => false,
        }
    }

    /// Unsigned quotient. Division by zero yields all ones.
    pub fn bvdiv(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvdiv(BvOp::UDiv, w, t1, t2))
    }

    /// Unsigned remainder. `x rem 0` is `x`.
    pub fn bvrem(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvdiv(BvOp::URem, w, t1, t2))
    }

    /// Signed quotient, rounding toward zero.
    pub fn bvsdiv(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvdiv(BvOp::SDiv, w, t1, t2))
    }

    /// Signed remainder, with the sign of the dividend.
    pub fn bvsrem(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvdiv(BvOp::SRem, w, t1, t2))
    }

    /// Signed remainder, with the sign of the divisor.
    pub fn bvsmod(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        let w = self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvdiv(BvOp::SMod, w, t1, t2))
    }

    fn mk_bvdiv(&mut self, op: BvOp, w: WidthInt, t1: TermRef, t2: TermRef) -> TermRef {
        let folded: Option<Vec<Word>> = match (self.terms.get(t1), self.terms.get(t2)) {
            (Term::BvConst64 { value: a, .. }, Term::BvConst64 { value: b, .. }) => {
                let r = fold_div(op, &SmallBv::new(*a, w), &SmallBv::new(*b, w));
                Some(vec![r.value])
            }
            (Term::BvConst { words: a, .. }, Term::BvConst { words: b, .. }) => {
                let r = fold_div(op, &words_to_value(a, w), &words_to_value(b, w));
                Some(value_to_words(&r))
            }
            _ => None,
        };
        match folded {
            Some(words) => self.mk_bvconst_words(w, &words),
            None => self.mk_bvbinop(op, w, t1, t2),
        }
    }

    fn mk_bvbinop(&mut self, op: BvOp, w: WidthInt, a: TermRef, b: TermRef) -> TermRef {
        let tau = self.types.bv(w);
        self.terms.intern(Term::BvBinOp { op, a, b }, tau)
    }

    pub fn bveq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bveq(t1, t2))
    }

    pub fn bvneq(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bveq(t1, t2).map(|t| !t)
    }

    /// unsigned `t1 >= t2`
    pub fn bvge(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvge(t1, t2))
    }

    pub fn bvgt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvge(t2, t1).map(|t| !t)
    }

    pub fn bvle(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvge(t2, t1)
    }

    pub fn bvlt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvge(t1, t2).map(|t| !t)
    }

    /// signed `t1 >= t2`
    pub fn bvsge(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.check_compatible_bv_terms(t1, t2)?;
        Ok(self.mk_bvsge(t1, t2))
    }

    pub fn bvsgt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvsge(t2, t1).map(|t| !t)
    }

    pub fn bvsle(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvsge(t2, t1)
    }

    pub fn bvslt(&mut self, t1: TermRef, t2: TermRef) -> Result<TermRef> {
        self.bvsge(t1, t2).map(|t| !t)
    }

    pub(crate) fn mk_bvge(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if t1 == t2 {
            return TermRef::TRUE;
        }
        let (lo1, hi1) = self.bv_unsigned_bounds(t1);
        let (lo2, hi2) = self.bv_unsigned_bounds(t2);
        if lo1 >= hi2 {
            return TermRef::TRUE;
        }
        if hi1 < lo2 {
            return TermRef::FALSE;
        }
        self.terms.intern(Term::BvGe(t1, t2), TypeRef::BOOL)
    }

    pub(crate) fn mk_bvsge(&mut self, t1: TermRef, t2: TermRef) -> TermRef {
        if t1 == t2 {
            return TermRef::TRUE;
        }
        let (lo1, hi1) = self.bv_signed_bounds(t1);
        let (lo2, hi2) = self.bv_signed_bounds(t2);
        if lo1 >= hi2 {
            return TermRef::TRUE;
        }
        if hi1 < lo2 {
            return TermRef::FALSE;
        }
        self.terms.intern(Term::BvSge(t1, t2), TypeRef::BOOL)
    }

    /// Smallest and largest unsigned value `t` can take, judging from its constant bits.
    fn bv_unsigned_bounds(&self, t: TermRef) -> (BigUint, BigUint) {
        let w = self.types.bv_width(self.terms.type_of(t)).unwrap_or(0);
        match self.bv_literal_bits(t) {
            Some(bits) => {
                let (mut lo, mut hi) = (BigUint::zero(), BigUint::zero());
                for (i, b) in bits.iter().enumerate() {
                    if *b == TermRef::TRUE {
                        lo.set_bit(i as u64, true);
                    }
                    if *b != TermRef::FALSE {
                        hi.set_bit(i as u64, true);
                    }
                }
                (lo, hi)
            }
            None => (BigUint::zero(), (BigUint::one() << w) - BigUint::one()),
        }
    }

    /// Like [`Context::bv_unsigned_bounds`] in two's complement.
    fn bv_signed_bounds(&self, t: TermRef) -> (BigInt, BigInt) {
        let w = self.types.bv_width(self.terms.type_of(t)).unwrap_or(1);
        let (lo, hi) = self.bv_unsigned_bounds(t);
        let msb = (w - 1) as u64;
        let sign = BigInt::one() << msb;
        let signed = |mut v: BigUint, negative: bool| {
            v.set_bit(msb, false);
            let v = BigInt::from(v);
            if negative {
                v - &sign
            } else {
                v
            }
        };
        // the smallest value takes the sign bit whenever it is possible,
        // the largest one only when it is certain
        let lo_neg = hi.bit(msb);
        let hi_neg = lo.bit(msb);
        (signed(lo, lo_neg), signed(hi, hi_neg))
    }
}

fn fold_div<V: DivOps>(op: BvOp, a: &V, b: &V) -> V {
    match op {
        BvOp::UDiv => a.bv_udiv(b),
        BvOp::URem => a.bv_urem(b),
        BvOp::SDiv => a.bv_sdiv(b),
        BvOp::SRem => a.bv_srem(b),
        BvOp::SMod => a.bv_smod(b),
        _ => unreachable!("not a division: {op:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wraps_around() {
        let mut ctx = Context::default();
        let a = ctx.parse_bvbin("00001111").unwrap();
        let b = ctx.bvconst_u64(8, 1).unwrap();
        let s = ctx.bvadd(a, b).unwrap();
        assert_eq!(ctx[s], Term::BvConst64 { width: 8, value: 0b0001_0000 });
        let m = ctx.bvconst_minus_one(8).unwrap();
        assert_eq!(ctx.bvadd(m, b).unwrap(), ctx.bvconst_zero(8).unwrap());
        assert_eq!(ctx.bvconst_u64(4, 0x1f).unwrap(), ctx.bvconst_u64(4, 0xf).unwrap());
        assert!(ctx.bvconst_u64(0, 1).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::PosIntRequired);
    }

    #[test]
    fn polynomials_cancel() {
        let mut ctx = Context::default();
        for w in [8, 100] {
            let tau = ctx.bv_type(w).unwrap();
            let x = ctx.new_uninterpreted_term(tau).unwrap();
            let y = ctx.new_uninterpreted_term(tau).unwrap();
            let s = ctx.bvadd(x, y).unwrap();
            assert_eq!(ctx.bvsub(s, y).unwrap(), x);
            let n = ctx.bvneg(x).unwrap();
            assert_eq!(ctx.bvadd(n, x).unwrap(), ctx.bvconst_zero(w).unwrap());
            let xx = ctx.bvmul(x, x).unwrap();
            assert_eq!(ctx.bvsquare(x).unwrap(), xx);
            assert_eq!(ctx.bvpower(x, 2).unwrap(), xx);
            assert!(matches!(ctx[xx], Term::PowerProduct(_)));
        }
    }

    #[test]
    fn shifted_bit_arrays_become_bit_arrays() {
        let mut ctx = Context::default();
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let q = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let x = ctx.bvarray(&[p, q, TermRef::FALSE, TermRef::FALSE]).unwrap();
        // 4*x + 1 = [1, 0, p, q]
        let four = ctx.bvconst_u64(4, 4).unwrap();
        let one = ctx.bvconst_one(4).unwrap();
        let fx = ctx.bvmul(four, x).unwrap();
        let t = ctx.bvadd(fx, one).unwrap();
        assert_eq!(ctx[t], Term::BvArray(vec![TermRef::TRUE, TermRef::FALSE, p, q]));
        // 2*x + x overlaps and stays a polynomial
        let two = ctx.bvconst_u64(4, 2).unwrap();
        let tx = ctx.bvmul(two, x).unwrap();
        let u = ctx.bvadd(tx, x).unwrap();
        assert!(matches!(ctx[u], Term::BvPoly64 { .. }));
    }

    #[test]
    fn logic_and_slicing() {
        let mut ctx = Context::default();
        let bv8 = ctx.bv_type(8).unwrap();
        let x = ctx.new_uninterpreted_term(bv8).unwrap();
        let n = ctx.bvnot(x).unwrap();
        assert_eq!(ctx.bvnot(n).unwrap(), x);
        assert_eq!(ctx.bvand(x, n).unwrap(), ctx.bvconst_zero(8).unwrap());
        assert_eq!(ctx.bvxnor(x, x).unwrap(), ctx.bvconst_minus_one(8).unwrap());
        assert_eq!(ctx.bvextract(x, 0, 7).unwrap(), x);
        let lo = ctx.bvextract(x, 0, 3).unwrap();
        let hi = ctx.bvextract(x, 4, 7).unwrap();
        assert_eq!(ctx.bvconcat(hi, lo).unwrap(), x);
        assert!(ctx.bvextract(x, 4, 8).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::InvalidBvExtract);
        let c = ctx.bvconst_u64(4, 0b1010).unwrap();
        let s = ctx.sign_extend(c, 4).unwrap();
        assert_eq!(s, ctx.bvconst_u64(8, 0b1111_1010).unwrap());
        let z = ctx.zero_extend(c, 4).unwrap();
        assert_eq!(z, ctx.bvconst_u64(8, 0b0000_1010).unwrap());
        let r = ctx.bvrepeat(c, 2).unwrap();
        assert_eq!(r, ctx.bvconst_u64(8, 0b1010_1010).unwrap());
        assert_eq!(ctx.redor(c).unwrap(), ctx.bvconst_one(1).unwrap());
        assert_eq!(ctx.redand(c).unwrap(), ctx.bvconst_zero(1).unwrap());
        assert_eq!(ctx.redcomp(x, x).unwrap(), ctx.bvconst_one(1).unwrap());
        assert!(ctx.shift_left0(x, 9).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::InvalidBitShift);
        assert_eq!(ctx.rotate_left(x, 8).unwrap(), x);
        let b3 = ctx.bitextract(x, 3).unwrap();
        assert_eq!(ctx[b3], Term::Bit { index: 3, arg: x });
    }

    #[test]
    fn variable_shifts() {
        let mut ctx = Context::default();
        let bv8 = ctx.bv_type(8).unwrap();
        let x = ctx.new_uninterpreted_term(bv8).unwrap();
        let y = ctx.new_uninterpreted_term(bv8).unwrap();
        let three = ctx.bvconst_u64(8, 3).unwrap();
        assert_eq!(ctx.bvshl(x, three).unwrap(), ctx.shift_left0(x, 3).unwrap());
        assert_eq!(ctx.bvlshr(x, three).unwrap(), ctx.shift_right0(x, 3).unwrap());
        let big = ctx.bvconst_u64(8, 200).unwrap();
        assert_eq!(ctx.bvshl(x, big).unwrap(), ctx.bvconst_zero(8).unwrap());
        let zero = ctx.bvconst_zero(8).unwrap();
        assert_eq!(ctx.bvlshr(zero, y).unwrap(), zero);
        let ones = ctx.bvconst_minus_one(8).unwrap();
        assert_eq!(ctx.bvashr(ones, y).unwrap(), ones);
        let s = ctx.bvshl(x, y).unwrap();
        assert_eq!(ctx[s], Term::BvBinOp { op: BvOp::Shl, a: x, b: y });
    }

    #[test]
    fn constant_division() {
        let mut ctx = Context::default();
        let a = ctx.bvconst_u64(4, 0b1001).unwrap(); // -7
        let b = ctx.bvconst_u64(4, 2).unwrap();
        let zero = ctx.bvconst_zero(4).unwrap();
        assert_eq!(ctx.bvdiv(a, b).unwrap(), ctx.bvconst_u64(4, 4).unwrap());
        assert_eq!(ctx.bvsdiv(a, b).unwrap(), ctx.bvconst_u64(4, 0b1101).unwrap());
        assert_eq!(ctx.bvsrem(a, b).unwrap(), ctx.bvconst_minus_one(4).unwrap());
        assert_eq!(ctx.bvsmod(a, b).unwrap(), ctx.bvconst_one(4).unwrap());
        assert_eq!(ctx.bvdiv(a, zero).unwrap(), ctx.bvconst_minus_one(4).unwrap());
        assert_eq!(ctx.bvrem(a, zero).unwrap(), a);
        let w = ctx.parse_bvhex("100000000000000000").unwrap();
        let two = ctx.bvconst_u64(72, 2).unwrap();
        let half = ctx.bvdiv(w, two).unwrap();
        assert_eq!(half, ctx.parse_bvhex("080000000000000000").unwrap());
    }

    #[test]
    fn comparisons_fold_on_known_bits() {
        let mut ctx = Context::default();
        let bv4 = ctx.bv_type(4).unwrap();
        let x = ctx.new_uninterpreted_term(bv4).unwrap();
        let zero = ctx.bvconst_zero(4).unwrap();
        let max = ctx.bvconst_minus_one(4).unwrap();
        assert_eq!(ctx.bvge(x, zero).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.bvge(max, x).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.bvlt(x, zero).unwrap(), TermRef::FALSE);
        assert_eq!(ctx.bvle(x, x).unwrap(), TermRef::TRUE);
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        // [p, 0, 0, 1] is at least 8 unsigned and negative signed
        let y = ctx.bvarray(&[p, TermRef::FALSE, TermRef::FALSE, TermRef::TRUE]).unwrap();
        let seven = ctx.bvconst_u64(4, 7).unwrap();
        assert_eq!(ctx.bvgt(y, seven).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.bvslt(y, zero).unwrap(), TermRef::TRUE);
        assert_eq!(ctx.bvsge(seven, x).unwrap(), TermRef::TRUE);
        // x may take either sign
        let s = ctx.bvsge(zero, x).unwrap();
        assert_eq!(ctx[s], Term::BvSge(zero, x));
        let s = ctx.bvsge(x, zero).unwrap();
        assert_eq!(ctx[s], Term::BvSge(x, zero));
        let eight = ctx.bvconst_u64(4, 8).unwrap();
        assert_eq!(ctx.bvsge(x, eight).unwrap(), TermRef::TRUE);
        let g = ctx.bvge(x, seven).unwrap();
        assert_eq!(ctx[g], Term::BvGe(x, seven));
        assert_eq!(ctx.bvneq(zero, max).unwrap(), TermRef::TRUE);
    }
}
