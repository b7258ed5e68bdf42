// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Buffer API
//!
//! Buffers handed out to callers that build a polynomial or a bit-vector step by step and
//! commit it once. A handle stays valid until the buffer is freed; any later use reports
//! [`ErrorCode::InvalidBuffer`]. Getting the term out of a buffer resets it.

use crate::bitnodes::{NodeRef, NodeTable};
use crate::buffers::*;
use crate::bvconst::word_count;
use crate::context::{Context, Pooled};
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::term::TermRef;
use baa::{WidthInt, Word};
use num_rational::BigRational;

impl Context {
    /// Returns the buffer to its pool.
    pub fn free_buffer<B: Pooled>(&mut self, h: BufferRef<B>) -> Result<()> {
        if B::pool(self).free(h) {
            Ok(())
        } else {
            self.fail(ErrorReport::new(ErrorCode::InvalidBuffer).badval(h.slot()))
        }
    }

    /// Empties the buffer. Bit-vector arithmetic buffers keep their width.
    pub fn reset_buffer<B: Pooled>(&mut self, h: BufferRef<B>) -> Result<()> {
        self.with_buffer(h, |_, b| {
            b.reset();
            Ok(())
        })
    }

    pub fn new_arith_buffer(&mut self) -> BufferRef<ArithBuffer> {
        self.arith_buffers.alloc()
    }

    pub fn arith_buffer_add_term(&mut self, h: BufferRef<ArithBuffer>, t: TermRef) -> Result<()> {
        self.check_arith_term(t)?;
        self.with_buffer(h, |ctx, b| {
            ctx.arith_add_term(b, t);
            Ok(())
        })
    }

    pub fn arith_buffer_sub_term(&mut self, h: BufferRef<ArithBuffer>, t: TermRef) -> Result<()> {
        self.check_arith_term(t)?;
        self.with_buffer(h, |ctx, b| {
            ctx.arith_sub_term(b, t);
            Ok(())
        })
    }

    pub fn arith_buffer_add_const(
        &mut self,
        h: BufferRef<ArithBuffer>,
        a: &BigRational,
    ) -> Result<()> {
        self.with_buffer(h, |_, b| {
            b.add_const(a.clone());
            Ok(())
        })
    }

    /// `b += a * t`
    pub fn arith_buffer_add_const_times_term(
        &mut self,
        h: BufferRef<ArithBuffer>,
        a: &BigRational,
        t: TermRef,
    ) -> Result<()> {
        self.check_arith_term(t)?;
        self.with_buffer(h, |ctx, b| {
            let monos = ctx.arith_monomials(t);
            b.add_scaled_monos(a, &monos);
            Ok(())
        })
    }

    pub fn arith_buffer_mul_term(&mut self, h: BufferRef<ArithBuffer>, t: TermRef) -> Result<()> {
        self.check_arith_term(t)?;
        self.with_buffer(h, |ctx, b| {
            ctx.check_degree(b.degree(&ctx.pprods) + ctx.term_degree(t))?;
            ctx.arith_mul_term(b, t);
            Ok(())
        })
    }

    pub fn arith_buffer_negate(&mut self, h: BufferRef<ArithBuffer>) -> Result<()> {
        self.with_buffer(h, |_, b| {
            b.negate();
            Ok(())
        })
    }

    pub fn arith_buffer_normalize(&mut self, h: BufferRef<ArithBuffer>) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            b.normalize(&ctx.pprods);
            Ok(())
        })
    }

    /// The polynomial in `h` as a term. Leaves the buffer empty.
    pub fn arith_buffer_get_term(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.with_buffer(h, |ctx, b| Ok(ctx.arith_buffer_term(b)))
    }

    pub fn arith_buffer_get_eq0(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.with_buffer(h, |ctx, b| Ok(ctx.arith_buffer_eq0(b)))
    }

    pub fn arith_buffer_get_geq0(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.with_buffer(h, |ctx, b| Ok(ctx.arith_buffer_geq0(b)))
    }

    pub fn arith_buffer_get_leq0(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.with_buffer(h, |ctx, b| Ok(ctx.arith_buffer_leq0(b)))
    }

    pub fn arith_buffer_get_gt0(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.arith_buffer_get_leq0(h).map(|t| !t)
    }

    pub fn arith_buffer_get_lt0(&mut self, h: BufferRef<ArithBuffer>) -> Result<TermRef> {
        self.arith_buffer_get_geq0(h).map(|t| !t)
    }

    /// Arithmetic buffer with `u64` coefficients for vectors of up to 64 bits.
    pub fn new_bv64_buffer(&mut self, width: u32) -> Result<BufferRef<BvArith64Buffer>> {
        let width = self.check_bv_width(width as u64)?;
        if width > 64 {
            return self.fail(ErrorReport::new(ErrorCode::MaxBvSizeExceeded).badval(width));
        }
        Ok(self.new_bvarith_buffer(width))
    }

    /// Arithmetic buffer for vectors of any width.
    pub fn new_bv_buffer(&mut self, width: u32) -> Result<BufferRef<BvArithWideBuffer>> {
        let width = self.check_bv_width(width as u64)?;
        Ok(self.new_bvarith_buffer(width))
    }

    fn new_bvarith_buffer<C: BvCoeff>(&mut self, width: WidthInt) -> BufferRef<BvArithBuffer<C>>
    where
        BvArithBuffer<C>: Pooled,
    {
        let pool = BvArithBuffer::<C>::pool(self);
        let h = pool.alloc();
        if let Some(b) = pool.get_mut(h) {
            b.prepare(width);
        }
        h
    }

    pub fn bvarith_buffer_add_term<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
        t: TermRef,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bv_term_width(t, b.width())?;
            let monos = ctx.bv_monomials::<C>(t, b.width());
            b.add_monos(&monos);
            Ok(())
        })
    }

    pub fn bvarith_buffer_sub_term<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
        t: TermRef,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bv_term_width(t, b.width())?;
            let monos = ctx.bv_monomials::<C>(t, b.width());
            b.sub_monos(&monos);
            Ok(())
        })
    }

    /// Adds `a` modulo `2^width`.
    pub fn bvarith_buffer_add_const<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
        a: u64,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |_, b| {
            b.add_const(C::from_u64_coeff(a, b.width()));
            Ok(())
        })
    }

    /// `b += a * t`
    pub fn bvarith_buffer_add_const_times_term<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
        a: u64,
        t: TermRef,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| {
            let w = b.width();
            ctx.check_bv_term_width(t, w)?;
            let a = C::from_u64_coeff(a, w);
            for (c, p) in ctx.bv_monomials::<C>(t, w) {
                b.add_mono(c.times(&a, w), p);
            }
            Ok(())
        })
    }

    pub fn bvarith_buffer_mul_term<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
        t: TermRef,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bv_term_width(t, b.width())?;
            ctx.check_degree(b.degree(&ctx.pprods) + ctx.term_degree(t))?;
            let monos = ctx.bv_monomials::<C>(t, b.width());
            b.mul_monos(&monos, &mut ctx.pprods);
            Ok(())
        })
    }

    pub fn bvarith_buffer_negate<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |_, b| {
            b.negate();
            Ok(())
        })
    }

    pub fn bvarith_buffer_normalize<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
    ) -> Result<()>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| {
            b.normalize(&ctx.pprods);
            Ok(())
        })
    }

    /// The polynomial in `h` as a term. Leaves the buffer empty with its width unchanged.
    pub fn bvarith_buffer_get_term<C: BvCoeff>(
        &mut self,
        h: BufferRef<BvArithBuffer<C>>,
    ) -> Result<TermRef>
    where
        BvArithBuffer<C>: Pooled,
    {
        self.with_buffer(h, |ctx, b| Ok(ctx.bv_buffer_term(b)))
    }

    pub fn new_bvlogic_buffer(&mut self) -> BufferRef<BvLogicBuffer> {
        self.logic_buffers.alloc()
    }

    /// Replaces the content of `h` with the bits of `t`.
    pub fn bvlogic_buffer_set_term(&mut self, h: BufferRef<BvLogicBuffer>, t: TermRef) -> Result<()> {
        self.check_bv_term(t)?;
        self.with_buffer(h, |ctx, b| {
            let bits = ctx.term_bits(t);
            b.set_bits(bits);
            Ok(())
        })
    }

    /// Replaces the content of `h` with `value` zero extended to `width` bits.
    pub fn bvlogic_buffer_set_constant(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        width: u32,
        value: u64,
    ) -> Result<()> {
        let width = self.check_bv_width(width as u64)?;
        let mut words: Vec<Word> = vec![0; word_count(width)];
        words[0] = value;
        self.with_buffer(h, |_, b| {
            b.set_constant_words(width, &words);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_not(&mut self, h: BufferRef<BvLogicBuffer>) -> Result<()> {
        self.with_buffer(h, |_, b| {
            b.not();
            Ok(())
        })
    }

    /// Combines `h` with the bits of a term of the same width.
    fn logic_buffer_with_term(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        t: TermRef,
        f: impl FnOnce(&mut BvLogicBuffer, &[NodeRef], &mut NodeTable),
    ) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bv_term_width(t, b.width())?;
            let other = ctx.term_bits(t);
            f(b, &other, &mut ctx.nodes);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_and_term(&mut self, h: BufferRef<BvLogicBuffer>, t: TermRef) -> Result<()> {
        self.logic_buffer_with_term(h, t, |b, other, nodes| b.and_bits(other, nodes))
    }

    pub fn bvlogic_buffer_or_term(&mut self, h: BufferRef<BvLogicBuffer>, t: TermRef) -> Result<()> {
        self.logic_buffer_with_term(h, t, |b, other, nodes| b.or_bits(other, nodes))
    }

    pub fn bvlogic_buffer_xor_term(&mut self, h: BufferRef<BvLogicBuffer>, t: TermRef) -> Result<()> {
        self.logic_buffer_with_term(h, t, |b, other, nodes| b.xor_bits(other, nodes))
    }

    /// `b := 0b1` if `b == t`, `0b0` otherwise
    pub fn bvlogic_buffer_comp_term(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        t: TermRef,
    ) -> Result<()> {
        self.logic_buffer_with_term(h, t, |b, other, nodes| b.comp(other, nodes))
    }

    /// `t` ends up in the most significant bits.
    pub fn bvlogic_buffer_concat_high(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        t: TermRef,
    ) -> Result<()> {
        let w = self.check_bv_term(t)?;
        self.with_buffer(h, |ctx, b| {
            ctx.check_maxbvsize(b.width() as u64 + w as u64)?;
            let high = ctx.term_bits(t);
            b.concat_high(&high);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_concat_low(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        t: TermRef,
    ) -> Result<()> {
        let w = self.check_bv_term(t)?;
        self.with_buffer(h, |ctx, b| {
            ctx.check_maxbvsize(b.width() as u64 + w as u64)?;
            let low = ctx.term_bits(t);
            b.concat_low(&low);
            Ok(())
        })
    }

    fn logic_buffer_shift(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        n: u32,
        f: impl FnOnce(&mut BvLogicBuffer, WidthInt),
    ) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bitshift(n, b.width())?;
            f(b, n);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_shift_left0(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::shift_left0)
    }

    pub fn bvlogic_buffer_shift_left1(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::shift_left1)
    }

    pub fn bvlogic_buffer_shift_right0(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::shift_right0)
    }

    pub fn bvlogic_buffer_shift_right1(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::shift_right1)
    }

    pub fn bvlogic_buffer_ashift_right(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::ashift_right)
    }

    pub fn bvlogic_buffer_rotate_left(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::rotate_left)
    }

    pub fn bvlogic_buffer_rotate_right(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.logic_buffer_shift(h, n, BvLogicBuffer::rotate_right)
    }

    /// Keeps bits `i` to `j` (inclusive).
    pub fn bvlogic_buffer_extract(
        &mut self,
        h: BufferRef<BvLogicBuffer>,
        i: u32,
        j: u32,
    ) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            ctx.check_bvextract(i, j, b.width())?;
            b.extract(i, j);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_repeat(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.check_positive(n as u64)?;
        self.with_buffer(h, |ctx, b| {
            ctx.check_maxbvsize(b.width() as u64 * n as u64)?;
            b.repeat(n);
            Ok(())
        })
    }

    /// Adds `n` copies of the sign bit.
    pub fn bvlogic_buffer_sign_extend(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            if b.is_empty() {
                return ctx.fail(ErrorReport::new(ErrorCode::PosIntRequired).badval(0));
            }
            let w = b.width() as u64 + n as u64;
            ctx.check_maxbvsize(w)?;
            b.sign_extend(w as WidthInt);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_zero_extend(&mut self, h: BufferRef<BvLogicBuffer>, n: u32) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            if b.is_empty() {
                return ctx.fail(ErrorReport::new(ErrorCode::PosIntRequired).badval(0));
            }
            let w = b.width() as u64 + n as u64;
            ctx.check_maxbvsize(w)?;
            b.zero_extend(w as WidthInt);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_redand(&mut self, h: BufferRef<BvLogicBuffer>) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            b.redand(&mut ctx.nodes);
            Ok(())
        })
    }

    pub fn bvlogic_buffer_redor(&mut self, h: BufferRef<BvLogicBuffer>) -> Result<()> {
        self.with_buffer(h, |ctx, b| {
            b.redor(&mut ctx.nodes);
            Ok(())
        })
    }

    /// The bit-vector in `h` as a term. Fails on an empty buffer, leaves the buffer empty
    /// otherwise.
    pub fn bvlogic_buffer_get_term(&mut self, h: BufferRef<BvLogicBuffer>) -> Result<TermRef> {
        self.with_buffer(h, |ctx, b| {
            if b.is_empty() {
                return ctx.fail(ErrorReport::new(ErrorCode::PosIntRequired).badval(0));
            }
            Ok(ctx.logic_buffer_term(b))
        })
    }
}
