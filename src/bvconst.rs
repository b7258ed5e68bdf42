// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Bit-Vector Constants
//!
//! Helpers for constants of width <= 64 (plain `u64`, reduced modulo `2^width`) and for
//! wide constants which are stored as little-endian words and computed on as
//! [`baa::BitVecValue`] or [`num_bigint::BigUint`].

use baa::{BitVecMutOps, BitVecOps, BitVecValue, WidthInt, Word};
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[inline]
pub fn mask64(width: WidthInt) -> u64 {
    debug_assert!(width > 0 && width <= 64);
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[inline]
pub fn norm64(value: u64, width: WidthInt) -> u64 {
    value & mask64(width)
}

#[inline]
pub fn bit64(value: u64, i: WidthInt) -> bool {
    (value >> i) & 1 == 1
}

#[inline]
pub fn is_neg64(value: u64, width: WidthInt) -> bool {
    bit64(value, width - 1)
}

#[inline]
pub fn word_count(width: WidthInt) -> usize {
    (width as usize).div_ceil(Word::BITS as usize)
}

#[inline]
pub fn word_bit(words: &[Word], i: WidthInt) -> bool {
    let w = Word::BITS;
    (words[(i / w) as usize] >> (i % w)) & 1 == 1
}

pub fn words_from_bits(bits: impl Iterator<Item = bool>, width: WidthInt) -> Vec<Word> {
    let mut words = vec![0; word_count(width)];
    let w = Word::BITS as usize;
    for (i, b) in bits.enumerate() {
        if b {
            words[i / w] |= 1 << (i % w);
        }
    }
    words
}

pub fn words_to_big(words: &[Word]) -> BigUint {
    words
        .iter()
        .rev()
        .fold(BigUint::zero(), |acc, w| (acc << Word::BITS) + BigUint::from(*w))
}

/// Reduces `n` modulo `2^width` and returns its words.
pub fn big_to_words(n: &BigUint, width: WidthInt) -> Vec<Word> {
    let reduced = n % (BigUint::one() << width);
    let mut words = reduced.to_u64_digits();
    words.resize(word_count(width), 0);
    words
}

pub fn value_to_big(value: &BitVecValue) -> BigUint {
    words_to_big(value.words())
}

pub fn big_to_value(n: &BigUint, width: WidthInt) -> BitVecValue {
    let mut value = BitVecValue::zero(width);
    value.words_mut().copy_from_slice(&big_to_words(n, width));
    value
}

pub fn words_to_value(words: &[Word], width: WidthInt) -> BitVecValue {
    big_to_value(&words_to_big(words), width)
}

pub fn value_to_words(value: &BitVecValue) -> Vec<Word> {
    big_to_words(&value_to_big(value), value.width())
}

pub fn value_bit(value: &BitVecValue, i: WidthInt) -> bool {
    value_to_big(value).bit(i as u64)
}

pub fn all_ones(width: WidthInt) -> BitVecValue {
    BitVecValue::zero(width).not()
}

/// Arithmetic needed to derive the signed SMT-LIB division operators from unsigned ones.
pub trait DivOps: Sized + Clone {
    fn bv_is_zero(&self) -> bool;
    fn bv_is_negative(&self) -> bool;
    fn bv_neg(&self) -> Self;
    fn bv_plus(&self, other: &Self) -> Self;
    /// unsigned quotient; division by zero yields all ones
    fn bv_udiv(&self, other: &Self) -> Self;
    /// unsigned remainder; `x urem 0 = x`
    fn bv_urem(&self, other: &Self) -> Self;

    fn bv_sdiv(&self, other: &Self) -> Self {
        match (self.bv_is_negative(), other.bv_is_negative()) {
            (false, false) => self.bv_udiv(other),
            (true, false) => self.bv_neg().bv_udiv(other).bv_neg(),
            (false, true) => self.bv_udiv(&other.bv_neg()).bv_neg(),
            (true, true) => self.bv_neg().bv_udiv(&other.bv_neg()),
        }
    }

    fn bv_srem(&self, other: &Self) -> Self {
        match (self.bv_is_negative(), other.bv_is_negative()) {
            (false, false) => self.bv_urem(other),
            (true, false) => self.bv_neg().bv_urem(other).bv_neg(),
            (false, true) => self.bv_urem(&other.bv_neg()),
            (true, true) => self.bv_neg().bv_urem(&other.bv_neg()).bv_neg(),
        }
    }

    fn bv_smod(&self, other: &Self) -> Self {
        let (sn, tn) = (self.bv_is_negative(), other.bv_is_negative());
        let abs_s = if sn { self.bv_neg() } else { self.clone() };
        let abs_t = if tn { other.bv_neg() } else { other.clone() };
        let u = abs_s.bv_urem(&abs_t);
        if u.bv_is_zero() {
            return u;
        }
        match (sn, tn) {
            (false, false) => u,
            (true, false) => u.bv_neg().bv_plus(other),
            (false, true) => u.bv_plus(other),
            (true, true) => u.bv_neg(),
        }
    }
}

/// A constant of at most 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmallBv {
    pub value: u64,
    pub width: WidthInt,
}

impl SmallBv {
    pub fn new(value: u64, width: WidthInt) -> Self {
        Self {
            value: norm64(value, width),
            width,
        }
    }
}

impl DivOps for SmallBv {
    fn bv_is_zero(&self) -> bool {
        self.value == 0
    }

    fn bv_is_negative(&self) -> bool {
        is_neg64(self.value, self.width)
    }

    fn bv_neg(&self) -> Self {
        Self::new(self.value.wrapping_neg(), self.width)
    }

    fn bv_plus(&self, other: &Self) -> Self {
        Self::new(self.value.wrapping_add(other.value), self.width)
    }

    fn bv_udiv(&self, other: &Self) -> Self {
        match self.value.checked_div(other.value) {
            Some(q) => Self::new(q, self.width),
            None => Self::new(u64::MAX, self.width),
        }
    }

    fn bv_urem(&self, other: &Self) -> Self {
        match self.value.checked_rem(other.value) {
            Some(r) => Self::new(r, self.width),
            None => *self,
        }
    }
}

impl DivOps for BitVecValue {
    fn bv_is_zero(&self) -> bool {
        self.is_zero()
    }

    fn bv_is_negative(&self) -> bool {
        value_bit(self, self.width() - 1)
    }

    fn bv_neg(&self) -> Self {
        self.negate()
    }

    fn bv_plus(&self, other: &Self) -> Self {
        self.add(other)
    }

    fn bv_udiv(&self, other: &Self) -> Self {
        if other.is_zero() {
            return all_ones(self.width());
        }
        big_to_value(&(value_to_big(self) / value_to_big(other)), self.width())
    }

    fn bv_urem(&self, other: &Self) -> Self {
        if other.is_zero() {
            return self.clone();
        }
        big_to_value(&(value_to_big(self) % value_to_big(other)), self.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_signed_division_follows_smt_lib() {
        let w = 4;
        let bv = |v: i64| SmallBv::new(v as u64, w);
        // -7 / 2 = -3 (rounding toward zero)
        assert_eq!(bv(-7).bv_sdiv(&bv(2)), bv(-3));
        // -7 rem 2 = -1 (sign follows the dividend)
        assert_eq!(bv(-7).bv_srem(&bv(2)), bv(-1));
        // -7 mod 2 = 1 (sign follows the divisor)
        assert_eq!(bv(-7).bv_smod(&bv(2)), bv(1));
        assert_eq!(bv(7).bv_smod(&bv(-2)), bv(-1));
        // division by zero
        assert_eq!(bv(5).bv_udiv(&bv(0)), bv(-1));
        assert_eq!(bv(5).bv_urem(&bv(0)), bv(5));
        assert_eq!(bv(-5).bv_sdiv(&bv(0)), bv(1));
        assert_eq!(bv(-5).bv_smod(&bv(0)), bv(-5));
    }

    #[test]
    fn word_conversions() {
        let n = (BigUint::one() << 70u32) + BigUint::from(5u32);
        let words = big_to_words(&n, 72);
        assert_eq!(words, vec![5, 64]);
        assert_eq!(words_to_big(&words), n);
        assert_eq!(words_to_value(&words, 72).width(), 72);
        assert_eq!(value_to_words(&words_to_value(&words, 72)), words);
        assert!(word_bit(&words, 70));
        assert!(!word_bit(&words, 71));
        // values are reduced, never dropped
        let wrapped = big_to_value(&((BigUint::one() << 72u32) + BigUint::from(3u32)), 72);
        assert_eq!(value_to_big(&wrapped), BigUint::from(3u32));
        let ones = BitVecValue::ones(100);
        assert_eq!(value_to_big(&ones), (BigUint::one() << 100u32) - BigUint::one());
    }

    #[test]
    fn wide_division() {
        let w = 80;
        let a = big_to_value(&BigUint::from(1000u32), w);
        let b = big_to_value(&BigUint::from(7u32), w);
        assert_eq!(value_to_big(&a.bv_udiv(&b)), BigUint::from(142u32));
        assert_eq!(value_to_big(&a.bv_urem(&b)), BigUint::from(6u32));
        assert_eq!(
            value_to_big(&a.bv_neg().bv_sdiv(&b).bv_neg()),
            BigUint::from(142u32)
        );
        let zero = BitVecValue::zero(w);
        assert_eq!(a.bv_udiv(&zero), all_ones(w));
    }
}
