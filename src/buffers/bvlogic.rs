// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::pool::ScratchBuffer;
use crate::bitnodes::{NodeRef, NodeTable};
use crate::bvconst::{word_bit, words_from_bits};
use baa::{WidthInt, Word};

/// Bit-vector as one [`NodeRef`] per bit, least significant bit first.
#[derive(Debug, Clone, Default)]
pub struct BvLogicBuffer {
    bits: Vec<NodeRef>,
}

impl ScratchBuffer for BvLogicBuffer {
    fn reset(&mut self) {
        self.bits.clear();
    }
}

impl BvLogicBuffer {
    pub fn width(&self) -> WidthInt {
        self.bits.len() as WidthInt
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[NodeRef] {
        &self.bits
    }

    pub fn set_bits(&mut self, bits: impl IntoIterator<Item = NodeRef>) {
        self.bits.clear();
        self.bits.extend(bits);
    }

    pub fn set_constant64(&mut self, width: WidthInt, value: u64) {
        debug_assert!(width <= 64);
        self.set_bits((0..width).map(|i| NodeRef::from_bool((value >> i) & 1 == 1)));
    }

    pub fn set_constant_words(&mut self, width: WidthInt, words: &[Word]) {
        self.set_bits((0..width).map(|i| NodeRef::from_bool(word_bit(words, i))));
    }

    pub fn is_constant(&self) -> bool {
        self.bits.iter().all(|b| b.as_bool().is_some())
    }

    pub fn constant64(&self) -> Option<u64> {
        if self.bits.len() > 64 {
            return None;
        }
        self.bits.iter().enumerate().try_fold(0u64, |acc, (i, b)| {
            b.as_bool().map(|v| acc | ((v as u64) << i))
        })
    }

    pub fn constant_words(&self) -> Option<Vec<Word>> {
        let bits: Option<Vec<bool>> = self.bits.iter().map(|b| b.as_bool()).collect();
        bits.map(|bits| words_from_bits(bits.into_iter(), self.width()))
    }

    pub fn not(&mut self) {
        for b in self.bits.iter_mut() {
            *b = !*b;
        }
    }

    fn zip_with(
        &mut self,
        other: &[NodeRef],
        nodes: &mut NodeTable,
        op: impl Fn(&mut NodeTable, NodeRef, NodeRef) -> NodeRef,
    ) {
        debug_assert_eq!(self.bits.len(), other.len());
        for (a, b) in self.bits.iter_mut().zip(other.iter()) {
            *a = op(nodes, *a, *b);
        }
    }

    pub fn and_bits(&mut self, other: &[NodeRef], nodes: &mut NodeTable) {
        self.zip_with(other, nodes, NodeTable::and);
    }

    pub fn or_bits(&mut self, other: &[NodeRef], nodes: &mut NodeTable) {
        self.zip_with(other, nodes, NodeTable::or);
    }

    pub fn xor_bits(&mut self, other: &[NodeRef], nodes: &mut NodeTable) {
        self.zip_with(other, nodes, NodeTable::xor);
    }

    fn shift_up(&mut self, k: WidthInt, fill: NodeRef) {
        let n = self.bits.len();
        let k = (k as usize).min(n);
        self.bits.truncate(n - k);
        self.bits.splice(0..0, std::iter::repeat(fill).take(k));
    }

    fn shift_down(&mut self, k: WidthInt, fill: NodeRef) {
        let n = self.bits.len();
        let k = (k as usize).min(n);
        self.bits.drain(0..k);
        self.bits.extend(std::iter::repeat(fill).take(k));
    }

    /// shift toward the most significant bit, filling with zeros
    pub fn shift_left0(&mut self, k: WidthInt) {
        self.shift_up(k, NodeRef::FALSE);
    }

    pub fn shift_left1(&mut self, k: WidthInt) {
        self.shift_up(k, NodeRef::TRUE);
    }

    pub fn shift_right0(&mut self, k: WidthInt) {
        self.shift_down(k, NodeRef::FALSE);
    }

    pub fn shift_right1(&mut self, k: WidthInt) {
        self.shift_down(k, NodeRef::TRUE);
    }

    pub fn ashift_right(&mut self, k: WidthInt) {
        if let Some(&msb) = self.bits.last() {
            self.shift_down(k, msb);
        }
    }

    pub fn rotate_left(&mut self, k: WidthInt) {
        if !self.bits.is_empty() {
            let k = k as usize % self.bits.len();
            self.bits.rotate_right(k);
        }
    }

    pub fn rotate_right(&mut self, k: WidthInt) {
        if !self.bits.is_empty() {
            let k = k as usize % self.bits.len();
            self.bits.rotate_left(k);
        }
    }

    /// keeps bits `lo` to `hi` (inclusive)
    pub fn extract(&mut self, lo: WidthInt, hi: WidthInt) {
        debug_assert!(lo <= hi && (hi as usize) < self.bits.len());
        self.bits.truncate(hi as usize + 1);
        self.bits.drain(0..lo as usize);
    }

    /// `self := high :: self`
    pub fn concat_high(&mut self, high: &[NodeRef]) {
        self.bits.extend_from_slice(high);
    }

    /// `self := self :: low`
    pub fn concat_low(&mut self, low: &[NodeRef]) {
        self.bits.splice(0..0, low.iter().copied());
    }

    pub fn repeat(&mut self, n: u32) {
        debug_assert!(n > 0);
        let pattern = self.bits.clone();
        for _ in 1..n {
            self.bits.extend_from_slice(&pattern);
        }
    }

    pub fn sign_extend(&mut self, width: WidthInt) {
        if let Some(&msb) = self.bits.last() {
            self.bits.resize(width as usize, msb);
        }
    }

    pub fn zero_extend(&mut self, width: WidthInt) {
        self.bits.resize(width as usize, NodeRef::FALSE);
    }

    /// and over all bits, result has width 1
    pub fn redand(&mut self, nodes: &mut NodeTable) {
        let r = self
            .bits
            .iter()
            .fold(NodeRef::TRUE, |acc, b| nodes.and(acc, *b));
        self.set_bits([r]);
    }

    pub fn redor(&mut self, nodes: &mut NodeTable) {
        let r = self
            .bits
            .iter()
            .fold(NodeRef::FALSE, |acc, b| nodes.or(acc, *b));
        self.set_bits([r]);
    }

    /// `1` iff `self == other`, result has width 1
    pub fn comp(&mut self, other: &[NodeRef], nodes: &mut NodeTable) {
        debug_assert_eq!(self.bits.len(), other.len());
        let mut r = NodeRef::TRUE;
        for (a, b) in self.bits.iter().zip(other.iter()) {
            let eq = nodes.xnor(*a, *b);
            r = nodes.and(r, eq);
        }
        self.set_bits([r]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::TermRef;

    fn constant(width: WidthInt, value: u64) -> BvLogicBuffer {
        let mut b = BvLogicBuffer::default();
        b.set_constant64(width, value);
        b
    }

    #[test]
    fn constant_shifts_and_rotations() {
        let mut b = constant(8, 0b1001_0110);
        b.shift_left0(2);
        assert_eq!(b.constant64(), Some(0b0101_1000));
        b.shift_right1(3);
        assert_eq!(b.constant64(), Some(0b1110_1011));
        b.ashift_right(4);
        assert_eq!(b.constant64(), Some(0b1111_1110));
        b.rotate_left(1);
        assert_eq!(b.constant64(), Some(0b1111_1101));
        b.rotate_right(9);
        assert_eq!(b.constant64(), Some(0b1111_1110));
        b.shift_left0(8);
        assert_eq!(b.constant64(), Some(0));
    }

    #[test]
    fn slices_and_extensions() {
        let mut b = constant(8, 0b1001_0110);
        b.extract(1, 4);
        assert_eq!(b.width(), 4);
        assert_eq!(b.constant64(), Some(0b1011));
        b.sign_extend(6);
        assert_eq!(b.constant64(), Some(0b11_1011));
        b.zero_extend(8);
        assert_eq!(b.constant64(), Some(0b0011_1011));
        let high = constant(4, 0b1010);
        b.concat_high(high.bits());
        assert_eq!(b.width(), 12);
        assert_eq!(b.constant64(), Some(0b1010_0011_1011));
        let mut r = constant(2, 0b10);
        r.repeat(3);
        assert_eq!(r.constant64(), Some(0b10_1010));
    }

    #[test]
    fn reductions_on_symbolic_bits() {
        let mut nodes = NodeTable::default();
        let x = nodes.leaf(TermRef::from_raw(10));
        let mut b = BvLogicBuffer::default();
        b.set_bits([x, NodeRef::TRUE, !x]);
        let copy = b.clone();
        b.redand(&mut nodes);
        assert_eq!(b.bits(), &[NodeRef::FALSE]);
        let mut c = copy.clone();
        c.redor(&mut nodes);
        assert_eq!(c.bits(), &[NodeRef::TRUE]);
        let mut d = copy.clone();
        d.comp(copy.bits(), &mut nodes);
        assert_eq!(d.bits(), &[NodeRef::TRUE]);
        let mut e = copy.clone();
        e.xor_bits(copy.bits(), &mut nodes);
        assert_eq!(e.constant64(), Some(0));
        assert!(!copy.is_constant());
    }
}
