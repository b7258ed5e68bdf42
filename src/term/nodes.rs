// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::pprod::PProdRef;
use crate::types::TypeRef;
use baa::{WidthInt, Word};
use num_rational::BigRational;
use std::ops::Not;

/// Handle of a term: `2 * index + polarity`.
///
/// Negating a boolean term flips the low bit and never touches the term table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermRef(u32);

impl TermRef {
    pub const TRUE: TermRef = TermRef(0);
    pub const FALSE: TermRef = TermRef(1);
    /// the arithmetic constant `0`
    pub const ZERO: TermRef = TermRef(2);

    #[inline]
    pub(crate) fn positive(index: u32) -> Self {
        TermRef(index << 1)
    }

    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::TRUE
        } else {
            Self::FALSE
        }
    }

    /// Raw handle value, e.g., to hand out to a C interface.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: u32) -> Self {
        TermRef(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        (self.0 >> 1) as usize
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 & 1 == 1
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// The positive occurrence of the same node.
    #[inline]
    pub fn unsigned(self) -> Self {
        TermRef(self.0 & !1)
    }

    /// `true` iff `self` is `not other`
    #[inline]
    pub fn is_opposite(self, other: TermRef) -> bool {
        self.0 ^ other.0 == 1
    }

    #[inline]
    pub fn is_bool_const(self) -> bool {
        self.0 <= 1
    }
}

impl Not for TermRef {
    type Output = TermRef;

    #[inline]
    fn not(self) -> Self::Output {
        TermRef(self.0 ^ 1)
    }
}

/// Operators that are kept as uninterpreted binary bit-vector terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BvOp {
    UDiv,
    URem,
    SDiv,
    SRem,
    SMod,
    Shl,
    LShr,
    AShr,
}

/// Payload of a term node. Two nodes never share the same payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// index 0; `false` is its negation
    True,
    ArithConst(BigRational),
    /// constant of a scalar or uninterpreted type
    Constant {
        tpe: TypeRef,
        index: u32,
    },
    Uninterpreted {
        tpe: TypeRef,
        id: u32,
    },
    Variable {
        tpe: TypeRef,
        id: u32,
    },
    Ite {
        cond: TermRef,
        tru: TermRef,
        fals: TermRef,
    },
    App {
        fun: TermRef,
        args: Vec<TermRef>,
    },
    Update {
        fun: TermRef,
        args: Vec<TermRef>,
        value: TermRef,
    },
    Tuple(Vec<TermRef>),
    Select {
        index: u32,
        tuple: TermRef,
    },
    Eq(TermRef, TermRef),
    Distinct(Vec<TermRef>),
    Forall {
        vars: Vec<TermRef>,
        body: TermRef,
    },
    Or(Vec<TermRef>),
    Xor(Vec<TermRef>),
    /// `t == 0`
    ArithEq0(TermRef),
    /// `t >= 0`
    ArithGe0(TermRef),
    ArithBinEq(TermRef, TermRef),
    PowerProduct(PProdRef),
    ArithPoly(Vec<(BigRational, PProdRef)>),
    BvConst64 {
        width: WidthInt,
        value: u64,
    },
    BvConst {
        width: WidthInt,
        words: Vec<Word>,
    },
    BvPoly64 {
        width: WidthInt,
        monomials: Vec<(u64, PProdRef)>,
    },
    BvPoly {
        width: WidthInt,
        monomials: Vec<(Vec<Word>, PProdRef)>,
    },
    /// bit `i` is element `i`; element 0 is the least significant bit
    BvArray(Vec<TermRef>),
    Bit {
        index: WidthInt,
        arg: TermRef,
    },
    BvBinOp {
        op: BvOp,
        a: TermRef,
        b: TermRef,
    },
    BvEq(TermRef, TermRef),
    /// unsigned `a >= b`
    BvGe(TermRef, TermRef),
    /// signed `a >= b`
    BvSge(TermRef, TermRef),
}

impl Term {
    pub fn is_bv_const(&self) -> bool {
        matches!(self, Term::BvConst64 { .. } | Term::BvConst { .. })
    }

    pub fn is_ite(&self) -> bool {
        matches!(self, Term::Ite { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_encoding() {
        let t = TermRef::positive(7);
        assert_eq!(t.index(), 7);
        assert!(t.is_positive());
        assert!((!t).is_negative());
        assert_eq!(!!t, t);
        assert_eq!((!t).unsigned(), t);
        assert!(t.is_opposite(!t));
        assert!(!t.is_opposite(t));
        assert_eq!(!TermRef::TRUE, TermRef::FALSE);
        assert_eq!(TermRef::ZERO.index(), 1);
    }
}
