// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Type Table
//!
//! Hash-consed store of all types. Structurally equal types share one [`TypeRef`].
//! Uninterpreted and scalar types are fresh on every request and carry a unique id.

use baa::WidthInt;
use rustc_hash::FxHashMap;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);

impl TypeRef {
    pub const BOOL: TypeRef = TypeRef(0);
    pub const INT: TypeRef = TypeRef(1);
    pub const REAL: TypeRef = TypeRef(2);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Reconstructs a handle from a raw index, e.g., for error reporting or tests.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        TypeRef(index as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Int,
    Real,
    BitVector(WidthInt),
    Scalar { card: u32, id: u32 },
    Uninterpreted { id: u32 },
    Tuple(Vec<TypeRef>),
    Function { domain: Vec<TypeRef>, range: TypeRef },
}

/// Number of inhabitants of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Finite(u32),
    /// finite, but too large to be represented exactly
    LargeFinite,
    Infinite,
}

impl Cardinality {
    pub fn is_finite(self) -> bool {
        !matches!(self, Cardinality::Infinite)
    }

    pub fn exact(self) -> Option<u32> {
        match self {
            Cardinality::Finite(n) => Some(n),
            _ => None,
        }
    }

    fn from_u64(n: u64) -> Self {
        u32::try_from(n)
            .map(Cardinality::Finite)
            .unwrap_or(Cardinality::LargeFinite)
    }

    fn product(self, other: Cardinality) -> Self {
        use Cardinality::*;
        match (self, other) {
            (Infinite, _) | (_, Infinite) => Infinite,
            (Finite(a), Finite(b)) => Self::from_u64(a as u64 * b as u64),
            _ => LargeFinite,
        }
    }

    /// cardinality of the function space `domain -> self`
    fn power(self, domain: Cardinality) -> Self {
        use Cardinality::*;
        match (self, domain) {
            (Finite(1), _) => Finite(1),
            (Infinite, _) | (_, Infinite) => Infinite,
            (Finite(r), Finite(d)) => (r as u64)
                .checked_pow(d)
                .map(Self::from_u64)
                .unwrap_or(LargeFinite),
            _ => LargeFinite,
        }
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    tpe: Type,
    card: Cardinality,
}

#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Vec<TypeInfo>,
    lookup: FxHashMap<Type, TypeRef>,
    fresh_ids: u32,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl TypeTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut out = Self {
            types: Vec::with_capacity(capacity),
            lookup: FxHashMap::default(),
            fresh_ids: 0,
        };
        let b = out.add(Type::Bool);
        let i = out.add(Type::Int);
        let r = out.add(Type::Real);
        debug_assert_eq!((b, i, r), (TypeRef::BOOL, TypeRef::INT, TypeRef::REAL));
        out
    }

    fn add(&mut self, tpe: Type) -> TypeRef {
        if let Some(&tau) = self.lookup.get(&tpe) {
            return tau;
        }
        let card = self.compute_card(&tpe);
        let tau = TypeRef(self.types.len() as u32);
        tracing::trace!("new type {tau:?} = {tpe:?}");
        self.types.push(TypeInfo {
            tpe: tpe.clone(),
            card,
        });
        self.lookup.insert(tpe, tau);
        tau
    }

    fn compute_card(&self, tpe: &Type) -> Cardinality {
        match tpe {
            Type::Bool => Cardinality::Finite(2),
            Type::Int | Type::Real | Type::Uninterpreted { .. } => Cardinality::Infinite,
            Type::BitVector(w) if *w < 32 => Cardinality::Finite(1u32 << w),
            Type::BitVector(_) => Cardinality::LargeFinite,
            Type::Scalar { card, .. } => Cardinality::Finite(*card),
            Type::Tuple(elems) => elems
                .iter()
                .fold(Cardinality::Finite(1), |acc, e| acc.product(self.card(*e))),
            Type::Function { domain, range } => {
                let dom = domain
                    .iter()
                    .fold(Cardinality::Finite(1), |acc, e| acc.product(self.card(*e)));
                self.card(*range).power(dom)
            }
        }
    }

    fn fresh_id(&mut self) -> u32 {
        let id = self.fresh_ids;
        self.fresh_ids += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_valid(&self, tau: TypeRef) -> bool {
        tau.index() < self.types.len()
    }

    pub fn get(&self, tau: TypeRef) -> &Type {
        &self.types[tau.index()].tpe
    }

    pub fn bv(&mut self, width: WidthInt) -> TypeRef {
        debug_assert!(width > 0);
        self.add(Type::BitVector(width))
    }

    pub fn tuple(&mut self, elems: &[TypeRef]) -> TypeRef {
        debug_assert!(!elems.is_empty());
        self.add(Type::Tuple(elems.to_vec()))
    }

    pub fn function(&mut self, domain: &[TypeRef], range: TypeRef) -> TypeRef {
        debug_assert!(!domain.is_empty());
        self.add(Type::Function {
            domain: domain.to_vec(),
            range,
        })
    }

    pub fn new_uninterpreted(&mut self) -> TypeRef {
        let id = self.fresh_id();
        self.add(Type::Uninterpreted { id })
    }

    pub fn new_scalar(&mut self, card: u32) -> TypeRef {
        debug_assert!(card > 0);
        let id = self.fresh_id();
        self.add(Type::Scalar { card, id })
    }

    pub fn card(&self, tau: TypeRef) -> Cardinality {
        self.types[tau.index()].card
    }

    pub fn is_finite(&self, tau: TypeRef) -> bool {
        self.card(tau).is_finite()
    }

    /// Types with exactly one inhabitant.
    pub fn is_unit(&self, tau: TypeRef) -> bool {
        self.card(tau) == Cardinality::Finite(1)
    }

    pub fn is_arithmetic(&self, tau: TypeRef) -> bool {
        tau == TypeRef::INT || tau == TypeRef::REAL
    }

    pub fn bv_width(&self, tau: TypeRef) -> Option<WidthInt> {
        match self.get(tau) {
            Type::BitVector(w) => Some(*w),
            _ => None,
        }
    }

    pub fn tuple_elems(&self, tau: TypeRef) -> Option<&[TypeRef]> {
        match self.get(tau) {
            Type::Tuple(elems) => Some(elems),
            _ => None,
        }
    }

    pub fn function_signature(&self, tau: TypeRef) -> Option<(&[TypeRef], TypeRef)> {
        match self.get(tau) {
            Type::Function { domain, range } => Some((domain, *range)),
            _ => None,
        }
    }

    pub fn is_scalar_or_uninterpreted(&self, tau: TypeRef) -> bool {
        matches!(
            self.get(tau),
            Type::Scalar { .. } | Type::Uninterpreted { .. }
        )
    }

    /// `a <: b`
    pub fn is_subtype(&self, a: TypeRef, b: TypeRef) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Type::Int, Type::Real) => true,
            (Type::Tuple(ea), Type::Tuple(eb)) => {
                ea.len() == eb.len()
                    && ea.iter().zip(eb.iter()).all(|(x, y)| self.is_subtype(*x, *y))
            }
            (
                Type::Function {
                    domain: da,
                    range: ra,
                },
                Type::Function {
                    domain: db,
                    range: rb,
                },
            ) => da == db && self.is_subtype(*ra, *rb),
            _ => false,
        }
    }

    fn has_super_type(&self, a: TypeRef, b: TypeRef) -> bool {
        if a == b {
            return true;
        }
        match (self.get(a), self.get(b)) {
            (Type::Int, Type::Real) | (Type::Real, Type::Int) => true,
            (Type::Tuple(ea), Type::Tuple(eb)) => {
                ea.len() == eb.len()
                    && ea
                        .iter()
                        .zip(eb.iter())
                        .all(|(x, y)| self.has_super_type(*x, *y))
            }
            (
                Type::Function {
                    domain: da,
                    range: ra,
                },
                Type::Function {
                    domain: db,
                    range: rb,
                },
            ) => da == db && self.has_super_type(*ra, *rb),
            _ => false,
        }
    }

    /// Least common supertype of `a` and `b`. Returns `None` for incompatible types without
    /// creating any new type.
    pub fn super_type(&mut self, a: TypeRef, b: TypeRef) -> Option<TypeRef> {
        if !self.has_super_type(a, b) {
            return None;
        }
        Some(self.build_super_type(a, b))
    }

    fn build_super_type(&mut self, a: TypeRef, b: TypeRef) -> TypeRef {
        if a == b {
            return a;
        }
        match (self.get(a).clone(), self.get(b).clone()) {
            (Type::Int, Type::Real) | (Type::Real, Type::Int) => TypeRef::REAL,
            (Type::Tuple(ea), Type::Tuple(eb)) => {
                let elems: Vec<_> = ea
                    .iter()
                    .zip(eb.iter())
                    .map(|(x, y)| self.build_super_type(*x, *y))
                    .collect();
                self.tuple(&elems)
            }
            (
                Type::Function { domain, range: ra },
                Type::Function { range: rb, .. },
            ) => {
                let range = self.build_super_type(ra, rb);
                self.function(&domain, range)
            }
            _ => unreachable!("compatibility was checked before"),
        }
    }
}

impl Index<TypeRef> for TypeTable {
    type Output = Type;

    fn index(&self, tau: TypeRef) -> &Self::Output {
        self.get(tau)
    }
}
