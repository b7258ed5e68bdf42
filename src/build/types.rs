// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::context::Context;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::types::{Cardinality, TypeRef};

impl Context {
    pub fn bool_type(&self) -> TypeRef {
        TypeRef::BOOL
    }

    pub fn int_type(&self) -> TypeRef {
        TypeRef::INT
    }

    pub fn real_type(&self) -> TypeRef {
        TypeRef::REAL
    }

    pub fn bv_type(&mut self, width: u32) -> Result<TypeRef> {
        let width = self.check_bv_width(width as u64)?;
        Ok(self.types.bv(width))
    }

    pub fn tuple_type(&mut self, elems: &[TypeRef]) -> Result<TypeRef> {
        self.check_positive(elems.len() as u64)?;
        self.check_arity(elems.len())?;
        self.check_good_types(elems)?;
        Ok(self.types.tuple(elems))
    }

    pub fn function_type(&mut self, domain: &[TypeRef], range: TypeRef) -> Result<TypeRef> {
        self.check_positive(domain.len() as u64)?;
        self.check_arity(domain.len())?;
        self.check_good_types(domain)?;
        self.check_good_type(range)?;
        Ok(self.types.function(domain, range))
    }

    /// A fresh type, different from every other type.
    pub fn new_uninterpreted_type(&mut self) -> TypeRef {
        self.types.new_uninterpreted()
    }

    /// A fresh enumeration type with `card` elements.
    pub fn new_scalar_type(&mut self, card: u32) -> Result<TypeRef> {
        self.check_positive(card as u64)?;
        Ok(self.types.new_scalar(card))
    }

    pub fn type_card(&mut self, tau: TypeRef) -> Result<Cardinality> {
        self.check_good_type(tau)?;
        Ok(self.types.card(tau))
    }

    pub fn is_finite_type(&mut self, tau: TypeRef) -> Result<bool> {
        self.check_good_type(tau)?;
        Ok(self.types.is_finite(tau))
    }

    pub fn is_unit_type(&mut self, tau: TypeRef) -> Result<bool> {
        self.check_good_type(tau)?;
        Ok(self.types.is_unit(tau))
    }

    pub fn is_subtype(&mut self, a: TypeRef, b: TypeRef) -> Result<bool> {
        self.check_good_types(&[a, b])?;
        Ok(self.types.is_subtype(a, b))
    }

    /// Least common supertype. Fails with `IncompatibleTypes` if there is none.
    pub fn super_type(&mut self, a: TypeRef, b: TypeRef) -> Result<TypeRef> {
        self.check_good_types(&[a, b])?;
        match self.types.super_type(a, b) {
            Some(tau) => Ok(tau),
            None => self.fail(
                ErrorReport::new(ErrorCode::IncompatibleTypes)
                    .type1(a)
                    .type2(b),
            ),
        }
    }
}
