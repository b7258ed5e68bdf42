// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Uninterpreted terms, variables, function application, tuples and quantifiers.
//!
//! A type with a single inhabitant has a representative term: the first term constructed
//! for it. Every later constructor that would produce a term of that type returns the
//! representative instead.

use crate::context::Context;
use crate::error::{ErrorCode, ErrorReport, Result};
use crate::term::{Term, TermRef};
use crate::types::TypeRef;

impl Context {
    pub fn new_uninterpreted_term(&mut self, tau: TypeRef) -> Result<TermRef> {
        self.check_good_type(tau)?;
        Ok(self.mk_uninterpreted(tau))
    }

    fn mk_uninterpreted(&mut self, tau: TypeRef) -> TermRef {
        if let Some(rep) = self.terms.unit_rep(tau) {
            return rep;
        }
        let id = self.terms.fresh_id();
        let t = self.terms.intern(Term::Uninterpreted { tpe: tau, id }, tau);
        if self.types.is_unit(tau) {
            self.terms.set_unit_rep(tau, t);
        }
        t
    }

    /// A fresh variable that can be bound by a quantifier.
    pub fn new_variable(&mut self, tau: TypeRef) -> Result<TermRef> {
        self.check_good_type(tau)?;
        let id = self.terms.fresh_id();
        Ok(self.terms.intern(Term::Variable { tpe: tau, id }, tau))
    }

    /// Constant number `index` of a scalar or uninterpreted type.
    pub fn constant(&mut self, tau: TypeRef, index: u32) -> Result<TermRef> {
        self.check_good_constant(tau, index)?;
        if let Some(rep) = self.terms.unit_rep(tau) {
            return Ok(rep);
        }
        let t = self.terms.intern(Term::Constant { tpe: tau, index }, tau);
        if self.types.is_unit(tau) {
            self.terms.set_unit_rep(tau, t);
        }
        Ok(t)
    }

    pub fn type_of_term(&mut self, t: TermRef) -> Result<TypeRef> {
        self.check_good_term(t)?;
        Ok(self.terms.type_of(t))
    }

    /// Checks `f` against `args` and returns the domain and range of `f`.
    fn check_good_application(
        &mut self,
        f: TermRef,
        args: &[TermRef],
    ) -> Result<(Vec<TypeRef>, TypeRef)> {
        self.check_positive(args.len() as u64)?;
        self.check_arity(args.len())?;
        self.check_good_term(f)?;
        self.check_good_terms(args)?;
        let Some((domain, range)) = self
            .types
            .function_signature(self.terms.type_of(f))
            .map(|(d, r)| (d.to_vec(), r))
        else {
            return self.fail(ErrorReport::new(ErrorCode::FunctionRequired).term1(f));
        };
        if domain.len() != args.len() {
            return self.fail(
                ErrorReport::new(ErrorCode::WrongNumberOfArguments)
                    .type1(self.terms.type_of(f))
                    .badval(args.len() as i64),
            );
        }
        for (a, tau) in args.iter().zip(domain.iter()) {
            self.check_term_has_type(*a, *tau)?;
        }
        Ok((domain, range))
    }

    /// `f(args)`. Applications of `update` terms are resolved when the arguments are
    /// syntactically equal to, or known to differ from, the updated point.
    pub fn application(&mut self, f: TermRef, args: &[TermRef]) -> Result<TermRef> {
        let (_, range) = self.check_good_application(f, args)?;
        let tau = self.terms.type_of(f);
        if self.types.is_unit(tau) || self.types.is_unit(range) {
            return Ok(self.mk_uninterpreted(range));
        }
        let mut fun = f;
        while let Term::Update {
            fun: inner,
            args: point,
            value,
        } = self.terms.get(fun)
        {
            if point.as_slice() == args {
                return Ok(*value);
            }
            let differs = point
                .iter()
                .zip(args.iter())
                .any(|(a, b)| self.disequal_terms(*a, *b));
            if !differs {
                break;
            }
            fun = *inner;
        }
        let args = args.to_vec();
        Ok(self.terms.intern(Term::App { fun, args }, range))
    }

    /// `f` with `f(args) = v`.
    pub fn update(&mut self, f: TermRef, args: &[TermRef], v: TermRef) -> Result<TermRef> {
        let (_, range) = self.check_good_application(f, args)?;
        self.check_term_has_type(v, range)?;
        let tau = self.terms.type_of(f);
        if self.types.is_unit(tau) {
            return Ok(self.mk_uninterpreted(tau));
        }
        // an update of the same point is overwritten
        let mut fun = f;
        while let Term::Update {
            fun: inner,
            args: point,
            ..
        } = self.terms.get(fun)
        {
            if point.as_slice() != args {
                break;
            }
            fun = *inner;
        }
        let args = args.to_vec();
        Ok(self.terms.intern(Term::Update { fun, args, value: v }, tau))
    }

    pub fn tuple(&mut self, args: &[TermRef]) -> Result<TermRef> {
        self.check_positive(args.len() as u64)?;
        self.check_arity(args.len())?;
        self.check_good_terms(args)?;
        Ok(self.mk_tuple(args.to_vec()))
    }

    fn mk_tuple(&mut self, args: Vec<TermRef>) -> TermRef {
        // (tuple (select 0 x) ... (select n-1 x)) -> x
        if let Some(x) = self.select_source(&args) {
            return x;
        }
        let elems: Vec<TypeRef> = args.iter().map(|a| self.terms.type_of(*a)).collect();
        let tau = self.types.tuple(&elems);
        if let Some(rep) = self.terms.unit_rep(tau) {
            return rep;
        }
        let t = self.terms.intern(Term::Tuple(args), tau);
        if self.types.is_unit(tau) {
            self.terms.set_unit_rep(tau, t);
        }
        t
    }

    fn select_source(&self, args: &[TermRef]) -> Option<TermRef> {
        let Term::Select { index: 0, tuple } = self.terms.get(*args.first()?) else {
            return None;
        };
        let x = *tuple;
        let arity = self.types.tuple_elems(self.terms.type_of(x))?.len();
        let all = arity == args.len()
            && args.iter().enumerate().all(|(i, a)| {
                matches!(self.terms.get(*a), Term::Select { index, tuple } if *index as usize == i && *tuple == x)
            });
        all.then_some(x)
    }

    fn check_tuple_index(&mut self, t: TermRef, index: u32) -> Result<Vec<TypeRef>> {
        self.check_good_term(t)?;
        let tau = self.terms.type_of(t);
        let Some(elems) = self.types.tuple_elems(tau).map(|e| e.to_vec()) else {
            return self.fail(ErrorReport::new(ErrorCode::TupleRequired).term1(t));
        };
        if index as usize >= elems.len() {
            return self.fail(
                ErrorReport::new(ErrorCode::InvalidTupleIndex)
                    .type1(tau)
                    .badval(index),
            );
        }
        Ok(elems)
    }

    /// Component `index` of `t`, counting from 0.
    pub fn select(&mut self, index: u32, t: TermRef) -> Result<TermRef> {
        let elems = self.check_tuple_index(t, index)?;
        Ok(self.mk_select(index, t, elems[index as usize]))
    }

    fn mk_select(&mut self, index: u32, t: TermRef, tau: TypeRef) -> TermRef {
        if let Term::Tuple(args) = self.terms.get(t) {
            return args[index as usize];
        }
        self.terms.intern(Term::Select { index, tuple: t }, tau)
    }

    /// `t` with component `index` replaced by `v`.
    pub fn tuple_update(&mut self, t: TermRef, index: u32, v: TermRef) -> Result<TermRef> {
        let elems = self.check_tuple_index(t, index)?;
        self.check_term_has_type(v, elems[index as usize])?;
        let tau = self.terms.type_of(t);
        if self.types.is_unit(tau) {
            return Ok(t);
        }
        let args: Vec<TermRef> = (0..elems.len() as u32)
            .map(|j| {
                if j == index {
                    v
                } else {
                    self.mk_select(j, t, elems[j as usize])
                }
            })
            .collect();
        Ok(self.mk_tuple(args))
    }

    fn check_good_quantified_term(
        &mut self,
        vars: &[TermRef],
        body: TermRef,
    ) -> Result<Vec<TermRef>> {
        self.check_positive(vars.len() as u64)?;
        self.check_maxvars(vars.len())?;
        self.check_boolean_term(body)?;
        for &v in vars {
            self.check_good_variable(v)?;
        }
        let mut vars = vars.to_vec();
        vars.sort_unstable();
        self.check_no_duplicates(&vars)?;
        Ok(vars)
    }

    pub fn forall(&mut self, vars: &[TermRef], body: TermRef) -> Result<TermRef> {
        let vars = self.check_good_quantified_term(vars, body)?;
        if body.is_bool_const() {
            return Ok(body);
        }
        Ok(self.terms.intern(Term::Forall { vars, body }, TypeRef::BOOL))
    }

    /// `not (forall vars. not body)`
    pub fn exists(&mut self, vars: &[TermRef], body: TermRef) -> Result<TermRef> {
        let vars = self.check_good_quantified_term(vars, body)?;
        if body.is_bool_const() {
            return Ok(body);
        }
        Ok(!self.terms.intern(Term::Forall { vars, body: !body }, TypeRef::BOOL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_types_have_one_term() {
        let mut ctx = Context::default();
        let s = ctx.new_scalar_type(1).unwrap();
        let a = ctx.new_uninterpreted_term(s).unwrap();
        assert_eq!(ctx.new_uninterpreted_term(s).unwrap(), a);
        assert_eq!(ctx.constant(s, 0).unwrap(), a);
        let pair = ctx.tuple_type(&[s, s]).unwrap();
        let p = ctx.tuple(&[a, a]).unwrap();
        assert_eq!(ctx.new_uninterpreted_term(pair).unwrap(), p);
        let f_tau = ctx.function_type(&[TypeRef::INT], s).unwrap();
        let f = ctx.new_uninterpreted_term(f_tau).unwrap();
        let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        assert_eq!(ctx.application(f, &[x]).unwrap(), a);
        // variables are never replaced
        assert_ne!(ctx.new_variable(s).unwrap(), a);
    }

    #[test]
    fn application_through_updates() {
        let mut ctx = Context::default();
        let u = ctx.new_uninterpreted_type();
        let f_tau = ctx.function_type(&[u], TypeRef::INT).unwrap();
        let f = ctx.new_uninterpreted_term(f_tau).unwrap();
        let a = ctx.constant(u, 0).unwrap();
        let b = ctx.constant(u, 1).unwrap();
        let x = ctx.new_uninterpreted_term(u).unwrap();
        let one = ctx.int32(1).unwrap();
        let two = ctx.int32(2).unwrap();
        let g = ctx.update(f, &[a], one).unwrap();
        assert_eq!(ctx.application(g, &[a]).unwrap(), one);
        // b differs from a
        assert_eq!(ctx.application(g, &[b]).unwrap(), ctx.application(f, &[b]).unwrap());
        let gx = ctx.application(g, &[x]).unwrap();
        assert_eq!(ctx[gx], Term::App { fun: g, args: vec![x] });
        // updating the same point twice keeps the last value
        let h = ctx.update(g, &[a], two).unwrap();
        assert_eq!(h, ctx.update(f, &[a], two).unwrap());
        assert!(ctx.application(one, &[a]).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::FunctionRequired);
        assert!(ctx.application(f, &[a, b]).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::WrongNumberOfArguments);
        assert!(ctx.application(f, &[one]).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::TypeMismatch);
    }

    #[test]
    fn tuples_and_projections() {
        let mut ctx = Context::default();
        let bv8 = ctx.bv_type(8).unwrap();
        let tau = ctx.tuple_type(&[TypeRef::INT, bv8]).unwrap();
        let x = ctx.new_uninterpreted_term(tau).unwrap();
        let s0 = ctx.select(0, x).unwrap();
        let s1 = ctx.select(1, x).unwrap();
        assert_eq!(ctx.tuple(&[s0, s1]).unwrap(), x);
        let one = ctx.int32(1).unwrap();
        let t = ctx.tuple(&[one, s1]).unwrap();
        assert_eq!(ctx.select(0, t).unwrap(), one);
        assert_eq!(ctx.tuple_update(x, 0, one).unwrap(), t);
        assert_eq!(ctx.tuple_update(t, 0, s0).unwrap(), x);
        assert!(ctx.select(2, x).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::InvalidTupleIndex);
        assert!(ctx.select(0, one).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::TupleRequired);
        // int fits into a real component
        let half = ctx.rational32(1, 2).unwrap();
        assert!(ctx.tuple_update(x, 0, half).is_err());
    }

    #[test]
    fn quantifiers() {
        let mut ctx = Context::default();
        let x = ctx.new_variable(TypeRef::INT).unwrap();
        let y = ctx.new_variable(TypeRef::INT).unwrap();
        let body = ctx.arith_geq(x, y).unwrap();
        let q = ctx.forall(&[y, x], body).unwrap();
        assert_eq!(ctx[q], Term::Forall { vars: vec![x, y], body });
        assert_eq!(ctx.forall(&[x, y], body).unwrap(), q);
        let e = ctx.exists(&[x], body).unwrap();
        assert!(e.is_negative());
        assert_eq!(ctx.forall(&[x], TermRef::TRUE).unwrap(), TermRef::TRUE);
        assert!(ctx.forall(&[x, x], body).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::DuplicateVariable);
        let c = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
        assert!(ctx.forall(&[c], body).is_err());
        assert_eq!(ctx.error_code(), ErrorCode::VariableRequired);
        let mut small = Context::new(crate::Config::default().with_max_vars(1));
        let a = small.new_variable(TypeRef::BOOL).unwrap();
        let b = small.new_variable(TypeRef::BOOL).unwrap();
        let ab = small.and2(a, b).unwrap();
        assert!(small.forall(&[a, b], ab).is_err());
        assert_eq!(small.error_code(), ErrorCode::TooManyVars);
    }
}
