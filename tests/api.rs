// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use num_rational::BigRational;
use patronus_terms::*;
use proptest::prelude::*;

fn int_vars(ctx: &mut Context, n: usize) -> Vec<TermRef> {
    (0..n)
        .map(|_| ctx.new_uninterpreted_term(TypeRef::INT).unwrap())
        .collect()
}

#[test]
fn failures_fill_the_error_slot() {
    let mut ctx = Context::default();
    let x = ctx.new_uninterpreted_term(TypeRef::INT).unwrap();
    let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();

    let err = ctx.or2(x, p).unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
    assert_eq!(ctx.error_code(), ErrorCode::TypeMismatch);
    assert_eq!(ctx.error_report().term1, Some(x));

    assert!(ctx.rational32(1, 0).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::DivisionByZero);
    assert!(ctx.parse_rational("1/x").is_err());
    assert_eq!(ctx.error_code(), ErrorCode::InvalidRationalFormat);
    assert!(ctx.parse_bvbin("0102").is_err());
    assert_eq!(ctx.error_code(), ErrorCode::InvalidBvBinFormat);
    assert!(ctx.parse_bvhex("fg").is_err());
    assert_eq!(ctx.error_code(), ErrorCode::InvalidBvHexFormat);

    let bv4 = ctx.bv_type(4).unwrap();
    let bv8 = ctx.bv_type(8).unwrap();
    let a = ctx.new_uninterpreted_term(bv4).unwrap();
    let b = ctx.new_uninterpreted_term(bv8).unwrap();
    assert!(ctx.bvadd(a, b).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::IncompatibleBvSizes);
    assert!(ctx.eq(a, x).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::IncompatibleTypes);
    assert!(ctx.bvextract(a, 2, 4).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::InvalidBvExtract);
    assert!(ctx.application(x, &[x]).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::FunctionRequired);
    assert!(ctx.select(0, x).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::TupleRequired);
    assert!(ctx.forall(&[x], p).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::VariableRequired);
    let v = ctx.new_variable(TypeRef::INT).unwrap();
    assert!(ctx.forall(&[v, v], p).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::DuplicateVariable);

    // the report is only overwritten by the next failure
    let _ = ctx.add(x, x).unwrap();
    assert_eq!(ctx.error_code(), ErrorCode::DuplicateVariable);
    ctx.clear_error();
    assert_eq!(ctx.error_code(), ErrorCode::NoError);
}

#[test]
fn limits_come_from_the_config() {
    let config = Config::default().with_max_degree(3).with_max_bvsize(16);
    let mut ctx = Context::new(config);
    let x = ctx.new_uninterpreted_term(TypeRef::REAL).unwrap();
    let x3 = ctx.power(x, 3).unwrap();
    assert!(ctx.mul(x3, x).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::DegreeOverflow);
    assert!(ctx.bv_type(17).is_err());
    let bv16 = ctx.bv_type(16).unwrap();
    let y = ctx.new_uninterpreted_term(bv16).unwrap();
    assert!(ctx.bvconcat(y, y).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::MaxBvSizeExceeded);
}

#[test]
fn contexts_are_independent() {
    let mut a = Context::default();
    let mut b = Context::default();
    let x = a.new_uninterpreted_term(TypeRef::INT).unwrap();
    assert!(b.type_of_term(x).is_err());
    assert_eq!(b.error_code(), ErrorCode::InvalidTerm);
    assert_eq!(a.error_code(), ErrorCode::NoError);
    a.set_term_name(x, "x").unwrap();
    assert_eq!(b.get_term_by_name("x"), None);
    a.teardown();
    b.teardown();
}

#[test]
fn buffers_survive_other_constructors() {
    let mut ctx = Context::default();
    let v = int_vars(&mut ctx, 2);
    let h = ctx.new_arith_buffer();
    ctx.arith_buffer_add_term(h, v[0]).unwrap();
    // internal constructors use their own scratch buffers
    let sum = ctx.add(v[0], v[1]).unwrap();
    ctx.arith_buffer_add_term(h, v[1]).unwrap();
    assert_eq!(ctx.arith_buffer_get_term(h).unwrap(), sum);
    ctx.free_buffer(h).unwrap();
    assert!(ctx.reset_buffer(h).is_err());
    assert_eq!(ctx.error_code(), ErrorCode::InvalidBuffer);
    assert_eq!(ctx.error_report().badval, h.slot() as i64);
}

proptest! {
    #[test]
    fn polynomials_are_hash_consed(coeffs in prop::collection::vec(-5i64..5, 4)) {
        let mut ctx = Context::default();
        let mut vars = int_vars(&mut ctx, 3);
        vars.push(TermRef::ZERO);
        let a = ctx.poly_int(&coeffs, &vars).unwrap();
        let rev_coeffs: Vec<i64> = coeffs.iter().rev().copied().collect();
        let rev_vars: Vec<TermRef> = vars.iter().rev().copied().collect();
        let b = ctx.poly_int(&rev_coeffs, &rev_vars).unwrap();
        prop_assert_eq!(a, b);
        let n = ctx.terms().len();
        let c = ctx.poly_int(&coeffs, &vars).unwrap();
        prop_assert_eq!(a, c);
        prop_assert_eq!(ctx.terms().len(), n);
    }

    #[test]
    fn buffer_normalization_is_idempotent(coeffs in prop::collection::vec(-5i64..5, 4)) {
        let mut ctx = Context::default();
        let mut vars = int_vars(&mut ctx, 3);
        vars.push(TermRef::ZERO);
        let expected = ctx.poly_int(&coeffs, &vars).unwrap();
        let h = ctx.new_arith_buffer();
        for (c, x) in coeffs.iter().zip(vars.iter()) {
            let c = BigRational::from_integer((*c).into());
            if *x == TermRef::ZERO {
                ctx.arith_buffer_add_const(h, &c).unwrap();
            } else {
                ctx.arith_buffer_add_const_times_term(h, &c, *x).unwrap();
            }
        }
        ctx.arith_buffer_normalize(h).unwrap();
        ctx.arith_buffer_normalize(h).unwrap();
        prop_assert_eq!(ctx.arith_buffer_get_term(h).unwrap(), expected);
        prop_assert_eq!(ctx.arith_buffer_get_term(h).unwrap(), TermRef::ZERO);
    }

    #[test]
    fn negation_is_an_involution(picks in prop::collection::vec(0usize..6, 1..6)) {
        let mut ctx = Context::default();
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let q = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let pool = [p, !p, q, !q, TermRef::TRUE, TermRef::FALSE];
        let args: Vec<TermRef> = picks.iter().map(|i| pool[*i]).collect();
        for t in [ctx.or(&args).unwrap(), ctx.and(&args).unwrap(), ctx.xor(&args).unwrap()] {
            let n = ctx.terms().len();
            let nt = ctx.not(t).unwrap();
            prop_assert_eq!(ctx.not(nt).unwrap(), t);
            prop_assert_eq!(ctx.terms().len(), n);
        }
    }

    #[test]
    fn bit_arrays_round_trip(picks in prop::collection::vec(0usize..4, 1..70)) {
        let mut ctx = Context::default();
        let p = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let q = ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap();
        let pool = [TermRef::FALSE, TermRef::TRUE, p, !q];
        let bits: Vec<TermRef> = picks.iter().map(|i| pool[*i]).collect();
        let t = ctx.bvarray(&bits).unwrap();
        let h = ctx.new_bvlogic_buffer();
        ctx.bvlogic_buffer_set_term(h, t).unwrap();
        prop_assert_eq!(ctx.bvlogic_buffer_get_term(h).unwrap(), t);
        for (i, b) in bits.iter().enumerate() {
            prop_assert_eq!(ctx.bitextract(t, i as u32).unwrap(), *b);
        }
    }
}
