// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Folded bit-vector comparisons must agree with every concrete value of their operands.

use patronus_terms::*;
use proptest::prelude::*;

const WIDTH: u32 = 4;

/// 0: false, 1: true, 2: unknown
fn operand(ctx: &mut Context, pattern: &[u8]) -> TermRef {
    let bits: Vec<TermRef> = pattern
        .iter()
        .map(|p| match p {
            0 => TermRef::FALSE,
            1 => TermRef::TRUE,
            _ => ctx.new_uninterpreted_term(TypeRef::BOOL).unwrap(),
        })
        .collect();
    ctx.bvarray(&bits).unwrap()
}

/// all unsigned values matching the constant bits of `pattern`
fn values(pattern: &[u8]) -> Vec<u32> {
    (0..1u32 << WIDTH)
        .filter(|v| {
            pattern.iter().enumerate().all(|(i, p)| match p {
                0 => (v >> i) & 1 == 0,
                1 => (v >> i) & 1 == 1,
                _ => true,
            })
        })
        .collect()
}

fn signed(v: u32) -> i32 {
    if v >> (WIDTH - 1) & 1 == 1 {
        v as i32 - (1 << WIDTH)
    } else {
        v as i32
    }
}

fn check_fold(folded: TermRef, concrete: impl Fn(u32, u32) -> bool, xs: &[u32], ys: &[u32]) {
    let expected = if folded == TermRef::TRUE {
        true
    } else if folded == TermRef::FALSE {
        false
    } else {
        return;
    };
    for x in xs {
        for y in ys {
            assert_eq!(concrete(*x, *y), expected, "x={x:#06b}, y={y:#06b}");
        }
    }
}

proptest! {
    #[test]
    fn folded_comparisons_are_sound(
        a in prop::collection::vec(0u8..3, WIDTH as usize),
        b in prop::collection::vec(0u8..3, WIDTH as usize),
    ) {
        let mut ctx = Context::default();
        let x = operand(&mut ctx, &a);
        let y = operand(&mut ctx, &b);
        let (xs, ys) = (values(&a), values(&b));

        let ge = ctx.bvge(x, y).unwrap();
        check_fold(ge, |u, v| u >= v, &xs, &ys);
        let sge = ctx.bvsge(x, y).unwrap();
        check_fold(sge, |u, v| signed(u) >= signed(v), &xs, &ys);
        let slt = ctx.bvslt(x, y).unwrap();
        check_fold(slt, |u, v| signed(u) < signed(v), &xs, &ys);
        let gt = ctx.bvgt(x, y).unwrap();
        check_fold(gt, |u, v| u > v, &xs, &ys);
    }
}

#[test]
fn signed_comparison_with_unknown_sign_is_kept() {
    let mut ctx = Context::default();
    let x = operand(&mut ctx, &[2, 2, 2, 2]);
    let zero = ctx.bvconst_zero(WIDTH).unwrap();
    let ge = ctx.bvsge(zero, x).unwrap();
    assert_ne!(ge, TermRef::TRUE);
    assert_ne!(ge, TermRef::FALSE);
    let lt = ctx.bvslt(x, zero).unwrap();
    assert_ne!(lt, TermRef::FALSE);
    assert_ne!(lt, TermRef::TRUE);
}
