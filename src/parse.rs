// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Numeric literal parsing for the constant constructors.

use crate::error::ErrorCode;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{Num, Zero};
use regex::Regex;

/// `±num[/den]`
pub(crate) fn parse_rational(inp: &str) -> Result<BigRational, ErrorCode> {
    let c = RATIONAL_REGEX
        .captures(inp)
        .ok_or(ErrorCode::InvalidRationalFormat)?;
    let num = parse_signed(&c[1], &c[2]).ok_or(ErrorCode::InvalidRationalFormat)?;
    let den = match c.get(3) {
        Some(m) => BigInt::from_str_radix(m.as_str(), 10)
            .map_err(|_| ErrorCode::InvalidRationalFormat)?,
        None => BigInt::from(1),
    };
    if den.is_zero() {
        return Err(ErrorCode::DivisionByZero);
    }
    Ok(BigRational::new(num, den))
}

/// `±d.d[e±k]`
pub(crate) fn parse_float(inp: &str) -> Result<BigRational, ErrorCode> {
    let c = FLOAT_REGEX
        .captures(inp)
        .ok_or(ErrorCode::InvalidFloatFormat)?;
    let int_part = c.get(2).map_or("", |m| m.as_str());
    let frac_part = c.get(3).map_or("", |m| m.as_str());
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ErrorCode::InvalidFloatFormat);
    }
    let digits = format!("{int_part}{frac_part}");
    let mantissa = parse_signed(&c[1], &digits).ok_or(ErrorCode::InvalidFloatFormat)?;
    let exp: i64 = match c.get(4) {
        Some(m) => m.as_str().parse().map_err(|_| ErrorCode::InvalidFloatFormat)?,
        None => 0,
    };
    let shift = exp - frac_part.len() as i64;
    let scale = BigInt::from(10).pow(shift.unsigned_abs() as u32);
    let value = if shift >= 0 {
        BigRational::from_integer(mantissa * scale)
    } else {
        BigRational::new(mantissa, scale)
    };
    Ok(value)
}

fn parse_signed(sign: &str, digits: &str) -> Option<BigInt> {
    let n = BigInt::from_str_radix(digits, 10).ok()?;
    Some(if sign == "-" { -n } else { n })
}

/// Binary digits, most significant bit first. Returns the value and its width.
pub(crate) fn parse_bvbin(inp: &str) -> Result<(BigUint, u64), ErrorCode> {
    if !BIN_REGEX.is_match(inp) {
        return Err(ErrorCode::InvalidBvBinFormat);
    }
    let value = BigUint::from_str_radix(inp, 2).map_err(|_| ErrorCode::InvalidBvBinFormat)?;
    Ok((value, inp.len() as u64))
}

/// Hexadecimal digits, most significant digit first. Every digit counts for four bits.
pub(crate) fn parse_bvhex(inp: &str) -> Result<(BigUint, u64), ErrorCode> {
    if !HEX_REGEX.is_match(inp) {
        return Err(ErrorCode::InvalidBvHexFormat);
    }
    let value = BigUint::from_str_radix(inp, 16).map_err(|_| ErrorCode::InvalidBvHexFormat)?;
    Ok((value, 4 * inp.len() as u64))
}

lazy_static! {
    static ref RATIONAL_REGEX: Regex = Regex::new(r"^([+-]?)([0-9]+)(?:/([0-9]+))?$").unwrap();
    static ref FLOAT_REGEX: Regex =
        Regex::new(r"^([+-]?)([0-9]*)(?:\.([0-9]*))?(?:[eE]([+-]?[0-9]+))?$").unwrap();
    static ref BIN_REGEX: Regex = Regex::new(r"^[01]+$").unwrap();
    static ref HEX_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]+$").unwrap();
}
