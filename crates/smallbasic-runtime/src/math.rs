//! The `Math` class.

use rand::Rng;

use crate::error::{RuntimeError, RuntimeResult};

pub const PI: f64 = std::f64::consts::PI;

/// Characters `get_random_string` draws from
const RANDOM_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789\"!@#$%^&*()_+-=[]{}|;:',.<>?/`~";

pub fn abs(n: f64) -> f64 {
    n.abs()
}

pub fn ceiling(n: f64) -> i64 {
    n.ceil() as i64
}

pub fn floor(n: f64) -> i64 {
    n.floor() as i64
}

/// Rounds to the nearest integer, halves going to the even neighbour.
pub fn round(n: f64) -> i64 {
    n.round_ties_even() as i64
}

pub fn natural_log(n: f64) -> f64 {
    n.ln()
}

/// Base-10 logarithm
pub fn log(n: f64) -> f64 {
    n.log10()
}

pub fn cos(radians: f64) -> f64 {
    radians.cos()
}

pub fn sin(radians: f64) -> f64 {
    radians.sin()
}

pub fn tan(radians: f64) -> f64 {
    radians.tan()
}

pub fn arc_sin(n: f64) -> f64 {
    n.asin()
}

pub fn arc_cos(n: f64) -> f64 {
    n.acos()
}

pub fn arc_tan(n: f64) -> f64 {
    n.atan()
}

/// Converts radians to degrees
pub fn get_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Converts degrees to radians
pub fn get_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn square_root(n: f64) -> f64 {
    n.sqrt()
}

pub fn power(base: f64, exponent: f64) -> f64 {
    base.powf(exponent)
}

pub fn max(a: f64, b: f64) -> f64 {
    a.max(b)
}

pub fn min(a: f64, b: f64) -> f64 {
    a.min(b)
}

/// Remainder of `dividend / divisor`, carrying the sign of the dividend
pub fn remainder(dividend: f64, divisor: f64) -> f64 {
    dividend % divisor
}

/// A uniformly random integer between 1 and `max`, both inclusive.
pub fn get_random_number(max: i64) -> RuntimeResult<i64> {
    if max < 1 {
        return Err(RuntimeError::invalid_argument(format!(
            "maximum must be at least 1, got {max}"
        )));
    }
    Ok(rand::thread_rng().gen_range(1..=max))
}

pub fn get_random_boolean() -> bool {
    rand::thread_rng().r#gen()
}

pub fn get_random_string(length: i64) -> RuntimeResult<String> {
    if length <= 0 {
        return Err(RuntimeError::invalid_argument(
            "length must be greater than zero",
        ));
    }
    let mut rng = rand::thread_rng();
    Ok((0..length)
        .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
        .collect())
}
