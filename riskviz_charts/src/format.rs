// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting for labels and tooltips.

/// Formats `v` with exactly `digits` fractional digits.
///
/// A value exactly halfway between two results rounds away from zero (`2.125` -> `"2.13"`);
/// `{:.2}` alone would round it to even.
pub fn to_fixed(v: f64, digits: usize) -> String {
    if v.is_finite() && is_exact_tie(v, digits) {
        let mut s = format!("{v:.prec$}", prec = digits + 1);
        // Drop the trailing `5` and round the remaining digits up in magnitude.
        s.pop();
        if s.ends_with('.') {
            s.pop();
        }
        return increment_last_digit(&s);
    }
    format!("{v:.digits$}")
}

/// Whether the exact decimal expansion of `v` ends in a single `5` right after `digits`.
fn is_exact_tie(v: f64, digits: usize) -> bool {
    let near = format!("{v:.prec$}", prec = digits + 1);
    if !near.ends_with('5') {
        return false;
    }
    // Every finite f64 has a terminating expansion of at most 1074 fractional digits.
    let exact = format!("{:.1100}", v.abs());
    let Some((_, frac)) = exact.split_once('.') else {
        return false;
    };
    let frac = frac.as_bytes();
    frac.get(digits) == Some(&b'5') && frac[digits + 1..].iter().all(|d| *d == b'0')
}

/// Adds one unit in the last place to a formatted decimal, away from zero.
fn increment_last_digit(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let mut out: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for d in out.iter_mut().rev() {
        match *d {
            b'.' => continue,
            b'9' if carry => *d = b'0',
            _ if carry => {
                *d += 1;
                carry = false;
            }
            _ => break,
        }
    }
    let mut result = String::with_capacity(out.len() + 2);
    result.push_str(sign);
    if carry {
        result.push('1');
    }
    result.extend(out.into_iter().map(char::from));
    result
}

/// Formats a fraction as a whole-number percentage (`0.25` -> `"25%"`).
pub fn percent_whole(v: f64) -> String {
    format!("{}%", to_fixed(v * 100.0, 0))
}

/// Formats an axis tick using as many decimals as the tick step needs, with thousands separators.
pub fn format_tick_with_step(v: f64, step: f64) -> String {
    let digits = if step.is_finite() && step > 0.0 {
        let d = -(step.log10() + 0.01).floor();
        if d > 0.0 {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "positive and bounded by the f64 exponent range"
            )]
            {
                d.min(17.0) as usize
            }
        } else {
            0
        }
    } else {
        0
    };
    group_thousands(&to_fixed(v, digits))
}

fn group_thousands(s: &str) -> String {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int, frac) = match rest.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (rest, None),
    };

    let mut out = String::with_capacity(s.len() + int.len() / 3);
    out.push_str(sign);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}
