//! Hex color parsing for the ray tint.

use std::cell::RefCell;
use std::collections::HashMap;

/// Tint used whenever a color string cannot be parsed.
pub const FALLBACK_RGB: [f32; 3] = [1.0, 1.0, 1.0];

/// Upper bound on memoized inputs. Pages only ever use a handful of tints, so
/// the cache is simply cleared when it fills up.
const CACHE_CAPACITY: usize = 32;

thread_local! {
    static CACHE: RefCell<HashMap<String, [f32; 3]>> = RefCell::new(HashMap::new());
}

/// Converts `#rrggbb` (the `#` is optional, digits are case-insensitive) into
/// a normalized RGB triple. Anything else maps to white.
pub fn color_to_linear_triple(input: &str) -> [f32; 3] {
    if let Some(hit) = CACHE.with(|cache| cache.borrow().get(input).copied()) {
        return hit;
    }
    let rgb = parse_hex(input).unwrap_or(FALLBACK_RGB);
    CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.len() >= CACHE_CAPACITY {
            cache.clear();
        }
        cache.insert(input.to_owned(), rgb);
    });
    rgb
}

fn parse_hex(input: &str) -> Option<[f32; 3]> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    // from_str_radix tolerates a leading '+', so validate the digits up front.
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_marker() {
        assert_eq!(color_to_linear_triple("#ff0000"), [1.0, 0.0, 0.0]);
        assert_eq!(color_to_linear_triple("00FF00"), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_sign_prefixed_pairs() {
        assert_eq!(color_to_linear_triple("#+f+f+f"), FALLBACK_RGB);
    }

    #[test]
    fn cache_survives_overflow() {
        for i in 0..(CACHE_CAPACITY * 2) {
            let input = format!("#{:06x}", i);
            let rgb = color_to_linear_triple(&input);
            assert!(rgb.iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert_eq!(color_to_linear_triple("#0000ff"), [0.0, 0.0, 1.0]);
    }
}
