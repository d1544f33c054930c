//! Pattern-based string generator.
//!
//! Supports placeholders:
//! - `{index}` - current mutation cycle
//! - `{uuid}` - random UUID
//! - `{rand:N}` - random N-digit number
//! - `{0}`, `{1}`, ... - positional arguments

use super::static_value::substitute_arguments;
use super::uuid::generate_uuid_v4;
use rand::Rng;

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(
    pattern: &str,
    arguments: &[String],
    rng: &mut R,
    index: u64,
) -> String {
    let mut result = substitute_arguments(pattern, arguments);

    result = result.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &generate_uuid_v4(rng).to_string(), 1);
    }

    // Replace {rand:N} patterns; malformed ones are kept as written
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let end = start + end;
        let Ok(digits) = result[start + 6..end].parse::<usize>() else {
            search_from = end + 1;
            continue;
        };
        let random_num = generate_random_digits(rng, digits);
        result.replace_range(start..=end, &random_num);
        search_from = start + random_num.len();
    }

    result
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    let mut result = String::with_capacity(digits);
    for position in 0..digits {
        // No leading zero
        let low = if position == 0 { 1 } else { 0 };
        let digit: u8 = rng.random_range(low..10);
        result.push(char::from(b'0' + digit));
    }
    result
}
