//! Renderers for direct values.
//!
//! Each [`DirectValue`] kind renders to the literal text that is inlined
//! into a statement.

pub mod numeric;
pub mod pattern;
pub mod static_value;
pub mod timestamp;
pub mod uuid;

use rand::Rng;
use southwind_core::DirectValue;

/// Render a direct value to literal text.
///
/// `index` is the current mutation cycle, used by `{index}` placeholders.
pub fn render_direct<R: Rng>(value: &DirectValue, rng: &mut R, index: u64) -> String {
    match value {
        DirectValue::Literal { text, arguments } => {
            static_value::substitute_arguments(text, arguments)
        }

        DirectValue::Pattern { pattern, arguments } => {
            pattern::generate_pattern(pattern, arguments, rng, index)
        }

        DirectValue::Uuid => uuid::generate_uuid_v4(rng).to_string(),

        DirectValue::IntRange { min, max } => numeric::generate_int_range(rng, *min, *max),

        DirectValue::FloatRange { min, max } => numeric::generate_float_range(rng, *min, *max),

        DirectValue::OneOf { values } => {
            if values.is_empty() {
                String::new()
            } else {
                values[rng.random_range(0..values.len())].clone()
            }
        }

        DirectValue::WeightedBool { true_weight } => rng.random_bool(*true_weight).to_string(),

        DirectValue::TimestampRange { start, end } => {
            timestamp::generate_timestamp_range(rng, start, end)
        }

        DirectValue::TimestampNow => timestamp::generate_timestamp_now(),
    }
}
