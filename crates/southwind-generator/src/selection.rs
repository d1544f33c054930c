//! Weighted random action selection.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;
use southwind_core::Action;

/// Pick one action, with probability `frequency / sum(frequencies)`.
///
/// Returns `None` when there is nothing to pick from, i.e. no actions or
/// no positive weight.
pub fn select_action<'a, R: Rng>(actions: &'a [Action], rng: &mut R) -> Option<&'a Action> {
    if actions.is_empty() {
        return None;
    }
    let distribution = WeightedIndex::new(actions.iter().map(Action::frequency)).ok()?;
    actions.get(distribution.sample(rng))
}
