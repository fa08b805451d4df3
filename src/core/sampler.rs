/// Weighted random selection over integer-weighted outcomes.

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    #[error("invalid distribution: no outcome has a positive weight")]
    InvalidDistribution,
}

impl From<WeightedError> for SamplerError {
    fn from(_: WeightedError) -> Self {
        // u32 weights widened to u64 can only fail as NoItem or AllWeightsZero.
        SamplerError::InvalidDistribution
    }
}

/// Outcomes paired with their weights. Order is significant: it fixes which
/// outcome a given draw lands on, which keeps seeded generation stable.
pub type WeightedChoices<K> = Vec<(K, u32)>;

/// Pick one outcome with probability `weight / total`.
///
/// One uniform draw in `[0, total)` against the cumulative weights.
/// Zero-weight outcomes are never chosen.
pub fn weighted_choice<'a, K, R>(choices: &'a [(K, u32)], rng: &mut R) -> Result<&'a K, SamplerError>
where
    R: Rng + ?Sized,
{
    let weights = choices.iter().map(|(_, w)| u64::from(*w));
    let dist = WeightedIndex::<u64>::new(weights)?;
    Ok(&choices[dist.sample(rng)].0)
}
