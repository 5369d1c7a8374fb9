//! One generation of the genetic algorithm.

use log::trace;

use crate::error::OptimizerError;
use crate::schema::{ConfigError, ELITE_PARENTS, OptimizerConfig};

use super::candidate::{Candidate, CandidateRng, Population, crossover};
use super::fitness::FitnessEvaluator;

/// Sizes of the parts a generation was assembled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breakdown {
    /// Elite parents carried over unchanged.
    pub parents: usize,
    /// Survivors, including the diversity picks.
    pub retained: usize,
    /// Lower-ranked candidates kept by the diversity draw.
    pub diversified: usize,
    /// Survivors that had a coordinate redrawn.
    pub mutated: usize,
    /// Offspring bred to refill the population.
    pub children: usize,
}

impl Breakdown {
    /// Population size the parts add up to.
    pub fn total(&self) -> usize {
        self.parents + self.retained + self.children
    }
}

/// Output of [`evolve`].
#[derive(Debug, Clone)]
pub struct Generation {
    /// Parents, then survivors, then children.
    pub population: Population,
    pub breakdown: Breakdown,
}

/// Produce the next generation from `population`.
///
/// The result has the same length as the input. It is ordered by
/// construction, not by fitness.
pub fn evolve(
    population: &[Candidate],
    config: &OptimizerConfig,
    evaluator: &FitnessEvaluator,
    rng: &mut CandidateRng,
) -> Result<Generation, OptimizerError> {
    let size = population.len();
    let selection = &config.selection;
    let bounds = &config.bounds;

    let ranked = evaluator.rank(population)?;

    let parent_end = ELITE_PARENTS.min(ranked.len());
    let retain_end = (parent_end + selection.retain_length(size)).min(ranked.len());
    let parents = &ranked[..parent_end];
    let mut retained: Vec<Candidate> = ranked[parent_end..retain_end].to_vec();

    let mut diversified = 0;
    for candidate in &ranked[retain_end..] {
        if rng.chance(selection.select_fraction) {
            retained.push(*candidate);
            diversified += 1;
        }
    }

    let mut mutated = 0;
    for slot in retained.iter_mut() {
        if rng.chance(selection.mutate_fraction) {
            *slot = rng.mutate(*slot, bounds);
            mutated += 1;
        }
    }

    let desired = size.checked_sub(parents.len() + retained.len()).ok_or(
        ConfigError::RetainExceedsPopulation {
            parents: parents.len(),
            retained: retained.len(),
            size,
        },
    )?;
    if desired > 0 && (retained.is_empty() || parents.is_empty()) {
        return Err(ConfigError::EmptyRetainPool {
            size,
            retain_fraction: selection.retain_fraction,
        }
        .into());
    }

    let mut children = Vec::with_capacity(desired);
    while children.len() < desired {
        let donor = retained[rng.index(retained.len())];
        let slot = rng.index(parents.len());
        children.push(crossover(donor, parents[slot], slot));
    }

    let breakdown = Breakdown {
        parents: parents.len(),
        retained: retained.len(),
        diversified,
        mutated,
        children: children.len(),
    };
    trace!("generation breakdown: {breakdown:?}");

    let mut next = Vec::with_capacity(size);
    next.extend_from_slice(parents);
    next.extend(retained);
    next.extend(children);
    debug_assert_eq!(next.len(), size);

    Ok(Generation {
        population: next,
        breakdown,
    })
}
