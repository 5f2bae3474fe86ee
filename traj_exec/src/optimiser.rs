//! # Hierarchical grid search optimiser
//!
//! Minimises a loss function over a fixed set of bounded scalar variables
//! without gradient information. A single [`search`] samples every variable
//! at the midpoints of `per_layer` equal sub-intervals of its domain and
//! evaluates the loss at every combination. [`layered_search`] then
//! repeatedly shrinks each domain around the best point found, freezing
//! variables once their sampling gap drops below their tolerance.
//!
//! The variable set is a fixed-size array, with variable `0` the outermost
//! loop of the grid. Evaluation is strictly sequential and depth first, each
//! frame of the search owning its own copy of the assignment.
//!
//! The number of loss evaluations per search is the product of the
//! `per_layer` values, so these should be kept small.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The search domain and sampling density of one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableDomain {
    /// Lower bound of the domain
    pub range_min: f64,

    /// Upper bound of the domain
    pub range_max: f64,

    /// Number of samples taken across the domain in each search
    pub per_layer: usize,

    /// Once the gap between samples is below this value the variable is
    /// considered converged
    pub tolerance: f64,
}

/// The best assignment found by a search and its loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult<const N: usize> {
    pub values: [f64; N],
    pub score: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OptimiserError {
    #[error("Variable {index} has an invalid range [{min}, {max}]")]
    InvalidDomain { index: usize, min: f64, max: f64 },

    #[error("Variable {index} must be sampled at least once per layer")]
    InvalidPerLayer { index: usize },

    #[error("Variable {index} has an invalid tolerance of {tolerance}")]
    InvalidTolerance { index: usize, tolerance: f64 },

    #[error("Every evaluated candidate produced a NaN loss")]
    NoValidScore,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A loss function over `N` variables.
///
/// Lower is better. A NaN loss disqualifies the candidate.
pub trait Loss<const N: usize> {
    fn loss(&mut self, values: &[f64; N]) -> f64;
}

impl<F, const N: usize> Loss<N> for F
where
    F: FnMut(&[f64; N]) -> f64,
{
    fn loss(&mut self, values: &[f64; N]) -> f64 {
        self(values)
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VariableDomain {
    pub fn new(range_min: f64, range_max: f64, per_layer: usize, tolerance: f64) -> Self {
        Self {
            range_min,
            range_max,
            per_layer,
            tolerance,
        }
    }

    /// A domain containing only `value`, which never moves.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, 1, std::f64::INFINITY)
    }

    /// Width of each sub-interval of the domain.
    pub fn gap(&self) -> f64 {
        (self.range_max - self.range_min) / self.per_layer as f64
    }

    /// The `k`th sample point, the midpoint of the `k`th sub-interval.
    pub fn sample(&self, k: usize) -> f64 {
        let gap = self.gap();
        self.range_min + gap / 2.0 + k as f64 * gap
    }

    /// Build the domain for the next layer around `best`.
    ///
    /// Returns the new domain and whether the variable has converged.
    pub fn narrowed(&self, best: f64) -> (Self, bool) {
        let gap = self.gap();

        if gap < self.tolerance {
            return (Self::new(best, best, 1, self.tolerance), true);
        }

        let range_min = best - gap / 2.0;
        let range_max = best + gap / 2.0;
        let needed = ((range_max - range_min) / self.tolerance).ceil();

        // NaN (zero range and zero tolerance) saturates to zero in the cast
        let per_layer = self.per_layer.min(needed as usize).max(1);

        (Self::new(range_min, range_max, per_layer, self.tolerance), false)
    }

    fn validate(&self, index: usize) -> Result<(), OptimiserError> {
        // Written to also reject NaN bounds
        if !(self.range_min <= self.range_max) {
            return Err(OptimiserError::InvalidDomain {
                index,
                min: self.range_min,
                max: self.range_max,
            });
        }

        if self.per_layer == 0 {
            return Err(OptimiserError::InvalidPerLayer { index });
        }

        if !(self.tolerance >= 0.0) {
            return Err(OptimiserError::InvalidTolerance {
                index,
                tolerance: self.tolerance,
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Exhaustive grid search over the given domains.
///
/// Returns the assignment with the lowest loss. Candidates with a NaN loss
/// are never selected, if every candidate is NaN `NoValidScore` is returned.
/// Ties are resolved in favour of the first candidate evaluated.
pub fn search<L, const N: usize>(
    loss: &mut L,
    domains: &[VariableDomain; N],
) -> Result<SearchResult<N>, OptimiserError>
where
    L: Loss<N>,
{
    for (i, d) in domains.iter().enumerate() {
        d.validate(i)?;
    }

    find_min(loss, domains, 0, [0f64; N]).ok_or(OptimiserError::NoValidScore)
}

/// Run a [`search`], then up to `layers` further searches each narrowed
/// around the best point found so far.
///
/// Stops early once every variable has converged to within its tolerance.
pub fn layered_search<L, const N: usize>(
    layers: usize,
    loss: &mut L,
    domains: &[VariableDomain; N],
) -> Result<SearchResult<N>, OptimiserError>
where
    L: Loss<N>,
{
    let mut domains = *domains;
    let mut best = search(loss, &domains)?;

    for layer in 0..layers {
        debug!("Layer {}: best loss {} at {:?}", layer, best.score, best.values);

        let mut converged = true;
        for (d, value) in domains.iter_mut().zip(best.values.iter()) {
            let (next, var_converged) = d.narrowed(*value);
            *d = next;
            converged &= var_converged;
        }

        if converged {
            debug!("All variables within tolerance after {} layer(s)", layer);
            break;
        }

        let next = search(loss, &domains)?;
        if next.score <= best.score {
            best = next;
        }
    }

    Ok(best)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn find_min<L, const N: usize>(
    loss: &mut L,
    domains: &[VariableDomain; N],
    depth: usize,
    values: [f64; N],
) -> Option<SearchResult<N>>
where
    L: Loss<N>,
{
    if depth == N {
        let score = loss.loss(&values);
        trace!("{:?} -> {}", values, score);

        if score.is_nan() {
            return None;
        }
        return Some(SearchResult { values, score });
    }

    let domain = &domains[depth];
    let mut best: Option<SearchResult<N>> = None;

    for k in 0..domain.per_layer {
        let mut candidate = values;
        candidate[depth] = domain.sample(k);

        if let Some(result) = find_min(loss, domains, depth + 1, candidate) {
            match best {
                Some(b) if b.score <= result.score => (),
                _ => best = Some(result),
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_samples_midpoints() {
        let mut seen = Vec::new();
        let mut loss = |v: &[f64; 1]| {
            seen.push(v[0]);
            0.0
        };

        search(&mut loss, &[VariableDomain::new(0.0, 10.0, 5, 0.1)]).unwrap();

        assert_eq!(seen, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn test_search_visits_full_grid() {
        let mut count = 0;
        let mut loss = |v: &[f64; 3]| {
            count += 1;
            (v[0] - 1.0).powi(2) + (v[1] + 2.0).powi(2) + v[2].abs()
        };

        let result = search(
            &mut loss,
            &[
                VariableDomain::new(0.0, 4.0, 4, 0.1),
                VariableDomain::new(-4.0, 0.0, 4, 0.1),
                VariableDomain::fixed(0.0),
            ],
        )
        .unwrap();

        assert_eq!(count, 16);
        assert_eq!(result.values[2], 0.0);
        assert!((result.values[0] - 0.5).abs() < 1e-12 || (result.values[0] - 1.5).abs() < 1e-12);
        assert!((result.values[1] + 1.5).abs() < 1e-12 || (result.values[1] + 2.5).abs() < 1e-12);
        assert!((result.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_disqualifies() {
        let mut loss = |v: &[f64; 1]| if v[0] < 5.0 { std::f64::NAN } else { v[0] };

        let result = search(&mut loss, &[VariableDomain::new(0.0, 10.0, 10, 0.1)]).unwrap();
        assert_eq!(result.values[0], 5.5);
        assert_eq!(result.score, 5.5);

        let mut all_nan = |_: &[f64; 1]| std::f64::NAN;
        assert_eq!(
            search(&mut all_nan, &[VariableDomain::new(0.0, 1.0, 3, 0.1)]),
            Err(OptimiserError::NoValidScore)
        );
    }

    #[test]
    fn test_infinite_scores_still_return_candidate() {
        let mut loss = |_: &[f64; 1]| std::f64::INFINITY;
        let result = search(&mut loss, &[VariableDomain::new(0.0, 1.0, 2, 0.1)]).unwrap();
        assert_eq!(result.values[0], 0.25);
        assert!(result.score.is_infinite());
    }

    #[test]
    fn test_invalid_domains() {
        let mut loss = |_: &[f64; 2]| 0.0;

        assert_eq!(
            search(
                &mut loss,
                &[VariableDomain::fixed(1.0), VariableDomain::new(2.0, 1.0, 3, 0.1)]
            ),
            Err(OptimiserError::InvalidDomain { index: 1, min: 2.0, max: 1.0 })
        );
        assert_eq!(
            search(
                &mut loss,
                &[VariableDomain::new(0.0, 1.0, 0, 0.1), VariableDomain::fixed(1.0)]
            ),
            Err(OptimiserError::InvalidPerLayer { index: 0 })
        );
    }

    #[test]
    fn test_no_variables() {
        let mut loss = |_: &[f64; 0]| 42.0;
        let result = layered_search(3, &mut loss, &[]).unwrap();
        assert_eq!(result.score, 42.0);
    }

    #[test]
    fn test_narrowed() {
        let d = VariableDomain::new(0.0, 10.0, 4, 0.01);
        let (next, converged) = d.narrowed(3.75);
        assert!(!converged);
        assert_eq!(next.range_min, 2.5);
        assert_eq!(next.range_max, 5.0);
        assert_eq!(next.per_layer, 4);

        // Sample count is capped by what the tolerance can resolve
        let d = VariableDomain::new(0.0, 1.0, 2, 0.2);
        let (next, converged) = d.narrowed(0.25);
        assert!(!converged);
        assert_eq!(next.per_layer, 2);
        let (next, _) = VariableDomain::new(0.0, 1.0, 4, 0.2).narrowed(0.125);
        assert_eq!(next.per_layer, 2);

        let (next, converged) = VariableDomain::new(0.0, 0.01, 2, 0.01).narrowed(0.0075);
        assert!(converged);
        assert_eq!(next, VariableDomain::new(0.0075, 0.0075, 1, 0.01));
    }

    #[test]
    fn test_layered_converges_on_convex_loss() {
        let mut evaluations = 0;
        let mut loss = |v: &[f64; 1]| {
            evaluations += 1;
            (v[0] - 3.0).powi(2)
        };

        let result =
            layered_search(20, &mut loss, &[VariableDomain::new(0.0, 10.0, 4, 0.01)]).unwrap();

        assert!((result.values[0] - 3.0).abs() < 0.01);

        // Stops early once within tolerance rather than running every layer
        assert!(evaluations < 4 * 20);
    }

    #[test]
    fn test_layered_two_variables() {
        let mut loss = |v: &[f64; 2]| (v[0] - 1.3).powi(2) + 2.0 * (v[1] + 0.7).powi(2);

        let result = layered_search(
            30,
            &mut loss,
            &[
                VariableDomain::new(-5.0, 5.0, 5, 0.001),
                VariableDomain::new(-5.0, 5.0, 5, 0.001),
            ],
        )
        .unwrap();

        assert!((result.values[0] - 1.3).abs() < 0.01);
        assert!((result.values[1] + 0.7).abs() < 0.01);
    }
}
