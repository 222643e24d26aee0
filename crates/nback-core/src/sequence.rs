//! Stimulus sequence generation with a controlled match rate.
//!
//! The generator draws a uniform baseline, then forces matches at a random
//! subset of eligible positions by copying the symbol from `lag` places
//! earlier. A forced overwrite can coincidentally create or break matches
//! further downstream; that drift is accepted and left uncorrected, so the
//! realized match rate only approximates the target.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::{SessionConfig, Symbol};

/// An immutable, fixed-length symbol sequence for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    symbols: Vec<Symbol>,
    lag: usize,
}

impl Sequence {
    /// Generate a sequence per the session configuration. The RNG is
    /// injected so tests can seed it.
    pub fn generate<R: Rng>(config: &SessionConfig, rng: &mut R) -> Self {
        generate(
            &config.alphabet,
            config.trial_count,
            config.lag,
            config.target_match_rate,
            rng,
        )
    }

    /// Build a sequence from explicit symbols. Used by tests that need a
    /// fully deterministic stimulus order.
    pub fn from_symbols(symbols: Vec<Symbol>, lag: usize) -> Self {
        Self { symbols, lag }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }

    /// The symbol `lag` positions before `index`, if defined.
    pub fn lagged_symbol(&self, index: usize) -> Option<Symbol> {
        index
            .checked_sub(self.lag)
            .and_then(|i| self.symbols.get(i).copied())
    }

    /// Whether an n-back comparison is defined at `index`.
    pub fn is_eligible(&self, index: usize) -> bool {
        index >= self.lag && index < self.symbols.len()
    }

    /// Whether the symbol at `index` equals the one `lag` positions back.
    /// `None` for ineligible indices.
    pub fn is_match(&self, index: usize) -> Option<bool> {
        if !self.is_eligible(index) {
            return None;
        }
        Some(self.symbol(index) == self.lagged_symbol(index))
    }

    /// Count of realized matches among eligible positions.
    pub fn match_count(&self) -> usize {
        (self.lag..self.symbols.len())
            .filter(|&i| self.is_match(i) == Some(true))
            .count()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}

/// Generate `trial_count` symbols with roughly `target_match_rate` forced
/// matches at the given lag. Clamps rather than errors when the eligible
/// range is smaller than the requested match count.
pub fn generate<R: Rng>(
    alphabet: &[Symbol],
    trial_count: usize,
    lag: usize,
    target_match_rate: f64,
    rng: &mut R,
) -> Sequence {
    let mut symbols: Vec<Symbol> = (0..trial_count)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect();

    let number_of_matches = (trial_count as f64 * target_match_rate).round() as usize;

    let mut eligible: Vec<usize> = (lag.min(trial_count)..trial_count).collect();
    eligible.shuffle(rng);
    eligible.truncate(number_of_matches.min(eligible.len()));

    for &pos in &eligible {
        symbols[pos] = symbols[pos - lag];
    }

    // The steps above always yield trial_count symbols, but the contract is
    // exact length regardless, so pad or truncate before sealing.
    while symbols.len() < trial_count {
        symbols.push(alphabet[rng.gen_range(0..alphabet.len())]);
    }
    symbols.truncate(trial_count);

    Sequence { symbols, lag }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_alphabet() -> Vec<Symbol> {
        vec!['A', 'B', 'C']
    }

    #[test]
    fn generated_length_is_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        for trials in [1, 2, 5, 30, 100] {
            let seq = generate(&small_alphabet(), trials, 2, 0.3, &mut rng);
            assert_eq!(seq.len(), trials);
        }
    }

    #[test]
    fn forced_matches_hold_at_lag() {
        let mut rng = StdRng::seed_from_u64(42);
        let seq = generate(&small_alphabet(), 30, 2, 0.3, &mut rng);

        // Every realized match must be a genuine equality at the lag.
        for i in 2..seq.len() {
            if seq.is_match(i) == Some(true) {
                assert_eq!(seq.symbol(i), seq.lagged_symbol(i));
            }
        }
    }

    #[test]
    fn match_count_is_bounded() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let trials = 30;
            let lag = 2;
            let rate = 0.3;
            let seq = generate(&small_alphabet(), trials, lag, rate, &mut rng);

            let requested = (trials as f64 * rate).round() as usize;
            let eligible = trials - lag;
            // Forced matches can coincide with accidental baseline matches,
            // so the count can exceed the request, but never the eligible range.
            assert!(seq.match_count() <= eligible);
            assert!(requested <= eligible);
        }
    }

    #[test]
    fn seeded_case_realizes_exact_forced_count() {
        // 10 trials at lag 3 with rate 0.3 requests exactly 3 forced
        // matches. With this seed and a 26-letter alphabet no overwrite
        // side-effect creates or destroys a match elsewhere, so the
        // realized count equals the request.
        let alphabet: Vec<Symbol> = ('A'..='Z').collect();
        let mut rng = StdRng::seed_from_u64(1);
        let seq = generate(&alphabet, 10, 3, 0.3, &mut rng);
        assert_eq!(seq.len(), 10);
        assert_eq!(seq.match_count(), 3);
    }

    #[test]
    fn clamps_when_eligible_range_is_small() {
        // 4 trials at lag 3 leaves one eligible index; a 100% match rate
        // must clamp to it rather than error.
        let mut rng = StdRng::seed_from_u64(11);
        let seq = generate(&small_alphabet(), 4, 3, 1.0, &mut rng);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.is_match(3), Some(true));
    }

    #[test]
    fn eligibility_boundaries() {
        let seq = Sequence::from_symbols(vec!['A', 'B', 'A', 'C'], 2);
        assert!(!seq.is_eligible(0));
        assert!(!seq.is_eligible(1));
        assert!(seq.is_eligible(2));
        assert!(seq.is_eligible(3));
        assert!(!seq.is_eligible(4));
        assert_eq!(seq.is_match(2), Some(true));
        assert_eq!(seq.is_match(3), Some(false));
        assert_eq!(seq.is_match(0), None);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = generate(&small_alphabet(), 30, 2, 0.3, &mut StdRng::seed_from_u64(5));
        let b = generate(&small_alphabet(), 30, 2, 0.3, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
