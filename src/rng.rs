use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// The single random source for everything the battle core decides by chance.
///
/// `Seeded` draws from a reproducible generator. `Scripted` replays a fixed list
/// of outcomes in 1..=100, which lets a test say exactly how each roll lands.
#[derive(Debug, Clone)]
pub enum TurnRng {
    Seeded(StdRng),
    Scripted { outcomes: Vec<u8>, index: usize },
}

impl TurnRng {
    pub fn seeded(seed: u64) -> Self {
        TurnRng::Seeded(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        TurnRng::Seeded(StdRng::from_os_rng())
    }

    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        TurnRng::Scripted { outcomes, index: 0 }
    }

    /// Next roll in 1..=100.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match self {
            TurnRng::Seeded(rng) => rng.random_range(1..=100),
            TurnRng::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    panic!(
                        "TurnRng exhausted after {} scripted outcomes, wanted one for '{}'",
                        outcomes.len(),
                        reason
                    );
                }
                let outcome = outcomes[*index];
                *index += 1;
                outcome
            }
        };

        trace!(outcome, reason, "rng consumed");
        outcome
    }

    /// True with probability `chance` (clamped to [0, 1]).
    ///
    /// A scripted outcome `n` succeeds when `n <= chance * 100`.
    pub fn roll_chance(&mut self, chance: f64, reason: &str) -> bool {
        let chance = chance.clamp(0.0, 1.0);
        match self {
            TurnRng::Seeded(rng) => {
                let hit = rng.random_bool(chance);
                trace!(chance, hit, reason, "rng chance");
                hit
            }
            TurnRng::Scripted { .. } => {
                f64::from(self.next_outcome(reason)) <= chance * 100.0
            }
        }
    }

    /// Fair coin. Scripted outcomes above 50 count as `true`.
    pub fn next_bool(&mut self, reason: &str) -> bool {
        self.next_outcome(reason) > 50
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize, reason: &str) -> usize {
        debug_assert!(len > 0, "next_index called with an empty range");
        match self {
            TurnRng::Seeded(rng) => {
                let index = rng.random_range(0..len);
                trace!(index, len, reason, "rng index");
                index
            }
            TurnRng::Scripted { .. } => {
                usize::from(self.next_outcome(reason)).saturating_sub(1) % len
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scripted_outcomes_replay_in_order() {
        let mut rng = TurnRng::new_for_test(vec![10, 90, 1, 100]);
        assert_eq!(rng.next_outcome("first"), 10);
        assert!(rng.next_bool("second"));
        assert_eq!(rng.next_index(3, "third"), 0);
        assert!(!rng.roll_chance(0.99, "fourth"));
    }

    #[test]
    fn test_scripted_chance_boundary() {
        let mut rng = TurnRng::new_for_test(vec![30, 31]);
        assert!(rng.roll_chance(0.3, "at threshold"));
        assert!(!rng.roll_chance(0.3, "above threshold"));
    }

    #[test]
    fn test_scripted_zero_maps_to_the_first_index() {
        let mut rng = TurnRng::new_for_test(vec![0, 1, 7]);
        assert_eq!(rng.next_index(4, "zero"), 0);
        assert_eq!(rng.next_index(4, "one"), 0);
        assert_eq!(rng.next_index(4, "seven"), 2);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = TurnRng::seeded(7);
        let mut b = TurnRng::seeded(7);
        let rolls_a: Vec<u8> = (0..20).map(|_| a.next_outcome("a")).collect();
        let rolls_b: Vec<u8> = (0..20).map(|_| b.next_outcome("b")).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().all(|&r| (1..=100).contains(&r)));
    }

    #[test]
    #[should_panic(expected = "TurnRng exhausted")]
    fn test_scripted_exhaustion_panics() {
        let mut rng = TurnRng::new_for_test(vec![]);
        rng.next_outcome("nothing left");
    }
}
