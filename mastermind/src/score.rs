//! Mastermind feedback for a guess.

/// Feedback for a single guess.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Score {
    /// Whether every position matched.
    pub won: bool,
    /// Positions where the guess equals the secret.
    pub exact_matches: usize,
    /// Guessed values that appear elsewhere in the secret.
    pub value_matches: usize,
}

/// Scores `guess` against `secret`.
///
/// Exact matches are counted first, and both sides of each are consumed. Then, for every
/// remaining guess value in order, all remaining secret slots holding that value are consumed,
/// but the guess value only earns a single value match. A duplicated value in the secret can
/// therefore be used up by one guess value, leaving nothing for a later equal guess value:
/// `[1, 1, 2, 2]` against `[2, 2, 1, 1]` gives two value matches, not four.
///
/// # Panics
/// If the sequences differ in length.
pub fn score(secret: &[u32], guess: &[u32]) -> Score {
    assert_eq!(
        secret.len(),
        guess.len(),
        "secret and guess must have the same length"
    );

    let length = secret.len();
    let mut secret_used = vec![false; length];
    let mut guess_used = vec![false; length];

    let mut exact_matches = 0;
    for i in 0..length {
        if guess[i] == secret[i] {
            exact_matches += 1;
            secret_used[i] = true;
            guess_used[i] = true;
        }
    }

    let mut value_matches = 0;
    for (i, &value) in guess.iter().enumerate() {
        if guess_used[i] {
            continue;
        }

        let mut found = false;
        for (j, &secret_value) in secret.iter().enumerate() {
            if secret_value == value && !secret_used[j] {
                if !found {
                    value_matches += 1;
                    found = true;
                }
                secret_used[j] = true;
            }
        }
    }

    Score {
        won: exact_matches == length,
        exact_matches,
        value_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn identical_sequences_win() {
        for secret in [vec![1], vec![3, 3, 3], vec![1, 2, 3, 4], vec![2, 1, 2, 1, 2]] {
            assert_eq!(
                score(&secret, &secret),
                Score { won: true, exact_matches: secret.len(), value_matches: 0 }
            );
        }
    }

    #[test]
    fn reversed_sequence() {
        assert_eq!(
            score(&[1, 2, 3], &[3, 2, 1]),
            Score { won: false, exact_matches: 1, value_matches: 2 }
        );
    }

    #[test]
    fn repeated_values_in_both() {
        assert_eq!(
            score(&[1, 1, 2], &[1, 2, 1]),
            Score { won: false, exact_matches: 1, value_matches: 2 }
        );
    }

    #[test]
    fn one_guess_value_consumes_all_equal_secret_values() {
        assert_eq!(
            score(&[1, 1, 2, 2], &[2, 2, 1, 1]),
            Score { won: false, exact_matches: 0, value_matches: 2 }
        );
        assert_eq!(
            score(&[3, 3, 1], &[1, 3, 2]),
            Score { won: false, exact_matches: 1, value_matches: 1 }
        );
    }

    #[test]
    fn nothing_in_common() {
        assert_eq!(
            score(&[1, 1, 1], &[2, 3, 0]),
            Score { won: false, exact_matches: 0, value_matches: 0 }
        );
    }

    #[test]
    fn empty_sequences_are_a_win() {
        assert_eq!(score(&[], &[]), Score { won: true, exact_matches: 0, value_matches: 0 });
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn mismatched_lengths_panic() {
        score(&[1, 2, 3], &[1, 2]);
    }

    #[test]
    fn distinct_values_match_their_intersection() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let values: Vec<u32> = (1..=9).collect();

        for _ in 0..500 {
            let secret: Vec<u32> = values.choose_multiple(&mut rng, 4).copied().collect();
            let guess: Vec<u32> = values.choose_multiple(&mut rng, 4).copied().collect();

            let common = guess.iter().filter(|v| secret.contains(v)).count();
            let result = score(&secret, &guess);

            assert_eq!(result.exact_matches + result.value_matches, common);
            assert_eq!(result.won, secret == guess);
        }
    }
}
