//! Cost arithmetic: `cost(v) = |v|²`.

use nestfest_types::Credits;

/// Credits needed to cast `votes` on a single submission.
///
/// The sign is ignored; zero votes cost nothing. Never overflows, since
/// `i64::MIN.unsigned_abs()²` fits in a `u128`.
pub fn calculate_cost(votes: i64) -> Credits {
    cost_of_magnitude(votes.unsigned_abs())
}

/// Cost of an unsigned vote magnitude.
pub fn cost_of_magnitude(votes: u64) -> Credits {
    let v = votes as u128;
    v * v
}

/// Largest `v` with `v² <= available_credits`.
///
/// Used for UI/validation hints; requests are never clamped to it.
pub fn calculate_max_votes(available_credits: Credits) -> u64 {
    // floor(sqrt(u128::MAX)) == u64::MAX
    u64::try_from(integer_sqrt(available_credits)).unwrap_or(u64::MAX)
}

/// Exact floor square root of a `u128` (Newton's method from above).
pub fn integer_sqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let bits = 128 - n.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_is_square_of_magnitude() {
        assert_eq!(calculate_cost(0), 0);
        assert_eq!(calculate_cost(1), 1);
        assert_eq!(calculate_cost(5), 25);
        assert_eq!(calculate_cost(-5), 25);
        assert_eq!(calculate_cost(i64::MIN), 1u128 << 126);
    }

    #[test]
    fn test_max_votes_boundaries() {
        assert_eq!(calculate_max_votes(0), 0);
        assert_eq!(calculate_max_votes(3), 1);
        assert_eq!(calculate_max_votes(4), 2);
        assert_eq!(calculate_max_votes(30), 5);
        assert_eq!(calculate_max_votes(35), 5);
        assert_eq!(calculate_max_votes(36), 6);
        assert_eq!(calculate_max_votes(100), 10);
    }

    #[test]
    fn test_integer_sqrt_extremes() {
        assert_eq!(integer_sqrt(u128::MAX), u64::MAX as u128);
        assert_eq!(calculate_max_votes(u128::MAX), u64::MAX);
        let big = (u64::MAX as u128) * (u64::MAX as u128);
        assert_eq!(integer_sqrt(big), u64::MAX as u128);
        assert_eq!(integer_sqrt(big - 1), u64::MAX as u128 - 1);
    }
}
