use rand::Rng;

/// Characters account numbers are drawn from
const DIGITS: &[u8] = b"0123456789";

/// Generate a string of `length` random decimal digits (leading zeros allowed)
pub fn generate_numeric_id(length: usize) -> String {
    generate_numeric_id_with(&mut rand::thread_rng(), length)
}

/// Same as [`generate_numeric_id`], drawing from the given random source
pub fn generate_numeric_id_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
        .collect()
}

/// Source of candidate account numbers
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator {
    fn generate(&mut self, length: usize) -> String;
}

/// Thread-local RNG backed generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&mut self, length: usize) -> String {
        generate_numeric_id(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(4)]
    #[case(32)]
    fn test_generated_id_has_requested_length(#[case] length: usize) {
        let id = generate_numeric_id(length);

        assert_eq!(id.len(), length);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let first = generate_numeric_id_with(&mut StdRng::seed_from_u64(7), 12);
        let second = generate_numeric_id_with(&mut StdRng::seed_from_u64(7), 12);

        assert_eq!(first, second);
    }

    #[test]
    fn test_every_digit_is_eventually_drawn() {
        let mut rng = StdRng::seed_from_u64(42);
        let sample = generate_numeric_id_with(&mut rng, 2000);

        for digit in "0123456789".chars() {
            assert!(sample.contains(digit), "digit {} never drawn", digit);
        }
    }
}
