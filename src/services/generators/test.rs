//! Test challenge generator.

use rand::RngCore;

use crate::domain::errors::GenerationResult;
use crate::domain::models::{Challenge, ChallengeGenerationData, ChallengeMeta, TestChallenge};

/// Write a new test. Always constructible.
pub fn generate(
    data: &mut ChallengeGenerationData<'_>,
    _rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    Ok(Some(Challenge::Test(TestChallenge {
        meta: ChallengeMeta::new(&data.context.branch, data.file.coverage, 1),
        user: data.user.to_string(),
        test_count: data.context.test_count,
        head_commit: data.context.head_commit.clone(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BuildContext, FileDetails};
    use crate::domain::ports::NullListener;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_snapshots_test_count_and_commit() {
        let ctx = BuildContext::new("/ws", "main", "demo").with_tests(42, "abc123");
        let file = FileDetails::test("org.example", "FooTest", "src/test/FooTest.java", vec![]);
        let mut data = ChallengeGenerationData::new(&ctx, "alice", file, &NullListener);
        let mut rng = StdRng::seed_from_u64(1);

        let challenge = generate(&mut data, &mut rng).unwrap().unwrap();
        let Challenge::Test(test) = &challenge else {
            panic!("expected a test challenge");
        };
        assert_eq!(test.test_count, 42);
        assert_eq!(test.head_commit.as_deref(), Some("abc123"));
        assert_eq!(test.user, "alice");
        assert_eq!(challenge.score(), 1);
    }
}
