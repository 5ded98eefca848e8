use scriptable_api::{bind, Behavior, MemberTableBuilder, Value};

/// Keeps the seed it was started with and derives a value from it on each run
#[derive(Default)]
pub struct SeededComponent {
    seed: i64,
    state: i64,
}

// Linear congruential step, constants from Knuth's MMIX
const MULTIPLIER: i64 = 6364136223846793005;
const INCREMENT: i64 = 1442695040888963407;

impl Behavior for SeededComponent {
    const ID: &'static str = "seeded";

    fn describe(members: &mut MemberTableBuilder<Self>) {
        members
            .field("seed", |s: &Self| &s.seed, |s: &mut Self| &mut s.seed)
            .read_only("state", |s: &Self| s.state)
            .method("reseed", |s: &mut Self, (seed,): (i64,)| {
                s.seed = seed;
                s.state = seed;
                Ok(())
            });
    }

    fn start(&mut self, parameters: &[Value]) -> anyhow::Result<()> {
        let (seed,) = bind::<(i64,)>("start", parameters)?;
        self.seed = seed;
        self.state = seed;
        Ok(())
    }

    fn run(&mut self, _parameters: &[Value]) -> anyhow::Result<()> {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        Ok(())
    }
}
