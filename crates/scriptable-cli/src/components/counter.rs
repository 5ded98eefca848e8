use scriptable_api::{bind, Behavior, MemberTableBuilder, Value};

/// Adds `step` to `count` on every run
pub struct CounterComponent {
    count: i64,
    step: i64,
}

impl Default for CounterComponent {
    fn default() -> Self {
        Self { count: 0, step: 1 }
    }
}

impl Behavior for CounterComponent {
    const ID: &'static str = "counter";

    fn describe(members: &mut MemberTableBuilder<Self>) {
        members
            .field("count", |c: &Self| &c.count, |c: &mut Self| &mut c.count)
            .field("step", |c: &Self| &c.step, |c: &mut Self| &mut c.step)
            .method("add", |c: &mut Self, (n,): (i64,)| {
                c.count += n;
                Ok(c.count)
            })
            .method("reset", |c: &mut Self, ()| {
                c.count = 0;
                Ok(())
            });
    }

    /// Optional parameter: the step size
    fn start(&mut self, parameters: &[Value]) -> anyhow::Result<()> {
        if !parameters.is_empty() {
            let (step,) = bind::<(i64,)>("start", parameters)?;
            self.step = step;
        }
        Ok(())
    }

    /// Optional parameter: how many steps to take this run
    fn run(&mut self, parameters: &[Value]) -> anyhow::Result<()> {
        let times = if parameters.is_empty() {
            1
        } else {
            bind::<(i64,)>("run", parameters)?.0
        };
        self.count += self.step * times;
        Ok(())
    }
}
