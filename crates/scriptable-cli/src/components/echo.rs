use scriptable_api::{Behavior, MemberTableBuilder, Value};
use tracing::info;

/// Logs and remembers whatever it is run with
#[derive(Default)]
pub struct EchoComponent {
    prefix: String,
    last: Vec<Value>,
    runs: u32,
}

impl Behavior for EchoComponent {
    const ID: &'static str = "echo";

    fn describe(members: &mut MemberTableBuilder<Self>) {
        members
            .field("prefix", |e: &Self| &e.prefix, |e: &mut Self| &mut e.prefix)
            .read_only("last", |e: &Self| e.last.clone())
            .read_only("runs", |e: &Self| e.runs)
            .method("say", |e: &mut Self, words: Vec<Value>| {
                let words: Vec<String> = words.iter().map(ToString::to_string).collect();
                Ok(format!("{}{}", e.prefix, words.join(" ")))
            })
            .method("fail", |_: &mut Self, ()| -> anyhow::Result<()> {
                anyhow::bail!("echo was asked to fail")
            });
    }

    fn start(&mut self, parameters: &[Value]) -> anyhow::Result<()> {
        if let Some(prefix) = parameters.first().and_then(Value::as_str) {
            self.prefix = prefix.to_string();
        }
        Ok(())
    }

    fn run(&mut self, parameters: &[Value]) -> anyhow::Result<()> {
        self.runs += 1;
        self.last = parameters.to_vec();
        let shown = Value::List(self.last.clone());
        info!(target: "echo", "{}{}", self.prefix, shown);
        Ok(())
    }
}
