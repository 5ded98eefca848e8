mod components;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use scriptable_api::{Access, MemberKind, ScriptError, Value};
use scriptable_host::{init_logging, ConfigLoadError, Container, ScriptableConfig, SlotOutcome};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enables debug mode
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the built-in components
    List,
    /// Write an example config file
    Init,
    /// Build the configured container and run every slot
    Run {
        /// Number of times to run all slots (overrides config)
        #[arg(short, long)]
        ticks: Option<u32>,
    },
    /// Print every slot's members and their current values
    Inspect,
    /// Read a member of a slot
    Get { slot: usize, member: String },
    /// Write a member of a slot
    Set {
        slot: usize,
        member: String,
        value: String,
    },
    /// Invoke a method of a slot
    Call {
        slot: usize,
        method: String,
        args: Vec<String>,
    },
}

const EXAMPLE_CONFIG: &str = r#"# Scriptable Configuration
# Each [[container.slots]] entry is one slot; leave out `component` for an empty slot

[logging]
file = false

[container]
run_policy = "continue"
ticks = 3

[[container.slots]]
component = "counter"
start = [2]

[[container.slots]]
component = "seeded"
start = [42]

[[container.slots]]
component = "echo"
start = ["echo: "]
run = ["hello", 1]
"#;

fn config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(ScriptableConfig::config_path()?),
    }
}

fn create_example_config(path: &Path) -> anyhow::Result<()> {
    // Never overwrite an existing config file
    if path.exists() {
        bail!(
            "Config file already exists at {}. Edit it manually or delete it to create a new one.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, EXAMPLE_CONFIG)?;
    info!("Created example config at {}", path.display());
    eprintln!("Config file created at: {}", path.display());
    Ok(())
}

/// Parse a command-line value as a TOML value, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    #[derive(Deserialize)]
    struct Wrapper {
        value: Value,
    }

    toml::from_str::<Wrapper>(&format!("value = {}", raw))
        .map(|w| w.value)
        .unwrap_or_else(|_| Value::Str(raw.to_string()))
}

/// One line of `run` output per slot; empty slots print nothing
fn outcome_line(tick: u32, index: usize, outcome: SlotOutcome) -> Option<String> {
    match outcome {
        SlotOutcome::Ran => Some(format!("tick {} slot {}: ok", tick, index)),
        SlotOutcome::Empty => None,
        SlotOutcome::Failed(e) => Some(format!(
            "tick {} slot {}: failed: {:#}",
            tick,
            index,
            anyhow::Error::from(e)
        )),
        SlotOutcome::NotRun => Some(format!("tick {} slot {}: not run", tick, index)),
    }
}

/// Write a member, then read it back unless it is write-only
fn set_and_read_back(
    container: &mut Container,
    slot: usize,
    member: &str,
    value: Value,
) -> anyhow::Result<Option<Value>> {
    container.set_slot_member(slot, member, value)?;
    match container.get_slot_member(slot, member) {
        Ok(value) => Ok(Some(value)),
        Err(ScriptError::MemberNotReadable { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn print_members(container: &Container) {
    for (index, slot) in container.iter() {
        let Some(component) = slot else {
            println!("[{}] <empty>", index);
            continue;
        };

        println!("[{}] {}", index, component.id());
        for member in component.members() {
            match member.kind {
                MemberKind::Data { value, access } => {
                    let current = if access.contains(Access::READ) {
                        component
                            .get_member(&member.name)
                            .map(|v| v.to_string())
                            .unwrap_or_else(|e| format!("<{}>", e))
                    } else {
                        "<write-only>".to_string()
                    };
                    println!("    {}: {} = {}", member.name, value, current);
                }
                MemberKind::Method { arity } => {
                    let arity = arity.map_or("...".to_string(), |n| n.to_string());
                    println!("    {}({})", member.name, arity);
                }
            }
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let path = config_path(&cli)?;

    if let Command::Init = cli.command {
        create_example_config(&path)?;
        return Ok(true);
    }

    let registry = components::create_registry()?;
    if let Command::List = cli.command {
        for id in registry.available() {
            println!("{}", id);
        }
        return Ok(true);
    }

    let config = match ScriptableConfig::load_from(&path) {
        Ok(config) => config,
        Err(ConfigLoadError::NotFound(path)) => {
            bail!(
                "No config found at {}. Run `scriptable init` to create one.",
                path.display()
            );
        }
        Err(e) => return Err(e).context("Failed to load config"),
    };

    let mut container = registry
        .build_container(&config.container)
        .context("Failed to build container")?;
    debug!(
        "Built container with {} slots ({} occupied)",
        container.slot_count(),
        container.occupied_count()
    );

    match cli.command {
        Command::Run { ticks } => {
            let ticks = ticks.unwrap_or(config.container.ticks);
            let parameters = config.container.run_parameters();
            let mut ok = true;

            for tick in 0..ticks {
                let report = container.run_all(&parameters)?;
                ok &= report.is_success();
                for (index, outcome) in report.into_outcomes().into_iter().enumerate() {
                    if let Some(line) = outcome_line(tick, index, outcome) {
                        println!("{}", line);
                    }
                }
            }

            print_members(&container);
            Ok(ok)
        }
        Command::Inspect => {
            print_members(&container);
            Ok(true)
        }
        Command::Get { slot, member } => {
            println!("{}", container.get_slot_member(slot, &member)?);
            Ok(true)
        }
        Command::Set {
            slot,
            member,
            value,
        } => {
            match set_and_read_back(&mut container, slot, &member, parse_value(&value))? {
                Some(current) => println!("{}", current),
                None => println!("ok"),
            }
            Ok(true)
        }
        Command::Call { slot, method, args } => {
            let args: Vec<Value> = args.iter().map(|a| parse_value(a)).collect();
            println!("{}", container.invoke_slot_method(slot, &method, &args)?);
            Ok(true)
        }
        Command::List | Command::Init => Ok(true),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logging settings come from the config when it exists
    let file_logging = config_path(&cli)
        .ok()
        .and_then(|path| ScriptableConfig::load_from(&path).ok())
        .map(|config| config.logging.file)
        .unwrap_or(false);
    let _guard = init_logging("scriptable", file_logging, cli.debug)?;

    // Returning lets `_guard` drop and flush the file writer
    let ok = run(cli)?;
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
