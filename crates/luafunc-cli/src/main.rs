//! `luafunc` CLI: call Lua entry points with JSON arguments from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Run `main` from a file with two arguments
//! luafunc run -i sum.lua -a 3 -a 4
//!
//! # Inline code, another entry point, a table argument
//! luafunc run -c 'function keys(t) local n = 0 for _ in pairs(t) do n = n + 1 end return n end' \
//!     --function keys -a '{"a":1,"b":2}'
//!
//! # Code from stdin
//! echo 'function main() return {1, 2, 3} end' | luafunc run
//!
//! # Call any registered function with its full argument list
//! luafunc call lua -a '"function main(x) return x end"' -a '"main"' -a '[1,2]'
//!
//! # List registered functions and their signatures
//! luafunc functions
//! ```
//!
//! Set `RUST_LOG=luafunc_core=debug` to trace sessions on stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use luafunc_core::{FunctionRegistry, HostValue, SessionConfig};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "luafunc",
    version,
    about = "Call Lua entry points with JSON arguments"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Maximum bytes each Lua state may allocate
    #[arg(long, global = true)]
    memory_limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load Lua code and call one of its global functions
    Run {
        /// Lua source file (reads from stdin if neither -i nor -c is given)
        #[arg(short, long, conflicts_with = "code")]
        input: Option<String>,
        /// Inline Lua source
        #[arg(short, long)]
        code: Option<String>,
        /// Name of the global function to call
        #[arg(short, long, default_value = "main")]
        function: String,
        /// Positional argument as JSON (repeatable, order is kept)
        #[arg(short = 'a', long = "arg", value_name = "JSON")]
        args: Vec<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Call a registered function with its full argument list
    Call {
        /// Registered function name
        name: String,
        /// Argument as JSON (repeatable, order is kept)
        #[arg(short = 'a', long = "arg", value_name = "JSON")]
        args: Vec<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List registered functions
    Functions {
        /// Print the declarations as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = SessionConfig {
        memory_limit: cli.memory_limit,
        ..SessionConfig::default()
    };
    let registry = FunctionRegistry::with_config(config);

    match cli.command {
        Commands::Run {
            input,
            code,
            function,
            args,
            output,
        } => {
            let code = match code {
                Some(code) => code,
                None => read_input(input.as_deref())?,
            };
            let mut call_args = vec![HostValue::from(code), HostValue::from(function)];
            call_args.extend(parse_args(&args)?);

            let result = registry
                .call("lua", &call_args)
                .context("Failed to run Lua function")?;
            write_output(output.as_deref(), &render(&result)?)?;
        }
        Commands::Call { name, args, output } => {
            let call_args = parse_args(&args)?;
            let result = registry
                .call(&name, &call_args)
                .with_context(|| format!("Failed to call function '{}'", name))?;
            write_output(output.as_deref(), &render(&result)?)?;
        }
        Commands::Functions { json } => {
            if json {
                let specs: serde_json::Map<String, serde_json::Value> = registry
                    .iter()
                    .map(|(name, spec)| -> Result<(String, serde_json::Value)> {
                        Ok((name.to_string(), serde_json::to_value(spec)?))
                    })
                    .collect::<Result<_>>()?;
                println!("{}", serde_json::to_string_pretty(&specs)?);
            } else {
                for (name, spec) in registry.iter() {
                    println!("{}", spec.signature(name));
                    println!("    {}", spec.description);
                }
            }
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Parse each `--arg` as one JSON value.
fn parse_args(raw: &[String]) -> Result<Vec<HostValue>> {
    raw.iter()
        .enumerate()
        .map(|(i, arg)| {
            let value: serde_json::Value = serde_json::from_str(arg)
                .with_context(|| format!("Argument {} is not valid JSON: {}", i + 1, arg))?;
            Ok(HostValue::from(value))
        })
        .collect()
}

/// Pretty-print a result as JSON.
fn render(value: &HostValue) -> Result<String> {
    debug!(kind = %value.kind(), "rendering result");
    let json = serde_json::Value::try_from(value).context("Result has no JSON form")?;
    Ok(serde_json::to_string_pretty(&json)?)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read Lua code from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
