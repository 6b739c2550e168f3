use anyhow::Result as AnyResult;
use clap::{Parser, Subcommand};

use duct::{cmd, Expression};

#[derive(Debug, Subcommand)]
pub enum Subcommands {
    /// Runs tests.
    Test,

    /// Checks the driver for errors, on the host and on a bare-metal target.
    Check,

    /// Builds the documentation.
    Doc {
        /// Whether to open the documentation in a browser.
        #[clap(long)]
        open: bool,
    },

    /// Runs extra checks (formatting, clippy).
    ExtraCheck,
}

#[derive(Debug, Parser)]
#[clap(about, version, propagate_version = true)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommands,
}

/// The driver is `no_std`, this target keeps it honest.
const EMBEDDED_TARGET: &str = "--target=thumbv7em-none-eabihf";

/// Packages that build for embedded targets. `xtask` itself is host-only.
const DRIVER_PACKAGES: &[&str] = &["bq4050", "device-descriptor", "register-access", "logger"];

fn cargo(args: &[&str]) -> Expression {
    println!("🛠️  Running command: cargo {}", args.join(" "));

    cmd("cargo", args)
}

fn with_packages<'a>(mut args: Vec<&'a str>) -> Vec<&'a str> {
    for &p in DRIVER_PACKAGES {
        args.push("-p");
        args.push(p);
    }

    args
}

fn test() -> AnyResult<()> {
    // Host tests print through `simple_logger`, which needs the `log` backend.
    let mut args = with_packages(vec!["test"]);
    args.push("--features=bq4050/log");

    cargo(&args).run()?;

    Ok(())
}

fn checks() -> AnyResult<()> {
    cargo(&with_packages(vec!["check"])).run()?;

    for feature in ["--features=log", "--features=defmt"] {
        cargo(&["check", "-p", "bq4050", EMBEDDED_TARGET, feature]).run()?;
    }

    Ok(())
}

fn docs(open: bool) -> AnyResult<()> {
    let mut args = with_packages(vec!["doc", "--no-deps"]);

    if open {
        args.push("--open");
    }

    cargo(&args).run()?;

    Ok(())
}

fn extra_checks() -> AnyResult<()> {
    cargo(&["fmt", "--check"]).run()?;
    cargo(&with_packages(vec!["clippy", "--all-targets"])).run()?;
    cargo(&["clippy", "-p", "bq4050", EMBEDDED_TARGET, "--features=defmt"]).run()?;

    Ok(())
}

fn main() -> AnyResult<()> {
    let cli = Cli::parse();

    match cli.subcommand {
        Subcommands::Test => test(),
        Subcommands::Check => checks(),
        Subcommands::Doc { open } => docs(open),
        Subcommands::ExtraCheck => extra_checks(),
    }
}
