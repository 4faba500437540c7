// SPDX-License-Identifier: AGPL-3.0-only
// SPDX-FileCopyrightText: 2025 Steve Clarke <stephenlclarke@mac.com> - https://xyzzy.tools

//! formatshift command-line entry point.
//!
//! The binary only wires user input into the library modules under
//! `src/tree`, `src/obfuscate` and `src/pipeline`; none of the
//! transformation logic lives here.

use anyhow::{Context, Result, anyhow};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use formatshift::obfuscate::{self, TransformKind};
use formatshift::pipeline::Job;
use formatshift::tree::{DEFAULT_MAX_DEPTH, Walker};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// CI may inject a release tag via `FORMATSHIFT_VERSION`; otherwise we use
/// the Cargo package version.
const VERSION: &str = match option_env!("FORMATSHIFT_VERSION") {
    Some(tag) => tag,
    None => env!("CARGO_PKG_VERSION"),
};

fn sha() -> &'static str {
    option_env!("FORMATSHIFT_COMMIT").unwrap_or("0000000")
}

fn rust_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

fn version_string() -> String {
    format!(
        "formatshift {VERSION} (commit:{}) [rust:{}]",
        sha(),
        rust_version()
    )
}

/// Cached version string with a 'static lifetime for clap metadata.
fn version_str() -> &'static str {
    static VERSION_STR: OnceLock<String> = OnceLock::new();
    VERSION_STR.get_or_init(version_string).as_str()
}

fn main() {
    std::process::exit(match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            1
        }
    });
}

/// Parse arguments, set up logging and run the requested job.
fn run() -> Result<i32> {
    let matches = match build_cli().try_get_matches() {
        Ok(m) => m,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                return Ok(0);
            }
            _ => err.exit(),
        },
    };

    if matches.get_flag("version") {
        println!("{}", version_string());
        return Ok(0);
    }

    init_logging(
        matches
            .get_one::<String>("log-level")
            .map(String::as_str)
            .unwrap_or("info"),
        matches.get_flag("json-logs"),
    );
    let opts = CliOptions::from_matches(&matches)?;

    let job = Job::new(&opts.input, &opts.output, opts.kind)
        .with_walker(Walker::with_max_depth(opts.max_depth));
    let mut source = obfuscate::create_random_source(opts.seed);

    job.run(&mut source).with_context(|| {
        format!(
            "{} failed for {}",
            opts.kind,
            job.input().display()
        )
    })?;

    info!(
        input = %job.input().display(),
        output = %job.output().display(),
        "data obfuscation completed successfully"
    );
    Ok(0)
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Command definition; `--version` is handled by hand so the banner can
/// carry the commit and compiler.
fn build_cli() -> Command {
    Command::new("formatshift")
        .about("Obfuscate structured data - JSON to randomised XML, or shuffle date formats")
        .disable_version_flag(true)
        .version(version_str())
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .required_unless_present("version")
                .help("Path to the input file (.json or .xml)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .required_unless_present("version")
                .help("Path to the output file"),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .value_name("KIND")
                .value_parser([
                    TransformKind::JsonToXml.as_str(),
                    TransformKind::DateObfuscation.as_str(),
                ])
                .required_unless_present("version")
                .help("Transformation to apply"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Seed the random generator for a repeatable run"),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help(format!(
                    "Deepest nesting accepted before the run is abandoned [default: {DEFAULT_MAX_DEPTH}]"
                )),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit"),
        )
}

/// Typed view of the parsed flags.
struct CliOptions {
    input: PathBuf,
    output: PathBuf,
    kind: TransformKind,
    seed: Option<u64>,
    max_depth: usize,
}

impl CliOptions {
    fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input = required(matches, "input")?;
        let output = required(matches, "output")?;
        let kind = required(matches, "type")?.parse::<TransformKind>()?;
        Ok(Self {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            kind,
            seed: matches.get_one::<u64>("seed").copied(),
            max_depth: matches
                .get_one::<usize>("max-depth")
                .copied()
                .unwrap_or(DEFAULT_MAX_DEPTH),
        })
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing required argument --{name}"))
}
