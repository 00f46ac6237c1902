use crate::config::ProbeConfig;
use crate::probe::{ProbeReport, capture};
use clap::{Arg, ArgAction, Command, value_parser};
use filesdr_driver::Registry;
use std::path::PathBuf;
use std::process;
use tracing::{debug, error};

mod config;
mod logging;
mod probe;

fn cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::new("args")
                .short('a')
                .long("args")
                .value_name("KWARGS")
                .help("Device arguments, e.g. \"fifo=/tmp/file_sdr\"."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with log_level and an [args] table."),
        )
        .arg(
            Arg::new("find")
                .long("find")
                .action(ArgAction::SetTrue)
                .conflicts_with("rx")
                .help("List matching devices and exit."),
        )
        .arg(
            Arg::new("rx")
                .long("rx")
                .value_name("SAMPLES")
                .value_parser(value_parser!(usize))
                .help("Read this many samples from the pipe, or until the writer closes."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON."),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity."),
        )
}

fn to_json(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn run() -> Result<(), String> {
    let matches = cli().get_matches();

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ProbeConfig::load(path)?,
        None => ProbeConfig::default(),
    };
    let level = logging::resolve_level(
        matches.get_count("verbose"),
        config.log_level.as_deref(),
    );
    logging::init(level)?;

    let args = config.device_args(matches.get_one::<String>("args").map(String::as_str));
    let json = matches.get_flag("json");
    let registry = Registry::with_builtin();
    debug!("device args: {args}");

    if matches.get_flag("find") {
        let found = registry.find(&args);
        if json {
            println!("{}", to_json(&found)?);
        } else {
            for (idx, result) in found.iter().enumerate() {
                println!("Found device {idx}: {result}");
            }
        }
        return Ok(());
    }

    let mut device = registry.make(&args).map_err(|e| e.to_string())?;

    if let Some(&count) = matches.get_one::<usize>("rx") {
        let stats = capture(device.as_mut(), count)?;
        if json {
            println!("{}", to_json(&stats)?);
        } else {
            println!("{}", stats.render());
        }
        return Ok(());
    }

    let report = ProbeReport::collect(device.as_ref())?;
    if json {
        println!("{}", to_json(&report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
