use crate::config::{LogFormat, LogSpanEvents, Mode, ReportFormat};
use clap::builder::Styles;
use clap::Parser;
use clap_complete::Shell;
use std::time::Duration;

/// Repeatedly measure the network path to a host with mtr
#[derive(Parser, Debug)]
#[command(name = "mtrmeter", author, version, about, long_about = None, arg_required_else_help(true), styles=Styles::styled())]
pub struct Args {
    /// The hostname or IP to measure
    #[arg(required_unless_present_any(["print_config_template", "generate", "generate_man"]))]
    pub host: Option<String>,

    /// Config file
    #[arg(value_enum, long, value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<String>,

    /// Run mode [default: accumulate]
    #[arg(value_enum, short = 'm', long)]
    pub mode: Option<Mode>,

    /// The number of pings sent to each hop per probe [default: 10]
    #[arg(short = 'c', long)]
    pub measurements: Option<usize>,

    /// The number of temporary name resolution failures tolerated [default: 3]
    #[arg(short = 'r', long)]
    pub max_retries: Option<usize>,

    /// The pause between probes [default: 60s]
    #[arg(short = 'i', long, value_parser = parse_duration)]
    pub sleep_interval: Option<Duration>,

    /// The maximum number of successful probes [default: unlimited]
    #[arg(short = 'n', long)]
    pub max_rounds: Option<usize>,

    /// The mtr program to run [default: mtr]
    #[arg(long, value_hint = clap::ValueHint::CommandName)]
    pub program: Option<String>,

    /// The wall-clock limit for a single probe [default: 360s]
    #[arg(short = 'T', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// The delay before collecting output in oneshot mode [default: 2s]
    #[arg(short = 'g', long, value_parser = parse_duration)]
    pub grace_duration: Option<Duration>,

    /// Report format [default: csv]
    #[arg(value_enum, short = 'f', long)]
    pub format: Option<ReportFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<String>,

    /// Report every record rather than the latest per start time
    #[arg(long)]
    pub no_group: bool,

    /// The field delimiter of the csv report [default: ;]
    #[arg(long)]
    pub csv_delimiter: Option<char>,

    /// Generate shell completion
    #[arg(long)]
    pub generate: Option<Shell>,

    /// Generate ROFF man page
    #[arg(long)]
    pub generate_man: bool,

    /// Print a template toml config file and exit
    #[arg(long)]
    pub print_config_template: bool,

    /// The debug log format [default: pretty]
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: mtrmeter=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log format [default: off]
    #[arg(long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
