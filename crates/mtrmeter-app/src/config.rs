use anyhow::anyhow;
use clap::ValueEnum;
use clap_complete::Shell;
use file::ConfigFile;
use mtrmeter_core::defaults;
use serde::Deserialize;
use std::time::Duration;

mod cmd;
mod constants;
mod file;

pub use cmd::Args;

/// The run mode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Probe repeatedly and accumulate the records.
    Accumulate,
    /// Run a single probe on a cooperative scheduler.
    Oneshot,
}

/// The report format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Generate a CSV report.
    Csv,
    /// Generate a JSON report.
    Json,
    /// Generate a pretty text table report.
    Pretty,
    /// Generate a Markdown text table report.
    Markdown,
}

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
    /// Display log data in Chrome trace format.
    Chrome,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// The action to perform.
#[derive(Debug, Eq, PartialEq)]
pub enum MtrmeterAction {
    /// Run mtrmeter.
    Mtrmeter(MtrmeterConfig),
    /// Print a template toml config file and exit.
    PrintConfigTemplate,
    /// Generate shell completion and exit.
    PrintShellCompletions(Shell),
    /// Generate a man page and exit.
    PrintManPage,
}

impl MtrmeterAction {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        Ok(if args.print_config_template {
            Self::PrintConfigTemplate
        } else if let Some(shell) = args.generate {
            Self::PrintShellCompletions(shell)
        } else if args.generate_man {
            Self::PrintManPage
        } else {
            Self::Mtrmeter(MtrmeterConfig::from(args)?)
        })
    }
}

/// Fully parsed and validated configuration.
#[derive(Debug, Eq, PartialEq)]
pub struct MtrmeterConfig {
    pub host: String,
    pub mode: Mode,
    pub measurements: usize,
    pub max_retries: usize,
    pub sleep_interval: Duration,
    pub max_rounds: Option<usize>,
    pub program: String,
    pub timeout: Duration,
    pub grace_duration: Duration,
    pub report_format: ReportFormat,
    pub report_output: Option<String>,
    pub report_group: bool,
    pub csv_delimiter: u8,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl MtrmeterConfig {
    pub fn from(args: Args) -> anyhow::Result<Self> {
        let cfg_file = if let Some(cfg) = &args.config_file {
            file::read_config_file(cfg)?
        } else {
            file::read_default_config_file()?.unwrap_or_default()
        };
        Self::build_config(args, cfg_file)
    }

    fn build_config(args: Args, cfg_file: ConfigFile) -> anyhow::Result<Self> {
        let cfg_file_mtrmeter = cfg_file.mtrmeter.unwrap_or_default();
        let cfg_file_probe = cfg_file.probe.unwrap_or_default();
        let cfg_file_report = cfg_file.report.unwrap_or_default();
        let host = args
            .host
            .ok_or_else(|| anyhow!("a host is required"))?;
        let mode = cfg_layer(args.mode, cfg_file_mtrmeter.mode, constants::DEFAULT_MODE);
        let measurements = cfg_layer(
            args.measurements,
            cfg_file_probe.measurements,
            defaults::DEFAULT_MEASUREMENTS,
        );
        let max_retries = cfg_layer(
            args.max_retries,
            cfg_file_mtrmeter.max_retries,
            defaults::DEFAULT_MAX_RETRIES,
        );
        let sleep_interval = cfg_layer(
            args.sleep_interval,
            cfg_file_mtrmeter.sleep_interval,
            defaults::DEFAULT_SLEEP_INTERVAL,
        );
        let max_rounds = cfg_layer_opt(args.max_rounds, cfg_file_mtrmeter.max_rounds);
        let program = cfg_layer(
            args.program,
            cfg_file_probe.program,
            String::from(defaults::DEFAULT_PROBE_PROGRAM),
        );
        let timeout = cfg_layer(
            args.timeout,
            cfg_file_probe.timeout,
            defaults::DEFAULT_PROBE_TIMEOUT,
        );
        let grace_duration = cfg_layer(
            args.grace_duration,
            cfg_file_probe.grace_duration,
            defaults::DEFAULT_PROBE_GRACE_DURATION,
        );
        let report_format = cfg_layer(
            args.format,
            cfg_file_report.format,
            constants::DEFAULT_REPORT_FORMAT,
        );
        let report_output = cfg_layer_opt(args.output, cfg_file_report.output);
        let report_group = cfg_layer_bool_flag(
            !args.no_group,
            cfg_file_report.group,
            constants::DEFAULT_REPORT_GROUP,
        );
        let csv_delimiter = cfg_layer(
            args.csv_delimiter,
            cfg_file_report.csv_delimiter,
            constants::DEFAULT_CSV_DELIMITER,
        );
        let verbose = args.verbose;
        let log_format = cfg_layer(
            args.log_format,
            cfg_file_mtrmeter.log_format,
            constants::DEFAULT_LOG_FORMAT,
        );
        let log_filter = cfg_layer(
            args.log_filter,
            cfg_file_mtrmeter.log_filter,
            String::from(constants::DEFAULT_LOG_FILTER),
        );
        let log_span_events = cfg_layer(
            args.log_span_events,
            cfg_file_mtrmeter.log_span_events,
            constants::DEFAULT_LOG_SPAN_EVENTS,
        );
        validate_host(&host)?;
        validate_measurements(measurements)?;
        validate_max_retries(max_retries)?;
        validate_max_rounds(max_rounds)?;
        validate_program(&program)?;
        validate_timeout(timeout)?;
        validate_grace_duration(mode, grace_duration, timeout)?;
        let csv_delimiter = validate_csv_delimiter(csv_delimiter)?;
        Ok(Self {
            host,
            mode,
            measurements,
            max_retries,
            sleep_interval,
            max_rounds,
            program,
            timeout,
            grace_duration,
            report_format,
            report_output,
            report_group,
            csv_delimiter,
            verbose,
            log_format,
            log_filter,
            log_span_events,
        })
    }
}

impl Default for MtrmeterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            mode: constants::DEFAULT_MODE,
            measurements: defaults::DEFAULT_MEASUREMENTS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            sleep_interval: defaults::DEFAULT_SLEEP_INTERVAL,
            max_rounds: None,
            program: String::from(defaults::DEFAULT_PROBE_PROGRAM),
            timeout: defaults::DEFAULT_PROBE_TIMEOUT,
            grace_duration: defaults::DEFAULT_PROBE_GRACE_DURATION,
            report_format: constants::DEFAULT_REPORT_FORMAT,
            report_output: None,
            report_group: constants::DEFAULT_REPORT_GROUP,
            csv_delimiter: b';',
            verbose: false,
            log_format: constants::DEFAULT_LOG_FORMAT,
            log_filter: String::from(constants::DEFAULT_LOG_FILTER),
            log_span_events: constants::DEFAULT_LOG_SPAN_EVENTS,
        }
    }
}

fn cfg_layer<T>(fst: Option<T>, snd: Option<T>, def: T) -> T {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => val,
        (None, None) => def,
    }
}

fn cfg_layer_opt<T>(fst: Option<T>, snd: Option<T>) -> Option<T> {
    match (fst, snd) {
        (Some(val), _) | (None, Some(val)) => Some(val),
        (None, None) => None,
    }
}

/// Layer a flag which can only be used to turn a setting off on the command line.
const fn cfg_layer_bool_flag(fst: bool, snd: Option<bool>, default: bool) -> bool {
    match (fst, snd) {
        (false, _) => false,
        (true, Some(val)) => val,
        (true, None) => default,
    }
}

/// Validate `host`.
fn validate_host(host: &str) -> anyhow::Result<()> {
    if host.trim().is_empty() {
        Err(anyhow!("host must not be empty"))
    } else if host.starts_with('-') {
        Err(anyhow!("host ({host}) must not start with '-'"))
    } else {
        Ok(())
    }
}

/// Validate `measurements`.
fn validate_measurements(measurements: usize) -> anyhow::Result<()> {
    if measurements == 0 {
        Err(anyhow!(
            "measurements ({measurements}) must be greater than zero"
        ))
    } else {
        Ok(())
    }
}

/// Validate `max_retries`.
fn validate_max_retries(max_retries: usize) -> anyhow::Result<()> {
    if max_retries == 0 {
        Err(anyhow!(
            "max-retries ({max_retries}) must be greater than zero"
        ))
    } else {
        Ok(())
    }
}

/// Validate `max_rounds`.
fn validate_max_rounds(max_rounds: Option<usize>) -> anyhow::Result<()> {
    match max_rounds {
        Some(0) => Err(anyhow!("max-rounds (0) must be greater than zero")),
        _ => Ok(()),
    }
}

/// Validate `program`.
fn validate_program(program: &str) -> anyhow::Result<()> {
    if program.trim().is_empty() {
        Err(anyhow!("program must not be empty"))
    } else {
        Ok(())
    }
}

/// Validate `timeout`.
fn validate_timeout(timeout: Duration) -> anyhow::Result<()> {
    if timeout.is_zero() {
        Err(anyhow!(
            "timeout ({}) must be greater than zero",
            humantime::format_duration(timeout)
        ))
    } else {
        Ok(())
    }
}

/// Validate `grace_duration` against `timeout`.
///
/// The grace duration is only used in oneshot mode.
fn validate_grace_duration(
    mode: Mode,
    grace_duration: Duration,
    timeout: Duration,
) -> anyhow::Result<()> {
    if mode == Mode::Oneshot && grace_duration >= timeout {
        Err(anyhow!(
            "grace-duration ({}) must be less than timeout ({})",
            humantime::format_duration(grace_duration),
            humantime::format_duration(timeout)
        ))
    } else {
        Ok(())
    }
}

/// Validate `csv_delimiter` and convert it to a byte.
fn validate_csv_delimiter(csv_delimiter: char) -> anyhow::Result<u8> {
    u8::try_from(csv_delimiter)
        .ok()
        .filter(|delimiter| delimiter.is_ascii() && !delimiter.is_ascii_alphanumeric())
        .filter(|&delimiter| delimiter != b'"' && delimiter != b'\n' && delimiter != b'\r')
        .ok_or_else(|| {
            anyhow!("csv-delimiter ({csv_delimiter:?}) must be an ascii punctuation or whitespace character")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::remove_whitespace;
    use test_case::test_case;

    #[test]
    fn test_config_default() {
        let args = parse("mtrmeter example.com").unwrap();
        let cfg_file = ConfigFile::default();
        let config = MtrmeterConfig::build_config(args, cfg_file).unwrap();
        let expected = MtrmeterConfig {
            host: String::from("example.com"),
            ..MtrmeterConfig::default()
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_config_sample() {
        let args = parse("mtrmeter example.com").unwrap();
        let cfg_file: ConfigFile =
            toml::from_str(include_str!("../mtrmeter-config-sample.toml")).unwrap();
        let config = MtrmeterConfig::build_config(args, cfg_file).unwrap();
        let expected = MtrmeterConfig {
            host: String::from("example.com"),
            ..MtrmeterConfig::default()
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_config_layering() {
        let cfg_file: ConfigFile = toml::from_str(
            r#"
            [mtrmeter]
            max-retries = 5
            sleep-interval = "30s"

            [probe]
            measurements = 20

            [report]
            format = "json"
            group = false
            "#,
        )
        .unwrap();
        let args = parse("mtrmeter example.com -c 3 --format pretty").unwrap();
        let config = MtrmeterConfig::build_config(args, cfg_file).unwrap();
        let expected = cfg()
            .max_retries(5)
            .sleep_interval(Duration::from_secs(30))
            .measurements(3)
            .report_format(ReportFormat::Pretty)
            .report_group(false)
            .build();
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test_case("mtrmeter --version", Err(anyhow!(format!("mtrmeter {}", clap::crate_version!()))); "show version")]
    #[test_case("mtrmeter -V", Err(anyhow!(format!("mtrmeter {}", clap::crate_version!()))); "show version short")]
    fn test_version(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().mode(Mode::Accumulate).build()); "default mode")]
    #[test_case("mtrmeter example.com --mode accumulate", Ok(cfg().mode(Mode::Accumulate).build()); "accumulate mode")]
    #[test_case("mtrmeter example.com --mode oneshot", Ok(cfg().mode(Mode::Oneshot).build()); "oneshot mode")]
    #[test_case("mtrmeter example.com -m oneshot", Ok(cfg().mode(Mode::Oneshot).build()); "oneshot mode short")]
    #[test_case("mtrmeter example.com --mode foo", Err(anyhow!("error: invalid value 'foo' for '--mode <MODE>' [possible values: accumulate, oneshot] For more information, try '--help'.")); "invalid mode")]
    fn test_mode(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com --dummy", Err(anyhow!("error: unexpected argument '--dummy' found")); "invalid argument")]
    fn test_unexpected(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare_lines(parse_config(cmd), expected, Some(0));
    }

    #[test_case("mtrmeter example.com", Ok(cfg().measurements(10).build()); "default measurements")]
    #[test_case("mtrmeter example.com --measurements 5", Ok(cfg().measurements(5).build()); "custom measurements")]
    #[test_case("mtrmeter example.com -c 5", Ok(cfg().measurements(5).build()); "custom measurements short")]
    #[test_case("mtrmeter example.com -c 0", Err(anyhow!("measurements (0) must be greater than zero")); "zero measurements")]
    #[test_case("mtrmeter example.com -c foo", Err(anyhow!("error: invalid value 'foo' for '--measurements <MEASUREMENTS>': invalid digit found in string For more information, try '--help'.")); "invalid measurements")]
    fn test_measurements(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().max_retries(3).build()); "default max retries")]
    #[test_case("mtrmeter example.com --max-retries 7", Ok(cfg().max_retries(7).build()); "custom max retries")]
    #[test_case("mtrmeter example.com -r 7", Ok(cfg().max_retries(7).build()); "custom max retries short")]
    #[test_case("mtrmeter example.com -r 0", Err(anyhow!("max-retries (0) must be greater than zero")); "zero max retries")]
    fn test_max_retries(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().sleep_interval(Duration::from_secs(60)).build()); "default sleep interval")]
    #[test_case("mtrmeter example.com --sleep-interval 5m", Ok(cfg().sleep_interval(Duration::from_secs(300)).build()); "custom sleep interval")]
    #[test_case("mtrmeter example.com -i 500ms", Ok(cfg().sleep_interval(Duration::from_millis(500)).build()); "custom sleep interval short")]
    #[test_case("mtrmeter example.com -i 0s", Ok(cfg().sleep_interval(Duration::ZERO).build()); "zero sleep interval")]
    #[test_case("mtrmeter example.com -i foo", Err(anyhow!("error: invalid value 'foo' for '--sleep-interval <SLEEP_INTERVAL>': expected number at 0 For more information, try '--help'.")); "invalid sleep interval")]
    fn test_sleep_interval(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().max_rounds(None).build()); "default max rounds")]
    #[test_case("mtrmeter example.com --max-rounds 3", Ok(cfg().max_rounds(Some(3)).build()); "custom max rounds")]
    #[test_case("mtrmeter example.com -n 3", Ok(cfg().max_rounds(Some(3)).build()); "custom max rounds short")]
    #[test_case("mtrmeter example.com -n 0", Err(anyhow!("max-rounds (0) must be greater than zero")); "zero max rounds")]
    fn test_max_rounds(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().program(String::from("mtr")).build()); "default program")]
    #[test_case("mtrmeter example.com --program /usr/sbin/mtr", Ok(cfg().program(String::from("/usr/sbin/mtr")).build()); "custom program")]
    fn test_program(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().timeout(Duration::from_secs(360)).build()); "default timeout")]
    #[test_case("mtrmeter example.com --timeout 2m", Ok(cfg().timeout(Duration::from_secs(120)).build()); "custom timeout")]
    #[test_case("mtrmeter example.com -T 2m", Ok(cfg().timeout(Duration::from_secs(120)).build()); "custom timeout short")]
    #[test_case("mtrmeter example.com -T 0s", Err(anyhow!("timeout (0s) must be greater than zero")); "zero timeout")]
    fn test_timeout(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com -m oneshot", Ok(cfg().mode(Mode::Oneshot).grace_duration(Duration::from_secs(2)).build()); "default grace duration")]
    #[test_case("mtrmeter example.com -m oneshot -g 100ms", Ok(cfg().mode(Mode::Oneshot).grace_duration(Duration::from_millis(100)).build()); "custom grace duration")]
    #[test_case("mtrmeter example.com -m oneshot -g 10s -T 10s", Err(anyhow!("grace-duration (10s) must be less than timeout (10s)")); "grace duration equal to timeout")]
    #[test_case("mtrmeter example.com -g 10s -T 10s", Ok(cfg().grace_duration(Duration::from_secs(10)).timeout(Duration::from_secs(10)).build()); "grace duration ignored in accumulate mode")]
    fn test_grace_duration(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().report_format(ReportFormat::Csv).build()); "default format")]
    #[test_case("mtrmeter example.com --format json", Ok(cfg().report_format(ReportFormat::Json).build()); "json format")]
    #[test_case("mtrmeter example.com -f pretty", Ok(cfg().report_format(ReportFormat::Pretty).build()); "pretty format")]
    #[test_case("mtrmeter example.com -f markdown", Ok(cfg().report_format(ReportFormat::Markdown).build()); "markdown format")]
    #[test_case("mtrmeter example.com -f xml", Err(anyhow!("error: invalid value 'xml' for '--format <FORMAT>' [possible values: csv, json, pretty, markdown] For more information, try '--help'.")); "invalid format")]
    fn test_report_format(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().report_output(None).report_group(true).build()); "default output")]
    #[test_case("mtrmeter example.com -o mtr.csv", Ok(cfg().report_output(Some(String::from("mtr.csv"))).build()); "custom output")]
    #[test_case("mtrmeter example.com --no-group", Ok(cfg().report_group(false).build()); "no group")]
    fn test_report_output(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().csv_delimiter(b';').build()); "default csv delimiter")]
    #[test_case("mtrmeter example.com --csv-delimiter ,", Ok(cfg().csv_delimiter(b',').build()); "comma csv delimiter")]
    #[test_case("mtrmeter example.com --csv-delimiter |", Ok(cfg().csv_delimiter(b'|').build()); "pipe csv delimiter")]
    #[test_case("mtrmeter example.com --csv-delimiter x", Err(anyhow!("csv-delimiter ('x') must be an ascii punctuation or whitespace character")); "alphanumeric csv delimiter")]
    #[test_case("mtrmeter example.com --csv-delimiter é", Err(anyhow!("csv-delimiter ('é') must be an ascii punctuation or whitespace character")); "non ascii csv delimiter")]
    fn test_csv_delimiter(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().verbose(false).build()); "default verbose")]
    #[test_case("mtrmeter example.com --verbose", Ok(cfg().verbose(true).build()); "enable verbose")]
    #[test_case("mtrmeter example.com -v", Ok(cfg().verbose(true).build()); "enable verbose short")]
    fn test_verbose(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().log_filter(String::from("mtrmeter=debug")).build()); "default log filter")]
    #[test_case("mtrmeter example.com --log-filter info,mtrmeter=trace", Ok(cfg().log_filter(String::from("info,mtrmeter=trace")).build()); "custom log filter")]
    fn test_log_filter(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().log_format(LogFormat::Pretty).build()); "default log format")]
    #[test_case("mtrmeter example.com --log-format compact", Ok(cfg().log_format(LogFormat::Compact).build()); "compact log format")]
    #[test_case("mtrmeter example.com --log-format json", Ok(cfg().log_format(LogFormat::Json).build()); "json log format")]
    #[test_case("mtrmeter example.com --log-format chrome", Ok(cfg().log_format(LogFormat::Chrome).build()); "chrome log format")]
    #[test_case("mtrmeter example.com --log-format foo", Err(anyhow!("error: invalid value 'foo' for '--log-format <LOG_FORMAT>' [possible values: compact, pretty, json, chrome] For more information, try '--help'.")); "invalid log format")]
    fn test_log_format(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter example.com", Ok(cfg().log_span_events(LogSpanEvents::Off).build()); "default log span")]
    #[test_case("mtrmeter example.com --log-span-events active", Ok(cfg().log_span_events(LogSpanEvents::Active).build()); "active log span")]
    #[test_case("mtrmeter example.com --log-span-events full", Ok(cfg().log_span_events(LogSpanEvents::Full).build()); "full log span")]
    fn test_log_span(cmd: &str, expected: anyhow::Result<MtrmeterConfig>) {
        compare(parse_config(cmd), expected);
    }

    #[test_case("mtrmeter --print-config-template", Ok(MtrmeterAction::PrintConfigTemplate); "print config template")]
    #[test_case("mtrmeter --generate bash", Ok(MtrmeterAction::PrintShellCompletions(Shell::Bash)); "generate bash shell completions")]
    #[test_case("mtrmeter --generate zsh", Ok(MtrmeterAction::PrintShellCompletions(Shell::Zsh)); "generate zsh shell completions")]
    #[test_case("mtrmeter --generate fish", Ok(MtrmeterAction::PrintShellCompletions(Shell::Fish)); "generate fish shell completions")]
    #[test_case("mtrmeter --generate foo", Err(anyhow!("error: invalid value 'foo' for '--generate <GENERATE>' [possible values: bash, elvish, fish, powershell, zsh] For more information, try '--help'.")); "generate invalid shell completions")]
    #[test_case("mtrmeter --generate-man", Ok(MtrmeterAction::PrintManPage); "generate man page")]
    fn test_action(cmd: &str, expected: anyhow::Result<MtrmeterAction>) {
        compare(parse_action(cmd), expected);
    }

    fn parse_action(cmd: &str) -> anyhow::Result<MtrmeterAction> {
        MtrmeterAction::from(parse(cmd)?)
    }

    fn parse_config(cmd: &str) -> anyhow::Result<MtrmeterConfig> {
        let args = parse(cmd)?;
        MtrmeterConfig::build_config(args, ConfigFile::default())
    }

    fn parse(cmd: &str) -> anyhow::Result<Args> {
        use clap::Parser;
        Ok(Args::try_parse_from(
            cmd.split(' ').map(std::ffi::OsString::from),
        )?)
    }

    fn compare<T>(actual: anyhow::Result<T>, expected: anyhow::Result<T>)
    where
        T: PartialEq + Eq + std::fmt::Debug,
    {
        compare_lines(actual, expected, None);
    }

    fn compare_lines<T>(
        actual: anyhow::Result<T>,
        expected: anyhow::Result<T>,
        lines: Option<usize>,
    ) where
        T: PartialEq + Eq + std::fmt::Debug,
    {
        match (actual, expected) {
            (Ok(cfg), Ok(exp)) => {
                pretty_assertions::assert_eq!(cfg, exp);
            }
            (Err(err), Err(exp_err)) => {
                if let Some(lines) = lines {
                    let fst = err
                        .to_string()
                        .lines()
                        .nth(lines)
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let snd = exp_err
                        .to_string()
                        .lines()
                        .nth(lines)
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    if remove_whitespace(fst) != remove_whitespace(snd) {
                        pretty_assertions::assert_eq!(err.to_string(), exp_err.to_string());
                    }
                } else if remove_whitespace(err.to_string())
                    != remove_whitespace(exp_err.to_string())
                {
                    pretty_assertions::assert_eq!(err.to_string(), exp_err.to_string());
                }
            }
            (Ok(_), Err(exp_err)) => {
                panic!("expected err {}", exp_err.to_string().trim());
            }
            (Err(err), Ok(_)) => {
                panic!("unexpected err {}", err.to_string().trim());
            }
        }
    }

    fn cfg() -> MtrmeterConfigBuilder {
        MtrmeterConfigBuilder::new(String::from("example.com"))
    }

    pub struct MtrmeterConfigBuilder {
        config: MtrmeterConfig,
    }

    macro_rules! setter {
        ($name:ident, $ty:ty) => {
            pub fn $name(self, $name: $ty) -> Self {
                Self {
                    config: MtrmeterConfig {
                        $name,
                        ..self.config
                    },
                }
            }
        };
    }

    impl MtrmeterConfigBuilder {
        pub fn new(host: String) -> Self {
            Self {
                config: MtrmeterConfig {
                    host,
                    ..MtrmeterConfig::default()
                },
            }
        }

        setter!(mode, Mode);
        setter!(measurements, usize);
        setter!(max_retries, usize);
        setter!(sleep_interval, Duration);
        setter!(max_rounds, Option<usize>);
        setter!(program, String);
        setter!(timeout, Duration);
        setter!(grace_duration, Duration);
        setter!(report_format, ReportFormat);
        setter!(report_output, Option<String>);
        setter!(report_group, bool);
        setter!(csv_delimiter, u8);
        setter!(verbose, bool);
        setter!(log_format, LogFormat);
        setter!(log_filter, String);
        setter!(log_span_events, LogSpanEvents);

        pub fn build(self) -> MtrmeterConfig {
            self.config
        }
    }
}
