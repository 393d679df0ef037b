use crate::config::{LogFormat, LogSpanEvents, Mode, ReportFormat};
use anyhow::Context;
use encoding_rs_io::DecodeReaderBytes;
use etcetera::BaseStrategy;
use mtrmeter_core::defaults;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "mtrmeter.toml";
const DEFAULT_HIDDEN_CONFIG_FILE: &str = ".mtrmeter.toml";

/// Read the config from the default location of user config for the platform.
///
/// Returns the parsed `Some(ConfigFile)` if the config file exists, `None` otherwise.
///
/// mtrmeter will attempt to locate a `mtrmeter.toml` or `.mtrmeter.toml`
/// config file in one of the following locations:
///     - the current directory
///     - the user home directory
///     - the XDG config directory (Unix only): `$XDG_CONFIG_HOME` or `~/.config`
///     - the XDG app config directory (Unix only): `$XDG_CONFIG_HOME/mtrmeter` or `~/.config/mtrmeter`
///     - the Windows data directory (Windows only): `%APPDATA%`
///
/// Only the first config file found is used.
pub fn read_default_config_file() -> anyhow::Result<Option<ConfigFile>> {
    use etcetera::base_strategy as base;
    if let Some(file) = read_files("")? {
        return Ok(Some(file));
    }
    let basedirs = base::choose_base_strategy()?;
    let dirs = [
        basedirs.home_dir().to_path_buf(),
        basedirs.config_dir(),
        basedirs.config_dir().join("mtrmeter"),
    ];
    for dir in dirs {
        if let Some(file) = read_files(dir)? {
            return Ok(Some(file));
        }
    }
    Ok(None)
}

/// Read the config from the given path.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> anyhow::Result<ConfigFile> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("config file not found: {}", path.as_ref().display()))?;
    let mut decoder = DecodeReaderBytes::new(BufReader::new(file));
    let mut dest = String::new();
    decoder.read_to_string(&mut dest)?;
    toml::from_str(&dest)
        .with_context(|| format!("invalid config file: {}", path.as_ref().display()))
}

fn read_files<P: AsRef<Path>>(dir: P) -> anyhow::Result<Option<ConfigFile>> {
    if let Some(file) = read_file(dir.as_ref(), DEFAULT_CONFIG_FILE)? {
        Ok(Some(file))
    } else if let Some(file) = read_file(dir.as_ref(), DEFAULT_HIDDEN_CONFIG_FILE)? {
        Ok(Some(file))
    } else {
        Ok(None)
    }
}

fn read_file<P: AsRef<Path>>(dir: P, file: &str) -> anyhow::Result<Option<ConfigFile>> {
    let path = dir.as_ref().join(file);
    if path.exists() {
        Ok(Some(read_config_file(path)?))
    } else {
        Ok(None)
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub mtrmeter: Option<ConfigMtrmeter>,
    pub probe: Option<ConfigProbe>,
    pub report: Option<ConfigReport>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            mtrmeter: Some(ConfigMtrmeter::default()),
            probe: Some(ConfigProbe::default()),
            report: Some(ConfigReport::default()),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigMtrmeter {
    pub mode: Option<Mode>,
    pub max_retries: Option<usize>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub sleep_interval: Option<Duration>,
    pub max_rounds: Option<usize>,
    pub log_format: Option<LogFormat>,
    pub log_filter: Option<String>,
    pub log_span_events: Option<LogSpanEvents>,
}

impl Default for ConfigMtrmeter {
    fn default() -> Self {
        Self {
            mode: Some(super::constants::DEFAULT_MODE),
            max_retries: Some(defaults::DEFAULT_MAX_RETRIES),
            sleep_interval: Some(defaults::DEFAULT_SLEEP_INTERVAL),
            max_rounds: None,
            log_format: Some(super::constants::DEFAULT_LOG_FORMAT),
            log_filter: Some(String::from(super::constants::DEFAULT_LOG_FILTER)),
            log_span_events: Some(super::constants::DEFAULT_LOG_SPAN_EVENTS),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigProbe {
    pub program: Option<String>,
    pub measurements: Option<usize>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    #[serde(deserialize_with = "humantime_deser")]
    pub grace_duration: Option<Duration>,
}

impl Default for ConfigProbe {
    fn default() -> Self {
        Self {
            program: Some(String::from(defaults::DEFAULT_PROBE_PROGRAM)),
            measurements: Some(defaults::DEFAULT_MEASUREMENTS),
            timeout: Some(defaults::DEFAULT_PROBE_TIMEOUT),
            grace_duration: Some(defaults::DEFAULT_PROBE_GRACE_DURATION),
        }
    }
}

#[derive(Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigReport {
    pub format: Option<ReportFormat>,
    pub output: Option<String>,
    pub group: Option<bool>,
    pub csv_delimiter: Option<char>,
}

impl Default for ConfigReport {
    fn default() -> Self {
        Self {
            format: Some(super::constants::DEFAULT_REPORT_FORMAT),
            output: None,
            group: Some(super::constants::DEFAULT_REPORT_GROUP),
            csv_delimiter: Some(super::constants::DEFAULT_CSV_DELIMITER),
        }
    }
}

fn humantime_deser<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    humantime::parse_duration(&String::deserialize(deserializer)?)
        .map_err(serde::de::Error::custom)
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_config_sample() {
        let config: ConfigFile =
            toml::from_str(include_str!("../../mtrmeter-config-sample.toml")).unwrap();
        pretty_assertions::assert_eq!(ConfigFile::default(), config);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: ConfigFile = toml::from_str(
            r#"
            [probe]
            timeout = "90s"

            [report]
            format = "json"
            "#,
        )
        .unwrap();
        let expected = ConfigFile {
            mtrmeter: None,
            probe: Some(ConfigProbe {
                program: None,
                measurements: None,
                timeout: Some(Duration::from_secs(90)),
                grace_duration: None,
            }),
            report: Some(ConfigReport {
                format: Some(ReportFormat::Json),
                output: None,
                group: None,
                csv_delimiter: None,
            }),
        };
        pretty_assertions::assert_eq!(expected, config);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let res = toml::from_str::<ConfigFile>("[probe]\ncount = 5\n");
        assert!(res.is_err());
    }

    #[test]
    fn test_read_config_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[mtrmeter]\nmax-retries = 7")?;
        let config = read_config_file(file.path())?;
        assert_eq!(
            Some(7),
            config.mtrmeter.and_then(|mtrmeter| mtrmeter.max_retries)
        );
        Ok(())
    }

    #[test]
    fn test_read_missing_config_file() {
        let err = read_config_file("/no/such/mtrmeter.toml").unwrap_err();
        assert_eq!(
            "config file not found: /no/such/mtrmeter.toml",
            err.to_string()
        );
    }
}
