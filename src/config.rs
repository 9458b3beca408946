use crate::protocol::DEFAULT_PROFILE_ID;
use crate::types::DataFields;
use crate::window::WindowHandle;
use std::path::PathBuf;
use std::time::Duration;

/// How the CSV timestamp column is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Seconds since the Unix epoch, fractional.
    #[default]
    UnixSeconds,
    /// Whole milliseconds since the poll loop started.
    ElapsedMillis,
}

/// Session and logging settings.
///
/// Defaults suit the stock TrackIR install; every field can be overridden
/// through a `TRACKIR_*` environment variable, see [`Config::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Explicit library path, bypassing the registry lookup.
    pub dll_path: Option<PathBuf>,
    pub profile_id: u16,
    pub data_fields: DataFields,
    /// Polling rate. The camera runs at ~120 Hz, so the default oversamples.
    pub poll_rate_hz: f64,
    /// Window to register instead of the console window.
    pub hwnd: Option<WindowHandle>,
    pub timestamp: TimestampMode,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dll_path: None,
            profile_id: DEFAULT_PROFILE_ID,
            data_fields: DataFields::SIX_DOF,
            poll_rate_hz: 240.0,
            hwnd: None,
            timestamp: TimestampMode::UnixSeconds,
        }
    }
}

impl Config {
    /// Read overrides from the process environment:
    ///
    /// | variable              | meaning                                  |
    /// |-----------------------|------------------------------------------|
    /// | `TRACKIR_DLL_PATH`    | library path                             |
    /// | `TRACKIR_PROFILE_ID`  | program profile id                       |
    /// | `TRACKIR_DATA_FIELDS` | `NP_RequestData` bitmask (dec or `0x`)   |
    /// | `TRACKIR_POLL_HZ`     | polling rate                             |
    /// | `TRACKIR_HWND`        | window handle (dec or `0x`)              |
    /// | `TRACKIR_TIMESTAMP`   | `unix` or `elapsed`                      |
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Config {
        Config::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dll_path = read("TRACKIR_DLL_PATH").map(PathBuf::from);

        let profile_id = read("TRACKIR_PROFILE_ID")
            .and_then(|v| parsed_or_warn("TRACKIR_PROFILE_ID", &v, v.parse::<u16>().ok()))
            .unwrap_or(defaults.profile_id);

        let data_fields = read("TRACKIR_DATA_FIELDS")
            .and_then(|v| parsed_or_warn("TRACKIR_DATA_FIELDS", &v, parse_u16(&v)))
            .map(DataFields::from_bits_retain)
            .unwrap_or(defaults.data_fields);

        let poll_rate_hz = read("TRACKIR_POLL_HZ")
            .and_then(|v| {
                let hz = v
                    .parse::<f64>()
                    .ok()
                    .filter(|hz| interval_for(*hz).is_some());
                parsed_or_warn("TRACKIR_POLL_HZ", &v, hz)
            })
            .unwrap_or(defaults.poll_rate_hz);

        let hwnd = read("TRACKIR_HWND").and_then(|v| {
            parsed_or_warn("TRACKIR_HWND", &v, WindowHandle::parse(&v).ok())
        });

        let timestamp = read("TRACKIR_TIMESTAMP")
            .and_then(|v| {
                let mode = match v.to_ascii_lowercase().as_str() {
                    "unix" | "epoch" => Some(TimestampMode::UnixSeconds),
                    "elapsed" | "ms" => Some(TimestampMode::ElapsedMillis),
                    _ => None,
                };
                parsed_or_warn("TRACKIR_TIMESTAMP", &v, mode)
            })
            .unwrap_or(defaults.timestamp);

        Config {
            dll_path,
            profile_id,
            data_fields,
            poll_rate_hz,
            hwnd,
            timestamp,
        }
    }

    /// Time between polls.
    ///
    /// A rate whose period is not representable as a `Duration` (zero,
    /// negative, or so small the period overflows) falls back to the default.
    pub fn poll_interval(&self) -> Duration {
        interval_for(self.poll_rate_hz).unwrap_or_else(|| {
            log::warn!(
                "Poll rate {} Hz has no usable interval, using default",
                self.poll_rate_hz
            );
            let fallback = Config::default().poll_rate_hz;
            Duration::from_secs_f64(1.0 / fallback)
        })
    }
}

fn interval_for(hz: f64) -> Option<Duration> {
    if !(hz.is_finite() && hz > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / hz).ok()
}

fn parse_u16(v: &str) -> Option<u16> {
    match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => v.parse().ok(),
    }
}

fn parsed_or_warn<T>(name: &str, raw: &str, parsed: Option<T>) -> Option<T> {
    if parsed.is_none() {
        log::warn!("Ignoring invalid {}='{}'", name, raw);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), Config::default());
        assert_eq!(Config::default().profile_id, 3750);
        assert_eq!(Config::default().data_fields.bits(), 119);
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("TRACKIR_DLL_PATH", "C:\\NP\\NPClient64.dll"),
            ("TRACKIR_PROFILE_ID", "13302"),
            ("TRACKIR_DATA_FIELDS", "0xFFFF"),
            ("TRACKIR_POLL_HZ", "100"),
            ("TRACKIR_HWND", "0x30a4c"),
            ("TRACKIR_TIMESTAMP", "Elapsed"),
        ]);
        assert_eq!(config.dll_path, Some(PathBuf::from("C:\\NP\\NPClient64.dll")));
        assert_eq!(config.profile_id, 13302);
        assert_eq!(config.data_fields.bits(), 0xFFFF);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.hwnd.map(WindowHandle::as_raw), Some(0x30a4c));
        assert_eq!(config.timestamp, TimestampMode::ElapsedMillis);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("TRACKIR_PROFILE_ID", "70000"),
            ("TRACKIR_POLL_HZ", "-5"),
            ("TRACKIR_HWND", "nope"),
            ("TRACKIR_TIMESTAMP", "later"),
            ("TRACKIR_DLL_PATH", "   "),
        ]);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn tiny_poll_rate_is_rejected() {
        for rate in ["1e-20", "1e-320"] {
            let config = config_from(&[("TRACKIR_POLL_HZ", rate)]);
            assert_eq!(config.poll_rate_hz, Config::default().poll_rate_hz);
            assert_eq!(config.poll_interval(), Config::default().poll_interval());
        }
    }

    #[test]
    fn unusable_rate_set_directly_falls_back() {
        for rate in [1e-20, 0.0, f64::NAN, f64::INFINITY] {
            let config = Config {
                poll_rate_hz: rate,
                ..Config::default()
            };
            assert_eq!(config.poll_interval(), Config::default().poll_interval());
        }
    }
}
