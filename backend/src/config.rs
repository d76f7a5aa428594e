// Environment-driven server configuration.
// Invariants: unset variables fall back to defaults; malformed ones are errors, never silently ignored.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use race_core::smoother::DEFAULT_ALPHA;
use race_core::TrackLayout;
use thiserror::Error;

use crate::constants::{
    DEFAULT_FPS, DEFAULT_HTTP_BIND, DEFAULT_HTTP_PORT, DEFAULT_IDLE_RESET_MS, DEFAULT_UDP_BIND,
    DEFAULT_UDP_PORT,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },

    #[error("{name} out of range: {reason}")]
    OutOfRange {
        name: &'static str,
        reason: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub http_addr: SocketAddr,
    pub udp_addr: SocketAddr,
    pub source_ip: Option<IpAddr>,
    pub fps: u32,
    pub alpha: f64,
    pub idle_reset_ms: u64,
    pub layout: TrackLayout,
}

impl Default for Config {
    fn default() -> Self {
        let http_bind = IpAddr::from_str(DEFAULT_HTTP_BIND).unwrap_or(IpAddr::from([127, 0, 0, 1]));
        let udp_bind = IpAddr::from_str(DEFAULT_UDP_BIND).unwrap_or(IpAddr::from([0, 0, 0, 0]));
        Self {
            http_addr: SocketAddr::new(http_bind, DEFAULT_HTTP_PORT),
            udp_addr: SocketAddr::new(udp_bind, DEFAULT_UDP_PORT),
            source_ip: None,
            fps: DEFAULT_FPS,
            alpha: DEFAULT_ALPHA,
            idle_reset_ms: DEFAULT_IDLE_RESET_MS,
            layout: TrackLayout::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let http_bind = parse_or(&lookup, "HTTP_BIND", defaults.http_addr.ip())?;
        let http_port = parse_or(&lookup, "HTTP_PORT", defaults.http_addr.port())?;
        let udp_bind = parse_or(&lookup, "CLASSIFICA_UDP_BIND", defaults.udp_addr.ip())?;
        let udp_port = parse_or(&lookup, "CLASSIFICA_UDP_PORT", defaults.udp_addr.port())?;
        let source_ip = parse_opt(&lookup, "CLASSIFICA_SOURCE_IP")?;
        let fps: u32 = parse_or(&lookup, "CLASSIFICA_FPS", defaults.fps)?;
        let alpha: f64 = parse_or(&lookup, "CLASSIFICA_ALPHA", defaults.alpha)?;
        let idle_reset_ms = parse_or(&lookup, "CLASSIFICA_IDLE_RESET_MS", defaults.idle_reset_ms)?;

        let mut layout = defaults.layout;
        layout.margin_distance_m =
            parse_or(&lookup, "CLASSIFICA_MARGIN_M", layout.margin_distance_m)?;
        layout.lateral_min_m = parse_or(&lookup, "CLASSIFICA_LATERAL_MIN_M", layout.lateral_min_m)?;
        layout.lateral_max_m = parse_or(&lookup, "CLASSIFICA_LATERAL_MAX_M", layout.lateral_max_m)?;

        if fps == 0 || fps > 1_000 {
            return Err(ConfigError::OutOfRange {
                name: "CLASSIFICA_FPS",
                reason: "must be between 1 and 1000",
            });
        }
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "CLASSIFICA_ALPHA",
                reason: "must be in (0, 1]",
            });
        }
        if !(layout.margin_distance_m.is_finite() && layout.margin_distance_m >= 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "CLASSIFICA_MARGIN_M",
                reason: "must be a non-negative number",
            });
        }
        if !(layout.lateral_min_m.is_finite() && layout.lateral_max_m.is_finite())
            || layout.lateral_min_m > layout.lateral_max_m
        {
            return Err(ConfigError::OutOfRange {
                name: "CLASSIFICA_LATERAL_MIN_M",
                reason: "must not exceed CLASSIFICA_LATERAL_MAX_M",
            });
        }

        Ok(Self {
            http_addr: SocketAddr::new(http_bind, http_port),
            udp_addr: SocketAddr::new(udp_bind, udp_port),
            source_ip,
            fps,
            alpha,
            idle_reset_ms,
            layout,
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(1_000 / self.fps.max(1)).max(1))
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}

fn parse_opt<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid { name, value })
}
