use std::{net::IpAddr, str::FromStr};

use tracing::warn;

pub const DEFAULT_STANDARD_VIDEO: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerJoyrides.mp4";
pub const DEFAULT_HD_VIDEO: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerBlazes.mp4";
pub const DEFAULT_THUMBNAIL: &str =
    "https://storage.googleapis.com/gtv-videos-bucket/sample/images/ForBiggerJoyrides.jpg";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

/// The fixed media returned in place of a real render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderAssets {
    pub standard_video: String,
    pub hd_video: String,
    pub thumbnail: String,
}

impl Default for PlaceholderAssets {
    fn default() -> Self {
        Self {
            standard_video: DEFAULT_STANDARD_VIDEO.to_string(),
            hd_video: DEFAULT_HD_VIDEO.to_string(),
            thumbnail: DEFAULT_THUMBNAIL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub assets: PlaceholderAssets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            assets: PlaceholderAssets::default(),
        }
    }
}

impl Config {
    /// Reads `HOST`, `PORT`, `MAX_UPLOAD_BYTES` and the `PLACEHOLDER_*` overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let assets = PlaceholderAssets {
            standard_video: lookup("PLACEHOLDER_VIDEO_STANDARD").unwrap_or(defaults.assets.standard_video),
            hd_video: lookup("PLACEHOLDER_VIDEO_HD").unwrap_or(defaults.assets.hd_video),
            thumbnail: lookup("PLACEHOLDER_THUMBNAIL").unwrap_or(defaults.assets.thumbnail),
        };
        Self {
            host: parse_or(&lookup, "HOST", defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            assets,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, fallback = %default, "ignoring unparseable config value");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.assets, PlaceholderAssets::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("HOST", "127.0.0.1"),
            ("PLACEHOLDER_VIDEO_HD", "https://cdn.test/hd.mp4"),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(config.assets.hd_video, "https://cdn.test/hd.mp4");
        assert_eq!(config.assets.standard_video, DEFAULT_STANDARD_VIDEO);
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("MAX_UPLOAD_BYTES", "-1")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }
}
