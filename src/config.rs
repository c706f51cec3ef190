//! Environment-variable overrides (spec §6), isolated behind a single
//! `ConfigSource` abstraction per spec §9 Design Notes ("Environment-
//! variable side channels: isolate behind a single ConfigSource
//! abstraction so tests can inject values").
//!
//! Names are upper-cased and whitespace-stripped before lookup, exactly as
//! spec §6 specifies.

use std::collections::HashMap;

pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;

    fn lookup_key(&self, gamename: &str, suffix: &str) -> Option<String> {
        let key: String = format!("{gamename}_{suffix}")
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_uppercase())
            .collect();
        self.get(&key)
    }

    /// `<GAMENAME>_DEFAULT`: a parameter string decoded on top of defaults.
    fn default_params(&self, gamename: &str) -> Option<String> {
        self.lookup_key(gamename, "DEFAULT")
    }

    /// `<GAMENAME>_TILESIZE`: integer tile size.
    fn tile_size(&self, gamename: &str) -> Option<i32> {
        self.lookup_key(gamename, "TILESIZE").and_then(|v| v.parse().ok())
    }

    /// `<GAMENAME>_COLOUR_<i>`: six hex digits replacing colour `i`.
    fn colour_override(&self, gamename: &str, index: usize) -> Option<String> {
        self.lookup_key(gamename, &format!("COLOUR_{index}"))
    }

    /// `<GAMENAME>_PRESETS`: colon-separated `<name>:<paramstr>` pairs
    /// appended to the preset menu.
    fn extra_presets(&self, gamename: &str) -> Vec<(String, String)> {
        let Some(raw) = self.lookup_key(gamename, "PRESETS") else { return Vec::new() };
        raw.split(':')
            .filter(|chunk| !chunk.is_empty())
            .filter_map(|chunk| chunk.split_once('=').or_else(|| chunk.split_once(' ')))
            .map(|(name, params)| (name.to_string(), params.to_string()))
            .collect()
    }
}

/// Reads real process environment variables.
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory double so tests can inject values without touching the
/// real process environment.
#[derive(Default)]
pub struct MapConfigSource(pub HashMap<String, String>);

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_key_uppercases_and_strips_whitespace() {
        let cfg = MapConfigSource::new().with("SLIDE_TILESIZE", "48");
        assert_eq!(cfg.tile_size("slide"), Some(48));
        assert_eq!(cfg.tile_size("  Slide "), Some(48));
    }

    #[test]
    fn extra_presets_parse_colon_separated_pairs() {
        let cfg = MapConfigSource::new().with("SLIDE_PRESETS", "Tiny=4x4m5:Huge=20x20m400");
        let presets = cfg.extra_presets("slide");
        assert_eq!(presets, vec![("Tiny".to_string(), "4x4m5".to_string()), ("Huge".to_string(), "20x20m400".to_string())]);
    }

    #[test]
    fn missing_key_returns_none() {
        let cfg = MapConfigSource::new();
        assert_eq!(cfg.tile_size("slide"), None);
    }
}
