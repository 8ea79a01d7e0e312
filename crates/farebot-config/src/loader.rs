// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./farebot.toml` > `~/.config/farebot/farebot.toml`
//! > `/etc/farebot/farebot.toml` with environment variable overrides via the
//! `FAREBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::FarebotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/farebot/farebot.toml` (system-wide)
/// 3. `~/.config/farebot/farebot.toml` (user XDG config)
/// 4. `./farebot.toml` (local directory)
/// 5. `FAREBOT_*` environment variables
pub fn load_config() -> Result<FarebotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FarebotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FarebotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FarebotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FarebotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FarebotConfig::default()))
        .merge(Toml::file("/etc/farebot/farebot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("farebot/farebot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("farebot.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FAREBOT_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    const SECTIONS: [&str; 5] = ["bot", "telegram", "storage", "gateway", "broadcast"];

    Env::prefixed("FAREBOT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: FAREBOT_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        for section in SECTIONS {
            // Only split on the leading section name, so that keys like
            // `telegram_bot_token` keep their inner underscores.
            if let Some(rest) = key_str.strip_prefix(section)
                && let Some(rest) = rest.strip_prefix('_')
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}
