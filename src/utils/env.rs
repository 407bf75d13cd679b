//! Environment Configuration

use crate::parser::BotConfig;
use crate::utils::log::{log, LogLevel};

/// This function is used to apply environment overrides to the bot config
pub fn config_env(bot_config: &mut BotConfig) {
    config_env_with(bot_config, |key| std::env::var(key).ok());
}

fn config_env_with<F>(bot_config: &mut BotConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let overrides = [
        ("BUILDBOT_PYTHON", &mut bot_config.python),
        ("BUILDBOT_WAF", &mut bot_config.waf),
        ("BUILDBOT_CC", &mut bot_config.compiler),
    ];
    for (key, field) in overrides {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            log(LogLevel::Debug, &format!("{} overrides '{}' with '{}'", key, field, value));
            *field = value;
        }
    }
}
