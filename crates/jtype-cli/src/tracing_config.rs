//! Diagnostic logging for the `jtype` binary.
//!
//! Nothing is installed unless `JTYPE_LOG` or `RUST_LOG` holds a filter, so
//! stdout only ever carries query answers. `JTYPE_LOG_FORMAT` picks the
//! stderr layout: `text`, `tree` (span nesting per query) or `json`.
//!
//! ```bash
//! JTYPE_LOG=jtype_solver=debug JTYPE_LOG_FORMAT=tree jtype run universe.json
//! JTYPE_LOG="jtype::query_json=trace" JTYPE_LOG_FORMAT=json jtype run universe.json
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("tree") {
            Self::Tree
        } else if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// What the environment asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directives; `None` disables logging.
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl LogSettings {
    /// Read settings through `var`; `JTYPE_LOG` wins over `RUST_LOG`.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            directives: var("JTYPE_LOG").or_else(|| var("RUST_LOG")),
            format: var("JTYPE_LOG_FORMAT").map_or_else(LogFormat::default, |value| {
                LogFormat::parse(&value)
            }),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Install the global subscriber. Invalid directives are skipped.
    pub fn install(&self) {
        let Some(directives) = &self.directives else {
            return;
        };
        let filter = EnvFilter::builder().parse_lossy(directives);
        match self.format {
            LogFormat::Tree => Registry::default()
                .with(filter)
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_indent_lines(true)
                        .with_targets(true),
                )
                .init(),
            LogFormat::Json => Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init(),
            LogFormat::Text => Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init(),
        }
    }
}

pub fn init_tracing() {
    LogSettings::from_env().install();
}

#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tests;
