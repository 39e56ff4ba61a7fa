use crate::convert::{InlineIdNaming, NamingStrategy, PlainNaming};
use serde::{Deserialize, Serialize};

/// Member key naming used when converting from and to JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategyKind {
    /// See [`PlainNaming`].
    #[default]
    Plain,
    /// See [`InlineIdNaming`].
    InlineIds,
}

impl NamingStrategyKind {
    pub fn strategy(self) -> &'static dyn NamingStrategy {
        match self {
            NamingStrategyKind::Plain => &PlainNaming,
            NamingStrategyKind::InlineIds => &InlineIdNaming,
        }
    }
}

/// Document-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub naming: NamingStrategyKind,
    /// Keep a cache index while applying transformations to the whole
    /// document.
    pub caching: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            naming: NamingStrategyKind::Plain,
            caching: true,
        }
    }
}
