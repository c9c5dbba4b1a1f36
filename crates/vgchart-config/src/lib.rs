//! Configuration management for vgchart

pub mod defaults;
pub mod loader;
pub mod settings;
pub mod validation;

pub use defaults::default_pages;
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
pub use settings::{
    BucketOrder, ChartKind, Config, DanglingLink, DataConfig, GroupBy, HoverMode, LayoutConfig,
    LoggingConfig, MarginConfig, OutputConfig, PageConfig, StyleConfig, YearRange,
};
