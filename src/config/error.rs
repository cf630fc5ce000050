use std::io;

/// Failures while locating, reading or writing the thinkchat TOML file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access thinkchat config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid thinkchat config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot encode thinkchat config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("no home directory to place thinkchat config and data under")]
    MissingHome,
}
