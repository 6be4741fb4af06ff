use std::{fmt::Display, ops::Deref, path::PathBuf};

/// A configuration value together with the source it was resolved from
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParsedProperty<T> {
    /// From a command line flag (parsed_value, flag_value)
    Cli(T, String),
    /// From an environment variable (parsed_value, env_var_value)
    Env(T, String),
    /// From the configuration file (parsed_value, file_path, toml_value_string)
    File(T, PathBuf, String),
    /// Built-in default
    Default(T),
}

impl<T> ParsedProperty<T> {
    /// Get the parsed value
    pub fn value(&self) -> &T {
        match self {
            ParsedProperty::Cli(value, _)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::File(value, _, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    /// Consume the property, keeping only the value
    pub fn into_value(self) -> T {
        match self {
            ParsedProperty::Cli(value, _)
            | ParsedProperty::Env(value, _)
            | ParsedProperty::File(value, _, _)
            | ParsedProperty::Default(value) => value,
        }
    }

    /// Get the source name as a string
    pub fn source_name(&self) -> &'static str {
        match self {
            ParsedProperty::Cli(_, _) => "cli",
            ParsedProperty::Env(_, _) => "env",
            ParsedProperty::File(_, _, _) => "file",
            ParsedProperty::Default(_) => "default",
        }
    }

    /// Get the original string value if available
    pub fn original(&self) -> Option<&str> {
        match self {
            ParsedProperty::Cli(_, original)
            | ParsedProperty::Env(_, original)
            | ParsedProperty::File(_, _, original) => Some(original),
            ParsedProperty::Default(_) => None,
        }
    }
}

impl<T> Deref for ParsedProperty<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.value()
    }
}

impl<T: Display> Display for ParsedProperty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value().fmt(f)
    }
}

impl<T> From<T> for ParsedProperty<T> {
    fn from(value: T) -> Self {
        ParsedProperty::Default(value)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    /// # ParsedProperty Source Tracking
    ///
    /// Tests value access and provenance for each source variant.
    ///
    /// ## Test Scenario
    /// - Creates chunk size properties from every source
    ///
    /// ## Expected Outcome
    /// - value() and Deref agree, source names and originals are preserved
    #[test]
    fn test_parsed_property_sources() {
        let cli = ParsedProperty::Cli(4096usize, "4096".to_string());
        let env = ParsedProperty::Env(2048usize, "2048".to_string());
        let file = ParsedProperty::File(
            512usize,
            PathBuf::from("config.toml"),
            "512".to_string(),
        );
        let default: ParsedProperty<usize> = 1024.into();

        assert_eq!(*cli.value(), 4096);
        assert_eq!(*env + 1, 2049);
        assert_eq!(file.to_string(), "512");
        assert_eq!(default.into_value(), 1024);

        assert_eq!(cli.source_name(), "cli");
        assert_eq!(env.source_name(), "env");
        assert_eq!(file.source_name(), "file");
        assert_eq!(ParsedProperty::Default(1usize).source_name(), "default");

        assert_eq!(cli.original(), Some("4096"));
        assert_eq!(file.original(), Some("512"));
        assert_eq!(ParsedProperty::Default(1usize).original(), None);
    }
}
