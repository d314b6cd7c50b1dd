//! Command-line argument parsing
//!
//! The server takes no subcommands; flags only select where configuration
//! comes from or ask for a sample file.

use clap::Parser;

/// Linkpress - URL shortener service
#[derive(Parser, Debug, Default)]
#[command(name = "linkpress")]
#[command(version)]
#[command(about = "A URL shortener service", long_about = None)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', default_value = "config.toml")]
    pub config: String,

    /// Write a sample configuration to the given path and exit
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<String>,
}

impl Args {
    pub fn parse_from_env() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let args = Args::parse_from(["linkpress"]);
        assert_eq!(args.config, "config.toml");
        assert!(args.generate_config.is_none());
    }

    #[test]
    fn test_short_config_flag() {
        let args = Args::parse_from(["linkpress", "-c", "custom.toml"]);
        assert_eq!(args.config, "custom.toml");
    }

    #[test]
    fn test_long_equals_config_flag() {
        let args = Args::parse_from(["linkpress", "--config=/etc/linkpress.toml"]);
        assert_eq!(args.config, "/etc/linkpress.toml");
    }

    #[test]
    fn test_generate_config_flag() {
        let args = Args::parse_from(["linkpress", "--generate-config", "sample.toml"]);
        assert_eq!(args.generate_config.as_deref(), Some("sample.toml"));
    }
}
