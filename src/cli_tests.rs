//! Tests for CLI argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::{Cli, Command};

mod parsing {
    use super::*;

    #[test]
    fn show_uses_default_directory() {
        let cli = Cli::parse_from_iter(["strata", "show"]);

        assert_eq!(cli.command, Command::Show);
        assert_eq!(cli.config_dir, PathBuf::from("config"));
        assert!(!cli.verbose);
    }

    #[test]
    fn set_takes_key_and_value() {
        let cli = Cli::parse_from_iter(["strata", "set", "app.name", "renamed"]);

        assert_eq!(
            cli.command,
            Command::Set {
                key: "app.name".to_string(),
                value: "renamed".to_string(),
            }
        );
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from_iter([
            "strata",
            "get",
            "app.name",
            "--config-dir",
            "/etc/app",
            "--env-prefix",
            "strata",
            "-v",
        ]);

        assert_eq!(cli.config_dir, PathBuf::from("/etc/app"));
        assert_eq!(cli.env_prefix.as_deref(), Some("strata"));
        assert!(cli.verbose);
    }

    #[test]
    fn init_output_defaults_to_config() {
        let cli = Cli::parse_from_iter(["strata", "init"]);

        assert!(cli.is_init());
        assert_eq!(
            cli.command,
            Command::Init {
                output: PathBuf::from("config")
            }
        );
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        let result = <Cli as clap::Parser>::try_parse_from(["strata"]);
        assert!(result.is_err());
    }
}

mod derived {
    use super::*;

    #[test]
    fn store_defaults_into_config_dir() {
        let cli = Cli::parse_from_iter(["strata", "-c", "/srv/conf", "overrides"]);
        assert_eq!(cli.store_path(), PathBuf::from("/srv/conf/dynamic.json"));
    }

    #[test]
    fn explicit_store_wins() {
        let cli = Cli::parse_from_iter(["strata", "--store", "/var/lib/overrides.json", "keys"]);
        assert_eq!(cli.store_path(), PathBuf::from("/var/lib/overrides.json"));
    }

    #[test]
    fn timeout_is_seconds() {
        let cli = Cli::parse_from_iter(["strata", "--timeout", "3", "keys"]);
        assert_eq!(cli.store_timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn no_timeout_by_default() {
        let cli = Cli::parse_from_iter(["strata", "keys"]);
        assert_eq!(cli.store_timeout(), None);
    }
}
