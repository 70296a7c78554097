//! # CLI Integration Tests
//!
//! Tests for command-line argument parsing and merging with configuration files.

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap_complete::Shell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    use crate::cli::{Cli, write_completions};

    /// Test basic CLI argument parsing
    #[test]
    fn test_cli_help() {
        let result = Cli::try_parse_from(["rasterplot", "--help"]);
        assert!(result.is_err()); // --help causes early exit with "error"

        let error = result.unwrap_err();
        assert!(error.to_string().contains("filled contour plots"));
    }

    /// Test version argument
    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["rasterplot", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_positional_files() {
        let cli = Cli::parse_from(["rasterplot", "a.asc", "b.asc", "c.asc"]);
        assert_eq!(
            cli.files,
            vec![
                PathBuf::from("a.asc"),
                PathBuf::from("b.asc"),
                PathBuf::from("c.asc")
            ]
        );
        assert!(!cli.save);
        assert!(!cli.offline);
    }

    /// Short flags as used by the original plotting script
    #[test]
    fn test_short_flags() {
        let cli = Cli::parse_from([
            "rasterplot", "-l", "-s", "-o", "-a", "-g", "-d", "ref.asc", "x.asc",
        ]);
        assert!(cli.logscale);
        assert!(cli.save);
        assert!(cli.offline);
        assert!(cli.abs);
        assert!(cli.gif);
        assert_eq!(cli.diff, Some(PathBuf::from("ref.asc")));
        assert_eq!(cli.files, vec![PathBuf::from("x.asc")]);
    }

    #[test]
    fn test_bounds_and_delay() {
        let cli = Cli::parse_from([
            "rasterplot", "--min", "-2.5", "--max", "10", "--delay", "35", "x.asc",
        ]);
        assert_eq!(cli.min, Some(-2.5));
        assert_eq!(cli.max, Some(10.0));
        assert_eq!(cli.delay, Some(35));

        let config = cli.to_config().unwrap();
        assert_eq!(config.delay, 35);
    }

    #[test]
    fn test_default_delay() {
        let cli = Cli::parse_from(["rasterplot", "x.asc"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.delay, 20);
        assert_eq!(config.levels, 10);
    }

    #[test]
    fn test_invalid_delay() {
        assert!(Cli::try_parse_from(["rasterplot", "--delay", "-1", "x.asc"]).is_err());
        assert!(Cli::try_parse_from(["rasterplot", "--delay", "soon", "x.asc"]).is_err());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["rasterplot", "-v", "-q", "x.asc"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.json");
        fs::write(
            &path,
            r#"{ "files": ["from_file.asc"], "save": true, "delay": 50, "min": 1.0 }"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "rasterplot",
            "--config",
            path.to_str().unwrap(),
            "--delay",
            "10",
            "-o",
        ]);
        let config = cli.to_config().unwrap();

        // files come from the config file since none were given
        assert_eq!(config.files, vec![PathBuf::from("from_file.asc")]);
        assert!(config.save);
        assert!(config.offline);
        assert_eq!(config.delay, 10);
        assert_eq!(config.min, Some(1.0));
    }

    #[test]
    fn test_cli_files_replace_config_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.yaml");
        fs::write(&path, "files: [a.asc, b.asc]\n").unwrap();

        let cli = Cli::parse_from(["rasterplot", "-c", path.to_str().unwrap(), "c.asc"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.files, vec![PathBuf::from("c.asc")]);
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::parse_from(["rasterplot", "-c", "/no/such/plot.json", "x.asc"]);
        assert!(cli.to_config().is_err());
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["rasterplot", "--completions", "bash"]);
        assert_eq!(cli.completions, Some(Shell::Bash));

        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("rasterplot"));
        assert!(script.contains("--logscale"));
    }
}
