use crate::config::Config;
use crate::sync::markers::DEFAULT_MARKER_SUFFIX;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dirmerge")]
#[command(about = "Two-way directory merge", long_about = None)]
#[command(version)]
#[command(after_help = "EXAMPLES:
    # Merge two directories (newest content wins, timestamps preserved)
    dirmerge merge ~/notes /mnt/usb/notes

    # Preview without changing anything
    dirmerge merge ~/notes /mnt/usb/notes --dry-run

    # Use a profile from ~/.config/dirmerge/config.toml
    dirmerge merge --profile notes

    # Delete a file from both sides on the next merge
    touch ~/notes/old.txt.dirmerge-delete")]
pub struct Cli {
    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only show errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit newline-delimited JSON events instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ~/.config/dirmerge/config.toml)
    #[arg(long, global = true, env = "DIRMERGE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Syncs two directories to have the same contents
    Merge(MergeArgs),

    /// List profiles defined in the config file
    Profiles,
}

#[derive(Args, Debug, Clone, Default)]
pub struct MergeArgs {
    /// First directory (optional when using --profile)
    pub dir1: Option<PathBuf>,

    /// Second directory (optional when using --profile)
    pub dir2: Option<PathBuf>,

    /// Show what would change without touching either side
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// File name suffix that marks a path for deletion on both sides
    #[arg(long)]
    pub marker_suffix: Option<String>,

    /// Read directories and options from a named profile
    #[arg(short, long)]
    pub profile: Option<String>,
}

/// Fully resolved options for one merge
#[derive(Debug, Clone, PartialEq)]
pub struct MergeSettings {
    pub a: PathBuf,
    pub b: PathBuf,
    pub dry_run: bool,
    pub marker_suffix: String,
}

impl MergeArgs {
    /// Combine CLI arguments with the config file (CLI > profile > global)
    pub fn resolve(&self, config: &Config) -> anyhow::Result<MergeSettings> {
        let profile = match &self.profile {
            Some(name) => Some(
                config
                    .get_profile(name)
                    .ok_or_else(|| anyhow::anyhow!("Profile '{}' not found", name))?,
            ),
            None => None,
        };

        let a = self
            .dir1
            .clone()
            .or_else(|| profile.and_then(|p| p.a.clone()));
        let b = self
            .dir2
            .clone()
            .or_else(|| profile.and_then(|p| p.b.clone()));
        let (Some(a), Some(b)) = (a, b) else {
            anyhow::bail!("Two directories are required (or use --profile)");
        };

        let dry_run = self.dry_run
            || profile
                .and_then(|p| p.dry_run)
                .or(config.dry_run)
                .unwrap_or(false);

        let marker_suffix = self
            .marker_suffix
            .clone()
            .or_else(|| profile.and_then(|p| p.marker_suffix.clone()))
            .or_else(|| config.marker_suffix.clone())
            .unwrap_or_else(|| DEFAULT_MARKER_SUFFIX.to_string());

        if marker_suffix.is_empty() {
            anyhow::bail!("--marker-suffix cannot be empty");
        }
        if marker_suffix.contains(['/', '\\']) {
            anyhow::bail!(
                "--marker-suffix cannot contain path separators (got: {})",
                marker_suffix
            );
        }

        Ok(MergeSettings {
            a,
            b,
            dry_run,
            marker_suffix,
        })
    }
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet || self.json {
            return tracing::Level::ERROR;
        }

        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    fn args(dir1: Option<&str>, dir2: Option<&str>) -> MergeArgs {
        MergeArgs {
            dir1: dir1.map(PathBuf::from),
            dir2: dir2.map(PathBuf::from),
            ..Default::default()
        }
    }

    fn config_with_profile() -> Config {
        let mut config = Config::default();
        config.profiles.insert(
            "notes".to_string(),
            Profile {
                a: Some(PathBuf::from("/p/a")),
                b: Some(PathBuf::from("/p/b")),
                dry_run: Some(true),
                marker_suffix: Some(".gone".to_string()),
            },
        );
        config
    }

    #[test]
    fn test_parse_merge_command() {
        let cli = Cli::try_parse_from(["dirmerge", "merge", "/a", "/b", "-n"]).unwrap();
        let Command::Merge(merge) = cli.command else {
            panic!("expected merge subcommand");
        };
        assert_eq!(merge.dir1, Some(PathBuf::from("/a")));
        assert_eq!(merge.dir2, Some(PathBuf::from("/b")));
        assert!(merge.dry_run);
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = args(Some("/a"), Some("/b")).resolve(&Config::default()).unwrap();
        assert_eq!(settings.a, PathBuf::from("/a"));
        assert_eq!(settings.marker_suffix, DEFAULT_MARKER_SUFFIX);
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_resolve_requires_two_dirs() {
        assert!(args(Some("/a"), None).resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_resolve_from_profile() {
        let mut merge = args(None, None);
        merge.profile = Some("notes".to_string());

        let settings = merge.resolve(&config_with_profile()).unwrap();
        assert_eq!(settings.a, PathBuf::from("/p/a"));
        assert_eq!(settings.b, PathBuf::from("/p/b"));
        assert!(settings.dry_run);
        assert_eq!(settings.marker_suffix, ".gone");
    }

    #[test]
    fn test_cli_overrides_profile() {
        let mut merge = args(Some("/cli/a"), None);
        merge.profile = Some("notes".to_string());
        merge.marker_suffix = Some(".rm".to_string());

        let settings = merge.resolve(&config_with_profile()).unwrap();
        assert_eq!(settings.a, PathBuf::from("/cli/a"));
        assert_eq!(settings.b, PathBuf::from("/p/b"));
        assert_eq!(settings.marker_suffix, ".rm");
    }

    #[test]
    fn test_unknown_profile() {
        let mut merge = args(None, None);
        merge.profile = Some("missing".to_string());
        assert!(merge.resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_marker_suffix_validation() {
        let mut merge = args(Some("/a"), Some("/b"));
        merge.marker_suffix = Some("x/y".to_string());
        assert!(merge.resolve(&Config::default()).is_err());

        merge.marker_suffix = Some(String::new());
        assert!(merge.resolve(&Config::default()).is_err());
    }

    #[test]
    fn test_log_level_quiet() {
        let cli = Cli::try_parse_from(["dirmerge", "-q", "profiles"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_verbose() {
        let cli = Cli::try_parse_from(["dirmerge", "profiles", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }
}
