use clap::{Parser, Subcommand, ValueEnum};
use editfacets::model::Status;
use once_cell::sync::Lazy;
use std::path::PathBuf;

/// `CARGO_PKG_VERSION`, with `@<hash> <date>` of the last commit appended on
/// builds that are not tagged releases.
static VERSION: Lazy<String> = Lazy::new(|| {
    let version = env!("CARGO_PKG_VERSION");
    match (env!("IS_RELEASE"), env!("GIT_HASH")) {
        ("true", _) | (_, "") => version.to_string(),
        (_, hash) => format!("{version}@{hash} {}", env!("GIT_COMMIT_DATE")),
    }
});

fn get_version() -> &'static str {
    VERSION.as_str()
}

#[derive(Parser, Debug)]
#[command(name = "editfacets", bin_name = "editfacets", version = get_version())]
#[command(about = "Filter, count and number a list of map edits", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding config.json and preferences.json
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show edits with facet counts, filtered and numbered
    #[command(alias = "ls")]
    List {
        /// JSON file holding an array of {title, date, types} records
        records: PathBuf,

        /// Only show edits with this status (accepted, pending, not-accepted, incorrect)
        #[arg(short, long)]
        status: Option<Status>,

        /// Only show edits of this type
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        kind: Option<String>,

        /// Earliest submission date (e.g. "2024-01-01", "3 weeks ago", "Submitted Jan 3")
        #[arg(long, value_name = "DATE")]
        from: Option<String>,

        /// Latest submission date; defaults to the same day as --from
        #[arg(long, value_name = "DATE", requires = "from")]
        to: Option<String>,

        /// Jump to the N-th visible edit and highlight it
        #[arg(short, long, value_name = "N")]
        go_to: Option<usize>,
    },

    /// Show or set whether edits are numbered
    Numbering {
        #[arg(value_enum)]
        state: Option<Toggle>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "editfacets",
            "list",
            "edits.json",
            "--status",
            "not accepted",
            "--type",
            "Road",
            "--from",
            "2024-01-01",
            "--go-to",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::List {
                status,
                kind,
                from,
                to,
                go_to,
                ..
            } => {
                assert_eq!(status, Some(Status::NotAccepted));
                assert_eq!(kind.as_deref(), Some("Road"));
                assert_eq!(from.as_deref(), Some("2024-01-01"));
                assert_eq!(to, None);
                assert_eq!(go_to, Some(2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn version_starts_with_package_version() {
        let version = get_version();
        assert!(version.starts_with(env!("CARGO_PKG_VERSION")));
        if env!("IS_RELEASE") == "true" {
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }

    #[test]
    fn to_requires_from() {
        assert!(Cli::try_parse_from(["editfacets", "list", "edits.json", "--to", "today"]).is_err());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(
            Cli::try_parse_from(["editfacets", "list", "edits.json", "--status", "maybe"]).is_err()
        );
    }

    #[test]
    fn numbering_toggle() {
        let cli = Cli::try_parse_from(["editfacets", "--data-dir", "/tmp/x", "numbering", "off"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Numbering {
                state: Some(Toggle::Off)
            }
        ));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
