use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(about = "Terminal back-office for managing suppliers and clients")]
#[command(version)]
pub struct Cli {
    /// Override the API base URL (BACKOFFICE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Managed record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Suppliers,
    Clients,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal UI (default)
    Tui,

    /// Print the records of a collection
    List {
        kind: EntityKind,

        /// Only show records whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create records from a .csv, .xlsx, .xls or .ods file
    Import {
        kind: EntityKind,

        /// File to import
        file: PathBuf,
    },

    /// Write a sample import file
    Sample {
        kind: EntityKind,

        /// Output file (defaults to <kind>_sample.csv in BACKOFFICE_SAMPLE_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete records by id
    Delete {
        kind: EntityKind,

        /// Ids of the records to delete
        #[arg(required = true)]
        ids: Vec<String>,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["backoffice"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Cli::try_parse_from(["backoffice", "delete", "clients"]).is_err());

        let cli = Cli::try_parse_from(["backoffice", "delete", "clients", "c1", "c2", "--yes"]).unwrap();
        match cli.command {
            Some(Commands::Delete { kind, ids, yes }) => {
                assert_eq!(kind, EntityKind::Clients);
                assert_eq!(ids, vec!["c1", "c2"]);
                assert!(yes);
            }
            _ => panic!("expected delete command"),
        }
    }

    #[test]
    fn test_global_api_url() {
        let cli = Cli::try_parse_from([
            "backoffice",
            "list",
            "suppliers",
            "--api-url",
            "http://erp.test/api",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://erp.test/api"));
    }
}
