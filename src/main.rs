//! rackboard CLI entry point.
//!
//! Parses command-line arguments and dispatches to the appropriate command handler.

use clap::{Parser, Subcommand};
use rackboard::commands::{
    board_command, config_command, export_command, list_command, SessionOptions,
};
use rackboard::output::print_error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rackboard")]
#[command(
    version,
    about = "Terminal inventory board for servers and the services deployed on them",
    after_help = "EXAMPLES:
    # Open the board (seeds example data on first launch)
    rackboard

    # Print the inventory as a tree
    rackboard list

    # Use a throwaway inventory without example data
    rackboard --data-dir /tmp/inv --no-seed

    # Share a read-only snapshot
    rackboard export board.html"
)]
struct Cli {
    /// Directory holding the inventory snapshot (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Do not populate example data into an empty inventory
    #[arg(long, global = true)]
    no_seed: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive board (default)
    #[command(after_help = "KEYS:
    a           add a service or server
    e / Enter   edit the selected card
    d           delete the selected card
    space       pick up a service, then drop it on another server
    Tab         switch between the Service and Server forms
    Esc         close the form or cancel a move
    q           quit")]
    Board,

    /// Print servers and their services as a tree
    List,

    /// Write the board as a standalone HTML page
    Export {
        /// Output file
        path: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Write the default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let options = SessionOptions {
        data_dir: cli.data_dir,
        no_seed: cli.no_seed,
    };

    let result = match cli.command {
        None | Some(Commands::Board) => board_command(&options),
        Some(Commands::List) => list_command(&options),
        Some(Commands::Export { path }) => export_command(&options, &path),
        Some(Commands::Config { init }) => config_command(init),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_opens_board() {
        let cli = Cli::try_parse_from(["rackboard"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.data_dir.is_none());
        assert!(!cli.no_seed);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["rackboard", "list", "--data-dir", "/tmp/inv", "--no-seed"])
                .unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/inv")));
        assert!(cli.no_seed);
    }

    #[test]
    fn test_export_requires_path() {
        assert!(Cli::try_parse_from(["rackboard", "export"]).is_err());
        let cli = Cli::try_parse_from(["rackboard", "export", "out.html"]).unwrap();
        match cli.command {
            Some(Commands::Export { path }) => assert_eq!(path, PathBuf::from("out.html")),
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::try_parse_from(["rackboard", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: true })));
        let cli = Cli::try_parse_from(["rackboard", "config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: false })));
    }

    #[test]
    fn test_board_subcommand_and_unknown_command() {
        let cli = Cli::try_parse_from(["rackboard", "board"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Board)));
        assert!(Cli::try_parse_from(["rackboard", "deploy"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
