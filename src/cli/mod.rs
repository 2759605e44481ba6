//! CLI command definitions for task-forest
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand};

/// Task Forest server and admin tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (default if no subcommand given)
    Serve(ServeArgs),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Print the live tasks of one user as JSON
    Tasks(TasksArgs),
}

/// Arguments for `serve`.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (overrides config)
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user
    Add {
        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// List registered users as JSON
    List,
}

/// Arguments for `tasks`.
#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Owner user id; omit to print every user's live tasks
    #[arg(long)]
    pub owner: Option<String>,

    /// Print a flat list instead of a forest
    #[arg(long)]
    pub flat: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["task-forest"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn parses_user_add() {
        let cli = Cli::try_parse_from([
            "task-forest",
            "--database",
            ":memory:",
            "user",
            "add",
            "--username",
            "alice",
            "--password",
            "pw",
        ])
        .unwrap();

        assert_eq!(cli.database.as_deref(), Some(":memory:"));
        match cli.command {
            Some(Command::User(UserCommand::Add { username, name, .. })) => {
                assert_eq!(username, "alice");
                assert!(name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from(["task-forest", "serve", "--port", "8080", "-v"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Command::Serve(args)) => assert_eq!(args.port, Some(8080)),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
