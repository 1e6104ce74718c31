use clap::ArgMatches;
use tracing::error;

mod cleanup;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("cleanup", sub_matches)) => cleanup::handle_cleanup_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
