use pylayer_config::LogLevel;
use pylayer_core::init_logging;

mod app;
mod commands;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Verbose when asked for on the command line or by the platform
    // (BP_LOG_LEVEL=DEBUG)
    let verbose = matches.get_flag("verbose") || LogLevel::from_env().is_verbose();
    init_logging(verbose);

    commands::run_command(&matches)?;

    Ok(())
}
