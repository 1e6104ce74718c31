use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("pylayer")
        .about("Post-install hygiene for Python runtime layers")
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Show subprocess output and step-by-step progress")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("cleanup")
                .about("Uninstall build-time packages and delete broken executables from a layer")
                .arg(
                    Arg::new("layer")
                        .long("layer")
                        .help("Root directory of the Python layer")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("TOML file with packages, pattern and python settings")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("package")
                        .long("package")
                        .short('p')
                        .help("Package to uninstall (repeatable, replaces the configured list)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("pattern")
                        .long("pattern")
                        .help("Glob selecting executables in <layer>/bin to probe"),
                )
                .arg(
                    Arg::new("python")
                        .long("python")
                        .help("Python interpreter used to run pip"),
                ),
        )
}
