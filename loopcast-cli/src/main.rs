// ============================================================================
// loopcast-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: Loopcast CLI Application
//
// Parses the command line, installs logging and dispatches to the command
// implementations in the library half of this crate. Failures are reported
// once here and turned into a non-zero exit status.
//
// AI-ASSISTANT-INFO: Entry point for the loopcast binary

// ---- Internal crate imports ----
use loopcast_cli::error::{exit_code, failure_details, suggestion};
use loopcast_cli::logging::init_logging;
use loopcast_cli::{
    create_core_config, dump_config, run_check, run_generate, run_scan, terminal, Cli, Commands,
};

// ---- External crate imports ----
use clap::Parser;
use log::debug;

// ---- Standard library imports ----
use std::process;

fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        terminal::disable_color();
    }

    // Only runs that produce output keep a run log.
    let log_dir = match &cli.command {
        Commands::Generate(args) if !args.dump_config => Some(
            args.log_dir
                .clone()
                .unwrap_or_else(|| args.output_dir.join("logs")),
        ),
        _ => None,
    };

    let log_path = match init_logging(cli.verbose, log_dir.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(exit_code(&e));
        }
    };
    if let Some(path) = &log_path {
        debug!("Run log: {}", path.display());
    }

    let result = match cli.command {
        Commands::Generate(args) => create_core_config(&args).and_then(|config| {
            if args.dump_config {
                dump_config(&config)
            } else {
                run_generate(&args, &config).map(|_| ())
            }
        }),
        Commands::Scan(args) => run_scan(args).map(|_| ()),
        Commands::Check(args) => run_check(&args),
    };

    if let Err(e) = result {
        terminal::print_error("Loopcast failed", &failure_details(&e), suggestion(&e));
        if let Some(path) = &log_path {
            terminal::print_status("Log file", &path.display().to_string(), false);
        }
        process::exit(exit_code(&e));
    }
}
