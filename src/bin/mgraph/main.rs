use std::process::ExitCode;

use env_logger::Env;

mod cli;
mod commands;
mod display;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();
    let quiet = match &cli.command {
        cli::Command::Lipophilicity(args) | cli::Command::Sider(args) => args.quiet,
        cli::Command::Prepare { args, .. } => args.quiet,
        cli::Command::Labels { .. } => true,
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(if quiet {
        "error"
    } else {
        "warn"
    }))
    .init();

    let ctx = display::Context::detect().with_quiet(quiet);

    if ctx.interactive {
        display::print_banner();
    }

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
