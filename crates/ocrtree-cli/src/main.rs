mod annotate_cmd;
mod cli;
mod confidence_cmd;
mod convert_cmd;
mod shared;
mod text_cmd;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

/// Log to stderr at WARN, or DEBUG with `--verbose`. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Annotate {
            ref tree,
            ref features,
            builtin,
            format,
            ref output,
        } => annotate_cmd::run(tree, features.as_deref(), builtin, format, output.as_deref()),
        cli::Commands::Convert {
            ref input,
            ref output,
        } => convert_cmd::run(input, output),
        cli::Commands::Confidence { ref tree, ref format } => confidence_cmd::run(tree, format),
        cli::Commands::Text { ref tree, ref format } => text_cmd::run(tree, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
