use arg_resolver::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("arg_resolver=debug,info")
    } else {
        EnvFilter::new("arg_resolver=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Predict(args) => {
            cli::predict::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Database(args) => {
            cli::database::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
