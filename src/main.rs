use clap::Parser;
use tracing_subscriber::EnvFilter;

use n1ql_compiler::cli::Args;
use n1ql_compiler::config::ConfigFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ConfigFile::load_from(&args.config)?;
    let output = args.command.run(&config, args.format)?;
    println!("{}", output);
    Ok(())
}
