use anyhow::Result;
use clap::Parser;
use hubconf::{
    cli::{Cli, Commands},
    service::{RenderRequest, RenderService},
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            inputs,
            format,
            output,
        } => {
            let request = RenderRequest {
                format,
                output,
                ..inputs.into_request()
            };
            let result = RenderService::render(request)?;

            // Print only the rendered configuration to stdout
            if let Some(rendered) = result.rendered {
                print!("{}", rendered);
            }
        }
        Commands::Check { inputs } => {
            let summary = RenderService::check(inputs.into_request())?;
            println!("{}", summary);
        }
        Commands::Version => {
            println!("hubconf {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
