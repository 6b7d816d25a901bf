use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kira_recist::cli::{Cli, Commands, ValidateArgs};
use kira_recist::ctx::Ctx;
use kira_recist::io;
use kira_recist::pipeline::Pipeline;
use kira_recist::reference::load_reference;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.sim_config();
            let mut ctx = Ctx::new(
                args.input,
                args.out,
                config,
                !args.no_write,
                env!("CARGO_PKG_VERSION"),
            );
            let pipeline = Pipeline::simulation();
            pipeline.run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Validate(args) => {
            handle_validate(args)?;
        }
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let label = args.location_label;
    let reference = load_reference(&args.input, std::slice::from_ref(&label))?;
    let column = reference.location_column(&label)?;
    let locations = reference.location_counts(column);

    println!("kira-recist validate ok");
    println!("rows: {}", reference.len());
    println!("locations: {}", locations.len());
    for (location, count) in &locations {
        println!("{}\t{}", location, count);
    }
    Ok(())
}
