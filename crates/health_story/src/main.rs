use anyhow::Result;
use clap::Parser;
use health_story::{Config, pipeline};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Generate the Chicago public health story", long_about = None)]
struct Args {
    /// Configuration file path (compiled-in defaults when absent)
    #[arg(short = 'c', long = "config", default_value = "config/default.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = Args::parse();

    let config = if args.config.exists() {
        Config::load_from_file(&args.config)?
    } else {
        info!(
            "Config file not found: {}, using default settings",
            args.config.display()
        );
        Config::default()
    };

    let paths = pipeline::run(&config)?;

    println!("All files generated successfully:");
    println!("- Poster PNG: {}", paths.poster.display());
    println!("- Interactive Map: {}", paths.map.display());
    println!("- Bar Chart: {}", paths.bar.display());
    println!("- Histogram: {}", paths.hist.display());
    println!("- Table: {}", paths.table.display());
    println!("- Story: {}", paths.story.display());

    Ok(())
}
