use clap::Parser;
use colored::Colorize;
use env_logger::Env;

mod lookup;
mod price;

#[derive(Parser)]
#[command(name = "kibom")]
#[command(about = "Annotate a KiCad BOM export with Mouser pricing", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", hide = true)]
    debug: bool,

    #[command(flatten)]
    price: price::PriceArgs,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Per-part lookup failures surface as warnings, so those stay visible
    // by default (overridden by RUST_LOG).
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    price::execute(cli.price)
}
