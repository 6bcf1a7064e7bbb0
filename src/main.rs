use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = hotcfg::cli::Cli::parse();
    if let Err(e) = hotcfg::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
