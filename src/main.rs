use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = stubtree::cli::Cli::parse();
    if let Err(e) = stubtree::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
