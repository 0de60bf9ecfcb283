// SppCom - Serial-link communication tool for embedded devices
use clap::Parser;
use sppcom::cli::{args::Args, commands::execute_command};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
