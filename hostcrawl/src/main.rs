use hostcrawl::command_argument_builder;
use hostcrawl::handlers::{handle_crawl, verbosity_level};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();

    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(verbosity_level(matches.get_count("verbose")))
        .init();

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}
