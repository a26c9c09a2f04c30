use crate::CLAP_STYLING;
use clap::{ArgAction, arg};
use hostcrawl_scanner::fetch::DEFAULT_TIMEOUT_SECS;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("hostcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("hostcrawl")
        .about(
            "Crawl every page reachable from the seed URLs without leaving the seed hosts. \
            Prints the pages that were fetched successfully.",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!([SEEDS] ...)
                .required(false)
                .help("Seed URLs; their hosts become the only hosts the crawl may visit"),
        )
        .arg(
            arg!(-S --"seeds-file" <PATH>)
                .required(false)
                .help("Path to a newline-delimited file of seed URLs, merged with SEEDS")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help(format!(
                    "Request timeout in seconds (default: {})",
                    DEFAULT_TIMEOUT_SECS
                ))
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            arg!(--"escape-fragment" <SUFFIX>)
                .required(false)
                .help("Suffix appended to every request URL (default: ?__escaped_fragment__)")
                .conflicts_with("no-escape-fragment"),
        )
        .arg(
            arg!(--"no-escape-fragment")
                .required(false)
                .help("Request URLs exactly as discovered")
                .action(ArgAction::SetTrue)
                .conflicts_with("escape-fragment"),
        )
        .arg(
            arg!(--"scheme" <SCHEME>)
                .required(false)
                .help("Approved URL scheme, may be repeated (default: http and https)")
                .action(ArgAction::Append),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: print to stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(--"progress")
                .required(false)
                .help("Show a progress spinner on stderr while crawling")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(-v --"verbose")
                .required(false)
                .help("Increase log verbosity (-v info, -vv debug)")
                .action(ArgAction::Count),
        )
}
