pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use commands::command_argument_builder;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    build_crawl_options, collect_seeds, escape_fragment_setting, load_urls_from_file,
    parse_url_line, verbosity_level,
};

// Re-export crawl functionality from hostcrawl-core
pub use hostcrawl_core::crawl::{CrawlOptions, execute_crawl, extract_url_path};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
