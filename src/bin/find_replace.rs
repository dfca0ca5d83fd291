// src/bin/find_replace.rs
use ballroom_scrape::config::options::debug_log_path;
use ballroom_scrape::{cli, log};

fn main() {
    log::init(Some(&debug_log_path()));
    if let Err(e) = cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
