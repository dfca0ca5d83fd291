// src/bin/scrape.rs
use ballroom_scrape::config::{options::debug_log_path, RunOptions};
use ballroom_scrape::core::HttpPageSource;
use ballroom_scrape::progress::ConsoleProgress;
use ballroom_scrape::store::JsonFileStore;
use ballroom_scrape::{log, runner};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    log::init(Some(&debug_log_path()));

    let opts = RunOptions::load()?;
    let store = JsonFileStore::open(&opts.store_path)?.deferred();
    let pages = HttpPageSource::new()?;

    println!("Competition: {}", opts.competition_name);
    println!("Listing:     {}", opts.listing_url);
    println!("Store:       {}", store.path().display());

    let mut progress = ConsoleProgress::new();
    let summary = runner::run(&opts, &store, &pages, Some(&mut progress))?;

    println!();
    println!("{summary}");
    Ok(())
}
