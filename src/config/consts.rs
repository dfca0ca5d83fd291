// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = concat!("ballroom_scrape/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 15;
pub const REQUEST_PAUSE_MS: u64 = 250; // be polite

// Config file
pub const CONFIG_FILE: &str = "ballroom_scrape.toml";
pub const CONFIG_PATH_ENV: &str = "BALLROOM_SCRAPE_CONFIG";
pub const LISTING_URL_ENV: &str = "BALLROOM_LISTING_URL";
pub const COMPETITION_NAME_ENV: &str = "BALLROOM_COMPETITION_NAME";
pub const STORE_PATH_ENV: &str = "BALLROOM_STORE_PATH";

// Local store
pub const STORE_DIR: &str = ".store";
pub const STORE_FILE: &str = "scores_db.json";
pub const DEBUG_LOG_FILE: &str = "debug.log";

// Maintenance
pub const BACKUP_DIR: &str = "backups";
pub const FIND_REPLACE_BATCH: usize = 500;
