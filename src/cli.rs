// src/cli.rs
use std::path::PathBuf;

use crate::config::consts::BACKUP_DIR;
use crate::config::options::load_store_path;
use crate::find_replace::{self, FindReplaceOptions};
use crate::progress::ConsoleProgress;
use crate::store::{Collection, JsonFileStore};

pub const HELP: &str = include_str!("cli_help.txt");

pub enum Command {
    Help,
    Run(FindReplaceOptions),
}

/// Entry point of the `find-replace` binary.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let opts = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Run(opts) => opts,
    };

    let store_path = load_store_path()?;
    let store = JsonFileStore::open(&store_path)?.deferred();

    println!("Find and Replace");
    println!("================");
    println!("Store: {}", store_path.display());
    println!("Collection: {}", opts.collection);
    println!("Field: {}", opts.field);
    println!("Find: {:?}", opts.find);
    println!("Replace: {:?}", opts.replace);
    println!("Dry Run: {}", opts.dry_run);
    println!("Backup: {}", opts.backup);
    println!("Case Sensitive: {}", opts.case_sensitive);
    println!("Exact Match: {}", opts.exact_match);
    println!();

    let mut progress = ConsoleProgress::new();
    let report = find_replace::run(&store, &opts, &PathBuf::from(BACKUP_DIR), Some(&mut progress))?;
    logf!(
        "find-replace on {}.{}: {} matched, {} changed, {} written",
        opts.collection,
        opts.field,
        report.matched,
        report.apply.changes.len(),
        report.apply.written
    );
    Ok(())
}

pub fn parse_args<I>(args: I) -> Result<Command, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = String>,
{
    let mut collection: Option<Collection> = None;
    let mut field: Option<String> = None;
    let mut find: Option<String> = None;
    let mut replace: Option<String> = None;
    let (mut dry_run, mut backup, mut case_sensitive, mut exact_match) = (false, false, false, false);

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "-c" | "--collection" => {
                let v = args.next().ok_or("Missing value for --collection")?;
                collection = Some(v.parse()?);
            }
            "-f" | "--field" => field = Some(args.next().ok_or("Missing value for --field")?),
            "--find" => find = Some(args.next().ok_or("Missing value for --find")?),
            // A trailing --replace with no value deletes the found text.
            "--replace" => replace = Some(args.next().unwrap_or_default()),
            "-d" | "--dry-run" => dry_run = true,
            "-b" | "--backup" => backup = true,
            "--case-sensitive" => case_sensitive = true,
            "--exact-match" => exact_match = true,
            "-h" | "--help" => return Ok(Command::Help),
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }

    let (Some(collection), Some(field), Some(find), Some(replace)) = (collection, field, find, replace) else {
        return Err("Missing required parameters: --collection, --field, --find, --replace \
                    (--replace may be \"\" to delete text; see --help)"
            .into());
    };
    if find.is_empty() {
        return Err("--find must not be empty".into());
    }

    Ok(Command::Run(FindReplaceOptions {
        collection,
        field,
        find,
        replace,
        dry_run,
        backup,
        case_sensitive,
        exact_match,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_short_and_long_flags() {
        let cmd = parse_args(args(&[
            "-c", "people", "-f", "name", "--find", "Jon", "--replace", "John", "-d", "--exact-match",
        ]))
        .unwrap();
        let Command::Run(o) = cmd else { panic!("expected run") };
        assert_eq!(o.collection, Collection::People);
        assert_eq!(o.field, "name");
        assert_eq!(o.find, "Jon");
        assert_eq!(o.replace, "John");
        assert!(o.dry_run && o.exact_match);
        assert!(!o.backup && !o.case_sensitive);
    }

    #[test]
    fn empty_replace_is_allowed() {
        let cmd = parse_args(args(&["-c", "judges", "-f", "name", "--find", " (x)", "--replace", ""])).unwrap();
        let Command::Run(o) = cmd else { panic!("expected run") };
        assert_eq!(o.replace, "");
    }

    #[test]
    fn help_wins_and_missing_flags_error() {
        assert!(matches!(parse_args(args(&["--find", "x", "-h"])).unwrap(), Command::Help));
        assert!(parse_args(args(&["-c", "people", "--find", "x", "--replace", "y"])).is_err());
        assert!(parse_args(args(&["-c", "teams", "-f", "n", "--find", "x", "--replace", "y"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
