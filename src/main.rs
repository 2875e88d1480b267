use clap::Parser;
use kinverify::cli::{CheckArgs, Cli, Command, IgnoresArgs, MarkArgs, OptionsArgs, RuleArgs};
use kinverify::config::{self, Config, VerifyOptions};
use kinverify::db;
use kinverify::logging;
use kinverify::report;
use kinverify::scan::{self, NoProgress, ScanResult, StderrProgress};
use kinverify::store::{IgnoreSet, IgnoreStore, VerifyResults};
use kinverify::{Result, VerifyError};
use std::path::{Path, PathBuf};

/// Absolute path of the database; ignore files are keyed on it.
fn database_path(path: &Path) -> Result<PathBuf> {
    Ok(std::fs::canonicalize(path)?)
}

fn scan_database(config: &Config) -> Result<(ScanResult, VerifyResults, IgnoreStore)> {
    let path = database_path(&config.database)?;
    let database = db::open(&path)?;
    let store = IgnoreStore::for_database(database.save_path())?;

    let ignores = if config.use_ignores {
        store.load()
    } else {
        IgnoreSet::new()
    };

    let result = if config.progressive {
        scan::run(database.as_ref(), &config.options, &mut StderrProgress::new())?
    } else {
        scan::run(database.as_ref(), &config.options, &mut NoProgress)?
    };

    let mut results = VerifyResults::new(ignores);
    results.extend(result.violations.iter().cloned());
    results.set_hide_marked(config.hide_marked);
    Ok((result, results, store))
}

fn check(args: &CheckArgs) -> Result<()> {
    let config = Config::from_check_args(args)?;
    let (result, results, _store) = scan_database(&config)?;

    report::print(&result, &results, &config);

    if let Err(e) = config.persist_options() {
        eprintln!("warning: failed to save options: {e}");
    }
    Ok(())
}

fn change_marks(args: &MarkArgs, ignored: bool) -> Result<()> {
    if !args.has_selector() {
        return Err(VerifyError::config("choose --all, --message or --row"));
    }

    let check_args = CheckArgs::for_marking(args.database.clone(), args.rules.clone());
    let config = Config::from_check_args(&check_args)?;
    let (_result, mut results, store) = scan_database(&config)?;

    let changed = if args.all {
        if ignored {
            results.mark_all();
        } else {
            results.unmark_all();
        }
        results.len()
    } else if let Some(message) = &args.message {
        let count = results.set_group(message, ignored);
        if count == 0 {
            return Err(VerifyError::config(format!("no problem with message '{message}'")));
        }
        count
    } else {
        for &number in &args.row {
            // rows are numbered from 1 in the table
            if number == 0 || !results.set_row(number - 1, ignored) {
                return Err(VerifyError::config(format!(
                    "no problem number {number} (there are {})",
                    results.len()
                )));
            }
        }
        args.row.len()
    };

    let verb = if ignored { "marked" } else { "unmarked" };
    results.close(&store)?;
    println!("{verb} {changed} problems, saved to {}", store.path().display());
    Ok(())
}

fn invert(database: &Path, rules: &RuleArgs) -> Result<()> {
    let check_args = CheckArgs::for_marking(database.to_path_buf(), rules.clone());
    let config = Config::from_check_args(&check_args)?;
    let (_result, mut results, store) = scan_database(&config)?;

    results.invert();
    let (marked, total) = (results.marked(), results.len());
    results.close(&store)?;
    println!("{marked} of {total} problems now marked");
    Ok(())
}

fn ignores(args: &IgnoresArgs) -> Result<()> {
    let store = IgnoreStore::for_database(&database_path(&args.database)?)?;

    if args.clear {
        if store.clear()? {
            println!("removed {}", store.path().display());
        } else {
            println!("no ignore file at {}", store.path().display());
        }
        return Ok(());
    }

    let set = store.load();
    println!("ignore file: {}", store.path().display());
    if set.is_empty() {
        println!("nothing ignored");
    } else {
        println!("{:<40} {}", "Handle", "Rule");
        println!("{}", "-".repeat(60));
        for (handle, rule) in set.pairs() {
            println!("{handle:<40} {rule}");
        }
    }
    Ok(())
}

fn options(args: &OptionsArgs) -> Result<()> {
    let path = config::options_path(args.options_file.as_deref());
    let mut options = path
        .as_deref()
        .map(VerifyOptions::load_or_default)
        .unwrap_or_default();
    options.apply_assignments(&args.set)?;

    for (name, value) in options.entries() {
        println!("{name:<14} {value}");
    }

    if args.save {
        let path = path.ok_or(VerifyError::NoDataDir)?;
        options.save(&path)?;
        println!("\nsaved to {}", path.display());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let verbose = matches!(&cli.command, Command::Check(args) if args.verbose);
    logging::init(verbose);

    let outcome = match &cli.command {
        Command::Check(args) => check(args),
        Command::Mark(args) => change_marks(args, true),
        Command::Unmark(args) => change_marks(args, false),
        Command::Invert(args) => invert(&args.database, &args.rules),
        Command::Ignores(args) => ignores(args),
        Command::Options(args) => options(args),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
