//! Nifki wiki operator CLI.
//!
//! Provides the `nifki` binary for working on a wiki directory without the
//! server: building pages, creating empty pages, and inspecting what is
//! stored.
//!
//! `build` runs the same `BuildInvoker` as the server's save route, so a
//! page built here plays exactly as if it had been saved through the web.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nifki_build::{
    BuildError, BuildInvoker, BuildOptions, BuildOutcome, SystemRunner, DEFAULT_COMPILER,
};
use nifki_core::{is_valid_page_name, PageName};
use nifki_storage::{BuildResult, FsPageStore, PageStore, StorageError};

/// Nifki wiki tools.
#[derive(Parser)]
#[command(name = "nifki", about = "Nifki wiki tools")]
struct Cli {
    /// Wiki directory.
    #[arg(short, long, default_value = "wiki", global = true)]
    wiki: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a page with the external compiler.
    Build {
        page: String,

        /// Compiler command line; the wiki root and page are appended.
        #[arg(long, default_value = DEFAULT_COMPILER)]
        compiler: String,

        /// Kill the compiler after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Create an empty page.
    NewPage { page: String },
    /// List all pages.
    List,
    /// Print a page as JSON.
    Show { page: String },
    /// Check whether a string is a valid page name.
    CheckName { candidate: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match cli.command {
        Commands::Build {
            page,
            compiler,
            timeout_secs,
        } => run_build(&cli.wiki, &page, &compiler, timeout_secs),
        Commands::NewPage { page } => run_new_page(&cli.wiki, &page),
        Commands::List => run_list(&cli.wiki),
        Commands::Show { page } => run_show(&cli.wiki, &page),
        Commands::CheckName { candidate } => run_check_name(&candidate),
    };
    process::exit(exit_code);
}

/// Parses the page argument, or prints why not.
fn page_arg(raw: &str) -> Result<PageName, i32> {
    PageName::parse(raw).map_err(|e| {
        eprintln!("Error: {}", e);
        2
    })
}

fn open_store(wiki: &Path) -> Result<FsPageStore, i32> {
    FsPageStore::open(wiki).map_err(|e| {
        eprintln!("Error: failed to open wiki '{}': {}", wiki.display(), e);
        3
    })
}

/// Maps storage failures onto exit codes: 2 for a missing or duplicate
/// page, 3 for anything else.
fn storage_failure(e: StorageError) -> i32 {
    eprintln!("Error: {}", e);
    match e {
        StorageError::PageNotFound(_) | StorageError::DestinationExists(_) => 2,
        _ => 3,
    }
}

/// Execute the build subcommand.
///
/// Returns exit code: 0 = build completed (the page may still have compile
/// errors), 1 = the compiler itself failed, 2 = invalid input, 3 = I/O error.
fn run_build(wiki: &Path, page: &str, compiler: &str, timeout_secs: Option<u64>) -> i32 {
    let page = match page_arg(page) {
        Ok(page) => page,
        Err(code) => return code,
    };
    let store = match open_store(wiki) {
        Ok(store) => store,
        Err(code) => return code,
    };
    if !store.exists(&page) {
        return storage_failure(StorageError::PageNotFound(page));
    }
    let options = match BuildOptions::from_command_line(compiler) {
        Ok(options) => options.with_timeout(timeout_secs.map(Duration::from_secs)),
        Err(e) => {
            eprintln!("Error: {}", e);
            return 2;
        }
    };

    let invoker = BuildInvoker::new(options, Arc::new(SystemRunner));
    match invoker.invoke(&store, &page) {
        Ok(report) => match report.outcome {
            BuildOutcome::Completed(BuildResult::Success { artifact }) => {
                let ms = report.elapsed.as_millis();
                println!("Built {page} in {ms} ms: {}", artifact.display());
                0
            }
            BuildOutcome::Completed(BuildResult::Failure { diagnostic }) => {
                println!("{} does not compile:\n{}", page, diagnostic);
                0
            }
            BuildOutcome::Completed(BuildResult::NotBuilt) => {
                println!("The compiler finished without producing anything for {page}");
                0
            }
            BuildOutcome::ToolFailed { diagnostic, .. } => {
                eprintln!("Compiler failed:\n{}", diagnostic);
                1
            }
            BuildOutcome::TimedOut { after } => {
                eprintln!("Compiler timed out after {} seconds", after.as_secs());
                1
            }
        },
        Err(BuildError::Storage(e)) => storage_failure(e),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn run_new_page(wiki: &Path, page: &str) -> i32 {
    let page = match page_arg(page) {
        Ok(page) => page,
        Err(code) => return code,
    };
    let store = match open_store(wiki) {
        Ok(store) => store,
        Err(code) => return code,
    };
    match store.create(&page) {
        Ok(()) => {
            println!("Created {}", page);
            0
        }
        Err(e) => storage_failure(e),
    }
}

fn run_list(wiki: &Path) -> i32 {
    let store = match open_store(wiki) {
        Ok(store) => store,
        Err(code) => return code,
    };
    match store.list_pages() {
        Ok(pages) => {
            for page in pages {
                println!("{}", page);
            }
            0
        }
        Err(e) => storage_failure(e),
    }
}

fn run_show(wiki: &Path, page: &str) -> i32 {
    let page = match page_arg(page) {
        Ok(page) => page,
        Err(code) => return code,
    };
    let store = match open_store(wiki) {
        Ok(store) => store,
        Err(code) => return code,
    };
    match store.load(&page) {
        Ok(record) => match serde_json::to_string_pretty(&record) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(e) => {
                eprintln!("Error: failed to serialize page: {e}");
                3
            }
        },
        Err(e) => storage_failure(e),
    }
}

/// Exit code 0 when valid, 1 when not.
fn run_check_name(candidate: &str) -> i32 {
    if is_valid_page_name(candidate) {
        println!("'{}' is a valid page name", candidate);
        0
    } else {
        println!("'{}' is not a valid page name", candidate);
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn build_defaults() {
        let cli = Cli::parse_from(["nifki", "build", "mygame"]);
        assert_eq!(cli.wiki, PathBuf::from("wiki"));
        match cli.command {
            Commands::Build {
                page,
                compiler,
                timeout_secs,
            } => {
                assert_eq!(page, "mygame");
                assert_eq!(compiler, DEFAULT_COMPILER);
                assert_eq!(timeout_secs, None);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn wiki_flag_is_global() {
        let cli = Cli::parse_from(["nifki", "list", "--wiki", "/srv/wiki"]);
        assert_eq!(cli.wiki, PathBuf::from("/srv/wiki"));
    }

    #[test]
    fn commands_against_a_wiki() {
        let tmp = tempfile::tempdir().unwrap();
        let wiki = tmp.path().join("wiki");
        assert_eq!(run_new_page(&wiki, "mygame"), 0);
        assert_eq!(run_new_page(&wiki, "mygame"), 2);
        assert_eq!(run_new_page(&wiki, "AB"), 2);
        assert_eq!(run_list(&wiki), 0);
        assert_eq!(run_show(&wiki, "mygame"), 0);
        assert_eq!(run_show(&wiki, "nothere"), 2);
        assert_eq!(run_build(&wiki, "nothere", DEFAULT_COMPILER, None), 2);
        assert_eq!(run_build(&wiki, "mygame", "", None), 2);
    }

    #[test]
    fn check_name_exit_codes() {
        assert_eq!(run_check_name("Abc123"), 0);
        assert_eq!(run_check_name("ABC"), 1);
    }
}
