use std::path::PathBuf;

use clap::Parser;

use bplus_index::{
    cli::{Repl, loader},
    config::{Backend, DEFAULT_ORDER, IndexConfig},
    debugger::Component,
    idx_info,
    storage::paged_index::DEFAULT_PAGE_SIZE,
};

#[derive(Parser, Debug)]
#[command(name = "bpidx")]
#[command(version = "0.1.0")]
#[command(about = "Interactive ordered index over integer keys")]
#[command(long_about = "Interactive ordered index over integer keys

Records are (key, value) pairs with an integer key and a text value. They
live either in a B+ tree or in a flat list of fixed-size pages.

SHELL COMMANDS:
  + <key> <value>   insert a record
  - <key>           remove a key
  ? <key>           look up a key
  r <start> <end>   list keys in [start, end]
  h                 help
  q                 quit

EXAMPLES:
  bpidx --order 5
  bpidx -f records.csv --backend pages --page-size 64
  bpidx -d --log bpidx.log")]
struct Args {
    /// CSV of key,value records to load before the shell starts
    #[arg(short, long, value_name = "CSV")]
    file: Option<PathBuf>,

    /// Records per page for the pages backend
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Maximum children per tree node
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_ORDER)]
    order: usize,

    /// Index backend
    #[arg(short, long, value_name = "BACKEND", default_value_t = Backend::Tree)]
    backend: Backend,

    /// Log structural changes at debug level
    #[arg(short, long)]
    debug: bool,

    /// Also append log lines to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
}

impl From<Args> for IndexConfig {
    fn from(args: Args) -> Self {
        IndexConfig {
            order: args.order,
            page_size: args.page_size,
            backend: args.backend,
            debug: args.debug,
            log_file: args.log,
            input: args.file,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = IndexConfig::from(Args::parse());
    config.validate()?;

    let debugger = config.build_debugger()?;
    let mut index = config.build_index(debugger.clone())?;

    idx_info!(
        debugger,
        Component::Shell,
        "{} backend, order {}, page size {}",
        config.backend,
        config.order,
        config.page_size
    );

    if let Some(path) = &config.input {
        loader::load_csv(path, index.as_mut(), &debugger)?;
    }

    let mut repl = Repl::new(index, debugger)?;
    repl.run()?;

    Ok(())
}
