use std::{io::Write, sync::Arc};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::{
    cli::command::{
        Command, INSERT_USAGE, RANGE_USAGE, REMOVE_USAGE, SEARCH_USAGE,
    },
    debugger::{Component, Debugger},
    idx_debug, idx_error, idx_warn,
    storage::RecordIndex,
};

const PROMPT: &str = "bpidx> ";

pub struct Repl {
    index: Box<dyn RecordIndex<i64, String>>,
    editor: DefaultEditor,
    debugger: Arc<Debugger>,
}

impl Repl {
    pub fn new(
        index: Box<dyn RecordIndex<i64, String>>,
        debugger: Arc<Debugger>,
    ) -> anyhow::Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(Repl {
            index,
            editor,
            debugger,
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut out = std::io::stdout();
        self.print_banner(&mut out)?;

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line.as_str());

                    match Command::parse(&line) {
                        Ok(command) => {
                            idx_debug!(self.debugger, Component::Shell, "{:?}", command);
                            if execute(self.index.as_mut(), command, &mut out)? {
                                break;
                            }
                        }
                        Err(e) => {
                            idx_warn!(self.debugger, Component::Shell, "rejected input '{}'", line.trim());
                            eprintln!("{}", e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("q");
                    break;
                }
                Err(err) => {
                    idx_error!(self.debugger, Component::Shell, "readline failed: {:?}", err);
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_banner(&self, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(
            out,
            "bpidx: {} index, {} records loaded",
            self.index.name(),
            self.index.len()
        )?;
        print_help(out)?;
        Ok(())
    }
}

/// Applies one command to `index`, writing the reply to `out`. Returns
/// `true` when the shell should exit.
pub fn execute(
    index: &mut dyn RecordIndex<i64, String>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    match command {
        Command::Insert { key, value } => {
            writeln!(out, "inserted ({}, {})", key, value)?;
            index.insert(key, value);
        }

        Command::Remove { key } => {
            if index.search(&key).is_empty() {
                writeln!(out, "no record with key {}", key)?;
            } else {
                index.remove(&key);
                writeln!(out, "removed key {}", key)?;
            }
        }

        Command::Search { key } => {
            let found = index.search(&key);
            if found.is_empty() {
                writeln!(out, "no record with key {}", key)?;
            } else {
                writeln!(out, "found: {}", found.join(", "))?;
            }
        }

        Command::Range { start, end } => {
            let entries = index.range(&start, &end);
            if entries.is_empty() {
                writeln!(out, "no records in [{}, {}]", start, end)?;
            }
            for (key, value) in entries {
                writeln!(out, "{}: {}", key, value)?;
            }
        }

        Command::Help => print_help(out)?,

        Command::Quit => return Ok(true),
    }

    Ok(false)
}

fn print_help(out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  {:<18} insert a record", INSERT_USAGE)?;
    writeln!(out, "  {:<18} remove a key", REMOVE_USAGE)?;
    writeln!(out, "  {:<18} look up a key", SEARCH_USAGE)?;
    writeln!(out, "  {:<18} list keys in [start, end]", RANGE_USAGE)?;
    writeln!(out, "  {:<18} show this list", "h")?;
    writeln!(out, "  {:<18} quit", "q")?;
    Ok(())
}
