use crate::error::IndexError;

pub const INSERT_USAGE: &str = "+ <key> <value>";
pub const REMOVE_USAGE: &str = "- <key>";
pub const SEARCH_USAGE: &str = "? <key>";
pub const RANGE_USAGE: &str = "r <start> <end>";
pub const MENU_USAGE: &str = "h for the list of commands";

/// One line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert { key: i64, value: String },
    Remove { key: i64 },
    Search { key: i64 },
    Range { start: i64, end: i64 },
    Help,
    Quit,
}

impl Command {
    /// Symbol commands may be glued to their argument (`+5 five`); letter
    /// commands are the first word. Values keep their case and inner spaces.
    pub fn parse(line: &str) -> Result<Self, IndexError> {
        let line = line.trim();

        let (head, rest) = match line.chars().next() {
            Some(c @ ('+' | '-' | '?')) => (&line[..1], line[c.len_utf8()..].trim()),
            _ => match line.split_once(char::is_whitespace) {
                Some((head, rest)) => (head, rest.trim()),
                None => (line, ""),
            },
        };

        match head.to_lowercase().as_str() {
            "+" => {
                let (key, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| invalid(line, INSERT_USAGE))?;
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid(line, INSERT_USAGE));
                }

                Ok(Command::Insert {
                    key: parse_key(key, line, INSERT_USAGE)?,
                    value: value.to_string(),
                })
            }

            "-" => Ok(Command::Remove {
                key: single_key(rest, line, REMOVE_USAGE)?,
            }),

            "?" => Ok(Command::Search {
                key: single_key(rest, line, SEARCH_USAGE)?,
            }),

            "r" | "range" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(start), Some(end), None) => Ok(Command::Range {
                        start: parse_key(start, line, RANGE_USAGE)?,
                        end: parse_key(end, line, RANGE_USAGE)?,
                    }),
                    _ => Err(invalid(line, RANGE_USAGE)),
                }
            }

            "h" | "help" if rest.is_empty() => Ok(Command::Help),
            "q" | "quit" if rest.is_empty() => Ok(Command::Quit),

            _ => Err(invalid(line, MENU_USAGE)),
        }
    }
}

fn single_key(rest: &str, line: &str, usage: &'static str) -> Result<i64, IndexError> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(invalid(line, usage));
    }
    parse_key(rest, line, usage)
}

fn parse_key(token: &str, line: &str, usage: &'static str) -> Result<i64, IndexError> {
    token.parse::<i64>().map_err(|_| invalid(line, usage))
}

fn invalid(line: &str, usage: &'static str) -> IndexError {
    IndexError::InvalidCommand {
        input: line.to_string(),
        usage,
    }
}
