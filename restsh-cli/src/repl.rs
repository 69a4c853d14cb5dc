//! The interactive loop: rustyline editing with prefix completion and a
//! prompt that carries the last dispatch outcome.

use std::io::{self, Write};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use restsh_core::command::{self, Command};
use restsh_core::dispatch::Dispatch;
use restsh_core::session::Session;
use restsh_core::token;

const PROMPT: &str = "➜ ";

/// Completion vocabulary for the first word of a line.
const COMMANDS: &[&str] = &[
    "GET", "PUT", "POST", "DELETE", "HEAD", "PATCH", "DEL", "reset", "clear", "exit", "quit",
    "get", "set", "help",
];

struct ReplHelper;

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];
        // `set ` and `get ` take a single subcommand.
        if let Some(rest) = head.strip_prefix("set ").or_else(|| head.strip_prefix("get ")) {
            return Ok((head.len() - rest.len(), candidates(rest, &["url"])));
        }
        if head.contains(' ') {
            return Ok((pos, Vec::new()));
        }
        Ok((0, candidates(head, COMMANDS)))
    }
}

fn candidates(prefix: &str, words: &[&str]) -> Vec<Pair> {
    words
        .iter()
        .filter(|word| word.starts_with(prefix))
        .map(|word| Pair {
            display: word.to_string(),
            replacement: word.to_string(),
        })
        .collect()
}

impl Hinter for ReplHelper {
    type Hint = String;
}
impl Highlighter for ReplHelper {}
impl Validator for ReplHelper {}
impl Helper for ReplHelper {}

/// Run the shell until exit, EOF or interrupt.
///
/// A successful request embeds its status code in the prompt (`[200] ➜ `);
/// any failure marks the prompt errored (`[err] ➜ `). Errors never
/// terminate the loop.
pub fn run<D: Dispatch>(
    session: &mut Session,
    client: &mut D,
    show_headers: bool,
) -> rustyline::Result<()> {
    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ReplHelper));
    let mut prompt = PROMPT.to_string();

    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let parsed = token::tokenize(&line).and_then(|tokens| command::parse(&tokens));
        let cmd = match parsed {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("{} {}", "✖".red().bold(), e);
                prompt = format!("[err] {}", PROMPT);
                continue;
            }
        };

        match cmd {
            Command::SetUrl(value) => session.base_url = value,
            Command::GetUrl => println!("BaseURL: {}", session.base_url),
            Command::Reset => match client.reset() {
                Ok(()) => prompt = PROMPT.to_string(),
                Err(e) => {
                    eprintln!("{} {}", "✖".red().bold(), e);
                    prompt = format!("[err] {}", PROMPT);
                }
            },
            Command::Clear => {
                clear_screen()?;
                prompt = PROMPT.to_string();
            }
            Command::Help => print_help(),
            Command::Request(spec) => match client.send(&spec, session) {
                Ok(envelope) => {
                    prompt = format!("[{}] {}", envelope.status, PROMPT);
                    println!("Response: {}", envelope.body_text());
                    if show_headers {
                        for (key, values) in &envelope.headers {
                            println!("{}: {}", key.as_str().dimmed(), values.join(", "));
                        }
                    }
                }
                Err(e) => {
                    eprintln!("{} {}", "✖".red().bold(), e);
                    prompt = format!("[err] {}", PROMPT);
                }
            },
            Command::Exit => break,
        }
    }
    Ok(())
}

fn clear_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x1b[2J\x1b[1;1H")?;
    stdout.flush()
}

fn print_help() {
    println!("Commands:");
    println!("  set url <value>     set the base URL");
    println!("  get url             print the base URL");
    println!("  reset               drop all session cookies");
    println!("  clear               clear the screen");
    println!("  GET|POST|PUT|DELETE|HEAD|PATCH <path> [body]");
    println!("  DEL <path> [body]   alias for DELETE");
    println!("  exit|quit|q         leave the shell");
}
