use std::fs::File;
use std::io::{self, BufReader};
use std::process;

use clap::Parser;
use colored::Colorize;

use restsh_core::replay::{Replay, Summary};
use restsh_core::session::Session;

mod repl;
mod reqwest_client;

/// restsh — an interactive shell for HTTP requests with scripted replay
#[derive(Parser, Debug)]
#[command(name = "restsh", version, about = "An interactive REST shell")]
struct Cli {
    /// Base URL to resolve relative request paths against
    base_url: Option<String>,

    /// Print response headers after each response body
    #[arg(short = 'H', long = "headers")]
    headers: bool,

    /// Replay a script instead of starting the shell ("-" reads stdin)
    #[arg(long = "replay", value_name = "FILE")]
    replay: Option<String>,

    /// Keep going after a failed expectation during replay
    #[arg(short = 'c', long = "continue-on-error")]
    continue_on_error: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut session = Session::new(cli.base_url.clone().unwrap_or_default());
    let mut client = match reqwest_client::ReqwestDispatch::new() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "✖".red().bold(), e);
            process::exit(1);
        }
    };

    if let Some(script) = &cli.replay {
        match replay_script(script, &mut session, &client, cli.continue_on_error) {
            Ok(summary) if summary.failed == 0 => {}
            Ok(summary) => {
                eprintln!(
                    "{} {} of {} expectation(s) failed",
                    "✖".red().bold(),
                    summary.failed,
                    summary.passed + summary.failed
                );
                process::exit(1);
            }
            Err(e) => {
                eprintln!("{} {}", "✖".red().bold(), e);
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = repl::run(&mut session, &mut client, cli.headers) {
        eprintln!("{} {}", "✖".red().bold(), e);
        process::exit(1);
    }
}

fn replay_script(
    path: &str,
    session: &mut Session,
    client: &reqwest_client::ReqwestDispatch,
    continue_on_error: bool,
) -> restsh_core::Result<Summary> {
    let replay = Replay::new(continue_on_error);
    if path == "-" || path == "/dev/stdin" {
        let stdin = io::stdin();
        replay.run(session, client, stdin.lock())
    } else {
        let file = File::open(path)?;
        replay.run(session, client, BufReader::new(file))
    }
}
