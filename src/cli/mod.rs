//! The command-line host (spec §4.H, §6): a REPL reading textual commands
//! and driving a [`Host`] per game in play, generic over whichever back-end
//! the player picked on the command line.
//!
//! Grounded on `tesuji::cli::CliAdapter`, the teacher's own command-reading
//! loop (`next_command` parsing a line into a verb plus the rest, matched
//! against a small fixed vocabulary), generalized here from one game
//! (an SGF editor) to any [`Backend`] by making the loop itself generic
//! over `B` and leaving per-game specifics to [`Host`] and `text_format`.

use std::fs::File;
use std::io::{self, BufRead, Write as _};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use crate::backend::Backend;
use crate::backends::bridges::BridgesBackend;
use crate::backends::slide::SlideBackend;
use crate::config::EnvConfigSource;
use crate::facade::Host;
use crate::ident::IdDefaultMode;
use crate::rng::{HostEntropy, OsEntropy};

#[derive(Parser)]
#[command(name = "puzzles", about = "Generate, play, and solve logic puzzles from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a game and drop into an interactive REPL to play it.
    Play {
        game: GameKind,
        /// A parameter string (e.g. "7x6m25" for slide, "w9h9d2" for bridges).
        #[arg(long)]
        params: Option<String>,
        /// A full game identifier (params#seed or params:desc) to resume.
        #[arg(long)]
        id: Option<String>,
    },
    /// Generate a game, solve it immediately, and print the result.
    Solve {
        game: GameKind,
        #[arg(long)]
        params: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Emit shell tab-completions for this binary.
    Completions { shell: clap_complete::Shell },
}

#[derive(Clone, Copy, ValueEnum)]
enum GameKind {
    Slide,
    Bridges,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play { game, params, id } => match game {
            GameKind::Slide => repl(new_host(SlideBackend::default(), params.as_deref(), id.as_deref())?),
            GameKind::Bridges => repl(new_host(BridgesBackend::default(), params.as_deref(), id.as_deref())?),
        },
        Command::Solve { game, params, id } => match game {
            GameKind::Slide => solve_and_print(new_host(SlideBackend::default(), params.as_deref(), id.as_deref())?),
            GameKind::Bridges => solve_and_print(new_host(BridgesBackend::default(), params.as_deref(), id.as_deref())?),
        },
        Command::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, &name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Builds a fresh [`Host`], applying a short param string and/or a full
/// game identifier before the first generation, mirroring the teacher's
/// `run` loading an optional file before the first `render`.
fn new_host<B: Backend>(backend: B, params: Option<&str>, id: Option<&str>) -> Result<Host<B>> {
    let config = EnvConfigSource;
    let mut host = Host::new(backend, &config);

    if let Some(id) = id {
        host.game_id(id, IdDefaultMode::Seed).map_err(|e| anyhow::anyhow!("invalid game id {id:?}: {e}"))?;
    } else if let Some(params) = params {
        // A bare param string carries no seed of its own; mint one now so
        // it reaches `game_id` as a well-formed `params#seed` identifier
        // instead of being misread as a seed itself.
        let seed = OsEntropy.fresh_seed();
        let full_id = format!("{params}#{seed}");
        host.game_id(&full_id, IdDefaultMode::Seed).map_err(|e| anyhow::anyhow!("invalid parameters {params:?}: {e}"))?;
    }

    host.new_game(&mut OsEntropy);
    Ok(host)
}

fn solve_and_print<B: Backend>(mut host: Host<B>) -> Result<()> {
    print_board(&host);
    host.solve().map_err(|e| anyhow::anyhow!("solve failed: {e}"))?;
    println!("--- solved ---");
    print_board(&host);
    Ok(())
}

fn print_board<B: Backend>(host: &Host<B>) {
    let midend = host.midend();
    match midend.backend().text_format(midend.current_state()) {
        Some(text) => print!("{text}"),
        None => println!("(this back-end has no text rendering)"),
    }
    match midend.status() {
        1 => println!("status: solved"),
        -1 => println!("status: lost"),
        _ => println!("status: in progress"),
    }
}

/// The interactive command loop: prints the board, reads one line, and
/// dispatches it, mirroring `tesuji::cli::CliAdapter::next_command`'s
/// verb-plus-rest parsing but against this spec's own small vocabulary.
fn repl<B: Backend>(mut host: Host<B>) -> Result<()> {
    let stdin = io::stdin();
    println!("commands: click <col> <row> | undo | redo | restart | solve | id <string> | save <path> | load <path> | show | quit");
    print_board(&host);

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }
        let line = line.trim();
        let (cmd, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => continue,
            "quit" => return Ok(()),
            "show" => print_board(&host),
            "undo" => {
                host.undo();
                print_board(&host);
            }
            "redo" => {
                host.redo();
                print_board(&host);
            }
            "restart" => {
                host.midend_mut().restart_game();
                print_board(&host);
            }
            "solve" => match host.solve() {
                Ok(()) => print_board(&host),
                Err(e) => eprintln!("solve failed: {e}"),
            },
            "click" => {
                let mut parts = rest.split_whitespace();
                let (Some(col), Some(row)) = (parts.next(), parts.next()) else {
                    eprintln!("usage: click <col> <row>");
                    continue;
                };
                match (col.parse::<i32>(), row.parse::<i32>()) {
                    (Ok(col), Ok(row)) => {
                        let tile = host.midend().tile_size().max(1);
                        let (x, y) = (col * tile + tile / 2, row * tile + tile / 2);
                        host.mouse(x, y, crate::input::Button::Left, crate::input::ButtonPhase::Press);
                        host.mouse(x, y, crate::input::Button::Left, crate::input::ButtonPhase::Release);
                        print_board(&host);
                    }
                    _ => eprintln!("usage: click <col> <row>"),
                }
            }
            "id" => {
                if rest.is_empty() {
                    eprintln!("usage: id <params#seed | params:desc>");
                    continue;
                }
                match host.game_id(rest, IdDefaultMode::Seed) {
                    Ok(()) => {
                        host.new_game(&mut OsEntropy);
                        print_board(&host);
                    }
                    Err(e) => eprintln!("bad game id: {e}"),
                }
            }
            "save" => {
                if rest.is_empty() {
                    eprintln!("usage: save <path>");
                    continue;
                }
                let mut file = File::create(rest).with_context(|| format!("creating {rest}"))?;
                host.midend().serialise(&mut file).with_context(|| format!("writing {rest}"))?;
                println!("saved to {rest}");
            }
            "load" => {
                if rest.is_empty() {
                    eprintln!("usage: load <path>");
                    continue;
                }
                let mut file = File::open(rest).with_context(|| format!("opening {rest}"))?;
                host.midend_mut().deserialise(&mut file).with_context(|| format!("reading {rest}"))?;
                print_board(&host);
            }
            _ => bail!("unknown command: {line}"),
        }
    }
}
