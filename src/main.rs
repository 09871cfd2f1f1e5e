use anyhow::{Context, Result};
use argh::FromArgs;
use simplelog::LevelFilter;
use std::io::{self, Write};
use std::path::PathBuf;
use threesh::config::Config;
use threesh::history::HistoryStore;
use threesh::line_source::EditorSource;
use threesh::{Interpreter, Session, logging, signals};

#[derive(FromArgs)]
/// A small interactive shell with pipes and output redirection.
struct Args {
    #[argh(option, short = 'c')]
    /// run a single line, then exit with its status.
    command: Option<String>,

    #[argh(option)]
    /// history file to use instead of $HOME/.3sh_history.
    history_file: Option<PathBuf>,

    #[argh(option)]
    /// append diagnostic logs to this file.
    log_file: Option<PathBuf>,

    #[argh(option)]
    /// log level: off, error, warn, info, debug or trace.
    log_level: Option<LevelFilter>,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    logging::init(args.log_file.as_deref(), args.log_level)?;
    let config = Config::from_env(args.history_file).context("cannot start shell")?;

    if let Some(line) = args.command {
        let mut sh = Interpreter::new(Session::new(config.home, Vec::new()));
        let code = sh.execute_line(&line, &mut io::stdout());
        io::stdout().flush().ok();
        std::process::exit(code);
    }

    let (store, persisted) = HistoryStore::open(&config.history_path).context("cannot start shell")?;
    signals::shield_from_interrupts().context("cannot install SIGINT handler")?;
    let mut source = EditorSource::new(&persisted).context("cannot start line editor")?;

    let mut sh = Interpreter::new(Session::new(config.home, persisted));
    sh.repl(&mut source, &store)?;
    Ok(())
}
