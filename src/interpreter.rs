use crate::builtin::Builtin;
use crate::command::{Command, ExitCode, Sink, Source};
use crate::external::{self, LaunchError, RedirectMode};
use crate::history::HistoryStore;
use crate::lexer::LexingError;
use crate::line_source::{LineSource, ReadOutcome};
use crate::parser::{self, LineShape, ParsedLine};
use crate::prompt;
use crate::session::Session;
use std::io::{self, Write};
use std::path::Path;
use std::process::Child;
use thiserror::Error;

/// Status of a line rejected before anything ran.
pub const SYNTAX_ERROR: ExitCode = 2;

/// A line that cannot be executed as written.
#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("{0}")]
    Lexing(#[from] LexingError),
    #[error("missing command before `{0}`")]
    MissingCommand(&'static str),
    #[error("missing command after `{0}`")]
    MissingTrailingCommand(&'static str),
    #[error("missing file name after `{0}`")]
    MissingDestination(&'static str),
    #[error("expected one file name after `{0}`, found {1} words")]
    AmbiguousDestination(&'static str, usize),
}

/// Errors that abandon a single line. None of them stop the read loop.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
}

impl ExecError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ExecError::Syntax(_) => SYNTAX_ERROR,
            ExecError::Launch(e) => e.exit_code(),
        }
    }
}

fn report(err: &dyn std::fmt::Display) {
    eprintln!("3sh: {err}");
}

fn operator(shape: LineShape) -> &'static str {
    match shape {
        LineShape::Simple => "",
        LineShape::Pipe => "|",
        LineShape::Redirect | LineShape::PipeRedirect => ">",
        LineShape::Append | LineShape::PipeAppend => ">>",
    }
}

fn require_command<'a>(command: &'a Command, op: &'static str, leading: bool) -> Result<&'a Command, SyntaxError> {
    match (command.is_empty(), leading) {
        (false, _) => Ok(command),
        (true, true) => Err(SyntaxError::MissingCommand(op)),
        (true, false) => Err(SyntaxError::MissingTrailingCommand(op)),
    }
}

fn require_destination<'a>(command: &'a Command, op: &'static str) -> Result<&'a Path, SyntaxError> {
    match command.words() {
        [] => Err(SyntaxError::MissingDestination(op)),
        [path] => Ok(Path::new(path.as_str())),
        words => Err(SyntaxError::AmbiguousDestination(op, words.len())),
    }
}

/// The read-classify-execute engine.
///
/// Owns the [`Session`]; builtins run in-process against it, everything else
/// is launched as child processes that are always waited for.
///
/// Example
/// ```
/// use threesh::{Interpreter, Session};
/// let mut sh = Interpreter::new(Session::new("/".into(), Vec::new()));
/// let code = sh.execute_line("true", &mut std::io::sink());
/// assert_eq!(code, 0);
/// assert_eq!(sh.execute_line("echo $?", &mut std::io::sink()), 0);
/// ```
pub struct Interpreter {
    session: Session,
}

impl Interpreter {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Classify and run one raw line.
    ///
    /// `stdout` receives builtin output; external programs write to the
    /// shell's own standard output unless redirected.
    pub fn execute_line(&mut self, line: &str, stdout: &mut dyn Write) -> ExitCode {
        match parser::parse_line(line, &self.session.expansions()) {
            Ok(parsed) => self.execute(&parsed, stdout),
            Err(e) => self.finish(Err(ExecError::from(SyntaxError::from(e)))),
        }
    }

    /// Run a classified line and store its status for `$?`.
    pub fn execute(&mut self, parsed: &ParsedLine, stdout: &mut dyn Write) -> ExitCode {
        let result = self.dispatch(parsed, stdout);
        self.finish(result)
    }

    fn finish(&mut self, result: Result<ExitCode, ExecError>) -> ExitCode {
        let code = result.unwrap_or_else(|e| {
            report(&e);
            e.exit_code()
        });
        self.session.last_status = code;
        code
    }

    fn dispatch(&mut self, parsed: &ParsedLine, stdout: &mut dyn Write) -> Result<ExitCode, ExecError> {
        let op = operator(parsed.shape());
        match (parsed.shape(), parsed.commands()) {
            (LineShape::Simple, [command]) => self.run_simple(command, stdout),
            (LineShape::Redirect, [command, dest]) | (LineShape::Append, [command, dest]) => {
                let command = require_command(command, op, true)?;
                let path = require_destination(dest, op)?;
                let mode = match parsed.shape() {
                    LineShape::Append => RedirectMode::Append,
                    _ => RedirectMode::Truncate,
                };
                stdout.flush().ok();
                let file = external::open_destination(path, mode)?;
                let child = external::spawn(command, Source::Inherit, Sink::File(file))?;
                Ok(external::wait(child)?)
            }
            (LineShape::Pipe, [left, right]) => {
                let left = require_command(left, op, true)?;
                let right = require_command(right, "|", false)?;
                stdout.flush().ok();
                Self::run_pipe(left, right, Sink::Inherit)
            }
            (LineShape::PipeRedirect, [left, right, dest]) | (LineShape::PipeAppend, [left, right, dest]) => {
                let left = require_command(left, "|", true)?;
                let right = require_command(right, "|", false)?;
                let path = require_destination(dest, op)?;
                let mode = match parsed.shape() {
                    LineShape::PipeAppend => RedirectMode::Append,
                    _ => RedirectMode::Truncate,
                };
                stdout.flush().ok();
                let file = external::open_destination(path, mode)?;
                Self::run_pipe(left, right, Sink::File(file))
            }
            (shape, commands) => unreachable!("{shape:?} line with {} segments", commands.len()),
        }
    }

    fn run_simple(&mut self, command: &Command, stdout: &mut dyn Write) -> Result<ExitCode, ExecError> {
        let Some(name) = command.name() else {
            return Ok(0);
        };
        if let Some(builtin) = Builtin::lookup(name) {
            log::debug!("running builtin {}", builtin.name());
            let code = builtin.run(command.args(), stdout, &mut self.session);
            stdout.flush().ok();
            return Ok(code);
        }
        stdout.flush().ok();
        let child = external::spawn(command, Source::Inherit, Sink::Inherit)?;
        Ok(external::wait(child)?)
    }

    /// Connect `left`'s output to `right`'s input and wait for both.
    ///
    /// The status is that of `right`. A program that fails to start is
    /// reported; the other side still runs and sees end of stream or a
    /// closed pipe.
    fn run_pipe(left: &Command, right: &Command, sink: Sink) -> Result<ExitCode, ExecError> {
        let (read_end, write_end) = external::channel()?;
        let upstream = external::spawn(left, Source::Inherit, Sink::Channel(write_end));
        let downstream = external::spawn(right, Source::Channel(read_end), sink);

        Self::join_pipe(upstream.and_then(external::wait), downstream)
    }

    /// Collect a pipe once the upstream side has finished.
    ///
    /// The downstream child is always waited for; an upstream failure is only
    /// reported.
    fn join_pipe(
        upstream: Result<ExitCode, LaunchError>,
        downstream: Result<Child, LaunchError>,
    ) -> Result<ExitCode, ExecError> {
        if let Err(e) = upstream {
            report(&e);
        }
        Ok(external::wait(downstream?)?)
    }

    /// Interactive loop: prompt, read, log, execute, until `exit` or end of input.
    ///
    /// The session log is appended to `history` on the way out. A failure to
    /// write it is reported and otherwise ignored.
    pub fn repl(&mut self, source: &mut dyn LineSource, history: &HistoryStore) -> anyhow::Result<()> {
        log::info!("session started, {} history entries", self.session.persisted.len());
        loop {
            let prompt = prompt::current(&self.session.home);
            match source.next_line(&prompt) {
                Ok(ReadOutcome::Line(line)) => {
                    if !line.trim().is_empty() {
                        self.session.record(&line);
                        source.add_history(&line);
                    }
                    self.execute_line(&line, &mut io::stdout());
                    if self.session.should_exit {
                        break;
                    }
                }
                Ok(ReadOutcome::Interrupted) => {
                    log::debug!("line abandoned by interrupt");
                }
                Ok(ReadOutcome::Eof) => {
                    println!("exit");
                    break;
                }
                Err(e) => {
                    log::warn!("line source failed, leaving: {e}");
                    break;
                }
            }
        }

        if let Err(e) = history.append(&self.session.log) {
            report(&e);
        }
        log::info!("session ended after {} commands", self.session.log.len());
        Ok(())
    }
}
