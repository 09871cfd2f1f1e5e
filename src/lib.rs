//! A tiny interactive command shell.
//!
//! Each input line is classified by its first pipe and output-redirect
//! operators, split into commands, and run either in-process (builtins such
//! as `cd`) or as child processes whose standard streams are wired through a
//! pipe and/or a destination file. The shell always waits for everything it
//! starts before showing the next prompt.
//!
//! The main entry point is [`Interpreter`], which owns the [`Session`] and
//! executes lines. [`line_source`] and [`history`] provide the interactive
//! input and the persisted command log.

mod builtin;
pub mod command;
pub mod config;
mod external;
pub mod history;
mod interpreter;
pub mod lexer;
pub mod line_source;
pub mod logging;
pub mod parser;
pub mod prompt;
mod session;
pub mod signals;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{ExecError, Interpreter, SYNTAX_ERROR, SyntaxError};
pub use session::Session;
pub use builtin::Builtin;
pub use external::{NOT_EXECUTABLE, NOT_FOUND};
