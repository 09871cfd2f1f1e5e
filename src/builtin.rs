use crate::command::{ExitCode, Word};
use crate::session::Session;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures a builtin handles locally. Each kind has its own exit status.
#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("cd: no previous directory")]
    NoPreviousDir,
    #[error("cd: {}: permission denied", .0.display())]
    PermissionDenied(PathBuf),
    #[error("cd: {}: no such directory", .0.display())]
    NoSuchDir(PathBuf),
    #[error("cd: {}: {source}", path.display())]
    ChangeDir { path: PathBuf, source: io::Error },
    #[error("{0}")]
    Io(#[from] io::Error),
}

impl BuiltinError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            BuiltinError::NoPreviousDir => 1,
            BuiltinError::PermissionDenied(_) => 2,
            BuiltinError::NoSuchDir(_) => 3,
            BuiltinError::ChangeDir { .. } => 4,
            BuiltinError::Io(_) => 1,
        }
    }
}

/// The closed set of commands the shell runs in-process.
///
/// Add a builtin by adding a variant here plus its `BuiltinCommand` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Cd,
    Help,
    Exit,
    History,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Cd, Builtin::Help, Builtin::Exit, Builtin::History];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Help => "help",
            Builtin::Exit => "exit",
            Builtin::History => "history",
        }
    }

    /// Exact-match lookup of a command name.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    /// Parse `args` for this builtin and run it against the session.
    ///
    /// Errors are reported on standard error; the return value is the status
    /// to store as the last exit status.
    pub fn run(self, args: &[Word], stdout: &mut dyn Write, session: &mut Session) -> ExitCode {
        match self {
            Builtin::Cd => run::<Cd>(args, stdout, session),
            Builtin::Help => run::<Help>(args, stdout, session),
            Builtin::Exit => run::<Exit>(args, stdout, session),
            Builtin::History => run::<History>(args, stdout, session),
        }
    }
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    const KIND: Builtin;

    /// Adjust raw arguments before `argh` sees them.
    fn prepare_args(args: Vec<&str>) -> Vec<&str> {
        args
    }

    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode, BuiltinError>;
}

/// Treat every argument as an operand, so flags such as `--help` are ignored.
fn operands_only(mut args: Vec<&str>) -> Vec<&str> {
    args.insert(0, "--");
    args
}

fn run<T: BuiltinCommand>(args: &[Word], stdout: &mut dyn Write, session: &mut Session) -> ExitCode {
    let name = T::KIND.name();
    let args = T::prepare_args(args.iter().map(Word::as_str).collect());
    match T::from_args(&[name], &args) {
        Ok(cmd) => match cmd.execute(stdout, session) {
            Ok(code) => code,
            Err(e) => {
                log::debug!("builtin {name} failed: {e:?}");
                eprintln!("3sh: {e}");
                e.exit_code()
            }
        },
        Err(EarlyExit { output, status }) => {
            if status.is_ok() {
                let _ = writeln!(stdout, "{output}");
                0
            } else {
                eprintln!("{output}");
                1
            }
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// Without a target, changes to the home directory; `-` returns to the previous one.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to, or `-` for the previous directory.
    pub target: Option<String>,
}

impl Cd {
    fn change_to(path: &Path) -> Result<(), BuiltinError> {
        env::set_current_dir(path).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => BuiltinError::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound | ErrorKind::NotADirectory => {
                BuiltinError::NoSuchDir(path.to_path_buf())
            }
            _ => BuiltinError::ChangeDir {
                path: path.to_path_buf(),
                source: e,
            },
        })
    }
}

impl BuiltinCommand for Cd {
    const KIND: Builtin = Builtin::Cd;

    fn prepare_args(mut args: Vec<&str>) -> Vec<&str> {
        // `-` would otherwise be taken for a flag.
        if args.first() == Some(&"-") {
            args.insert(0, "--");
        }
        args
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode, BuiltinError> {
        let current = env::current_dir().ok();
        let target = match self.target.as_deref() {
            None | Some("") => session.home.clone(),
            Some("-") => session
                .previous_dir
                .clone()
                .ok_or(BuiltinError::NoPreviousDir)?,
            Some(path) => PathBuf::from(path),
        };

        Self::change_to(&target)?;
        log::info!("cd: {:?} -> {}", current, target.display());
        session.previous_dir = current;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print usage and the list of builtin commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Help {
    const KIND: Builtin = Builtin::Help;

    fn prepare_args(args: Vec<&str>) -> Vec<&str> {
        operands_only(args)
    }

    fn execute(self, stdout: &mut dyn Write, _session: &mut Session) -> Result<ExitCode, BuiltinError> {
        writeln!(stdout, "3sh: a small interactive shell")?;
        writeln!(stdout, "Type a program name and its arguments, then press enter.")?;
        writeln!(stdout, "Connect two programs with `|`; send output to a file with `>` or `>>`.")?;
        writeln!(stdout, "The following commands are built in:")?;
        for builtin in Builtin::ALL {
            writeln!(stdout, "  {}", builtin.name())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Save history and leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored; the shell always exits with status 0.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    const KIND: Builtin = Builtin::Exit;

    fn prepare_args(args: Vec<&str>) -> Vec<&str> {
        operands_only(args)
    }

    fn execute(self, _stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode, BuiltinError> {
        session.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List saved history followed by the commands run in this session.
pub struct History {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for History {
    const KIND: Builtin = Builtin::History;

    fn prepare_args(args: Vec<&str>) -> Vec<&str> {
        operands_only(args)
    }

    fn execute(self, stdout: &mut dyn Write, session: &mut Session) -> Result<ExitCode, BuiltinError> {
        for (i, line) in session.history().enumerate() {
            writeln!(stdout, "{:>5}  {}", i + 1, line)?;
        }
        Ok(0)
    }
}
