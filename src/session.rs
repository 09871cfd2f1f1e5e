use crate::command::ExitCode;
use crate::lexer::Expansions;
use std::path::PathBuf;

/// Mutable state that lives for the whole interactive session.
///
/// The session contains:
/// - `home`: the user's home directory, target of a bare `cd` and of `~`.
/// - `previous_dir`: the directory `cd -` returns to.
/// - `last_status`: exit status of the last executed line, substituted for `$?`.
/// - `persisted`: history entries loaded from the history store at startup.
/// - `log`: lines executed in this session, written to the store at the end.
/// - `should_exit`: set by `exit`; the read loop checks it after every line.
#[derive(Debug, Clone)]
pub struct Session {
    pub home: PathBuf,
    pub previous_dir: Option<PathBuf>,
    pub last_status: ExitCode,
    pub persisted: Vec<String>,
    pub log: Vec<String>,
    pub should_exit: bool,
}

impl Session {
    /// Start a session rooted at `home`, seeded with previously persisted history.
    pub fn new(home: PathBuf, persisted: Vec<String>) -> Self {
        Self {
            home,
            previous_dir: None,
            last_status: 0,
            persisted,
            log: Vec::new(),
            should_exit: false,
        }
    }

    /// Substitutions the lexer needs for the next line.
    pub fn expansions(&self) -> Expansions {
        Expansions {
            home: self.home.to_string_lossy().into_owned(),
            last_status: self.last_status,
        }
    }

    /// Record a line in the session log. Blank lines are ignored.
    pub fn record(&mut self, line: &str) {
        if !line.trim().is_empty() {
            self.log.push(line.to_string());
        }
    }

    /// Persisted entries followed by this session's entries.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.persisted
            .iter()
            .chain(self.log.iter())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_skips_blank_lines() {
        let mut session = Session::new(PathBuf::from("/home/ann"), Vec::new());
        session.record("ls");
        session.record("   ");
        session.record("");
        assert_eq!(session.log, vec!["ls".to_string()]);
    }

    #[test]
    fn test_history_lists_persisted_entries_first() {
        let mut session = Session::new(
            PathBuf::from("/home/ann"),
            vec!["old1".to_string(), "old2".to_string()],
        );
        session.record("new");
        let all: Vec<&str> = session.history().collect();
        assert_eq!(all, vec!["old1", "old2", "new"]);
    }

    #[test]
    fn test_expansions_follow_last_status() {
        let mut session = Session::new(PathBuf::from("/home/ann"), Vec::new());
        session.last_status = 42;
        let exp = session.expansions();
        assert_eq!(exp.home, "/home/ann");
        assert_eq!(exp.last_status, 42);
    }
}
