use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::ops::Deref;
use std::os::fd::OwnedFd;
use std::process::Stdio;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// External programs killed by a signal report the signal number.
pub type ExitCode = i32;

/// A single token produced by the lexer. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word(String);

impl Word {
    /// Wrap `text` into a word, refusing empty strings.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.is_empty() { None } else { Some(Self(text)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Word {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<OsStr> for Word {
    fn as_ref(&self) -> &OsStr {
        OsStr::new(&self.0)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Word {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One program invocation: the first word names the program or builtin,
/// the rest are its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    words: Vec<Word>,
}

impl Command {
    pub fn new(words: Vec<Word>) -> Self {
        Self { words }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Program or builtin name, if the command has any words.
    pub fn name(&self) -> Option<&Word> {
        self.words.first()
    }

    pub fn args(&self) -> &[Word] {
        self.words.get(1..).unwrap_or_default()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

/// Where a launched process reads its standard input from.
#[derive(Debug)]
pub enum Source {
    /// The shell's own standard input.
    Inherit,
    /// Read end of a pipe channel.
    Channel(OwnedFd),
}

impl From<Source> for Stdio {
    fn from(source: Source) -> Stdio {
        match source {
            Source::Inherit => Stdio::inherit(),
            Source::Channel(fd) => Stdio::from(fd),
        }
    }
}

/// Where a launched process writes its standard output to.
#[derive(Debug)]
pub enum Sink {
    /// The shell's own standard output.
    Inherit,
    /// Write end of a pipe channel.
    Channel(OwnedFd),
    /// A redirection destination, already opened.
    File(File),
}

impl From<Sink> for Stdio {
    fn from(sink: Sink) -> Stdio {
        match sink {
            Sink::Inherit => Stdio::inherit(),
            Sink::Channel(fd) => Stdio::from(fd),
            Sink::File(file) => Stdio::from(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(words: &[&str]) -> Command {
        Command::new(words.iter().map(|w| Word::new(*w).unwrap()).collect())
    }

    #[test]
    fn test_word_rejects_empty_text() {
        assert!(Word::new("").is_none());
        assert_eq!(Word::new("ls").unwrap(), "ls");
    }

    #[test]
    fn test_command_name_and_args() {
        let c = cmd(&["grep", "-i", "foo"]);
        assert_eq!(c.name().map(Word::as_str), Some("grep"));
        assert_eq!(c.args().len(), 2);
        assert_eq!(c.to_string(), "grep -i foo");
    }

    #[test]
    fn test_empty_command_has_no_name_or_args() {
        let c = Command::default();
        assert!(c.is_empty());
        assert!(c.name().is_none());
        assert!(c.args().is_empty());
    }
}
