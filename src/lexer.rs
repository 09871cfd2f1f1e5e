//! Lexical analysis: splits a command segment into words.
//!
//! Whitespace separates words unless it sits between double quotes. Once a
//! word is complete, `~` is replaced by the home directory and a word that is
//! exactly `$?` becomes the last exit status.

use crate::command::{ExitCode, Word};
use thiserror::Error;

/// Errors that can occur during the lexical analysis process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    /// A closing double quote was not found.
    #[error("unterminated quote")]
    UnfinishedQuote,
}

/// Values substituted into words when they are completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansions {
    /// Replacement for every `~`.
    pub home: String,
    /// Replacement for a `$?` word.
    pub last_status: ExitCode,
}

impl Expansions {
    fn apply(&self, raw: String) -> String {
        let expanded = if raw.contains('~') {
            raw.replace('~', &self.home)
        } else {
            raw
        };
        if expanded == "$?" {
            self.last_status.to_string()
        } else {
            expanded
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingDoubleQuote,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
    expansions: &'a Expansions,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str, expansions: &'a Expansions) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Start,
            buffer: String::new(),
            expansions,
        }
    }

    /// Runs the machine over the whole input.
    ///
    /// A dangling double quote rejects the entire segment, no partial output.
    fn make_words(&mut self) -> Result<Vec<Word>, LexingError> {
        let mut out = Vec::new();

        while let Some(ch) = self.input.next() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingDoubleQuote => self.handle_double_quote(ch),
            }
        }

        if self.state == LexingState::ReadingDoubleQuote {
            return Err(LexingError::UnfinishedQuote);
        }

        self.finalize_word(&mut out);
        Ok(out)
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            c if c.is_whitespace() => {}
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<Word>) {
        match ch {
            c if c.is_whitespace() => {
                self.finalize_word(out);
                self.state = LexingState::Start;
            }
            '"' => self.state = LexingState::ReadingDoubleQuote,
            c => self.buffer.push(c),
        }
    }

    fn handle_double_quote(&mut self, ch: char) {
        match ch {
            '"' => self.state = LexingState::ReadingWord,
            c => self.buffer.push(c),
        }
    }

    /// Expands the accumulated buffer and emits it, dropping empty results
    /// such as a bare `""`.
    fn finalize_word(&mut self, out: &mut Vec<Word>) {
        let raw = std::mem::take(&mut self.buffer);
        if raw.is_empty() {
            return;
        }
        if let Some(word) = Word::new(self.expansions.apply(raw)) {
            out.push(word);
        }
    }
}

/// The main entry point function to perform lexical analysis.
///
/// # Returns
/// Words in source order, or a `LexingError` when a double quote is left open.
pub fn split_into_words(line: &str, expansions: &Expansions) -> Result<Vec<Word>, LexingError> {
    LexingFSM::new(line, expansions).make_words()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(status: ExitCode) -> Expansions {
        Expansions {
            home: "/home/ann".to_string(),
            last_status: status,
        }
    }

    fn words(line: &str, status: ExitCode) -> Vec<String> {
        split_into_words(line, &ctx(status))
            .unwrap()
            .into_iter()
            .map(Word::into_string)
            .collect()
    }

    #[test]
    fn test_quoted_whitespace_is_kept() {
        assert_eq!(words("\"a b\" c", 0), vec!["a b", "c"]);
    }

    #[test]
    fn test_runs_of_whitespace_collapse() {
        assert_eq!(words("  ls \t  -l   ", 0), vec!["ls", "-l"]);
        assert!(words("   ", 0).is_empty());
    }

    #[test]
    fn test_quotes_join_adjacent_text() {
        assert_eq!(words("pre\"fix mid\"post x", 0), vec!["prefix midpost", "x"]);
    }

    #[test]
    fn test_empty_quotes_produce_no_word() {
        assert_eq!(words("echo \"\"", 0), vec!["echo"]);
    }

    #[test]
    fn test_last_status_expansion() {
        assert_eq!(words("echo $?", 3), vec!["echo", "3"]);
    }

    #[test]
    fn test_status_only_expands_whole_word() {
        assert_eq!(words("echo x$? $?y", 3), vec!["echo", "x$?", "$?y"]);
    }

    #[test]
    fn test_tilde_expands_everywhere_including_quotes() {
        assert_eq!(
            words("ls ~ ~/src \"~/a b\" a~b", 0),
            vec!["ls", "/home/ann", "/home/ann/src", "/home/ann/a b", "a/home/annb"]
        );
    }

    #[test]
    fn test_unterminated_quote_rejects_line() {
        let err = split_into_words("echo \"hello world", &ctx(0)).unwrap_err();
        assert_eq!(err, LexingError::UnfinishedQuote);
        assert!(split_into_words("\"", &ctx(0)).is_err());
        assert!(split_into_words("a b c \" d", &ctx(0)).is_err());
    }
}
