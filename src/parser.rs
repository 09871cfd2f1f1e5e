use crate::command::Command;
use crate::lexer::{self, Expansions, LexingError};

/// Structural category of an input line.
///
/// Decides how many commands take part and how their standard streams
/// are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// `cmd`
    Simple,
    /// `left | right`
    Pipe,
    /// `cmd > path`
    Redirect,
    /// `cmd >> path`
    Append,
    /// `left | right > path`
    PipeRedirect,
    /// `left | right >> path`
    PipeAppend,
}

impl LineShape {
    /// Number of segments a line of this shape is split into.
    pub fn segments(self) -> usize {
        match self {
            LineShape::Simple => 1,
            LineShape::Pipe | LineShape::Redirect | LineShape::Append => 2,
            LineShape::PipeRedirect | LineShape::PipeAppend => 3,
        }
    }
}

/// A classified line: its shape plus the commands in segment order.
///
/// For redirecting shapes the last command names the destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    shape: LineShape,
    commands: Vec<Command>,
}

impl ParsedLine {
    pub fn shape(&self) -> LineShape {
        self.shape
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

/// Splits `line` at the leftmost relevant operator.
///
/// Only the first `|` and the first `>`/`>>` are looked at. Any operator
/// characters after them stay inside the segment text.
fn split_segments(line: &str) -> (LineShape, Vec<&str>) {
    let pipe = line.find('|');
    let append = line.find(">>");
    let redirect = line.find('>');

    match (pipe, append, redirect) {
        (Some(p), Some(a), _) if p < a => (
            LineShape::PipeAppend,
            vec![&line[..p], &line[p + 1..a], &line[a + 2..]],
        ),
        (Some(p), None, Some(r)) if p < r => (
            LineShape::PipeRedirect,
            vec![&line[..p], &line[p + 1..r], &line[r + 1..]],
        ),
        (_, Some(a), _) => (LineShape::Append, vec![&line[..a], &line[a + 2..]]),
        (_, None, Some(r)) => (LineShape::Redirect, vec![&line[..r], &line[r + 1..]]),
        (Some(p), None, None) => (LineShape::Pipe, vec![&line[..p], &line[p + 1..]]),
        (None, None, None) => (LineShape::Simple, vec![line]),
    }
}

/// Classifies a raw input line and tokenizes each of its segments.
///
/// Classification is total: every line, including an empty one, yields a
/// shape. Empty segments are kept as empty commands so that the executor can
/// reject them. A `LexingError` in any segment rejects the whole line.
pub fn parse_line(line: &str, expansions: &Expansions) -> Result<ParsedLine, LexingError> {
    let (shape, segments) = split_segments(line);
    let commands = segments
        .into_iter()
        .map(|segment| lexer::split_into_words(segment, expansions).map(Command::new))
        .collect::<Result<Vec<_>, _>>()?;
    debug_assert_eq!(commands.len(), shape.segments());
    log::debug!("classified {:?} as {:?} ({} segments)", line, shape, commands.len());
    Ok(ParsedLine { shape, commands })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Expansions {
        Expansions {
            home: "/home/ann".to_string(),
            last_status: 0,
        }
    }

    fn parse(line: &str) -> ParsedLine {
        parse_line(line, &ctx()).unwrap()
    }

    fn segments(parsed: &ParsedLine) -> Vec<String> {
        parsed.commands().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_simple_line() {
        let parsed = parse("echo hi");
        assert_eq!(parsed.shape(), LineShape::Simple);
        assert_eq!(segments(&parsed), vec!["echo hi"]);
    }

    #[test]
    fn test_empty_line_is_simple_with_empty_command() {
        let parsed = parse("");
        assert_eq!(parsed.shape(), LineShape::Simple);
        assert_eq!(parsed.commands().len(), 1);
        assert!(parsed.commands()[0].is_empty());
    }

    #[test]
    fn test_pipe_then_redirect_is_combined_form() {
        let parsed = parse("a | b > out.txt");
        assert_eq!(parsed.shape(), LineShape::PipeRedirect);
        assert_eq!(segments(&parsed), vec!["a", "b", "out.txt"]);
    }

    #[test]
    fn test_pipe_then_append_is_combined_form() {
        let parsed = parse("cat log|grep err>>errors.txt");
        assert_eq!(parsed.shape(), LineShape::PipeAppend);
        assert_eq!(segments(&parsed), vec!["cat log", "grep err", "errors.txt"]);
    }

    #[test]
    fn test_operators_without_spaces() {
        let parsed = parse("echo hi>f");
        assert_eq!(parsed.shape(), LineShape::Redirect);
        assert_eq!(segments(&parsed), vec!["echo hi", "f"]);

        let parsed = parse("ls|wc -l");
        assert_eq!(parsed.shape(), LineShape::Pipe);
        assert_eq!(segments(&parsed), vec!["ls", "wc -l"]);
    }

    #[test]
    fn test_append_wins_over_redirect() {
        let parsed = parse("echo hi >> log");
        assert_eq!(parsed.shape(), LineShape::Append);
        assert_eq!(segments(&parsed), vec!["echo hi", "log"]);
    }

    #[test]
    fn test_redirect_before_pipe_is_plain_redirect() {
        let parsed = parse("echo a > f | b");
        assert_eq!(parsed.shape(), LineShape::Redirect);
        assert_eq!(segments(&parsed), vec!["echo a", "f | b"]);
    }

    #[test]
    fn test_only_first_pipe_splits() {
        let parsed = parse("a | b | c");
        assert_eq!(parsed.shape(), LineShape::Pipe);
        assert_eq!(segments(&parsed), vec!["a", "b | c"]);
    }

    #[test]
    fn test_empty_segments_are_kept() {
        let parsed = parse("echo hi >");
        assert_eq!(parsed.shape(), LineShape::Redirect);
        assert!(parsed.commands()[1].is_empty());

        let parsed = parse("| wc");
        assert_eq!(parsed.shape(), LineShape::Pipe);
        assert!(parsed.commands()[0].is_empty());
    }

    #[test]
    fn test_segments_are_expanded() {
        let parsed = parse("ls ~ > ~/listing");
        assert_eq!(segments(&parsed), vec!["ls /home/ann", "/home/ann/listing"]);
    }

    #[test]
    fn test_unterminated_quote_in_any_segment_fails() {
        assert_eq!(
            parse_line("echo ok | grep \"x", &ctx()),
            Err(LexingError::UnfinishedQuote)
        );
    }
}
