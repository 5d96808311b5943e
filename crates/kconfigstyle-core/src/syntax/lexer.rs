//! Lazy, lossless Kconfig tokenizer
//!
//! Every byte of the input ends up in exactly one token, so concatenating
//! token texts reproduces the input. Help text is recognized the same way the
//! Kconfig lexer does it: after a `help` line, indented lines form the help
//! block until a non-blank line is indented less than the first one.

use super::token::{Keyword, Token, TokenKind};
use crate::span::{Position, Span};

/// Columns a tab advances to when measuring indentation
pub const TAB_STOP: usize = 8;

/// Display width of leading whitespace, with tabs advancing to the next stop
pub fn indent_width(ws: &str) -> usize {
    ws.chars().fold(0, |col, c| match c {
        '\t' => (col / TAB_STOP + 1) * TAB_STOP,
        _ => col + 1,
    })
}

/// Tokenize `source` lazily
pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelpState {
    Off,
    /// A `help` line just ended; the next indented line opens the block
    Armed,
    In { baseline: usize },
}

/// Iterator over the tokens of one source text
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: Position,
    /// At the first byte of a physical line
    line_start: bool,
    /// The current physical line continues the previous one
    continued: bool,
    /// A word was already seen on the current logical line
    saw_word: bool,
    /// The current logical line started with `help`
    help_line: bool,
    help: HelpState,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
            line_start: true,
            continued: false,
            saw_word: false,
            help_line: false,
            help: HelpState::Off,
            finished: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    /// Consume bytes up to `end` and return the covered span
    fn bump_to(&mut self, end: usize) -> Span {
        let start = self.pos;
        for c in self.source[start.offset..end].chars() {
            if c == '\n' {
                self.pos.line += 1;
                self.pos.column = 1;
            } else {
                self.pos.column += 1;
            }
        }
        self.pos.offset = end;
        Span::new(start, self.pos)
    }

    fn token_to(&mut self, kind: TokenKind, end: usize) -> Token {
        let span = self.bump_to(end);
        Token::new(kind, span)
    }

    /// Offsets of the current physical line: (content end, line end)
    ///
    /// Content excludes the terminator; line end includes it.
    fn physical_line_bounds(&self) -> (usize, usize) {
        let rest = self.rest();
        match rest.find('\n') {
            Some(nl) => {
                let content = if nl > 0 && rest.as_bytes()[nl - 1] == b'\r' {
                    nl - 1
                } else {
                    nl
                };
                (self.pos.offset + content, self.pos.offset + nl + 1)
            }
            None => (self.source.len(), self.source.len()),
        }
    }

    fn end_logical_line(&mut self) {
        self.line_start = true;
        self.continued = false;
        self.saw_word = false;
        if self.help_line {
            self.help = HelpState::Armed;
            self.help_line = false;
        }
    }

    /// Handle the first byte of a physical line
    fn lex_line_start(&mut self) -> Option<Token> {
        self.line_start = false;
        let (content_end, line_end) = self.physical_line_bounds();
        let line = &self.source[self.pos.offset..content_end];
        let ws_len = line.len() - line.trim_start_matches([' ', '\t']).len();

        if self.continued {
            if ws_len > 0 {
                return Some(self.token_to(TokenKind::Whitespace, self.pos.offset + ws_len));
            }
            return None;
        }

        if ws_len == line.len() {
            // Whitespace-only physical line
            if line_end == self.pos.offset {
                return None;
            }
            return Some(self.token_to(TokenKind::BlankLine, line_end));
        }

        let width = indent_width(&line[..ws_len]);
        match self.help {
            HelpState::Armed if width > 0 => {
                self.help = HelpState::In { baseline: width };
                return Some(self.token_to(TokenKind::HelpText, content_end));
            }
            HelpState::In { baseline } if width >= baseline => {
                return Some(self.token_to(TokenKind::HelpText, content_end));
            }
            HelpState::Off => {}
            _ => self.help = HelpState::Off,
        }

        if ws_len > 0 {
            return Some(self.token_to(TokenKind::Indent, self.pos.offset + ws_len));
        }
        None
    }

    fn lex_newline(&mut self, len: usize) -> Token {
        let token = self.token_to(TokenKind::Newline, self.pos.offset + len);
        self.end_logical_line();
        token
    }

    fn lex_word(&mut self) -> Token {
        let bytes = self.rest().as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if is_word_byte(b) {
                i += 1;
            } else if b == b'$' && bytes.get(i + 1) == Some(&b'(') {
                i += macro_len(&bytes[i..]);
            } else {
                break;
            }
        }
        let end = self.pos.offset + i;
        let word = &self.source[self.pos.offset..end];
        let kind = match Keyword::from_word(word) {
            Some(kw) => {
                if !self.saw_word && kw == Keyword::Help {
                    self.help_line = true;
                }
                TokenKind::Keyword(kw)
            }
            None => TokenKind::Identifier,
        };
        self.saw_word = true;
        self.token_to(kind, end)
    }

    fn lex_string(&mut self, quote: u8) -> Token {
        let bytes = self.rest().as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 < bytes.len() && bytes[i + 1] != b'\n' => i += 2,
                b'\n' => break,
                b if b == quote => {
                    let end = self.pos.offset + i + 1;
                    self.saw_word = true;
                    return self.token_to(TokenKind::StringLiteral, end);
                }
                _ => i += 1,
            }
        }
        // Unterminated: everything up to the line terminator is unknown
        let (content_end, _) = self.physical_line_bounds();
        self.token_to(TokenKind::Unknown, content_end)
    }

    fn lex_operator(&mut self) -> Option<Token> {
        const OPERATORS: [&str; 14] = [
            "&&", "||", "!=", "<=", ">=", ":=", "+=", "?=", "!", "=", "<", ">", "(", ")",
        ];
        let rest = self.rest();
        let op = OPERATORS.iter().find(|op| rest.starts_with(**op))?;
        let end = self.pos.offset + op.len();
        Some(self.token_to(TokenKind::Operator, end))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        if self.line_start && self.pos.offset < self.source.len() {
            if let Some(token) = self.lex_line_start() {
                if token.kind == TokenKind::BlankLine {
                    self.line_start = true;
                }
                return Some(token);
            }
        }

        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            self.finished = true;
            return Some(Token::new(TokenKind::Eof, Span::empty(self.pos)));
        };

        let start = self.pos.offset;
        let token = match c {
            '\n' => self.lex_newline(1),
            '\r' if rest.starts_with("\r\n") => self.lex_newline(2),
            '\\' if rest[1..].starts_with('\n') || rest[1..].starts_with("\r\n") => {
                let len = if rest[1..].starts_with('\n') { 2 } else { 3 };
                let token = self.token_to(TokenKind::LineContinuation, start + len);
                self.line_start = true;
                self.continued = true;
                token
            }
            ' ' | '\t' => {
                let len = rest.len() - rest.trim_start_matches([' ', '\t']).len();
                self.token_to(TokenKind::Whitespace, start + len)
            }
            '#' => {
                let (content_end, _) = self.physical_line_bounds();
                self.token_to(TokenKind::Comment, content_end)
            }
            '"' | '\'' => self.lex_string(c as u8),
            c if c.is_ascii() && (is_word_byte(c as u8) || rest.starts_with("$(")) => {
                self.lex_word()
            }
            _ => match self.lex_operator() {
                Some(token) => token,
                None => self.token_to(TokenKind::Unknown, start + c.len_utf8()),
            },
        };
        Some(token)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/')
}

/// Length of a `$(...)` reference, nested parentheses included
fn macro_len(bytes: &[u8]) -> usize {
    let mut depth = 0;
    for (i, &b) in bytes.iter().enumerate().skip(1) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            b'\n' => return i,
            _ => {}
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<&str> {
        tokenize(source).map(|t| t.text(source)).collect()
    }

    #[test]
    fn test_lossless() {
        let sources = [
            "config FOO\n\tbool \"Foo\"\n\tdefault y if BAR && !BAZ # note\n",
            "menu \"X\"\n\n  \nendmenu",
            "config A\n\thelp\n\t  Text\n\n\t  More\nconfig B\r\n",
            "select A && \\\n\t\tB\n",
            "weird ` chars \"open\n",
            "",
        ];
        for source in sources {
            let joined: String = texts(source).concat();
            assert_eq!(joined, source);
        }
    }

    #[test]
    fn test_restartable() {
        let source = "config FOO\n\tbool\n";
        let first: Vec<Token> = tokenize(source).collect();
        let second: Vec<Token> = tokenize(source).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_basic_line() {
        assert_eq!(
            kinds("\tdefault y\n"),
            vec![
                TokenKind::Indent,
                TokenKind::Keyword(Keyword::Default),
                TokenKind::Whitespace,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_blank_line_token() {
        let tokens: Vec<Token> = tokenize("a\n \t\n\nb").collect();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::BlankLine,
                TokenKind::BlankLine,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[2].span.start.line, 2);
        assert_eq!(tokens[4].span.start.line, 4);
    }

    #[test]
    fn test_help_text() {
        let source = "\thelp\n\t  Line one\n\n\t    nested\n\tdefault y\n";
        let tokens: Vec<Token> = tokenize(source).collect();
        let help: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::HelpText)
            .map(|t| t.text(source))
            .collect();
        assert_eq!(help, vec!["\t  Line one", "\t    nested"]);
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Keyword(Keyword::Default)));
    }

    #[test]
    fn test_help_requires_indent() {
        let source = "help\nconfig FOO\n";
        assert!(!kinds(source).contains(&TokenKind::HelpText));
    }

    #[test]
    fn test_help_keyword_inside_help() {
        let source = "\thelp\n\t  config use this\n\t  help me\nconfig B\n";
        let count = kinds(source)
            .iter()
            .filter(|k| **k == TokenKind::HelpText)
            .count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_help_only_at_line_start() {
        let source = "\tprompt \"help\"\n\t  text\n";
        assert!(!kinds(source).contains(&TokenKind::HelpText));
    }

    #[test]
    fn test_line_continuation() {
        let source = "depends on A && \\\n\t\tB\n";
        let tokens: Vec<Token> = tokenize(source).collect();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert!(kinds.contains(&TokenKind::LineContinuation));
        assert!(!kinds.contains(&TokenKind::Indent));
        let b = tokens.iter().find(|t| t.text(source) == "B").unwrap();
        assert_eq!(b.span.start.line, 2);
        assert_eq!(b.span.start.column, 3);
    }

    #[test]
    fn test_operators_and_macros() {
        let source = "default $(dt_has(foo)) if !(A||B) != 0\n";
        let words = texts(source);
        assert!(words.contains(&"$(dt_has(foo))"));
        assert!(words.contains(&"||"));
        assert!(words.contains(&"!="));
        assert!(words.contains(&"!"));
    }

    #[test]
    fn test_unknown_never_fails() {
        let source = "config A`B\n\tprompt \"unterminated\n";
        let tokens: Vec<Token> = tokenize(source).collect();
        let unknown: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Unknown)
            .map(|t| t.text(source))
            .collect();
        assert_eq!(unknown, vec!["`", "\"unterminated"]);
    }

    #[test]
    fn test_comment_stops_before_crlf() {
        let source = "# hi\r\n";
        assert_eq!(texts(source), vec!["# hi", "\r\n", ""]);
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("\t"), 8);
        assert_eq!(indent_width("\t  "), 10);
        assert_eq!(indent_width("  \t"), 8);
        assert_eq!(indent_width("    "), 4);
    }
}
