//! Lexical tokens

use std::fmt;

use crate::span::Span;

/// Reserved Kconfig words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Config,
    MenuConfig,
    Menu,
    EndMenu,
    Choice,
    EndChoice,
    If,
    EndIf,
    Source,
    Rsource,
    Osource,
    Orsource,
    Comment,
    MainMenu,
    Help,
    Bool,
    Tristate,
    Int,
    Hex,
    String,
    DefBool,
    DefTristate,
    Prompt,
    Default,
    Depends,
    On,
    Select,
    Imply,
    Range,
    Option,
    Visible,
    Modules,
    Optional,
    Transitional,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let kw = match word {
            "config" => Keyword::Config,
            "menuconfig" => Keyword::MenuConfig,
            "menu" => Keyword::Menu,
            "endmenu" => Keyword::EndMenu,
            "choice" => Keyword::Choice,
            "endchoice" => Keyword::EndChoice,
            "if" => Keyword::If,
            "endif" => Keyword::EndIf,
            "source" => Keyword::Source,
            "rsource" => Keyword::Rsource,
            "osource" => Keyword::Osource,
            "orsource" => Keyword::Orsource,
            "comment" => Keyword::Comment,
            "mainmenu" => Keyword::MainMenu,
            "help" | "---help---" => Keyword::Help,
            "bool" | "boolean" => Keyword::Bool,
            "tristate" => Keyword::Tristate,
            "int" => Keyword::Int,
            "hex" => Keyword::Hex,
            "string" => Keyword::String,
            "def_bool" => Keyword::DefBool,
            "def_tristate" => Keyword::DefTristate,
            "prompt" => Keyword::Prompt,
            "default" => Keyword::Default,
            "depends" => Keyword::Depends,
            "on" => Keyword::On,
            "select" => Keyword::Select,
            "imply" => Keyword::Imply,
            "range" => Keyword::Range,
            "option" => Keyword::Option,
            "visible" => Keyword::Visible,
            "modules" => Keyword::Modules,
            "optional" => Keyword::Optional,
            "transitional" => Keyword::Transitional,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Config => "config",
            Keyword::MenuConfig => "menuconfig",
            Keyword::Menu => "menu",
            Keyword::EndMenu => "endmenu",
            Keyword::Choice => "choice",
            Keyword::EndChoice => "endchoice",
            Keyword::If => "if",
            Keyword::EndIf => "endif",
            Keyword::Source => "source",
            Keyword::Rsource => "rsource",
            Keyword::Osource => "osource",
            Keyword::Orsource => "orsource",
            Keyword::Comment => "comment",
            Keyword::MainMenu => "mainmenu",
            Keyword::Help => "help",
            Keyword::Bool => "bool",
            Keyword::Tristate => "tristate",
            Keyword::Int => "int",
            Keyword::Hex => "hex",
            Keyword::String => "string",
            Keyword::DefBool => "def_bool",
            Keyword::DefTristate => "def_tristate",
            Keyword::Prompt => "prompt",
            Keyword::Default => "default",
            Keyword::Depends => "depends",
            Keyword::On => "on",
            Keyword::Select => "select",
            Keyword::Imply => "imply",
            Keyword::Range => "range",
            Keyword::Option => "option",
            Keyword::Visible => "visible",
            Keyword::Modules => "modules",
            Keyword::Optional => "optional",
            Keyword::Transitional => "transitional",
        }
    }

    /// Keywords that close a block
    pub fn is_terminator(&self) -> bool {
        matches!(self, Keyword::EndMenu | Keyword::EndChoice | Keyword::EndIf)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    StringLiteral,
    Operator,
    /// `#` up to (not including) the line terminator
    Comment,
    /// Leading whitespace of a line that starts a logical line
    Indent,
    /// Any other run of spaces and tabs
    Whitespace,
    Newline,
    /// A whole whitespace-only line, terminator included
    BlankLine,
    /// `\` immediately followed by a line terminator
    LineContinuation,
    /// One line of help text, indentation included, terminator excluded
    HelpText,
    Unknown,
    Eof,
}

impl TokenKind {
    /// Tokens that carry no syntactic meaning
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Indent
                | TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::BlankLine
                | TokenKind::LineContinuation
                | TokenKind::Comment
                | TokenKind::Eof
        )
    }
}

/// A lexical token
///
/// Tokens do not own their text; use [`Token::text`] with the source they
/// were produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(kw) => Some(kw),
            _ => None,
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.kind == TokenKind::Keyword(kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["config", "menuconfig", "endchoice", "def_tristate", "orsource"] {
            let kw = Keyword::from_word(word).unwrap();
            assert_eq!(kw.as_str(), word);
        }
    }

    #[test]
    fn test_help_aliases() {
        assert_eq!(Keyword::from_word("---help---"), Some(Keyword::Help));
        assert_eq!(Keyword::from_word("helpful"), None);
    }

    #[test]
    fn test_terminators() {
        assert!(Keyword::EndIf.is_terminator());
        assert!(!Keyword::If.is_terminator());
    }
}
