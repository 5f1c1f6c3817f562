use crate::frontend::token::{SourceLocation, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A diagnostic produced while scanning. Scanning never stops on one of
/// these; they accumulate and the caller decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationError {
    pub location: SourceLocation,
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for CompilationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {}",
            self.location, self.severity, self.message
        )
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    file: String,
    errors: Vec<CompilationError>,
}

impl Lexer {
    pub fn new(source: &str, file: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            file: file.to_string(),
            errors: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: self.line,
            column: self.col,
            offset: self.pos,
        }
    }

    fn error(&mut self, location: SourceLocation, message: String) {
        self.errors.push(CompilationError {
            location,
            message,
            severity: Severity::Error,
        });
    }

    /// Scan the whole source. Returns every token recognized plus every
    /// diagnostic recorded along the way; a terminal EOF token is always
    /// present even when the source ends mid-construct.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<CompilationError>) {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => self.skip_comment(),
                '\n' => {
                    let location = self.location();
                    self.advance();
                    tokens.push(Token {
                        kind: TokenKind::Newline,
                        value: "\n".to_string(),
                        location,
                    });
                }
                c if c.is_alphabetic() || c == '_' => tokens.push(self.read_word()),
                c if c.is_ascii_digit() => tokens.push(self.read_number()),
                '"' | '\'' => tokens.push(self.read_string(ch)),
                _ => match self.read_operator() {
                    Some(token) => tokens.push(token),
                    None => {
                        let location = self.location();
                        self.error(location, format!("Unexpected character: '{}'", ch));
                        self.advance();
                    }
                },
            }
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            value: String::new(),
            location: self.location(),
        });

        (tokens, self.errors)
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_word(&mut self) -> Token {
        let location = self.location();
        let mut word = String::new();

        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier);
        Token {
            kind,
            value: word,
            location,
        }
    }

    fn read_number(&mut self) -> Token {
        let location = self.location();
        let mut raw = String::new();

        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() {
                raw.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Fractional part, only when a digit follows the dot
        if self.current() == Some('.') && self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            raw.push('.');
            self.advance();
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    raw.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Exponent part, only when digits follow the marker
        if matches!(self.current(), Some('e') | Some('E')) && self.exponent_follows() {
            raw.push(self.advance().unwrap_or('e'));
            if matches!(self.current(), Some('+') | Some('-')) {
                raw.push(self.advance().unwrap_or('+'));
            }
            while let Some(ch) = self.current() {
                if ch.is_ascii_digit() {
                    raw.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token {
            kind: TokenKind::Number,
            value: raw,
            location,
        }
    }

    fn exponent_follows(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => self
                .source
                .get(self.pos + 2)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false),
            _ => false,
        }
    }

    fn read_string(&mut self, quote: char) -> Token {
        let location = self.location();
        self.advance();

        let mut value = String::new();
        loop {
            match self.current() {
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(quote, &mut value);
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
                None => {
                    self.error(location.clone(), "Unterminated string literal".to_string());
                    break;
                }
            }
        }

        Token {
            kind: TokenKind::Str,
            value,
            location,
        }
    }

    fn read_escape(&mut self, quote: char, value: &mut String) {
        match self.current() {
            Some('n') => {
                value.push('\n');
                self.advance();
            }
            Some('t') => {
                value.push('\t');
                self.advance();
            }
            Some('r') => {
                value.push('\r');
                self.advance();
            }
            Some('\\') => {
                value.push('\\');
                self.advance();
            }
            Some(c) if c == quote => {
                value.push(quote);
                self.advance();
            }
            Some('x') => {
                let location = self.location();
                self.advance();
                let mut hex = String::new();
                for _ in 0..2 {
                    match self.current() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                match u8::from_str_radix(&hex, 16) {
                    Ok(code) if hex.len() == 2 => value.push(code as char),
                    _ => {
                        self.error(
                            location,
                            format!("Invalid escape sequence: \\x{}", hex),
                        );
                        value.push('x');
                        value.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                // Unknown escapes keep the escaped character verbatim
                value.push(other);
                self.advance();
            }
            // Source ended on the backslash; the enclosing string loop
            // reports the unterminated literal
            None => {}
        }
    }

    fn read_operator(&mut self) -> Option<Token> {
        let location = self.location();
        let ch = self.current()?;

        // Longest match first
        if let Some(next) = self.peek() {
            let two: String = [ch, next].iter().collect();
            if let Some(kind) = two_char_kind(&two) {
                self.advance();
                self.advance();
                return Some(Token {
                    kind,
                    value: two,
                    location,
                });
            }
        }

        let kind = single_char_kind(ch)?;
        self.advance();
        Some(Token {
            kind,
            value: ch.to_string(),
            location,
        })
    }
}

fn two_char_kind(op: &str) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match op {
        "==" => Eq,
        "!=" => Ne,
        "<=" => Le,
        ">=" => Ge,
        "&&" => And,
        "||" => Or,
        "->" => Arrow,
        "::" => DoubleColon,
        "//" => Divide,
        _ => return Option::None,
    };
    Some(kind)
}

fn single_char_kind(ch: char) -> Option<TokenKind> {
    use TokenKind::*;
    let kind = match ch {
        '+' => Plus,
        '-' => Minus,
        '*' => Multiply,
        '/' => Divide,
        '%' => Modulo,
        '=' => Assign,
        '<' => Lt,
        '>' => Gt,
        '!' => Not,
        '(' => Lparen,
        ')' => Rparen,
        '{' => Lbrace,
        '}' => Rbrace,
        '[' => Lbracket,
        ']' => Rbracket,
        ',' => Comma,
        '.' => Dot,
        ':' => Colon,
        ';' => Semicolon,
        _ => return Option::None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> (Vec<Token>, Vec<CompilationError>) {
        Lexer::new(source, "test.ndl").tokenize()
    }

    #[test]
    fn tokenizes_let_statement_with_positions() {
        let (tokens, errors) = lex("let x = 42;");
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);

        macro_rules! at {
            ($i:expr, $kind:expr, $value:expr, $line:expr, $col:expr) => {{
                assert_eq!(tokens[$i].kind, $kind, "kind mismatch at index {}", $i);
                assert_eq!(tokens[$i].value, $value, "value mismatch at index {}", $i);
                assert_eq!(
                    tokens[$i].location.line, $line,
                    "line mismatch at index {}",
                    $i
                );
                assert_eq!(
                    tokens[$i].location.column, $col,
                    "column mismatch at index {}",
                    $i
                );
            }};
        }

        assert_eq!(tokens.len(), 6, "unexpected token count: {:?}", tokens);
        at!(0, TokenKind::Let, "let", 1, 1);
        at!(1, TokenKind::Identifier, "x", 1, 5);
        at!(2, TokenKind::Assign, "=", 1, 7);
        at!(3, TokenKind::Number, "42", 1, 9);
        at!(4, TokenKind::Semicolon, ";", 1, 11);
        at!(5, TokenKind::Eof, "", 1, 12);
    }

    #[test]
    fn recovers_from_unexpected_character() {
        let (tokens, errors) = lex("let x = @5;");

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unexpected character"));
        assert_eq!(errors[0].location.column, 9);
        assert_eq!(errors[0].severity, Severity::Error);

        // The stream is still complete through EOF
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_fall_back_to_identifier() {
        let (tokens, _) = lex("while whilst");
        assert_eq!(tokens[0].kind, TokenKind::While);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, "whilst");
    }

    #[test]
    fn prefers_two_char_operators() {
        let (tokens, errors) = lex("a == b != c <= d >= e -> f :: g && h || i");
        assert!(errors.is_empty());
        let ops: Vec<TokenKind> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Identifier && t.kind != TokenKind::Eof)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            ops,
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Arrow,
                TokenKind::DoubleColon,
                TokenKind::And,
                TokenKind::Or,
            ]
        );
    }

    #[test]
    fn none_keyword_and_unknown_operators_coexist() {
        // Both operator tables fall through for '@' while the none
        // keyword still lexes as its own kind
        let (tokens, errors) = lex("none @@");
        assert_eq!(tokens[0].kind, TokenKind::None);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message.contains("Unexpected character: '@'")));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn double_slash_lexes_as_divide() {
        let (tokens, errors) = lex("a // b");
        assert!(errors.is_empty());
        assert_eq!(tokens[1].kind, TokenKind::Divide);
        assert_eq!(tokens[1].value, "//");
    }

    #[test]
    fn numbers_with_fraction_and_exponent() {
        let (tokens, errors) = lex("1 2.5 3e10 4.2E-3 5.");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].value, "1");
        assert_eq!(tokens[1].value, "2.5");
        assert_eq!(tokens[2].value, "3e10");
        assert_eq!(tokens[3].value, "4.2E-3");
        // A trailing dot is not part of the number
        assert_eq!(tokens[4].value, "5");
        assert_eq!(tokens[5].kind, TokenKind::Dot);
    }

    #[test]
    fn bare_exponent_marker_stays_an_identifier() {
        let (tokens, errors) = lex("42end");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].value, "42");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].value, "end");
    }

    #[test]
    fn string_escapes() {
        let (tokens, errors) = lex(r#""a\nb\tc\\d\"e" '\x41'"#);
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, "a\nb\tc\\d\"e");
        assert_eq!(tokens[1].value, "A");
    }

    #[test]
    fn invalid_hex_escape_is_recorded_but_scanning_continues() {
        let (tokens, errors) = lex(r#""\xZZ" 7"#);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Invalid escape sequence"));
        assert_eq!(tokens[0].kind, TokenKind::Str);
        // The escape degrades to its raw characters
        assert_eq!(tokens[0].value, "xZZ");
        assert_eq!(tokens[1].kind, TokenKind::Number);
    }

    #[test]
    fn string_ending_on_backslash_reports_one_error() {
        let (tokens, errors) = lex("\"abc\\");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unterminated string"));
        assert_eq!(errors[0].location.column, 1);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, "abc");
    }

    #[test]
    fn unterminated_string_is_an_error_with_partial_value() {
        let (tokens, errors) = lex("\"abc");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Unterminated string"));
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, "abc");
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn comments_and_newlines() {
        let (tokens, errors) = lex("let a = 1 # trailing\nlet b = 2\n");
        assert!(errors.is_empty());
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
        // Newline positions are where the break occurred, EOF on the next line
        assert_eq!(tokens[4].location.line, 1);
        assert_eq!(tokens[10].location.line, 3);
        assert_eq!(tokens[10].location.column, 1);
    }

    #[test]
    fn single_quoted_strings() {
        let (tokens, errors) = lex("'hi \"there\"'");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].value, "hi \"there\"");
    }

    #[test]
    fn eof_carries_offset_past_last_char() {
        let (tokens, _) = lex("let x = 42;");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.location.offset, 11);
        assert_eq!(eof.location.file, "test.ndl");
    }
}
