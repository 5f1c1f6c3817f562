/// Position of a token in its source file. `line` and `column` are 1-based,
/// `offset` is the 0-based character index of the token start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Let,
    Def,
    Return,
    If,
    Else,
    For,
    In,
    While,
    Break,
    Continue,
    Import,
    From,
    As,
    Class,
    Struct,
    Interface,
    Implements,
    Extends,
    Type,
    Enum,
    Match,
    Case,
    Default,
    Async,
    Await,
    Yield,
    True,
    False,
    None,

    // Literals and names
    Identifier,
    Number,
    Str,

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Assign,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    Not,
    And,
    Or,
    Arrow,
    DoubleColon,

    // Delimiters
    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,
    Comma,
    Dot,
    Colon,
    Semicolon,

    // Structure
    Newline,
    Eof,
}

impl TokenKind {
    /// Uppercase mnemonic, as shown in token dumps and diagnostics.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Let => "LET",
            Def => "DEF",
            Return => "RETURN",
            If => "IF",
            Else => "ELSE",
            For => "FOR",
            In => "IN",
            While => "WHILE",
            Break => "BREAK",
            Continue => "CONTINUE",
            Import => "IMPORT",
            From => "FROM",
            As => "AS",
            Class => "CLASS",
            Struct => "STRUCT",
            Interface => "INTERFACE",
            Implements => "IMPLEMENTS",
            Extends => "EXTENDS",
            Type => "TYPE",
            Enum => "ENUM",
            Match => "MATCH",
            Case => "CASE",
            Default => "DEFAULT",
            Async => "ASYNC",
            Await => "AWAIT",
            Yield => "YIELD",
            True => "TRUE",
            False => "FALSE",
            None => "NONE",
            Identifier => "IDENTIFIER",
            Number => "NUMBER",
            Str => "STRING",
            Plus => "PLUS",
            Minus => "MINUS",
            Multiply => "MULTIPLY",
            Divide => "DIVIDE",
            Modulo => "MODULO",
            Assign => "ASSIGN",
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Gt => "GT",
            Le => "LE",
            Ge => "GE",
            Not => "NOT",
            And => "AND",
            Or => "OR",
            Arrow => "ARROW",
            DoubleColon => "DOUBLE_COLON",
            Lparen => "LPAREN",
            Rparen => "RPAREN",
            Lbrace => "LBRACE",
            Rbrace => "RBRACE",
            Lbracket => "LBRACKET",
            Rbracket => "RBRACKET",
            Comma => "COMMA",
            Dot => "DOT",
            Colon => "COLON",
            Semicolon => "SEMICOLON",
            Newline => "NEWLINE",
            Eof => "EOF",
        }
    }

    /// Keyword lookup, case-insensitive. Anything else is an identifier.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match word.to_ascii_uppercase().as_str() {
            "LET" => Let,
            "DEF" => Def,
            "RETURN" => Return,
            "IF" => If,
            "ELSE" => Else,
            "FOR" => For,
            "IN" => In,
            "WHILE" => While,
            "BREAK" => Break,
            "CONTINUE" => Continue,
            "IMPORT" => Import,
            "FROM" => From,
            "AS" => As,
            "CLASS" => Class,
            "STRUCT" => Struct,
            "INTERFACE" => Interface,
            "IMPLEMENTS" => Implements,
            "EXTENDS" => Extends,
            "TYPE" => Type,
            "ENUM" => Enum,
            "MATCH" => Match,
            "CASE" => Case,
            "DEFAULT" => Default,
            "ASYNC" => Async,
            "AWAIT" => Await,
            "YIELD" => Yield,
            "TRUE" => True,
            "FALSE" => False,
            "NONE" => None,
            _ => return Option::None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub location: SourceLocation,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Eof => write!(f, "EOF"),
            _ => write!(f, "{}({})", self.kind, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(TokenKind::keyword("let"), Some(TokenKind::Let));
        assert_eq!(TokenKind::keyword("LET"), Some(TokenKind::Let));
        assert_eq!(TokenKind::keyword("While"), Some(TokenKind::While));
        assert_eq!(TokenKind::keyword("letter"), None);
    }

    #[test]
    fn names_match_mnemonics() {
        assert_eq!(TokenKind::Identifier.name(), "IDENTIFIER");
        assert_eq!(TokenKind::DoubleColon.name(), "DOUBLE_COLON");
        assert_eq!(TokenKind::Str.name(), "STRING");
    }
}
