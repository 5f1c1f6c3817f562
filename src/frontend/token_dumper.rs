use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
    pub show_values: bool, // if false, prints kind names only
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_values: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_values = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        for token in tokens {
            self.print_one(token);
        }
    }

    fn print_one(&self, token: &Token) {
        let line = token.location.line;
        let col = token.location.column;

        let colr = if self.color { color_for(token.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        match token.kind {
            TokenKind::Newline | TokenKind::Eof => {
                println!(
                    "[{:02}:{:02}] {}{}{}",
                    line,
                    col,
                    colr,
                    token.kind.name(),
                    reset
                );
            }
            _ if self.show_values => {
                println!(
                    "[{:02}:{:02}] {}{:<12} {:?}{}",
                    line,
                    col,
                    colr,
                    token.kind.name(),
                    token.value,
                    reset
                );
            }
            _ => {
                println!(
                    "[{:02}:{:02}] {}{}{}",
                    line,
                    col,
                    colr,
                    token.kind.name(),
                    reset
                );
            }
        }
    }

}

fn color_for(kind: TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        Newline | Eof => TokenDumper::DIM,
        Str => TokenDumper::GRN,
        Number | True | False | None => TokenDumper::CYN,
        Identifier => TokenDumper::YEL,
        Plus | Minus | Multiply | Divide | Modulo | Assign => TokenDumper::MAG,
        Eq | Ne | Lt | Gt | Le | Ge | Not | And | Or => TokenDumper::MAG,
        _ => TokenDumper::RESET,
    }
}
