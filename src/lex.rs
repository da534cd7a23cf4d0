/// #Notes
/// `-` could be an operator or the start of a number (`-1`). This lexer
///  does not attempt to distinguish: it always becomes a Minus token and the
///  parser folds negated numeric literals.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenType {
    ParenLeft,
    ParenRight,
    BracketLeft,
    BracketRight,
    Comma,
    Dot,
    Pipe,      // |, delimits closure parameters
    OrOr,      // ||
    AndAnd,    // &&
    Bang,      // !
    EqEq,      // ==
    BangEq,    // !=
    LT,        // <
    GT,        // >
    LTE,       // <=
    GTE,       // >=
    Plus,
    Minus,
    Asterisk,
    ForwardSlash,
    Number,
    Identifier,
    True,
    False,
    Null,
    As,
    StringSingleQuote,
    StringDoubleQuote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: TokenType,

    // Byte indexes into the source
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unterminated string literal starting at {0}")]
    UnterminatedStringLiteral(usize),
    #[error("Unexpected character at {0}")]
    UnexpectedCharacter(usize),
}

/// This type simply holds a reference to the source bytes and an index, so it's
///  cheap to copy, making lookahead in the parser very easy.
#[derive(Clone)]
pub struct Lexer<'input> {
    source: &'input [u8],
    current: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(source: &'input [u8]) -> Self {
        Self { source, current: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current >= self.source.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.source.get(self.current).copied()
    }

    #[inline]
    pub fn peek_at(&self, at: usize) -> Option<u8> {
        self.source.get(self.current + at).copied()
    }

    #[inline]
    fn pop(&mut self) -> Option<u8> {
        let res = self.peek();
        if res.is_some() {
            self.current += 1;
        }
        res
    }

    /// If current starts with [prefix], consume it and return true.
    fn consume1(&mut self, prefix: u8) -> bool {
        if let Some(c) = self.peek()
            && c == prefix
        {
            self.current += 1;
            true
        } else {
            false
        }
    }

    #[inline]
    fn consume_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while let Some(c) = self.peek()
            && predicate(c)
        {
            self.current += 1;
        }
    }

    #[inline]
    fn consume_whitespace(&mut self) {
        self.consume_while(|b| b.is_ascii_whitespace());
    }

    fn consume_number(&mut self) {
        // Digits, allowing `_` separators as in `1_000`
        self.consume_while(|b| b.is_ascii_digit() || b == b'_');

        // A fraction only if a digit follows the dot, otherwise the dot is
        //  member access
        if self.peek() == Some(b'.')
            && let Some(b'0'..=b'9') = self.peek_at(1)
        {
            self.current += 1;
            self.consume_while(|b| b.is_ascii_digit() || b == b'_');
        }
    }

    /// Returns the slice of the source that this token was lexed from.
    #[inline]
    pub fn source_of(&self, token: &Token) -> &'input [u8] {
        &self.source[token.start..token.end]
    }

    /// Like [source_of] but omits the opening and closing quotes of string
    ///  literal tokens. Escape sequences are left as written.
    #[inline]
    pub fn contents(&self, token: &Token) -> &'input [u8] {
        let s = self.source_of(token);
        match token.ty {
            TokenType::StringSingleQuote | TokenType::StringDoubleQuote => &s[1..s.len() - 1],
            _ => s,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&self) -> Result<Option<Token>, Error> {
        self.clone().next_token()
    }

    /// Consumes the next token if it has type [ty].
    pub fn consume(&mut self, ty: TokenType) -> Result<bool, Error> {
        let mut lookahead = self.clone();
        match lookahead.next_token()? {
            Some(tok) if tok.ty == ty => {
                *self = lookahead;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        self.consume_whitespace();

        let start = self.current;
        let Some(first) = self.pop() else {
            return Ok(None);
        };

        // Convenience macro for returning a token from `start` to `self.current`
        macro_rules! tok {
            ($name:ident) => {{
                Token {
                    ty: TokenType::$name,
                    start,
                    end: self.current,
                }
            }};
        }

        Ok(Some(match first {
            b'(' => tok!(ParenLeft),
            b')' => tok!(ParenRight),
            b'[' => tok!(BracketLeft),
            b']' => tok!(BracketRight),
            b',' => tok!(Comma),
            b'.' => tok!(Dot),
            b'+' => tok!(Plus),
            b'-' => tok!(Minus),
            b'*' => tok!(Asterisk),
            b'/' => tok!(ForwardSlash),
            b'|' => {
                if self.consume1(b'|') {
                    tok!(OrOr)
                } else {
                    tok!(Pipe)
                }
            }
            b'&' => {
                if self.consume1(b'&') {
                    tok!(AndAnd)
                } else {
                    return Err(Error::UnexpectedCharacter(start));
                }
            }
            b'=' => {
                if self.consume1(b'=') {
                    tok!(EqEq)
                } else {
                    return Err(Error::UnexpectedCharacter(start));
                }
            }
            b'!' => {
                if self.consume1(b'=') {
                    tok!(BangEq)
                } else {
                    tok!(Bang)
                }
            }
            b'<' => {
                if self.consume1(b'=') {
                    tok!(LTE)
                } else {
                    tok!(LT)
                }
            }
            b'>' => {
                if self.consume1(b'=') {
                    tok!(GTE)
                } else {
                    tok!(GT)
                }
            }

            // Single and double-quoted strings; a backslash escapes the
            //  following byte
            term @ (b'\'' | b'"') => {
                loop {
                    match self.pop() {
                        None => return Err(Error::UnterminatedStringLiteral(start)),
                        Some(b'\\') => {
                            if self.pop().is_none() {
                                return Err(Error::UnterminatedStringLiteral(start));
                            }
                        }
                        Some(b) if b == term => break,
                        Some(_) => {}
                    }
                }
                if term == b'"' {
                    tok!(StringDoubleQuote)
                } else {
                    tok!(StringSingleQuote)
                }
            }

            // Identifiers and keywords start with a-Z or underscore
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.consume_while(|b| b.is_ascii_alphanumeric() || b == b'_');
                match &self.source[start..self.current] {
                    b"true" => tok!(True),
                    b"false" => tok!(False),
                    b"null" => tok!(Null),
                    b"as" => tok!(As),
                    _ => tok!(Identifier),
                }
            }

            b'0'..=b'9' => {
                self.consume_number();
                tok!(Number)
            }

            _ => return Err(Error::UnexpectedCharacter(start)),
        }))
    }
}
