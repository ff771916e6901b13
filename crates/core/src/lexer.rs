use crate::error::{CgError, Span};
use std::fmt;

/// Which textual notation a token stream belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    /// Bracket-delimited interchange form: `[Cat: *x] (On ?x [Mat])`.
    Cgif,
    /// Arrow-based linear form: `[Cat] -> (On) -> [Mat].`
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Then,
    Else,
    Either,
    Or,
    Sc,
    Lambda,
    /// Linear-form `[Scope ...]` marker; lexed so it can be rejected.
    Scope,
    /// Linear-form `[typeMacro ...]` marker; lexed so it can be rejected.
    TypeMacro,
}

impl Keyword {
    fn from_word(word: &str, notation: Notation) -> Option<Keyword> {
        let lower = word.to_ascii_lowercase();
        match (lower.as_str(), notation) {
            ("lambda", _) => Some(Keyword::Lambda),
            ("if", Notation::Cgif) => Some(Keyword::If),
            ("then", Notation::Cgif) => Some(Keyword::Then),
            ("else", Notation::Cgif) => Some(Keyword::Else),
            ("either", Notation::Cgif) => Some(Keyword::Either),
            ("or", Notation::Cgif) => Some(Keyword::Or),
            ("sc", Notation::Cgif) => Some(Keyword::Sc),
            ("scope", Notation::Linear) => Some(Keyword::Scope),
            ("typemacro", Notation::Linear) => Some(Keyword::TypeMacro),
            _ => None,
        }
    }

    /// Keywords that may open a special context `[If ...]`.
    pub fn is_context_label(self) -> bool {
        !matches!(self, Keyword::Lambda | Keyword::Scope | Keyword::TypeMacro)
    }

    /// Linear-form markers with no supported meaning.
    pub fn is_linear_marker(self) -> bool {
        matches!(self, Keyword::Scope | Keyword::TypeMacro)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::If => "If",
            Keyword::Then => "Then",
            Keyword::Else => "Else",
            Keyword::Either => "Either",
            Keyword::Or => "Or",
            Keyword::Sc => "SC",
            Keyword::Lambda => "lambda",
            Keyword::Scope => "Scope",
            Keyword::TypeMacro => "typeMacro",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Keyword(Keyword),
    /// Integer literal (decimal, hex or octal source form)
    Int(i64),
    /// Floating literal -- kept as written, converted by the parser
    Float(String),
    /// `"..."` with escapes resolved
    Str(String),
    /// `'...'` with escapes resolved
    Name(String),
    /// `*label`
    DefLabel(String),
    /// `?label`
    BoundLabel(String),
    /// `#` or `#123`
    Marker(Option<String>),
    /// `;text` closed by `]`, `)` or `>` respectively
    ConceptComment(String),
    RelationComment(String),
    ActorComment(String),
    /// `/** ... */`
    FormalComment(String),
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LAngle,
    RAngle,
    Comma,
    Dot,
    Colon,
    Question,
    Tilde,
    At,
    Percent,
    Star,
    Bar,
    // Linear form only
    RightArrow,
    LeftArrow,
    Hyphen,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) => write!(f, "{}", s),
            Token::Keyword(k) => write!(f, "{}", k.as_str()),
            Token::Int(n) => write!(f, "{}", n),
            Token::Float(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "{:?}", s),
            Token::Name(s) => write!(f, "'{}'", s),
            Token::DefLabel(s) => write!(f, "*{}", s),
            Token::BoundLabel(s) => write!(f, "?{}", s),
            Token::Marker(Some(id)) => write!(f, "#{}", id),
            Token::Marker(None) => write!(f, "#"),
            Token::ConceptComment(s) | Token::RelationComment(s) | Token::ActorComment(s) => {
                write!(f, ";{}", s)
            }
            Token::FormalComment(s) => write!(f, "/**{}*/", s),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LAngle => write!(f, "<"),
            Token::RAngle => write!(f, ">"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Colon => write!(f, ":"),
            Token::Question => write!(f, "?"),
            Token::Tilde => write!(f, "~"),
            Token::At => write!(f, "@"),
            Token::Percent => write!(f, "%"),
            Token::Star => write!(f, "*"),
            Token::Bar => write!(f, "|"),
            Token::RightArrow => write!(f, "->"),
            Token::LeftArrow => write!(f, "<-"),
            Token::Hyphen => write!(f, "-"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    Default,
    FormalComment,
    MultilineComment,
}

/// Character-level tokenizer producing one [`Spanned`] token per call.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    mode: LexMode,
    notation: Notation,
    /// Where the comment that opened the current mode began.
    comment_start: (u32, u32),
    /// The previous token can be followed by a referent, so `-5` is a number.
    sign_allowed: bool,
}

impl Lexer {
    pub fn new(src: &str, notation: Notation) -> Self {
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            mode: LexMode::Default,
            notation,
            comment_start: (1, 1),
            sign_allowed: false,
        }
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> CgError {
        let context: String = self.chars[self.pos.min(self.chars.len())..]
            .iter()
            .take_while(|&&c| c != '\n')
            .take(24)
            .collect();
        CgError::Lex {
            line: self.line,
            column: self.column,
            found: self.peek_char(0),
            message: message.into(),
            context,
        }
    }

    fn spanned(&self, token: Token, line: u32, column: u32) -> Spanned {
        Spanned {
            token,
            span: Span {
                line,
                column,
                end_line: self.line,
                end_column: self.column,
            },
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, CgError> {
        loop {
            match self.mode {
                LexMode::MultilineComment => {
                    self.skip_comment_body()?;
                    self.mode = LexMode::Default;
                    continue;
                }
                LexMode::FormalComment => {
                    let (line, column) = self.comment_start;
                    let text = self.skip_comment_body()?;
                    self.mode = LexMode::Default;
                    return Ok(self.spanned(
                        Token::FormalComment(text.trim().to_owned()),
                        line,
                        column,
                    ));
                }
                LexMode::Default => {}
            }

            while self.peek_char(0).is_some_and(char::is_whitespace) {
                self.bump();
            }

            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek_char(0) else {
                return Ok(self.spanned(Token::Eof, line, column));
            };

            if c == '/' && self.peek_char(1) == Some('*') {
                self.comment_start = (line, column);
                let formal = self.peek_char(2) == Some('*') && self.peek_char(3) != Some('/');
                self.bump();
                self.bump();
                if formal {
                    self.bump();
                    self.mode = LexMode::FormalComment;
                } else {
                    self.mode = LexMode::MultilineComment;
                }
                continue;
            }

            let token = self.lex_token(c)?;
            self.sign_allowed = matches!(
                token,
                Token::Colon
                    | Token::LBracket
                    | Token::DefLabel(_)
                    | Token::BoundLabel(_)
                    | Token::Ident(_)
                    | Token::Int(_)
            );
            return Ok(self.spanned(token, line, column));
        }
    }

    /// Consume up to and including the closing `*/`, returning the body.
    fn skip_comment_body(&mut self) -> Result<String, CgError> {
        let mut text = String::new();
        loop {
            match self.peek_char(0) {
                None => return Err(self.error("unterminated comment")),
                Some('*') if self.peek_char(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_token(&mut self, c: char) -> Result<Token, CgError> {
        if c == '"' || c == '\'' {
            return self.lex_quoted(c);
        }
        if c.is_ascii_digit() {
            return self.lex_number(false);
        }
        if c.is_alphabetic() || c == '_' {
            let word = self.lex_word();
            return Ok(match Keyword::from_word(&word, self.notation) {
                Some(k) => Token::Keyword(k),
                None => Token::Ident(word),
            });
        }

        let next_starts_word = self
            .peek_char(1)
            .is_some_and(|n| n.is_alphabetic() || n == '_');
        match c {
            '*' if next_starts_word => {
                self.bump();
                Ok(Token::DefLabel(self.lex_word()))
            }
            '?' if next_starts_word => {
                self.bump();
                Ok(Token::BoundLabel(self.lex_word()))
            }
            '#' => {
                self.bump();
                let mut digits = String::new();
                while let Some(d) = self.peek_char(0).filter(char::is_ascii_digit) {
                    digits.push(d);
                    self.bump();
                }
                Ok(Token::Marker((!digits.is_empty()).then_some(digits)))
            }
            ';' => self.lex_node_comment(),
            '-' => self.lex_hyphen(),
            '<' if self.notation == Notation::Linear && self.peek_char(1) == Some('-') => {
                self.bump();
                self.bump();
                Ok(Token::LeftArrow)
            }
            _ => {
                let token = match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    '{' => Token::LBrace,
                    '}' => Token::RBrace,
                    '<' => Token::LAngle,
                    '>' => Token::RAngle,
                    ',' => Token::Comma,
                    '.' => Token::Dot,
                    ':' => Token::Colon,
                    '?' => Token::Question,
                    '~' => Token::Tilde,
                    '@' => Token::At,
                    '%' => Token::Percent,
                    '*' => Token::Star,
                    '|' => Token::Bar,
                    _ => return Err(self.error(format!("unexpected character '{}'", c))),
                };
                self.bump();
                Ok(token)
            }
        }
    }

    fn lex_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self
            .peek_char(0)
            .filter(|c| c.is_alphanumeric() || *c == '_')
        {
            word.push(c);
            self.bump();
        }
        word
    }

    fn lex_hyphen(&mut self) -> Result<Token, CgError> {
        let digit_follows = self.peek_char(1).is_some_and(|d| d.is_ascii_digit());
        match self.notation {
            Notation::Linear if digit_follows && self.sign_allowed => {
                self.bump();
                self.lex_number(true)
            }
            Notation::Linear => {
                self.bump();
                if self.peek_char(0) == Some('>') {
                    self.bump();
                    Ok(Token::RightArrow)
                } else {
                    Ok(Token::Hyphen)
                }
            }
            Notation::Cgif => {
                if digit_follows {
                    self.bump();
                    self.lex_number(true)
                } else {
                    Err(self.error("unexpected character '-'"))
                }
            }
        }
    }

    fn lex_number(&mut self, negative: bool) -> Result<Token, CgError> {
        let sign = if negative { -1 } else { 1 };

        if self.peek_char(0) == Some('0') && matches!(self.peek_char(1), Some('x' | 'X')) {
            self.bump();
            self.bump();
            let mut digits = String::new();
            while let Some(d) = self.peek_char(0).filter(char::is_ascii_hexdigit) {
                digits.push(d);
                self.bump();
            }
            return i64::from_str_radix(&digits, 16)
                .map(|n| Token::Int(sign * n))
                .map_err(|_| self.error(format!("invalid hexadecimal literal '0x{}'", digits)));
        }

        let mut text = String::new();
        while let Some(d) = self.peek_char(0).filter(char::is_ascii_digit) {
            text.push(d);
            self.bump();
        }
        let mut is_float = false;
        if self.peek_char(0) == Some('.') && self.peek_char(1).is_some_and(|d| d.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.bump();
            while let Some(d) = self.peek_char(0).filter(char::is_ascii_digit) {
                text.push(d);
                self.bump();
            }
        }
        if matches!(self.peek_char(0), Some('e' | 'E')) {
            let exp_digit_at = if matches!(self.peek_char(1), Some('+' | '-')) { 2 } else { 1 };
            if self.peek_char(exp_digit_at).is_some_and(|d| d.is_ascii_digit()) {
                is_float = true;
                for _ in 0..exp_digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                while let Some(d) = self.peek_char(0).filter(char::is_ascii_digit) {
                    text.push(d);
                    self.bump();
                }
            }
        }

        if is_float {
            let text = if negative { format!("-{}", text) } else { text };
            return Ok(Token::Float(text));
        }
        let radix = if text.len() > 1 && text.starts_with('0') { 8 } else { 10 };
        i64::from_str_radix(&text, radix)
            .map(|n| Token::Int(sign * n))
            .map_err(|_| self.error(format!("invalid integer literal '{}'", text)))
    }

    fn lex_quoted(&mut self, delim: char) -> Result<Token, CgError> {
        self.bump();
        let mut s = String::new();
        loop {
            match self.peek_char(0) {
                None | Some('\n') => return Err(self.error("unterminated quoted literal")),
                Some(c) if c == delim => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    let Some(escaped) = self.bump() else {
                        return Err(self.error("unterminated escape"));
                    };
                    s.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'b' => '\u{8}',
                        'r' => '\r',
                        'f' => '\u{c}',
                        other => other,
                    });
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
        Ok(if delim == '"' { Token::Str(s) } else { Token::Name(s) })
    }

    /// `;text` runs to the first closing `]`, `)` or `>`, which stays unconsumed.
    fn lex_node_comment(&mut self) -> Result<Token, CgError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.peek_char(0) {
                None => return Err(self.error("unterminated node comment")),
                Some(']') => return Ok(Token::ConceptComment(text.trim().to_owned())),
                Some(')') => return Ok(Token::RelationComment(text.trim().to_owned())),
                Some('>') => return Ok(Token::ActorComment(text.trim().to_owned())),
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }
}

/// Tokenize `src` completely, ending with a single [`Token::Eof`].
pub fn lex(src: &str, notation: Notation) -> Result<Vec<Spanned>, CgError> {
    let mut lexer = Lexer::new(src, notation);
    let mut tokens = Vec::new();
    loop {
        let t = lexer.next_token()?;
        let done = t.token == Token::Eof;
        tokens.push(t);
        if done {
            return Ok(tokens);
        }
    }
}
