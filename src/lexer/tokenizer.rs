//! Turns an OQL source string into a flat `Vec<Token>` (spec.md §4.1).

use crate::error::LexicalError;
use super::{Keyword, OperatorKind, Span, Token, TokenTag};

/// Lexes `source` into a flat token sequence. Whitespace is skipped
/// entirely rather than emitted as its own token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    input: &'a str,
    pos: usize,
    start: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, input: source, pos: 0, start: 0, tokens: Vec::new() }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    fn error(&self, reason: impl Into<String>, at: usize) -> LexicalError {
        LexicalError::new(reason, Span::new(at, at), self.source)
    }

    fn run(mut self) -> Result<Vec<Token>, LexicalError> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }
            self.start = self.pos;
            let Some(c) = self.peek() else { break };

            let token = match c {
                '`' => self.scan_backtick_ident()?,
                ':' => self.scan_parameter()?,
                '\'' => self.scan_string()?,
                '0'..='9' => self.scan_number()?,
                '.' if self.peek_at(1).is_some_and(|n| n.is_ascii_digit()) => self.scan_number()?,
                c if c.is_alphabetic() || c == '_' => self.scan_ident_or_keyword(),
                '.' => self.single(TokenTag::Dot),
                '(' => self.single(TokenTag::OpenBracket),
                ')' => self.single(TokenTag::CloseBracket),
                ',' => self.single(TokenTag::Comma),
                '=' => self.scan_operator_symbol(OperatorKind::Eq, 1),
                '<' => self.scan_lt(),
                '>' => self.scan_gt(),
                '+' => self.scan_operator_symbol(OperatorKind::Add, 1),
                '-' => self.scan_operator_symbol(OperatorKind::Sub, 1),
                '*' => self.scan_operator_symbol(OperatorKind::Mul, 1),
                '/' => self.scan_operator_symbol(OperatorKind::Div, 1),
                other => return Err(self.error(format!("invalid character `{other}`"), self.pos)),
            };
            self.tokens.push(token);
        }
        Ok(self.tokens)
    }

    fn single(&mut self, tag: TokenTag) -> Token {
        let c = self.advance().expect("caller already peeked a character");
        Token::new(self.span(), tag, c.to_string())
    }

    fn scan_operator_symbol(&mut self, kind: OperatorKind, width: usize) -> Token {
        for _ in 0..width {
            self.advance();
        }
        Token::new(self.span(), TokenTag::Operator, &self.input[self.start..self.pos])
            .with_operator(kind)
    }

    fn scan_lt(&mut self) -> Token {
        self.advance(); // '<'
        match self.peek() {
            Some('=') => {
                self.advance();
                Token::new(self.span(), TokenTag::Operator, "<=").with_operator(OperatorKind::Le)
            }
            Some('>') => {
                self.advance();
                Token::new(self.span(), TokenTag::Operator, "<>").with_operator(OperatorKind::Ne)
            }
            _ => Token::new(self.span(), TokenTag::Operator, "<").with_operator(OperatorKind::Lt),
        }
    }

    fn scan_gt(&mut self) -> Token {
        self.advance(); // '>'
        if self.peek() == Some('=') {
            self.advance();
            Token::new(self.span(), TokenTag::Operator, ">=").with_operator(OperatorKind::Ge)
        } else {
            Token::new(self.span(), TokenTag::Operator, ">").with_operator(OperatorKind::Gt)
        }
    }

    fn scan_backtick_ident(&mut self) -> Result<Token, LexicalError> {
        let open = self.pos;
        self.advance(); // opening back-tick
        let body_start = self.pos;
        loop {
            match self.peek() {
                Some('`') => break,
                Some(_) => {
                    self.advance();
                }
                None => return Err(self.error("unterminated back-tick identifier", open)),
            }
        }
        let text = self.input[body_start..self.pos].to_string();
        if text.is_empty() {
            return Err(self.error("empty back-tick identifier", open));
        }
        self.advance(); // closing back-tick
        Ok(Token::new(self.span(), TokenTag::Ident, text))
    }

    fn scan_parameter(&mut self) -> Result<Token, LexicalError> {
        let colon_pos = self.pos;
        self.advance(); // ':'
        let body_start = self.pos;
        if !self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(self.error("empty parameter name", colon_pos));
        }
        self.advance();
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = self.input[body_start..self.pos].to_string();
        Ok(Token::new(self.span(), TokenTag::Parameter, text))
    }

    fn scan_ident_or_keyword(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        let text = &self.input[self.start..self.pos];
        if let Some(keyword) = Keyword::from_str(text) {
            let token = Token::new(self.span(), TokenTag::Keyword, text).with_keyword(keyword);
            if let Some(op) = keyword.operator_kind() {
                let mut token = token;
                token.tag = TokenTag::Operator;
                token.operator = Some(op);
                token
            } else {
                token
            }
        } else {
            Token::new(self.span(), TokenTag::Ident, text)
        }
    }

    fn scan_string(&mut self) -> Result<Token, LexicalError> {
        let open = self.pos;
        self.advance(); // opening quote
        let body_start = self.pos;
        loop {
            match self.peek() {
                Some('\'') => break,
                Some(_) => {
                    self.advance();
                }
                None => return Err(self.error("unterminated string literal", open)),
            }
        }
        let text = self.input[body_start..self.pos].to_string();
        self.advance(); // closing quote
        Ok(Token::new(self.span(), TokenTag::String, text))
    }

    fn scan_number(&mut self) -> Result<Token, LexicalError> {
        let mut saw_digit = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            saw_digit = true;
            self.advance();
        }
        if self.peek() == Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                saw_digit = true;
                self.advance();
            }
        }
        if !saw_digit {
            return Err(self.error("malformed number", self.start));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exp_start = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            let mut has_exp_digits = false;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                has_exp_digits = true;
                self.advance();
            }
            if !has_exp_digits {
                return Err(self.error("malformed exponent", exp_start));
            }
        }
        if self.peek().is_some_and(char::is_alphabetic) {
            return Err(self.error("number immediately followed by a letter", self.pos));
        }
        Ok(Token::new(self.span(), TokenTag::Number, &self.input[self.start..self.pos]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(src: &str) -> Vec<TokenTag> {
        tokenize(src).unwrap().into_iter().map(|t| t.tag).collect()
    }

    #[test]
    fn positions_strictly_increase() {
        let tokens = tokenize("SELECT a From User a where a.flags = 12").unwrap();
        for pair in tokens.windows(2) {
            assert!(pair[0].span.start < pair[1].span.start);
        }
    }

    #[test]
    fn equals_sign_and_double_equals_are_both_eq() {
        let a = tokenize("a = b").unwrap();
        let b = tokenize("a == b").unwrap();
        assert_eq!(a[1].operator, Some(OperatorKind::Eq));
        assert_eq!(b[1].operator, Some(OperatorKind::Eq));
    }

    #[test]
    fn angle_brackets_fold_to_ne() {
        let tokens = tokenize("a <> b").unwrap();
        assert_eq!(tokens[1].operator, Some(OperatorKind::Ne));
    }

    #[test]
    fn backtick_forces_ident_even_for_keyword_text() {
        let tokens = tokenize("`select`").unwrap();
        assert_eq!(tokens[0].tag, TokenTag::Ident);
        assert_eq!(tokens[0].text, "select");
    }

    #[test]
    fn operator_keywords_retag_to_operator() {
        let tokens = tokenize("a LIKE b").unwrap();
        assert_eq!(tokens[1].tag, TokenTag::Operator);
        assert_eq!(tokens[1].keyword, Some(Keyword::Like));
    }

    #[test]
    fn parameter_text_excludes_colon() {
        let tokens = tokenize(":name").unwrap();
        assert_eq!(tokens[0].tag, TokenTag::Parameter);
        assert_eq!(tokens[0].text, "name");
    }

    #[test]
    fn empty_parameter_name_is_lexical_error() {
        assert!(tokenize(": foo").is_err());
    }

    #[test]
    fn bare_leading_dot_number_is_accepted() {
        let tokens = tokenize(".25").unwrap();
        assert_eq!(tokens[0].tag, TokenTag::Number);
        assert_eq!(tokens[0].text, ".25");
    }

    #[test]
    fn malformed_exponent_is_lexical_error() {
        assert!(tokenize("1e").is_err());
    }

    #[test]
    fn digit_then_letter_is_lexical_error() {
        assert!(tokenize("123abc").is_err());
    }

    #[test]
    fn unterminated_string_is_lexical_error() {
        assert!(tokenize("'abc").is_err());
    }

    #[test]
    fn whitespace_produces_no_tokens() {
        assert_eq!(tags("  a   b  "), vec![TokenTag::Ident, TokenTag::Ident]);
    }
}
