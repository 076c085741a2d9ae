use crate::language::{
    errors::SyntaxError,
    span::Span,
    token::{Literal, Token, TokenKind},
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{opt, recognize, value},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

pub fn lex(source: &str) -> Result<Vec<Token>, Vec<SyntaxError>> {
    let lexer = Lexer::new(source);
    lexer.run()
}

struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    line: usize,
    tokens: Vec<Token>,
    errors: Vec<SyntaxError>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    fn run(mut self) -> Result<Vec<Token>, Vec<SyntaxError>> {
        loop {
            self.skip_trivia();
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            match scan_token(rest) {
                Ok((remaining, (kind, literal))) => {
                    let consumed = rest.len() - remaining.len();
                    self.push_token(kind, literal, consumed);
                }
                Err(_) if rest.starts_with('"') => {
                    self.error(rest.len(), "Unterminated string.");
                }
                Err(_) => {
                    let width = rest.chars().next().map_or(1, |c| c.len_utf8());
                    self.error(width, "Unexpected character.");
                }
            }
        }

        let eof = Span::new(self.offset, self.offset);
        self.tokens.push(Token::new(TokenKind::Eof, "", self.line, eof));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    /// Skips whitespace and comments, keeping the line counter current.
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            if rest.starts_with("/*") {
                match block_comment(rest) {
                    Ok((remaining, _)) => self.advance(rest.len() - remaining.len()),
                    Err(_) => self.error(rest.len(), "Unterminated block comment."),
                }
                continue;
            }
            match alt((whitespace, line_comment))(rest) {
                Ok((remaining, _)) => self.advance(rest.len() - remaining.len()),
                Err(_) => return,
            }
        }
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.src[self.offset..self.offset + len];
        self.line += consumed.matches('\n').count();
        self.offset += len;
    }

    fn push_token(&mut self, kind: TokenKind, literal: Option<Literal>, len: usize) {
        let start = self.offset;
        let lexeme = &self.src[start..start + len];
        let mut token = Token::new(kind, lexeme, self.line, Span::new(start, start + len));
        token.literal = literal;
        self.tokens.push(token);
        self.advance(len);
    }

    fn error(&mut self, len: usize, message: &str) {
        let span = Span::new(self.offset, self.offset + len);
        self.errors.push(SyntaxError::new(message, span, self.line));
        self.advance(len);
    }
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_whitespace())(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(tag("//"), take_while(|c: char| c != '\n')))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn scan_token(input: &str) -> IResult<&str, (TokenKind, Option<Literal>)> {
    alt((
        number,
        string,
        identifier,
        punctuation,
    ))(input)
}

fn punctuation(input: &str) -> IResult<&str, (TokenKind, Option<Literal>)> {
    let (rest, kind) = operator(input)?;
    Ok((rest, (kind, None)))
}

fn number(input: &str) -> IResult<&str, (TokenKind, Option<Literal>)> {
    let (rest, text) = recognize(pair(digit1, opt(pair(char('.'), digit1))))(input)?;
    // digits with an optional fraction always parse
    let value = text.parse::<f64>().unwrap_or_default();
    Ok((rest, (TokenKind::Number, Some(Literal::Number(value)))))
}

fn string(input: &str) -> IResult<&str, (TokenKind, Option<Literal>)> {
    let (rest, body) = delimited(char('"'), take_until("\""), char('"'))(input)?;
    Ok((rest, (TokenKind::String, Some(Literal::Str(body.to_string())))))
}

fn identifier(input: &str) -> IResult<&str, (TokenKind, Option<Literal>)> {
    let (rest, text) = recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)?;
    let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
    Ok((rest, (kind, None)))
}

fn operator(input: &str) -> IResult<&str, TokenKind> {
    alt((
        alt((
            value(TokenKind::BangEqual, tag("!=")),
            value(TokenKind::EqualEqual, tag("==")),
            value(TokenKind::GreaterEqual, tag(">=")),
            value(TokenKind::LessEqual, tag("<=")),
            value(TokenKind::PlusPlus, tag("++")),
            value(TokenKind::MinusMinus, tag("--")),
        )),
        alt((
            value(TokenKind::LeftParen, char('(')),
            value(TokenKind::RightParen, char(')')),
            value(TokenKind::LeftBrace, char('{')),
            value(TokenKind::RightBrace, char('}')),
            value(TokenKind::Comma, char(',')),
            value(TokenKind::Dot, char('.')),
            value(TokenKind::Minus, char('-')),
            value(TokenKind::Plus, char('+')),
            value(TokenKind::Semicolon, char(';')),
            value(TokenKind::Slash, char('/')),
            value(TokenKind::Star, char('*')),
            value(TokenKind::Bang, char('!')),
            value(TokenKind::Equal, char('=')),
            value(TokenKind::Greater, char('>')),
            value(TokenKind::Less, char('<')),
        )),
    ))(input)
}
