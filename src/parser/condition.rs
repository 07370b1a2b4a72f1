//! MSBuild `Condition` attribute evaluation.
//!
//! Supports the subset Visual C++ projects use in practice:
//!
//! ```text
//! expr    := and ( "or" and )*
//! and     := unary ( "and" unary )*
//! unary   := "!" unary | primary
//! primary := "(" expr ")" | operand ( ("==" | "!=") operand )?
//! operand := 'quoted string' | bare word
//! ```
//!
//! Comparisons are case-insensitive, as in MSBuild. `$(Var)` references
//! inside operands are expanded at evaluation time.

use crate::parser::properties::Properties;

/// A parsed condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Eq(String, String),
    Ne(String, String),
    /// A lone operand: `true`/`false` after expansion.
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Str(String),
    Word(String),
    EqEq,
    NotEq,
    Bang,
    LParen,
    RParen,
    And,
    Or,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => value.push(ch),
                        None => return Err(format!("unterminated string in `{}`", input)),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return Err(format!("expected `==` in `{}`", input));
                }
                tokens.push(Token::EqEq);
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || matches!(ch, '\'' | '=' | '!' | '(' | ')') {
                        // `$(Var)` is part of a bare word
                        if ch == '(' && word.ends_with('$') {
                            for inner in chars.by_ref() {
                                word.push(inner);
                                if inner == ')' {
                                    break;
                                }
                            }
                            continue;
                        }
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                let token = match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    _ => Token::Word(word),
                };
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.next();
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while self.peek() == Some(&Token::And) {
            self.next();
            let rhs = self.unary()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.peek() == Some(&Token::Bang) {
            self.next();
            return Ok(Expr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err("expected `)`".to_string()),
                }
            }
            Some(Token::Str(lhs)) | Some(Token::Word(lhs)) => match self.peek() {
                Some(Token::EqEq) => {
                    self.next();
                    Ok(Expr::Eq(lhs, self.operand()?))
                }
                Some(Token::NotEq) => {
                    self.next();
                    Ok(Expr::Ne(lhs, self.operand()?))
                }
                _ => Ok(Expr::Value(lhs)),
            },
            Some(token) => Err(format!("unexpected token {:?}", token)),
            None => Err("unexpected end of condition".to_string()),
        }
    }

    fn operand(&mut self) -> Result<String, String> {
        match self.next() {
            Some(Token::Str(s)) | Some(Token::Word(s)) => Ok(s),
            Some(token) => Err(format!("expected operand, found {:?}", token)),
            None => Err("expected operand".to_string()),
        }
    }
}

/// Parse a condition string into an expression tree.
pub fn parse_condition(input: &str) -> Result<Expr, String> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        pos: 0,
    };
    let expr = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!("trailing input in `{}`", input));
    }
    Ok(expr)
}

/// Evaluate an expression against the given properties.
pub fn evaluate(expr: &Expr, props: &Properties) -> bool {
    match expr {
        Expr::Or(a, b) => evaluate(a, props) || evaluate(b, props),
        Expr::And(a, b) => evaluate(a, props) && evaluate(b, props),
        Expr::Not(inner) => !evaluate(inner, props),
        Expr::Eq(a, b) => props.expand(a).eq_ignore_ascii_case(&props.expand(b)),
        Expr::Ne(a, b) => !props.expand(a).eq_ignore_ascii_case(&props.expand(b)),
        Expr::Value(v) => props.expand(v).eq_ignore_ascii_case("true"),
    }
}

/// Evaluate an optional `Condition` attribute. A missing or blank condition
/// holds; one that cannot be parsed is returned as an error for the caller
/// to report.
pub fn holds(condition: Option<&str>, props: &Properties) -> Result<bool, String> {
    let Some(condition) = condition.filter(|c| !c.trim().is_empty()) else {
        return Ok(true);
    };
    parse_condition(condition)
        .map(|expr| evaluate(&expr, props))
        .map_err(|e| format!("unsupported condition `{}`: {}", condition, e))
}
