//! Fragment template syntax
//!
//! This module contains:
//!
//!  * The types representing a parsed fragment template.
//!  * The lexer shared with the skeleton directive parser.
//!  * The `parse` functions.
//!
//! Inside a fragment, `$$` is a literal `$` and `${ ... }` is an
//! interpolation: an integer expression, the head of a repetition
//! (`${for j in 1..=k sep ", "}` or `${for sel}`), a condition
//! (`${if k == N}`), or the `${end}` closing the innermost block.

/// A parsed fragment template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub elements: Vec<TemplateElement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateElement {
    Text(String),
    Subst(Expr),
    Repeat(RepeatedTemplate),
    Conditional(ConditionalTemplate),
}

/// A `${if cond}` ... `${end}` block; rendered when `cond` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalTemplate {
    pub condition: Expr,
    pub template: Template,
}

/// A `${for ...}` ... `${end}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedTemplate {
    pub over: RepeatOver,
    pub separator: String,
    pub template: Template,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepeatOver {
    /// `for var in start..end` (or `..=`).
    Range {
        var: String,
        start: Expr,
        end: Expr,
        inclusive: bool,
    },
    /// `for sel`: every alternative selection for each visitor argument.
    Selections,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Var(String),
    /// `s[expr]`: alternative selected for a 1-based argument position.
    Selected(Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

enum Opening {
    Repeat(RepeatOver, String),
    If(Expr),
}

impl Template {
    /// Parse fragment text. Errors carry a human-readable reason.
    pub fn parse(text: &str) -> Result<Template, String> {
        let mut stack: Vec<(Opening, Vec<TemplateElement>)> = Vec::new();
        let mut current: Vec<TemplateElement> = Vec::new();
        let mut literal = String::new();
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            literal.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(tail) = after.strip_prefix('$') {
                literal.push('$');
                rest = tail;
                continue;
            }
            let Some(body_start) = after.strip_prefix('{') else {
                literal.push('$');
                rest = after;
                continue;
            };
            let close = find_close(body_start)
                .ok_or_else(|| "unterminated '${' interpolation".to_string())?;
            let body = &body_start[..close];
            rest = &body_start[close + 1..];

            if !literal.is_empty() {
                current.push(TemplateElement::Text(std::mem::take(&mut literal)));
            }

            let tokens = lex(body)?;
            match tokens.first() {
                Some(Token::Ident(kw)) if kw == "for" => {
                    let (over, separator) = parse_repeat_head(&tokens[1..])?;
                    stack.push((Opening::Repeat(over, separator), std::mem::take(&mut current)));
                }
                Some(Token::Ident(kw)) if kw == "if" => {
                    let mut parser = ExprParser::new(&tokens[1..]);
                    let condition = parser.expr()?;
                    parser.finish()?;
                    stack.push((Opening::If(condition), std::mem::take(&mut current)));
                }
                Some(Token::Ident(kw)) if kw == "end" && tokens.len() == 1 => {
                    let (opening, outer) = stack
                        .pop()
                        .ok_or_else(|| "'${end}' without matching '${for}' or '${if}'".to_string())?;
                    let template = Template {
                        elements: std::mem::replace(&mut current, outer),
                    };
                    current.push(match opening {
                        Opening::Repeat(over, separator) => TemplateElement::Repeat(RepeatedTemplate {
                            over,
                            separator,
                            template,
                        }),
                        Opening::If(condition) => {
                            TemplateElement::Conditional(ConditionalTemplate { condition, template })
                        }
                    });
                }
                _ => {
                    let mut parser = ExprParser::new(&tokens);
                    let expr = parser.expr()?;
                    parser.finish()?;
                    current.push(TemplateElement::Subst(expr));
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            current.push(TemplateElement::Text(literal));
        }

        if !stack.is_empty() {
            return Err(format!("{} unterminated '${{for}}'/'${{if}}' block(s)", stack.len()));
        }
        Ok(Template { elements: current })
    }
}

/// Find the `}` closing an interpolation, skipping over quoted strings.
fn find_close(body: &str) -> Option<usize> {
    let mut in_str = false;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if in_str {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_str = false,
                _ => {}
            }
        } else {
            match c {
                '"' => in_str = true,
                '}' => return Some(i),
                '\n' => return None,
                _ => {}
            }
        }
    }
    None
}

fn parse_repeat_head(tokens: &[Token]) -> Result<(RepeatOver, String), String> {
    let (over, rest) = match tokens {
        [Token::Ident(sel), rest @ ..] if sel == "sel" => (RepeatOver::Selections, rest),
        [Token::Ident(var), Token::Ident(kw_in), rest @ ..] if kw_in == "in" => {
            let mut parser = ExprParser::new(rest);
            let start = parser.expr()?;
            let inclusive = match parser.next() {
                Some(Token::DotDot) => false,
                Some(Token::DotDotEq) => true,
                other => return Err(format!("expected '..' or '..=' in range, found {:?}", other)),
            };
            let end = parser.expr()?;
            let consumed = parser.pos;
            (
                RepeatOver::Range {
                    var: var.clone(),
                    start,
                    end,
                    inclusive,
                },
                &rest[consumed..],
            )
        }
        _ => return Err("expected 'for <var> in <range>' or 'for sel'".to_string()),
    };
    if is_reserved(match &over {
        RepeatOver::Range { var, .. } => var.as_str(),
        RepeatOver::Selections => "",
    }) {
        return Err("loop variable shadows a reserved name".to_string());
    }

    let separator = match rest {
        [] => String::new(),
        [Token::Ident(kw), Token::Str(sep)] if kw == "sep" => sep.clone(),
        _ => return Err(format!("unexpected tokens after loop head: {:?}", rest)),
    };
    Ok((over, separator))
}

/// Names the generator binds itself; loops may not rebind them.
pub(crate) fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "N" | "M" | "k" | "a" | "s" | "ord" | "sel" | "for" | "in" | "if" | "end" | "sep"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Ident(String),
    Int(i64),
    Str(String),
    Punct(char),
    Cmp(BinOp),
    DotDot,
    DotDotEq,
}

/// Split a directive or interpolation body into tokens.
pub(crate) fn lex(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut end = i;
            while let Some(&(j, d)) = chars.peek() {
                if d.is_ascii_alphanumeric() || d == '_' {
                    end = j + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(input[i..end].to_string()));
        } else if c.is_ascii_digit() {
            let mut end = i;
            while let Some(&(j, d)) = chars.peek() {
                if d.is_ascii_digit() {
                    end = j + 1;
                    chars.next();
                } else {
                    break;
                }
            }
            let value = input[i..end]
                .parse::<i64>()
                .map_err(|e| format!("invalid integer '{}': {}", &input[i..end], e))?;
            tokens.push(Token::Int(value));
        } else if c == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, d)) = chars.next() {
                match d {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, 'n')) => value.push('\n'),
                        Some((_, 't')) => value.push('\t'),
                        Some((_, '"')) => value.push('"'),
                        Some((_, '\\')) => value.push('\\'),
                        other => {
                            return Err(format!("unsupported escape {:?} in string", other.map(|o| o.1)))
                        }
                    },
                    _ => value.push(d),
                }
            }
            if !closed {
                return Err("unterminated string literal".to_string());
            }
            tokens.push(Token::Str(value));
        } else if c == '.' {
            chars.next();
            match chars.next() {
                Some((_, '.')) => {}
                _ => return Err("expected '..'".to_string()),
            }
            if let Some(&(_, '=')) = chars.peek() {
                chars.next();
                tokens.push(Token::DotDotEq);
            } else {
                tokens.push(Token::DotDot);
            }
        } else if "<>=!".contains(c) {
            chars.next();
            let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
            if followed_by_eq {
                chars.next();
            }
            tokens.push(match (c, followed_by_eq) {
                ('<', false) => Token::Cmp(BinOp::Lt),
                ('<', true) => Token::Cmp(BinOp::Le),
                ('>', false) => Token::Cmp(BinOp::Gt),
                ('>', true) => Token::Cmp(BinOp::Ge),
                ('=', true) => Token::Cmp(BinOp::Eq),
                ('!', true) => Token::Cmp(BinOp::Ne),
                ('=', false) => Token::Punct('='),
                _ => return Err("expected '!='".to_string()),
            });
        } else if "+-*[]()".contains(c) {
            chars.next();
            tokens.push(Token::Punct(c));
        } else {
            return Err(format!("unexpected character '{}'", c));
        }
    }
    Ok(tokens)
}

struct ExprParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> ExprParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn finish(&self) -> Result<(), String> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(format!("unexpected token {:?} in expression", token)),
        }
    }

    /// `sum (cmp sum)?`
    fn expr(&mut self) -> Result<Expr, String> {
        let lhs = self.sum()?;
        match self.peek() {
            Some(Token::Cmp(op)) => {
                self.pos += 1;
                let rhs = self.sum()?;
                Ok(Expr::Binary(Box::new(lhs), *op, Box::new(rhs)))
            }
            _ => Ok(lhs),
        }
    }

    fn sum(&mut self) -> Result<Expr, String> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct('+')) => BinOp::Add,
                Some(Token::Punct('-')) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, String> {
        let mut lhs = self.atom()?;
        while let Some(Token::Punct('*')) = self.peek() {
            self.pos += 1;
            let rhs = self.atom()?;
            lhs = Expr::Binary(Box::new(lhs), BinOp::Mul, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Token::Int(value)) => Ok(Expr::Int(*value)),
            Some(Token::Ident(name)) if name == "s" => {
                match self.next() {
                    Some(Token::Punct('[')) => {}
                    _ => return Err("expected '[' after 's'".to_string()),
                }
                let index = self.expr()?;
                match self.next() {
                    Some(Token::Punct(']')) => Ok(Expr::Selected(Box::new(index))),
                    _ => Err("expected ']'".to_string()),
                }
            }
            Some(Token::Ident(name)) => Ok(Expr::Var(name.clone())),
            Some(Token::Punct('(')) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::Punct(')')) => Ok(inner),
                    _ => Err("expected ')'".to_string()),
                }
            }
            Some(token) => Err(format!("unexpected token {:?} in expression", token)),
            None => Err("empty expression".to_string()),
        }
    }
}
