//! Parser for TaskFlow source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the syntax tree defined in [`ast`](super::ast). The grammar is LL(1): every
//! production decides on the single next token, so the parser never
//! backtracks. The public entry point is [`build_program`].
//!
//! Each time the cursor tests the next token against a kind, the kind's
//! description is recorded. Consuming a token clears the record. When no
//! production accepts the next token, the recorded descriptions are exactly
//! the tokens that would have been accepted at that point, and they become the
//! expected set of the diagnostic.
//!
//! Nesting is bounded. Every block, parenthesis, list and prefix operator
//! opens one level of recursion, up to [`MAX_NESTING`] levels. Every
//! expression tree is at most [`MAX_HEIGHT`] nodes tall, which bounds the
//! recursion of dropping and formatting it. Past either bound parsing fails
//! with [`ErrorCode::E103`](crate::error::ErrorCode::E103).

use std::collections::BTreeSet;

use log::{debug, trace};
use winnow::stream::{Stream, TokenSlice};

use crate::{
    ast::{BinaryOperator, Expression, Priority, Program, Statement, TaskDef, UnaryOperator},
    error::{Diagnostic, Result},
    span::Span,
    tokens::{Token, TokenKind},
};

/// Limit on nested blocks, parentheses, lists and prefix operators.
const MAX_NESTING: usize = 64;

/// Limit on the height of an expression tree, including operator chains.
const MAX_HEIGHT: usize = 1024;

/// Description recorded when the end of input would have been accepted.
const END_OF_INPUT: &str = "end of input";

/// Priority levels are plain identifiers checked in position.
const PRIORITY_LEVELS: [(&str, Priority); 3] = [
    ("`high`", Priority::High),
    ("`medium`", Priority::Medium),
    ("`low`", Priority::Low),
];

const COMPARISON_OPERATORS: [(TokenKind, BinaryOperator); 6] = [
    (TokenKind::EqualEqual, BinaryOperator::Equal),
    (TokenKind::NotEqual, BinaryOperator::NotEqual),
    (TokenKind::LessEqual, BinaryOperator::LessEqual),
    (TokenKind::GreaterEqual, BinaryOperator::GreaterEqual),
    (TokenKind::Less, BinaryOperator::Less),
    (TokenKind::Greater, BinaryOperator::Greater),
];

const ADDITIVE_OPERATORS: [(TokenKind, BinaryOperator); 2] = [
    (TokenKind::Plus, BinaryOperator::Add),
    (TokenKind::Minus, BinaryOperator::Subtract),
];

const MULTIPLICATIVE_OPERATORS: [(TokenKind, BinaryOperator); 2] = [
    (TokenKind::Star, BinaryOperator::Multiply),
    (TokenKind::Slash, BinaryOperator::Divide),
];

/// Token cursor with expected-token bookkeeping.
struct Input<'t, 'src> {
    tokens: TokenSlice<'t, Token<'src>>,
    expected: BTreeSet<&'static str>,
    /// Empty span just past the last token, `None` for an empty stream
    end_of_input: Option<Span>,
    /// Span of the last consumed token
    previous: Option<Span>,
    /// Currently open nesting levels
    depth: usize,
}

/// A parsed expression with the height of its tree.
struct Operand {
    expr: Expression,
    height: usize,
}

impl Operand {
    fn leaf(expr: Expression) -> Self {
        Self { expr, height: 1 }
    }
}

impl<'t, 'src> Input<'t, 'src> {
    fn new(tokens: &'t [Token<'src>]) -> Self {
        let end_of_input = tokens.last().map(|token| {
            let end = token.span.end();
            Span::new(end..end)
        });

        Self {
            tokens: TokenSlice::new(tokens),
            expected: BTreeSet::new(),
            end_of_input,
            previous: None,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&'t Token<'src>> {
        self.tokens.peek_token()
    }

    /// Consume the next token.
    fn bump(&mut self) -> Option<&'t Token<'src>> {
        self.expected.clear();
        let token = self.tokens.next_token();
        if let Some(token) = token {
            self.previous = Some(token.span);
        }
        token
    }

    /// Test the next token against `kind` without consuming it.
    fn check(&mut self, kind: TokenKind) -> bool {
        self.expected.insert(kind.description());
        self.peek().is_some_and(|token| token.kind == kind)
    }

    /// Consume the next token if it is of `kind`.
    fn eat(&mut self, kind: TokenKind) -> Option<&'t Token<'src>> {
        if self.check(kind) {
            self.bump()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'t Token<'src>> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected()),
        }
    }

    /// Consume the first operator of `table` that matches the next token.
    fn eat_operator(&mut self, table: &[(TokenKind, BinaryOperator)]) -> Option<BinaryOperator> {
        table
            .iter()
            .find(|(kind, _)| self.eat(*kind).is_some())
            .map(|(_, operator)| *operator)
    }

    fn check_end(&mut self) -> bool {
        self.expected.insert(END_OF_INPUT);
        self.peek().is_none()
    }

    /// Open a nesting level for the token just consumed.
    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING {
            return Err(Diagnostic::nesting_too_deep(MAX_NESTING, self.previous));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Wrap `expr` as an operand of `height`, located at `at` when too tall.
    fn operand(&self, expr: Expression, height: usize, at: Option<Span>) -> Result<Operand> {
        if height > MAX_HEIGHT {
            return Err(Diagnostic::nesting_too_deep(MAX_HEIGHT, at));
        }
        Ok(Operand { expr, height })
    }

    fn binary(
        &self,
        operator: BinaryOperator,
        left: Operand,
        right: Operand,
        at: Option<Span>,
    ) -> Result<Operand> {
        let height = left.height.max(right.height) + 1;
        self.operand(Expression::binary(operator, left.expr, right.expr), height, at)
    }

    fn unary(
        &self,
        operator: UnaryOperator,
        operand: Operand,
        at: Option<Span>,
    ) -> Result<Operand> {
        let height = operand.height + 1;
        self.operand(Expression::unary(operator, operand.expr), height, at)
    }

    /// Diagnostic for the next token, which no production accepts.
    fn unexpected(&self) -> Diagnostic {
        let expected = self.expected.iter().copied();
        match self.peek() {
            Some(token) => Diagnostic::unexpected_token(token.lexeme, expected, token.span),
            None => Diagnostic::unexpected_end_of_input(expected, self.end_of_input),
        }
    }
}

/// program = task+
fn program(input: &mut Input<'_, '_>) -> Result<Program> {
    let mut tasks = vec![task(input)?];

    loop {
        if input.check(TokenKind::Task) {
            tasks.push(task(input)?);
        } else if input.check_end() {
            break;
        } else {
            return Err(input.unexpected());
        }
    }

    Ok(Program::new(tasks))
}

/// task = "task" IDENT "{" option* statement* "}"
fn task(input: &mut Input<'_, '_>) -> Result<TaskDef> {
    input.expect(TokenKind::Task)?;
    let name = input.expect(TokenKind::Identifier)?.lexeme;
    input.expect(TokenKind::LeftBrace)?;

    let mut task = TaskDef::new(name);

    loop {
        if input.eat(TokenKind::Priority).is_some() {
            let level = priority_level(input)?;
            if task.priority.replace(level).is_some() {
                debug!(
                    task = name,
                    priority = level.as_str();
                    "Duplicate priority option, keeping the last"
                );
            }
        } else if input.eat(TokenKind::Depends).is_some() {
            let names = dependency_list(input)?;
            if task.depends.replace(names).is_some() {
                debug!(task = name; "Duplicate depends option, keeping the last");
            }
        } else {
            break;
        }
    }

    task.statements = statements(input)?;
    input.expect(TokenKind::RightBrace)?;

    trace!(task = name, statements = task.statements.len(); "Parsed task");

    Ok(task)
}

/// ":" ("high" | "medium" | "low")
fn priority_level(input: &mut Input<'_, '_>) -> Result<Priority> {
    input.expect(TokenKind::Colon)?;

    input
        .expected
        .extend(PRIORITY_LEVELS.iter().map(|(description, _)| *description));

    let level = input
        .peek()
        .filter(|token| token.kind == TokenKind::Identifier)
        .and_then(|token| token.lexeme.parse::<Priority>().ok());

    match level {
        Some(level) => {
            input.bump();
            Ok(level)
        }
        None => Err(input.unexpected()),
    }
}

/// ":" "[" (IDENT ("," IDENT)*)? "]"
fn dependency_list(input: &mut Input<'_, '_>) -> Result<Vec<String>> {
    input.expect(TokenKind::Colon)?;
    input.expect(TokenKind::LeftBracket)?;

    let mut names = Vec::new();
    if let Some(first) = input.eat(TokenKind::Identifier) {
        names.push(first.lexeme.to_string());
        while input.eat(TokenKind::Comma).is_some() {
            names.push(input.expect(TokenKind::Identifier)?.lexeme.to_string());
        }
    }

    input.expect(TokenKind::RightBracket)?;
    Ok(names)
}

/// statement*
fn statements(input: &mut Input<'_, '_>) -> Result<Vec<Statement>> {
    let mut statements = Vec::new();
    while let Some(statement) = statement(input)? {
        statements.push(statement);
    }
    Ok(statements)
}

/// "{" statement* "}"
fn block(input: &mut Input<'_, '_>) -> Result<Vec<Statement>> {
    input.expect(TokenKind::LeftBrace)?;
    input.enter()?;
    let body = statements(input)?;
    input.leave();
    input.expect(TokenKind::RightBrace)?;
    Ok(body)
}

/// Parse one statement, or return `None` when the next token starts none.
fn statement(input: &mut Input<'_, '_>) -> Result<Option<Statement>> {
    let statement = if input.eat(TokenKind::Let).is_some() {
        let name = input.expect(TokenKind::Identifier)?.lexeme.to_string();
        input.expect(TokenKind::Equals)?;
        let value = expression(input)?;
        Statement::VarDecl { name, value }
    } else if let Some(target) = input.eat(TokenKind::Identifier) {
        input.expect(TokenKind::Equals)?;
        let value = expression(input)?;
        Statement::Assignment {
            name: target.lexeme.to_string(),
            value,
        }
    } else if input.eat(TokenKind::If).is_some() {
        let condition = expression(input)?;
        let then_body = block(input)?;
        let else_body = match input.eat(TokenKind::Else) {
            Some(_) => Some(block(input)?),
            None => None,
        };
        Statement::If {
            condition,
            then_body,
            else_body,
        }
    } else if input.eat(TokenKind::Repeat).is_some() {
        let count = expression(input)?;
        input.expect(TokenKind::Times)?;
        let body = block(input)?;
        Statement::Repeat { count, body }
    } else if input.eat(TokenKind::While).is_some() {
        let condition = expression(input)?;
        let body = block(input)?;
        Statement::While { condition, body }
    } else if input.eat(TokenKind::Run).is_some() {
        let command = input.expect(TokenKind::String)?;
        Statement::Run {
            command: string_content(command.lexeme).to_string(),
        }
    } else if input.eat(TokenKind::Log).is_some() {
        let message = expression(input)?;
        Statement::Log { message }
    } else {
        return Ok(None);
    };

    Ok(Some(statement))
}

/// expression = or_expr
fn expression(input: &mut Input<'_, '_>) -> Result<Expression> {
    or_expr(input).map(|operand| operand.expr)
}

/// or_expr = and_expr ("or" and_expr)*
fn or_expr(input: &mut Input<'_, '_>) -> Result<Operand> {
    let mut left = and_expr(input)?;
    while input.eat(TokenKind::Or).is_some() {
        let at = input.previous;
        let right = and_expr(input)?;
        left = input.binary(BinaryOperator::Or, left, right, at)?;
    }
    Ok(left)
}

/// and_expr = not_expr ("and" not_expr)*
fn and_expr(input: &mut Input<'_, '_>) -> Result<Operand> {
    let mut left = not_expr(input)?;
    while input.eat(TokenKind::And).is_some() {
        let at = input.previous;
        let right = not_expr(input)?;
        left = input.binary(BinaryOperator::And, left, right, at)?;
    }
    Ok(left)
}

/// not_expr = "not" not_expr | comparison
fn not_expr(input: &mut Input<'_, '_>) -> Result<Operand> {
    if input.eat(TokenKind::Not).is_some() {
        let at = input.previous;
        input.enter()?;
        let operand = not_expr(input)?;
        input.leave();
        input.unary(UnaryOperator::Not, operand, at)
    } else {
        comparison(input)
    }
}

/// comparison = sum (comp_op sum)?
///
/// Comparisons do not chain: after one operator the right side is a `sum`,
/// so `a < b < c` fails at the second `<`.
fn comparison(input: &mut Input<'_, '_>) -> Result<Operand> {
    let left = sum(input)?;
    match input.eat_operator(&COMPARISON_OPERATORS) {
        Some(operator) => {
            let at = input.previous;
            let right = sum(input)?;
            input.binary(operator, left, right, at)
        }
        None => Ok(left),
    }
}

/// sum = product (("+" | "-") product)*
fn sum(input: &mut Input<'_, '_>) -> Result<Operand> {
    let mut left = product(input)?;
    while let Some(operator) = input.eat_operator(&ADDITIVE_OPERATORS) {
        let at = input.previous;
        let right = product(input)?;
        left = input.binary(operator, left, right, at)?;
    }
    Ok(left)
}

/// product = unary (("*" | "/") unary)*
fn product(input: &mut Input<'_, '_>) -> Result<Operand> {
    let mut left = unary(input)?;
    while let Some(operator) = input.eat_operator(&MULTIPLICATIVE_OPERATORS) {
        let at = input.previous;
        let right = unary(input)?;
        left = input.binary(operator, left, right, at)?;
    }
    Ok(left)
}

/// unary = "-" unary | atom
fn unary(input: &mut Input<'_, '_>) -> Result<Operand> {
    if input.eat(TokenKind::Minus).is_some() {
        let at = input.previous;
        input.enter()?;
        let operand = unary(input)?;
        input.leave();
        input.unary(UnaryOperator::Negate, operand, at)
    } else {
        atom(input)
    }
}

/// atom = NUMBER | STRING | "true" | "false" | IDENT | "(" expression ")" | list
fn atom(input: &mut Input<'_, '_>) -> Result<Operand> {
    if let Some(token) = input.eat(TokenKind::Number) {
        number_literal(token).map(Operand::leaf)
    } else if let Some(token) = input.eat(TokenKind::String) {
        Ok(Operand::leaf(Expression::string(string_content(
            token.lexeme,
        ))))
    } else if input.eat(TokenKind::True).is_some() {
        Ok(Operand::leaf(Expression::boolean(true)))
    } else if input.eat(TokenKind::False).is_some() {
        Ok(Operand::leaf(Expression::boolean(false)))
    } else if let Some(token) = input.eat(TokenKind::Identifier) {
        Ok(Operand::leaf(Expression::identifier(token.lexeme)))
    } else if input.eat(TokenKind::LeftParen).is_some() {
        input.enter()?;
        let inner = or_expr(input)?;
        input.leave();
        input.expect(TokenKind::RightParen)?;
        Ok(inner)
    } else if input.eat(TokenKind::LeftBracket).is_some() {
        let at = input.previous;
        input.enter()?;
        let list = list_elements(input, at)?;
        input.leave();
        Ok(list)
    } else {
        Err(input.unexpected())
    }
}

/// (expression ("," expression)*)? "]", after the opening bracket at `at`
fn list_elements(input: &mut Input<'_, '_>, at: Option<Span>) -> Result<Operand> {
    let mut elements = Vec::new();
    let mut height = 0;

    if input.eat(TokenKind::RightBracket).is_none() {
        loop {
            let element = or_expr(input)?;
            height = height.max(element.height);
            elements.push(element.expr);
            if input.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        input.expect(TokenKind::RightBracket)?;
    }

    input.operand(Expression::List(elements), height + 1, at)
}

/// A lexeme with a `.` is a float, anything else an integer.
fn number_literal(token: &Token<'_>) -> Result<Expression> {
    let out_of_range = || Diagnostic::number_out_of_range(token.lexeme, token.span);

    if token.lexeme.contains('.') {
        token
            .lexeme
            .parse::<f64>()
            .map(Expression::float)
            .map_err(|_| out_of_range())
    } else {
        token
            .lexeme
            .parse::<i64>()
            .map(Expression::integer)
            .map_err(|_| out_of_range())
    }
}

/// Strip the enclosing quotes from a string lexeme.
fn string_content(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(lexeme)
}

/// Build a [`Program`] from a token stream.
///
/// Diagnostics carry spans but no line information; the caller locates them
/// against the source text.
pub(crate) fn build_program(tokens: &[Token<'_>]) -> Result<Program> {
    let mut input = Input::new(tokens);
    program(&mut input)
}
