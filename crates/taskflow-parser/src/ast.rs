//! Syntax tree for TaskFlow programs.
//!
//! The tree is a strict ownership hierarchy: a [`Program`] owns its
//! [`TaskDef`]s, which own their [`Statement`]s, which own their
//! [`Expression`]s. Nodes carry no back references and are never mutated
//! after parsing.

use std::{fmt, str::FromStr};

/// Root node: every task in declaration order.
///
/// Task names are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub tasks: Vec<TaskDef>,
}

impl Program {
    pub fn new(tasks: Vec<TaskDef>) -> Self {
        Self { tasks }
    }

    /// All tasks in declaration order.
    pub fn tasks(&self) -> &[TaskDef] {
        &self.tasks
    }

    /// The first task declared with `name`.
    pub fn task(&self, name: &str) -> Option<&TaskDef> {
        self.tasks.iter().find(|task| task.name == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A `task name { ... }` definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDef {
    pub name: String,
    /// `None` when no `priority:` option was given
    pub priority: Option<Priority>,
    /// `None` when no `depends:` option was given; `Some(vec![])` for `depends: []`
    pub depends: Option<Vec<String>>,
    pub statements: Vec<Statement>,
}

impl TaskDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("invalid priority level `{s}`")),
        }
    }
}

/// A statement inside a task body or a nested block.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let name = value`
    VarDecl { name: String, value: Expression },
    /// `name = value`
    Assignment { name: String, value: Expression },
    /// `if condition { ... } else { ... }`
    ///
    /// `else_body` is `None` when there is no `else` clause, and
    /// `Some(vec![])` for an explicit empty `else {}`.
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    },
    /// `repeat count times { ... }`
    Repeat {
        count: Expression,
        body: Vec<Statement>,
    },
    /// `while condition { ... }`
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    /// `run "command"`; the command is the string content without quotes
    Run { command: String },
    /// `log message`
    Log { message: Expression },
}

/// Binary operators, from lowest to highest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Or,
    And,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// The operator as written in source.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `not`
    Not,
    /// `-`
    Negate,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Negate => "-",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three literal categories of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Number,
    String,
    Boolean,
}

/// A literal value.
///
/// Number lexemes containing a `.` become [`Literal::Float`], all other
/// number lexemes [`Literal::Integer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Integer(_) | Literal::Float(_) => LiteralKind::Number,
            Literal::String(_) => LiteralKind::String,
            Literal::Boolean(_) => LiteralKind::Boolean,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::String(s) => write!(f, "\"{s}\""),
            Literal::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Literal(Literal),
    Identifier(String),
    List(Vec<Expression>),
}

impl Expression {
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expression::Literal(Literal::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Expression::Literal(Literal::Boolean(value))
    }
}

/// Fully parenthesized rendering, e.g. `(2 + (3 * 4))`.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Binary {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::Unary {
                operator: UnaryOperator::Not,
                operand,
            } => write!(f, "(not {operand})"),
            Expression::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => write!(f, "(-{operand})"),
            Expression::Literal(literal) => write!(f, "{literal}"),
            Expression::Identifier(name) => f.write_str(name),
            Expression::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
        }
    }
}
