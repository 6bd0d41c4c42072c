use std::fmt;

/// Operators of the filter and script expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Logical
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,
    /// Logical NOT (`!`), the only unary operator
    Not,

    // Comparison
    /// Equal (`==`)
    Eq,
    /// Not equal (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Regular expression match (`=~`)
    Regex,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Integer modulo (`%`)
    Mod,
    /// Exponentiation (`**`)
    Pow,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Not => "!",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Regex => "=~",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
        }
    }

    pub fn is_unary(self) -> bool {
        self == Operator::Not
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Where an embedded selector starts walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `$`, the document being queried
    Root,
    /// `@`, the element under a filter or the value under a script
    Current,
}

impl Anchor {
    pub fn symbol(self) -> char {
        match self {
            Anchor::Root => '$',
            Anchor::Current => '@',
        }
    }
}

/// One entry of the expression builder's search order.
///
/// The builder splits an expression at the first entry of the list that
/// occurs in it, so entries earlier in the list bind more loosely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    Operator(Operator),
    Selector(Anchor),
}

impl Priority {
    pub fn symbol(self) -> &'static str {
        match self {
            Priority::Operator(op) => op.symbol(),
            Priority::Selector(Anchor::Root) => "$",
            Priority::Selector(Anchor::Current) => "@",
        }
    }
}

pub const DEFAULT_PRIORITIES: &[Priority] = &[
    Priority::Operator(Operator::Or),
    Priority::Operator(Operator::And),
    Priority::Operator(Operator::Eq),
    Priority::Operator(Operator::Ne),
    Priority::Operator(Operator::Le),
    Priority::Operator(Operator::Ge),
    Priority::Operator(Operator::Lt),
    Priority::Operator(Operator::Gt),
    Priority::Operator(Operator::Regex),
    Priority::Operator(Operator::Not),
    Priority::Operator(Operator::Add),
    Priority::Operator(Operator::Sub),
    Priority::Operator(Operator::Pow),
    Priority::Operator(Operator::Mul),
    Priority::Operator(Operator::Div),
    Priority::Operator(Operator::Mod),
    Priority::Selector(Anchor::Root),
    Priority::Selector(Anchor::Current),
];
