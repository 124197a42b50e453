//! Expression AST nodes

use serde::{Deserialize, Serialize};

use super::{
    is_default_span, ConstraintId, PortTarget, Reference, Span, TransformId, ValueTypeReference,
};

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Expression {
    Boolean {
        value: bool,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Integer {
        value: i64,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Decimal {
        value: f64,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Text {
        value: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `/pattern/`
    Regex {
        pattern: String,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `A1:C5`, `column B`, `row 3`, `B2`
    CellRange {
        range: CellRangeLiteral,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `[a, b, c]`
    Collection {
        elements: Vec<Expression>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    /// `"column name" oftype TYPE`
    ValueTypeAssignment {
        column: String,
        value_type: ValueTypeReference,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    ConstraintRef {
        reference: Reference<ConstraintId>,
    },
    TransformRef {
        reference: Reference<TransformId>,
    },
    /// A transform input port used inside the transform's body
    Variable {
        reference: Reference<PortTarget>,
    },
    /// The `value` keyword inside an expression constraint
    ValueKeyword {
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
    Ternary {
        operator: TernaryOperator,
        first: Box<Expression>,
        second: Box<Expression>,
        third: Box<Expression>,
        #[serde(default, skip_serializing_if = "is_default_span")]
        span: Span,
    },
}

impl Expression {
    /// Get the span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expression::Boolean { span, .. } => *span,
            Expression::Integer { span, .. } => *span,
            Expression::Decimal { span, .. } => *span,
            Expression::Text { span, .. } => *span,
            Expression::Regex { span, .. } => *span,
            Expression::CellRange { span, .. } => *span,
            Expression::Collection { span, .. } => *span,
            Expression::ValueTypeAssignment { span, .. } => *span,
            Expression::ConstraintRef { reference } => reference.span,
            Expression::TransformRef { reference } => reference.span,
            Expression::Variable { reference } => reference.span,
            Expression::ValueKeyword { span } => *span,
            Expression::Unary { span, .. } => *span,
            Expression::Binary { span, .. } => *span,
            Expression::Ternary { span, .. } => *span,
        }
    }

    /// Whether the expression is written as a plain literal.
    ///
    /// Collections of literals and signed numeric literals count as literals.
    pub fn is_literal(&self) -> bool {
        match self {
            Expression::Boolean { .. }
            | Expression::Integer { .. }
            | Expression::Decimal { .. }
            | Expression::Text { .. }
            | Expression::Regex { .. }
            | Expression::CellRange { .. }
            | Expression::ValueTypeAssignment { .. }
            | Expression::ConstraintRef { .. }
            | Expression::TransformRef { .. } => true,
            Expression::Collection { elements, .. } => elements.iter().all(Expression::is_literal),
            Expression::Unary {
                operator: UnaryOperator::Minus | UnaryOperator::Plus,
                operand,
                ..
            } => matches!(
                operand.as_ref(),
                Expression::Integer { .. } | Expression::Decimal { .. }
            ),
            Expression::Variable { .. }
            | Expression::ValueKeyword { .. }
            | Expression::Unary { .. }
            | Expression::Binary { .. }
            | Expression::Ternary { .. } => false,
        }
    }

    /// Direct sub-expressions in source order
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Collection { elements, .. } => elements.iter().collect(),
            Expression::Unary { operand, .. } => vec![operand.as_ref()],
            Expression::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expression::Ternary {
                first,
                second,
                third,
                ..
            } => vec![first.as_ref(), second.as_ref(), third.as_ref()],
            _ => Vec::new(),
        }
    }

    /// Visit this expression and all nested expressions, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// The four literal syntaxes for cell ranges.
///
/// Ids are kept as written: column letters (`"AB"`), 1-based row numbers
/// (`"3"`), cells (`"AB3"`), with `*` standing for "last column/row".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum CellRangeLiteral {
    Cell { cell: String },
    Column { column: String },
    Row { row: String },
    Range { from: String, to: String },
}

impl std::fmt::Display for CellRangeLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellRangeLiteral::Cell { cell } => write!(f, "{}", cell),
            CellRangeLiteral::Column { column } => write!(f, "column {}", column),
            CellRangeLiteral::Row { row } => write!(f, "row {}", row),
            CellRangeLiteral::Range { from, to } => write!(f, "range {}:{}", from, to),
        }
    }
}

/* ===================== Operators ===================== */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "sqrt")]
    Sqrt,
    #[serde(rename = "floor")]
    Floor,
    #[serde(rename = "ceil")]
    Ceil,
    #[serde(rename = "round")]
    Round,
    #[serde(rename = "lowercase")]
    Lowercase,
    #[serde(rename = "uppercase")]
    Uppercase,
    #[serde(rename = "asText")]
    AsText,
    #[serde(rename = "asInteger")]
    AsInteger,
    #[serde(rename = "asDecimal")]
    AsDecimal,
    #[serde(rename = "asBoolean")]
    AsBoolean,
    #[serde(rename = "lengthof")]
    LengthOf,
}

impl UnaryOperator {
    pub const ALL: [UnaryOperator; 14] = [
        UnaryOperator::Not,
        UnaryOperator::Plus,
        UnaryOperator::Minus,
        UnaryOperator::Sqrt,
        UnaryOperator::Floor,
        UnaryOperator::Ceil,
        UnaryOperator::Round,
        UnaryOperator::Lowercase,
        UnaryOperator::Uppercase,
        UnaryOperator::AsText,
        UnaryOperator::AsInteger,
        UnaryOperator::AsDecimal,
        UnaryOperator::AsBoolean,
        UnaryOperator::LengthOf,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Not => "not",
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Sqrt => "sqrt",
            UnaryOperator::Floor => "floor",
            UnaryOperator::Ceil => "ceil",
            UnaryOperator::Round => "round",
            UnaryOperator::Lowercase => "lowercase",
            UnaryOperator::Uppercase => "uppercase",
            UnaryOperator::AsText => "asText",
            UnaryOperator::AsInteger => "asInteger",
            UnaryOperator::AsDecimal => "asDecimal",
            UnaryOperator::AsBoolean => "asBoolean",
            UnaryOperator::LengthOf => "lengthof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "pow")]
    Pow,
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "matches")]
    Matches,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "xor")]
    Xor,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 18] = [
        BinaryOperator::Pow,
        BinaryOperator::Root,
        BinaryOperator::Multiply,
        BinaryOperator::Divide,
        BinaryOperator::Modulo,
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Matches,
        BinaryOperator::In,
        BinaryOperator::Less,
        BinaryOperator::LessEqual,
        BinaryOperator::Greater,
        BinaryOperator::GreaterEqual,
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::Xor,
        BinaryOperator::And,
        BinaryOperator::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Pow => "pow",
            BinaryOperator::Root => "root",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Matches => "matches",
            BinaryOperator::In => "in",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Xor => "xor",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TernaryOperator {
    /// `TEXT replace REGEX with TEXT`
    #[serde(rename = "replace")]
    Replace,
}

impl TernaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            TernaryOperator::Replace => "replace",
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::fmt::Display for TernaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
