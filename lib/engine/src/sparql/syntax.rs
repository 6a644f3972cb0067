use rdf_fusion_logical::{Table, TriplePath};
use rdf_fusion_model::{
    AggregateExpression, Expression, NamedNodePattern, OrderExpression, TriplePattern, Variable,
};

/// An element of a query pattern, as produced by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// A group (`{ ... }`). Filters within a group apply to the whole group.
    Group(Vec<Element>),
    /// A block of triple patterns.
    Triples(Vec<TriplePattern>),
    /// A block of triple patterns with property paths.
    PathBlock(Vec<TriplePath>),
    Filter(Expression),
    /// `BIND(expression AS ?variable)`
    Bind {
        variable: Variable,
        expression: Expression,
    },
    /// `LET(?variable := expression)`
    Assign {
        variable: Variable,
        expression: Expression,
    },
    Optional(Box<Element>),
    Minus(Box<Element>),
    /// `FILTER EXISTS { ... }` as a group element. Unlike other filters, it stays at its
    /// position in the group.
    Exists(Box<Element>),
    /// `FILTER NOT EXISTS { ... }`
    NotExists(Box<Element>),
    /// `LATERAL { ... }`
    Lateral(Box<Element>),
    /// The alternatives of a `UNION`.
    Union(Vec<Element>),
    NamedGraph {
        name: NamedNodePattern,
        inner: Box<Element>,
    },
    Service {
        endpoint: NamedNodePattern,
        inner: Box<Element>,
        silent: bool,
    },
    /// An inline `VALUES` block.
    Data(Table),
    SubQuery(Box<Query>),
    /// An element that is handled by a registered
    /// [ExtensionBuilder](rdf_fusion_logical::ExtensionBuilder).
    Extension {
        tag: String,
        args: Vec<Expression>,
    },
}

impl Element {
    /// Returns `true` if this is a group without any elements.
    pub fn is_empty_group(&self) -> bool {
        matches!(self, Element::Group(elements) if elements.is_empty())
    }
}

/// A `SELECT` query consisting of a pattern and the solution modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub pattern: Element,
    /// The `GROUP BY` keys. A key with an expression binds the result of the expression to the
    /// variable.
    pub group_by: Vec<(Variable, Option<Expression>)>,
    /// The aggregates computed per group and the variables they are bound to.
    pub aggregates: Vec<(Variable, AggregateExpression)>,
    pub having: Vec<Expression>,
    pub order_by: Vec<OrderExpression>,
    /// A `VALUES` block after the pattern. It is joined with the result of grouping and
    /// `HAVING`.
    pub values: Option<Table>,
    /// The projected variables. A variable with an expression is a `(expression AS ?variable)`
    /// select expression.
    pub project: Vec<(Variable, Option<Expression>)>,
    /// `SELECT *`
    pub result_star: bool,
    pub distinct: bool,
    pub reduced: bool,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Query {
    /// Creates a `SELECT *` query without any modifiers.
    pub fn new(pattern: Element) -> Self {
        Self {
            pattern,
            group_by: Vec::new(),
            aggregates: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            values: None,
            project: Vec::new(),
            result_star: true,
            distinct: false,
            reduced: false,
            offset: None,
            limit: None,
        }
    }

    /// Returns whether the query groups its solutions. A query with aggregates but without
    /// `GROUP BY` forms a single group.
    pub fn has_group(&self) -> bool {
        !self.group_by.is_empty() || !self.aggregates.is_empty()
    }
}
