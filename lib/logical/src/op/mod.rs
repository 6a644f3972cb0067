mod display;
mod table;

pub use table::Table;

use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_model::{
    AggregateExpression, Expression, NamedNode, NamedNodePattern, OrderExpression,
    PropertyPathExpression, TermPattern, TriplePattern, Variable,
};
use std::sync::Arc;

/// A shared reference to an algebra operator.
///
/// Operators are immutable once constructed. Rewrites build new operators and share unchanged
/// subtrees by cloning the [Arc]. Hence, [Arc::ptr_eq] can be used to detect whether a rewrite
/// changed a subtree.
pub type OpRef = Arc<Op>;

/// An ordered list of variable assignments as used by [Op::Assign] and [Op::Extend].
pub type VarExprList = Vec<(Variable, Expression)>;

/// A triple pattern whose predicate is a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePath {
    pub subject: TermPattern,
    pub path: PropertyPathExpression,
    pub object: TermPattern,
}

/// An argument of a property function. Property functions can take a single term or a list of
/// terms on either side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropFuncArg {
    Node(TermPattern),
    List(Vec<TermPattern>),
}

/// A pluggable operator that is not part of the closed set of algebra operators.
///
/// Extension operators are created by an [ExtensionBuilder](crate::ExtensionBuilder) that is
/// registered with an [ExtensionRegistry](crate::ExtensionRegistry). They have no inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpExtension {
    /// The tag that identifies the builder of this operator.
    pub tag: String,
    /// The arguments of the operator.
    pub args: Vec<Expression>,
}

/// Classifies operators by their number of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpShape {
    Leaf,
    Unary,
    Binary,
    Nary,
    Extension,
}

/// A node of the SPARQL algebra.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    /// A basic graph pattern. The triples are matched against the active graph.
    Bgp { patterns: Vec<TriplePattern> },
    /// A basic graph pattern whose triples all belong to `graph`.
    QuadPattern {
        graph: NamedNodePattern,
        patterns: Vec<TriplePattern>,
    },
    /// A single triple pattern.
    Triple { pattern: TriplePattern },
    /// A triple pattern with a property path.
    Path { path: TriplePath },
    /// A fixed set of solutions.
    Table { table: Table },
    /// Produces no solutions.
    Null,
    /// Enumerates the graph names of the dataset. Introduced by quadization for graph scopes that
    /// contain no patterns.
    DatasetNames { graph: NamedNodePattern },

    Filter {
        exprs: Vec<Expression>,
        inner: OpRef,
    },
    /// Evaluates `inner` within the graph `name`.
    Graph {
        name: NamedNodePattern,
        inner: OpRef,
    },
    Service {
        endpoint: NamedNodePattern,
        silent: bool,
        inner: OpRef,
    },
    PropFunc {
        property: NamedNode,
        subject: PropFuncArg,
        object: PropFuncArg,
        inner: OpRef,
    },
    /// Binds variables. Fails for solutions in which a variable is already bound to a
    /// different value.
    Assign {
        bindings: VarExprList,
        inner: OpRef,
    },
    /// Binds variables that are not bound in `inner`.
    Extend {
        bindings: VarExprList,
        inner: OpRef,
    },
    /// A debugging aid without semantics.
    Label {
        label: String,
        inner: OpRef,
    },
    List {
        inner: OpRef,
    },
    Order {
        conditions: Vec<OrderExpression>,
        inner: OpRef,
    },
    Project {
        variables: Vec<Variable>,
        inner: OpRef,
    },
    Distinct {
        inner: OpRef,
    },
    Reduced {
        inner: OpRef,
    },
    Slice {
        start: Option<usize>,
        length: Option<usize>,
        inner: OpRef,
    },
    Group {
        keys: Vec<(Variable, Option<Expression>)>,
        aggregates: Vec<(Variable, AggregateExpression)>,
        inner: OpRef,
    },

    Join {
        left: OpRef,
        right: OpRef,
    },
    /// An optional join. An empty `exprs` list means that there is no join condition.
    LeftJoin {
        left: OpRef,
        right: OpRef,
        exprs: Vec<Expression>,
    },
    Union {
        left: OpRef,
        right: OpRef,
    },
    Diff {
        left: OpRef,
        right: OpRef,
    },
    Minus {
        left: OpRef,
        right: OpRef,
    },
    Conditional {
        left: OpRef,
        right: OpRef,
    },
    /// Keeps the solutions of `inner` for which `pattern` has (or, if `negated`, has no)
    /// compatible solution. Compiled from `EXISTS` and `NOT EXISTS`.
    FilterExists {
        negated: bool,
        inner: OpRef,
        pattern: OpRef,
    },
    /// Evaluates `right` once per solution of `left`, with the bindings of that solution in
    /// scope.
    Lateral {
        left: OpRef,
        right: OpRef,
    },

    /// Evaluates the inputs from left to right, feeding the solutions of an input into the next.
    Sequence { inputs: Vec<OpRef> },
    Disjunction { inputs: Vec<OpRef> },

    Extension(OpExtension),
}

impl Op {
    /// Creates a basic graph pattern.
    pub fn bgp(patterns: Vec<TriplePattern>) -> OpRef {
        Arc::new(Op::Bgp { patterns })
    }

    /// Creates the join identity (a table with a single empty solution).
    pub fn unit() -> OpRef {
        Arc::new(Op::Table {
            table: Table::unit(),
        })
    }

    pub fn join(left: OpRef, right: OpRef) -> OpRef {
        Arc::new(Op::Join { left, right })
    }

    /// Creates a join but absorbs a join identity on either side.
    pub fn join_reduce(left: OpRef, right: OpRef) -> OpRef {
        if left.is_join_identity() {
            return right;
        }
        if right.is_join_identity() {
            return left;
        }
        Op::join(left, right)
    }

    pub fn left_join(left: OpRef, right: OpRef, exprs: Vec<Expression>) -> OpRef {
        Arc::new(Op::LeftJoin { left, right, exprs })
    }

    pub fn union(left: OpRef, right: OpRef) -> OpRef {
        Arc::new(Op::Union { left, right })
    }

    pub fn filter(exprs: Vec<Expression>, inner: OpRef) -> OpRef {
        Arc::new(Op::Filter { exprs, inner })
    }

    pub fn graph(name: NamedNodePattern, inner: OpRef) -> OpRef {
        Arc::new(Op::Graph { name, inner })
    }

    pub fn sequence(inputs: Vec<OpRef>) -> OpRef {
        Arc::new(Op::Sequence { inputs })
    }

    /// Returns `true` if this operator is a table that only contains a single empty solution.
    pub fn is_join_identity(&self) -> bool {
        matches!(self, Op::Table { table } if table.is_join_identity())
    }

    /// Returns the name of the operator as used in the textual representation.
    pub fn name(&self) -> &'static str {
        match self {
            Op::Bgp { .. } => "Bgp",
            Op::QuadPattern { .. } => "QuadPattern",
            Op::Triple { .. } => "Triple",
            Op::Path { .. } => "Path",
            Op::Table { .. } => "Table",
            Op::Null => "Null",
            Op::DatasetNames { .. } => "DatasetNames",
            Op::Filter { .. } => "Filter",
            Op::Graph { .. } => "Graph",
            Op::Service { .. } => "Service",
            Op::PropFunc { .. } => "PropFunc",
            Op::Assign { .. } => "Assign",
            Op::Extend { .. } => "Extend",
            Op::Label { .. } => "Label",
            Op::List { .. } => "List",
            Op::Order { .. } => "Order",
            Op::Project { .. } => "Project",
            Op::Distinct { .. } => "Distinct",
            Op::Reduced { .. } => "Reduced",
            Op::Slice { .. } => "Slice",
            Op::Group { .. } => "Group",
            Op::Join { .. } => "Join",
            Op::LeftJoin { .. } => "LeftJoin",
            Op::Union { .. } => "Union",
            Op::Diff { .. } => "Diff",
            Op::Minus { .. } => "Minus",
            Op::Conditional { .. } => "Conditional",
            Op::FilterExists { negated: false, .. } => "FilterExists",
            Op::FilterExists { negated: true, .. } => "FilterNotExists",
            Op::Lateral { .. } => "Lateral",
            Op::Sequence { .. } => "Sequence",
            Op::Disjunction { .. } => "Disjunction",
            Op::Extension(_) => "Extension",
        }
    }

    pub fn shape(&self) -> OpShape {
        match self {
            Op::Bgp { .. }
            | Op::QuadPattern { .. }
            | Op::Triple { .. }
            | Op::Path { .. }
            | Op::Table { .. }
            | Op::Null
            | Op::DatasetNames { .. } => OpShape::Leaf,
            Op::Filter { .. }
            | Op::Graph { .. }
            | Op::Service { .. }
            | Op::PropFunc { .. }
            | Op::Assign { .. }
            | Op::Extend { .. }
            | Op::Label { .. }
            | Op::List { .. }
            | Op::Order { .. }
            | Op::Project { .. }
            | Op::Distinct { .. }
            | Op::Reduced { .. }
            | Op::Slice { .. }
            | Op::Group { .. } => OpShape::Unary,
            Op::Join { .. }
            | Op::LeftJoin { .. }
            | Op::Union { .. }
            | Op::Diff { .. }
            | Op::Minus { .. }
            | Op::Conditional { .. }
            | Op::FilterExists { .. }
            | Op::Lateral { .. } => OpShape::Binary,
            Op::Sequence { .. } | Op::Disjunction { .. } => OpShape::Nary,
            Op::Extension(_) => OpShape::Extension,
        }
    }

    /// Returns the inputs of this operator from left to right.
    pub fn inputs(&self) -> Vec<&OpRef> {
        match self {
            Op::Bgp { .. }
            | Op::QuadPattern { .. }
            | Op::Triple { .. }
            | Op::Path { .. }
            | Op::Table { .. }
            | Op::Null
            | Op::DatasetNames { .. }
            | Op::Extension(_) => Vec::new(),
            Op::Filter { inner, .. }
            | Op::Graph { inner, .. }
            | Op::Service { inner, .. }
            | Op::PropFunc { inner, .. }
            | Op::Assign { inner, .. }
            | Op::Extend { inner, .. }
            | Op::Label { inner, .. }
            | Op::List { inner }
            | Op::Order { inner, .. }
            | Op::Project { inner, .. }
            | Op::Distinct { inner }
            | Op::Reduced { inner }
            | Op::Slice { inner, .. }
            | Op::Group { inner, .. } => vec![inner],
            Op::Join { left, right }
            | Op::LeftJoin { left, right, .. }
            | Op::Union { left, right }
            | Op::Diff { left, right }
            | Op::Minus { left, right }
            | Op::Conditional { left, right }
            | Op::Lateral { left, right } => vec![left, right],
            Op::FilterExists { inner, pattern, .. } => vec![inner, pattern],
            Op::Sequence { inputs } | Op::Disjunction { inputs } => inputs.iter().collect(),
        }
    }

    /// Creates a copy of this operator with new `inputs`.
    ///
    /// The number of inputs must match the number of inputs of this operator.
    pub fn with_new_inputs(&self, inputs: Vec<OpRef>) -> AlgebraResult<Op> {
        let expected = self.inputs().len();
        let is_nary = self.shape() == OpShape::Nary;
        if !is_nary && inputs.len() != expected {
            return AlgebraError::internal(format!(
                "{} expects {expected} inputs, got {}.",
                self.name(),
                inputs.len()
            ));
        }

        let mut inputs = inputs.into_iter();
        let mut next = || {
            inputs.next().ok_or_else(|| {
                AlgebraError::InternalCompilerError(format!("{} is missing an input.", self.name()))
            })
        };

        let op = match self {
            Op::Bgp { .. }
            | Op::QuadPattern { .. }
            | Op::Triple { .. }
            | Op::Path { .. }
            | Op::Table { .. }
            | Op::Null
            | Op::DatasetNames { .. }
            | Op::Extension(_) => self.clone(),
            Op::Filter { exprs, .. } => Op::Filter {
                exprs: exprs.clone(),
                inner: next()?,
            },
            Op::Graph { name, .. } => Op::Graph {
                name: name.clone(),
                inner: next()?,
            },
            Op::Service {
                endpoint, silent, ..
            } => Op::Service {
                endpoint: endpoint.clone(),
                silent: *silent,
                inner: next()?,
            },
            Op::PropFunc {
                property,
                subject,
                object,
                ..
            } => Op::PropFunc {
                property: property.clone(),
                subject: subject.clone(),
                object: object.clone(),
                inner: next()?,
            },
            Op::Assign { bindings, .. } => Op::Assign {
                bindings: bindings.clone(),
                inner: next()?,
            },
            Op::Extend { bindings, .. } => Op::Extend {
                bindings: bindings.clone(),
                inner: next()?,
            },
            Op::Label { label, .. } => Op::Label {
                label: label.clone(),
                inner: next()?,
            },
            Op::List { .. } => Op::List { inner: next()? },
            Op::Order { conditions, .. } => Op::Order {
                conditions: conditions.clone(),
                inner: next()?,
            },
            Op::Project { variables, .. } => Op::Project {
                variables: variables.clone(),
                inner: next()?,
            },
            Op::Distinct { .. } => Op::Distinct { inner: next()? },
            Op::Reduced { .. } => Op::Reduced { inner: next()? },
            Op::Slice { start, length, .. } => Op::Slice {
                start: *start,
                length: *length,
                inner: next()?,
            },
            Op::Group {
                keys, aggregates, ..
            } => Op::Group {
                keys: keys.clone(),
                aggregates: aggregates.clone(),
                inner: next()?,
            },
            Op::Join { .. } => Op::Join {
                left: next()?,
                right: next()?,
            },
            Op::LeftJoin { exprs, .. } => Op::LeftJoin {
                left: next()?,
                right: next()?,
                exprs: exprs.clone(),
            },
            Op::Union { .. } => Op::Union {
                left: next()?,
                right: next()?,
            },
            Op::Diff { .. } => Op::Diff {
                left: next()?,
                right: next()?,
            },
            Op::Minus { .. } => Op::Minus {
                left: next()?,
                right: next()?,
            },
            Op::Conditional { .. } => Op::Conditional {
                left: next()?,
                right: next()?,
            },
            Op::FilterExists { negated, .. } => Op::FilterExists {
                negated: *negated,
                inner: next()?,
                pattern: next()?,
            },
            Op::Lateral { .. } => Op::Lateral {
                left: next()?,
                right: next()?,
            },
            Op::Sequence { .. } => Op::Sequence {
                inputs: inputs.collect(),
            },
            Op::Disjunction { .. } => Op::Disjunction {
                inputs: inputs.collect(),
            },
        };
        Ok(op)
    }
}
