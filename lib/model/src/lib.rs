mod graph_name;
mod var_alloc;
pub mod vocab;

pub use graph_name::*;
pub use var_alloc::VarAlloc;

// Re-export some oxrdf types.
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Subject, SubjectRef,
    Term, TermRef, Triple, TripleRef, Variable, VariableRef,
};

// Re-export the pattern and expression types of spargebra. The algebra operators are defined
// in rdf-fusion-logical, spargebra only provides the building blocks.
pub use spargebra::algebra::{
    AggregateExpression, AggregateFunction, Expression, Function, OrderExpression,
    PropertyPathExpression,
};
pub use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern, TriplePattern};
