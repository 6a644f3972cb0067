use rdf_fusion_logical::{Op, OpRef, TriplePath};
use rdf_fusion_model::{
    NamedNodePattern, PropertyPathExpression, TermPattern, TriplePattern, VarAlloc,
};
use std::mem::take;
use std::sync::Arc;

/// An entry of a block that mixes plain triple patterns and property paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BlockItem {
    Triple(TriplePattern),
    Path(TriplePath),
}

/// Compiles a block of triple patterns and property paths.
///
/// Simple paths are reduced to triple patterns: a link becomes a triple, an inverse path swaps
/// subject and object, and a sequence introduces a fresh variable that joins both parts. The
/// remaining paths become [Op::Path] operators. Consecutive triple patterns form a single basic
/// graph pattern. If there is more than one resulting operator, they are combined in a
/// [Op::Sequence].
pub(crate) fn compile_block(items: Vec<BlockItem>, var_alloc: &mut VarAlloc) -> OpRef {
    let mut reduced = Vec::new();
    for item in items {
        match item {
            BlockItem::Triple(triple) => reduced.push(BlockItem::Triple(triple)),
            BlockItem::Path(path) => {
                reduce(path.subject, path.path, path.object, var_alloc, &mut reduced);
            }
        }
    }

    let mut ops = Vec::new();
    let mut triples = Vec::new();
    for item in reduced {
        match item {
            BlockItem::Triple(triple) => triples.push(triple),
            BlockItem::Path(path) => {
                if !triples.is_empty() {
                    ops.push(Op::bgp(take(&mut triples)));
                }
                ops.push(Arc::new(Op::Path { path }));
            }
        }
    }
    if !triples.is_empty() {
        ops.push(Op::bgp(triples));
    }

    match <[OpRef; 1]>::try_from(ops) {
        Ok([op]) => op,
        Err(ops) if ops.is_empty() => Op::unit(),
        Err(ops) => Op::sequence(ops),
    }
}

fn reduce(
    subject: TermPattern,
    path: PropertyPathExpression,
    object: TermPattern,
    var_alloc: &mut VarAlloc,
    result: &mut Vec<BlockItem>,
) {
    match path {
        PropertyPathExpression::NamedNode(predicate) => {
            result.push(BlockItem::Triple(TriplePattern {
                subject,
                predicate: NamedNodePattern::NamedNode(predicate),
                object,
            }));
        }
        PropertyPathExpression::Reverse(inner) => {
            reduce(object, *inner, subject, var_alloc, result);
        }
        PropertyPathExpression::Sequence(first, second) => {
            let join = TermPattern::Variable(var_alloc.allocate());
            reduce(subject, *first, join.clone(), var_alloc, result);
            reduce(join, *second, object, var_alloc, result);
        }
        path => result.push(BlockItem::Path(TriplePath {
            subject,
            path,
            object,
        })),
    }
}
