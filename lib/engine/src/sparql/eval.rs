use crate::sparql::error::EvaluationError;
use rdf_fusion_common::QuadStorage;
use rdf_fusion_logical::{Op, OpRef, Table};
use rdf_fusion_model::vocab::arq;
use rdf_fusion_model::{
    NamedNode, NamedNodePattern, NamedOrBlankNode, Term, TermPattern, TriplePattern,
    Variable,
};
use rustc_hash::FxHashSet;

type EvalResult<T> = Result<T, EvaluationError>;

/// A solution of a query: a set of variable bindings.
///
/// The bindings are sorted by variable name, so two solutions with the same bindings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Solution {
    bindings: Vec<(Variable, Term)>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.position(variable)
            .ok()
            .map(|index| &self.bindings[index].1)
    }

    /// Binds `variable` to `term`. Returns `false` if `variable` is already bound to a different
    /// term.
    pub fn bind(&mut self, variable: Variable, term: Term) -> bool {
        match self.position(&variable) {
            Ok(index) => self.bindings[index].1 == term,
            Err(index) => {
                self.bindings.insert(index, (variable, term));
                true
            }
        }
    }

    /// Merges two compatible solutions. Returns [None] if a variable is bound to different terms.
    pub fn merge(&self, other: &Solution) -> Option<Solution> {
        let mut result = self.clone();
        for (variable, term) in &other.bindings {
            if !result.bind(variable.clone(), term.clone()) {
                return None;
            }
        }
        Some(result)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter().map(|(variable, term)| (variable, term))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn project(&self, variables: &[Variable]) -> Solution {
        Solution {
            bindings: self
                .bindings
                .iter()
                .filter(|(variable, _)| variables.contains(variable))
                .cloned()
                .collect(),
        }
    }

    fn shares_variable_with(&self, other: &Solution) -> bool {
        self.bindings
            .iter()
            .any(|(variable, _)| other.get(variable).is_some())
    }

    fn position(&self, variable: &Variable) -> Result<usize, usize> {
        self.bindings
            .binary_search_by(|(candidate, _)| candidate.as_str().cmp(variable.as_str()))
    }
}

/// Evaluates an operator tree against `storage`.
///
/// This is a reference evaluator for the structural operators of the algebra. It does not
/// evaluate expressions. Hence, operators that require expression evaluation (e.g., filters or
/// assignments) return [EvaluationError::NotImplemented]. Patterns outside of a graph scope
/// match the default graph.
pub fn evaluate(op: &OpRef, storage: &dyn QuadStorage) -> EvalResult<Vec<Solution>> {
    let evaluator = Evaluator { storage };
    let solutions = evaluator.eval(op, &arq::DEFAULT_GRAPH_GENERATED.into_owned())?;
    tracing::debug!(solutions = solutions.len(), "Evaluated operator tree");
    Ok(solutions)
}

struct Evaluator<'s> {
    storage: &'s dyn QuadStorage,
}

impl Evaluator<'_> {
    fn eval(&self, op: &OpRef, active_graph: &NamedNode) -> EvalResult<Vec<Solution>> {
        match op.as_ref() {
            Op::Bgp { patterns } => {
                self.match_patterns(active_graph, patterns, vec![Solution::new()])
            }
            Op::Triple { pattern } => self.match_patterns(
                active_graph,
                std::slice::from_ref(pattern),
                vec![Solution::new()],
            ),
            Op::QuadPattern { graph, patterns } => self.eval_quad_pattern(graph, patterns),
            Op::Graph { name, inner } => match name {
                NamedNodePattern::NamedNode(graph) => self.eval(inner, graph),
                NamedNodePattern::Variable(variable) => {
                    let mut result = Vec::new();
                    for graph in self.named_graphs()? {
                        for mut solution in self.eval(inner, &graph)? {
                            if solution.bind(variable.clone(), graph.clone().into()) {
                                result.push(solution);
                            }
                        }
                    }
                    Ok(result)
                }
            },
            Op::DatasetNames { graph } => match graph {
                NamedNodePattern::NamedNode(graph) => {
                    if self.storage.contains_graph(graph.as_ref())? {
                        Ok(vec![Solution::new()])
                    } else {
                        Ok(Vec::new())
                    }
                }
                NamedNodePattern::Variable(variable) => Ok(self
                    .named_graphs()?
                    .into_iter()
                    .map(|graph| {
                        let mut solution = Solution::new();
                        solution.bind(variable.clone(), graph.into());
                        solution
                    })
                    .collect()),
            },
            Op::Table { table } => Ok(table_solutions(table)),
            Op::Null => Ok(Vec::new()),
            Op::Join { left, right } => Ok(join(
                &self.eval(left, active_graph)?,
                &self.eval(right, active_graph)?,
            )),
            Op::LeftJoin { left, right, exprs } => {
                if !exprs.is_empty() {
                    return EvaluationError::not_implemented("LeftJoin with a condition");
                }
                let right = self.eval(right, active_graph)?;
                let mut result = Vec::new();
                for solution in self.eval(left, active_graph)? {
                    let before = result.len();
                    result.extend(right.iter().filter_map(|other| solution.merge(other)));
                    if result.len() == before {
                        result.push(solution);
                    }
                }
                Ok(result)
            }
            Op::Union { left, right } => {
                let mut result = self.eval(left, active_graph)?;
                result.extend(self.eval(right, active_graph)?);
                Ok(result)
            }
            Op::Minus { left, right } => {
                let right = self.eval(right, active_graph)?;
                Ok(self
                    .eval(left, active_graph)?
                    .into_iter()
                    .filter(|solution| {
                        !right.iter().any(|other| {
                            solution.shares_variable_with(other) && solution.merge(other).is_some()
                        })
                    })
                    .collect())
            }
            // The pattern is evaluated once. A solution passes if it is compatible with one of
            // the solutions of the pattern.
            Op::FilterExists {
                negated,
                inner,
                pattern,
            } => {
                let pattern = self.eval(pattern, active_graph)?;
                Ok(self
                    .eval(inner, active_graph)?
                    .into_iter()
                    .filter(|solution| {
                        pattern
                            .iter()
                            .any(|other| solution.merge(other).is_some())
                            != *negated
                    })
                    .collect())
            }
            Op::Sequence { inputs } => {
                let mut result = vec![Solution::new()];
                for input in inputs {
                    result = join(&result, &self.eval(input, active_graph)?);
                }
                Ok(result)
            }
            Op::Distinct { inner } | Op::Reduced { inner } => {
                let mut seen = FxHashSet::default();
                Ok(self
                    .eval(inner, active_graph)?
                    .into_iter()
                    .filter(|solution| seen.insert(solution.clone()))
                    .collect())
            }
            Op::Project { variables, inner } => Ok(self
                .eval(inner, active_graph)?
                .iter()
                .map(|solution| solution.project(variables))
                .collect()),
            Op::Slice {
                start,
                length,
                inner,
            } => Ok(self
                .eval(inner, active_graph)?
                .into_iter()
                .skip(start.unwrap_or(0))
                .take(length.unwrap_or(usize::MAX))
                .collect()),
            Op::Label { inner, .. } | Op::List { inner } => self.eval(inner, active_graph),
            _ => EvaluationError::not_implemented(op.name()),
        }
    }

    fn eval_quad_pattern(
        &self,
        graph: &NamedNodePattern,
        patterns: &[TriplePattern],
    ) -> EvalResult<Vec<Solution>> {
        match graph {
            NamedNodePattern::NamedNode(graph) => {
                self.match_patterns(graph, patterns, vec![Solution::new()])
            }
            NamedNodePattern::Variable(variable) => {
                let mut result = Vec::new();
                for graph in self.named_graphs()? {
                    let mut seed = Solution::new();
                    seed.bind(variable.clone(), graph.clone().into());
                    result.extend(self.match_patterns(&graph, patterns, vec![seed])?);
                }
                Ok(result)
            }
        }
    }

    /// Matches the triple patterns one after another, extending each solution of `seed`.
    fn match_patterns(
        &self,
        graph: &NamedNode,
        patterns: &[TriplePattern],
        seed: Vec<Solution>,
    ) -> EvalResult<Vec<Solution>> {
        let mut solutions = seed;
        for pattern in patterns {
            let mut next = Vec::new();
            for solution in &solutions {
                let subject = resolve_term(&pattern.subject, solution)?;
                let object = resolve_term(&pattern.object, solution)?;
                let predicate = match &pattern.predicate {
                    NamedNodePattern::NamedNode(predicate) => Some(predicate.clone()),
                    NamedNodePattern::Variable(variable) => match solution.get(variable) {
                        Some(Term::NamedNode(predicate)) => Some(predicate.clone()),
                        Some(_) => continue,
                        None => None,
                    },
                };

                let quads = self.storage.quads_for_pattern(
                    Some(graph.as_ref()),
                    subject.as_ref().map(Term::as_ref),
                    predicate.as_ref().map(NamedNode::as_ref),
                    object.as_ref().map(Term::as_ref),
                )?;
                for quad in quads {
                    let mut extended = solution.clone();
                    if bind_term(&mut extended, &pattern.subject, quad.subject.into())
                        && bind_predicate(&mut extended, &pattern.predicate, quad.predicate)
                        && bind_term(&mut extended, &pattern.object, quad.object)
                    {
                        next.push(extended);
                    }
                }
            }
            solutions = next;
        }
        Ok(solutions)
    }

    /// Returns the named graphs of the dataset. Graphs named by blank nodes cannot be bound to a
    /// graph name and are skipped.
    fn named_graphs(&self) -> EvalResult<Vec<NamedNode>> {
        Ok(self
            .storage
            .named_graphs()?
            .into_iter()
            .filter_map(|graph| match graph {
                NamedOrBlankNode::NamedNode(graph) => Some(graph),
                NamedOrBlankNode::BlankNode(_) => None,
            })
            .collect())
    }
}

fn join(left: &[Solution], right: &[Solution]) -> Vec<Solution> {
    left.iter()
        .flat_map(|solution| right.iter().filter_map(|other| solution.merge(other)))
        .collect()
}

fn resolve_term(pattern: &TermPattern, solution: &Solution) -> EvalResult<Option<Term>> {
    match pattern {
        TermPattern::NamedNode(node) => Ok(Some(node.clone().into())),
        TermPattern::Literal(literal) => Ok(Some(literal.clone().into())),
        TermPattern::Variable(variable) => Ok(solution.get(variable).cloned()),
        _ => EvaluationError::not_implemented(format!("Term pattern {pattern}")),
    }
}

fn bind_term(solution: &mut Solution, pattern: &TermPattern, term: Term) -> bool {
    match pattern {
        TermPattern::Variable(variable) => solution.bind(variable.clone(), term),
        _ => true,
    }
}

fn bind_predicate(solution: &mut Solution, pattern: &NamedNodePattern, predicate: NamedNode) -> bool {
    match pattern {
        NamedNodePattern::Variable(variable) => solution.bind(variable.clone(), predicate.into()),
        NamedNodePattern::NamedNode(_) => true,
    }
}

fn table_solutions(table: &Table) -> Vec<Solution> {
    table
        .rows()
        .iter()
        .map(|row| {
            let mut solution = Solution::new();
            for (variable, value) in table.variables().iter().zip(row) {
                if let Some(value) = value {
                    solution.bind(variable.clone(), Term::from(value.clone()));
                }
            }
            solution
        })
        .collect()
}
