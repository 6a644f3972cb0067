use crate::sparql::syntax::{Element, Query};
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_logical::{ExtensionRegistry, Op, OpRef, PropFuncArg, Table};
use rdf_fusion_model::{
    AggregateExpression, Expression, NamedNodePattern, OrderExpression, TriplePattern, Variable,
};
use std::mem::{replace, take};

/// Converts an operator tree back into a [Query].
///
/// The converter first analyses the modifiers of the outermost query level. The remaining
/// pattern is then converted into nested groups. Modifiers that occur deeper in the tree start a
/// new query level and become sub-queries.
///
/// Not every operator tree has a query counterpart. In particular, trees in quad form cannot be
/// converted.
pub struct OpAsQuery<'r> {
    registry: &'r ExtensionRegistry,
}

impl<'r> OpAsQuery<'r> {
    /// Creates a new converter. Extension operators can only be converted if their tag is known
    /// to `registry`.
    pub fn new(registry: &'r ExtensionRegistry) -> Self {
        Self { registry }
    }

    pub fn convert(&self, op: &OpRef) -> AlgebraResult<Query> {
        let level = QueryLevel::analyse(op);
        let mut state = ConversionState::new(level.assignments);
        self.convert_into(level.pattern, &mut state)?;

        let mut query = Query::new(Element::Group(Vec::new()));
        if let Some((keys, aggregates)) = level.group {
            query.group_by = keys.to_vec();
            query.aggregates = aggregates.to_vec();
        }
        query.having = level.having;
        query.values = level.values.cloned();
        if let Some(conditions) = level.order {
            query.order_by = conditions.to_vec();
        }

        if let Some(variables) = level.project {
            query.result_star = false;
            query.project = variables
                .iter()
                .map(|variable| (variable.clone(), state.take_assignment(variable)))
                .collect();
        }
        // Only the assignments of a group can end up here. A select expression is the only
        // place for them.
        if let Some(assignment) = state.side_table.first() {
            return AlgebraError::unsupported(format!(
                "Assignment to {} is not projected",
                assignment.variable
            ));
        }

        query.distinct = level.distinct;
        query.reduced = level.reduced;
        if let Some((offset, limit)) = level.slice {
            query.offset = offset;
            query.limit = limit;
        }
        query.pattern = state.finish();

        tracing::debug!("Converted operator tree into a query");
        Ok(query)
    }

    /// Converts `op` and adds the resulting elements to the current group.
    fn convert_into(&self, op: &OpRef, state: &mut ConversionState) -> AlgebraResult<()> {
        match op.as_ref() {
            Op::Bgp { patterns } => state.push(Element::Triples(patterns.clone())),
            Op::Triple { pattern } => state.push(Element::Triples(vec![pattern.clone()])),
            Op::Join { left, right } => {
                let left = self.as_element(left, state)?;
                let right = match <[Element; 1]>::try_from(self.as_element_group(right, state)?) {
                    Ok([Element::SubQuery(query)]) => Element::SubQuery(query),
                    Ok([element]) => Element::Group(vec![element]),
                    Err(elements) => Element::Group(elements),
                };
                state.push(left);
                state.push(right);
            }
            Op::LeftJoin { left, right, exprs } => {
                let left = self.as_element(left, state)?;
                let mut right = self.as_element_group(right, state)?;
                // Filters of the optional body must not become part of the join condition.
                if right.iter().any(|e| matches!(e, Element::Filter(_))) {
                    right = vec![Element::Group(right)];
                }
                right.extend(exprs.iter().cloned().map(Element::Filter));

                if !left.is_empty_group() {
                    state.push(left);
                }
                state.push(Element::Optional(Box::new(Element::Group(right))));
            }
            Op::Union { left, right } => {
                let left = self.as_element_group(left, state)?;
                let right = Element::Group(self.as_element_group(right, state)?);
                let union = match <[Element; 1]>::try_from(left) {
                    Ok([Element::Union(mut branches)]) => {
                        branches.push(right);
                        Element::Union(branches)
                    }
                    Ok([element]) => Element::Union(vec![Element::Group(vec![element]), right]),
                    Err(left) => Element::Union(vec![Element::Group(left), right]),
                };
                state.push(union);
            }
            Op::Filter { exprs, inner } => {
                let inner = self.as_element(inner, state)?;
                if !inner.is_empty_group() {
                    state.push(inner);
                }
                for expression in exprs {
                    state.push(Element::Filter(expression.clone()));
                }
            }
            Op::FilterExists {
                negated,
                inner,
                pattern,
            } => {
                self.convert_position_input(inner, state)?;
                let pattern = Box::new(self.as_group(pattern, state)?);
                state.push(if *negated {
                    Element::NotExists(pattern)
                } else {
                    Element::Exists(pattern)
                });
            }
            Op::Lateral { left, right } => {
                self.convert_position_input(left, state)?;
                let right = self.as_group(right, state)?;
                state.push(Element::Lateral(Box::new(right)));
            }
            Op::Graph { name, inner } => {
                let inner = self.as_group(inner, state)?;
                state.push(Element::NamedGraph {
                    name: name.clone(),
                    inner: Box::new(inner),
                });
            }
            Op::Service {
                endpoint,
                silent,
                inner,
            } => {
                let inner = self.as_group(inner, state)?;
                state.push(Element::Service {
                    endpoint: endpoint.clone(),
                    inner: Box::new(inner),
                    silent: *silent,
                });
            }
            Op::Extend { bindings, inner } | Op::Assign { bindings, inner } => {
                // A filter below the assignment must stay in its own group.
                if matches!(inner.as_ref(), Op::Filter { .. }) {
                    let inner = self.as_element(inner, state)?;
                    state.push(inner);
                } else {
                    self.convert_into(inner, state)?;
                }

                let is_assign = matches!(op.as_ref(), Op::Assign { .. });
                for (variable, expression) in bindings {
                    state.push(assignment_element(variable, expression, is_assign));
                }
            }
            Op::Label { inner, .. } | Op::List { inner } => self.convert_into(inner, state)?,
            Op::Sequence { inputs } => {
                let nest = !state.current.is_empty();
                if nest {
                    state.start_sub_group();
                }
                for input in inputs {
                    let element = self.as_element(input, state)?;
                    state.push(element);
                }
                if nest {
                    let group = state.end_sub_group();
                    state.push(Element::Group(group));
                }
            }
            Op::PropFunc {
                property,
                subject,
                object,
                inner,
            } => {
                let (PropFuncArg::Node(subject), PropFuncArg::Node(object)) = (subject, object)
                else {
                    return AlgebraError::unsupported("PropFunc with list arguments");
                };
                if !inner.is_join_identity() {
                    self.convert_into(inner, state)?;
                }
                state.push(Element::Triples(vec![TriplePattern {
                    subject: subject.clone(),
                    predicate: NamedNodePattern::NamedNode(property.clone()),
                    object: object.clone(),
                }]));
            }
            Op::Extension(extension) => {
                if !self.registry.contains(&extension.tag) {
                    return AlgebraError::unsupported(format!(
                        "Unknown extension '{}'",
                        extension.tag
                    ));
                }
                state.push(Element::Extension {
                    tag: extension.tag.clone(),
                    args: extension.args.clone(),
                });
            }
            Op::Order { .. }
            | Op::Project { .. }
            | Op::Distinct { .. }
            | Op::Reduced { .. }
            | Op::Slice { .. }
            | Op::Group { .. } => {
                let sub_query = self.convert(op)?;
                state.push(Element::SubQuery(Box::new(sub_query)));
            }
            // Joined into a group, the join identity has no effect.
            Op::Table { table } if table.is_join_identity() => {}
            Op::Table { .. } => return AlgebraError::unsupported("Table"),
            Op::QuadPattern { .. }
            | Op::Path { .. }
            | Op::DatasetNames { .. }
            | Op::Disjunction { .. }
            | Op::Minus { .. }
            | Op::Diff { .. }
            | Op::Conditional { .. }
            | Op::Null => return AlgebraError::unsupported(op.name()),
        }
        Ok(())
    }

    /// Converts `op` into the elements of a new group.
    fn as_element_group(
        &self,
        op: &OpRef,
        state: &mut ConversionState,
    ) -> AlgebraResult<Vec<Element>> {
        state.start_sub_group();
        let result = self.convert_into(op, state);
        let group = state.end_sub_group();
        result.map(|()| group)
    }

    /// Converts the input of an element that applies at its position in the group. Filters of
    /// the input apply to the whole group and therefore get a group of their own.
    fn convert_position_input(
        &self,
        op: &OpRef,
        state: &mut ConversionState,
    ) -> AlgebraResult<()> {
        if matches!(op.as_ref(), Op::Filter { .. }) {
            let group = self.as_group(op, state)?;
            state.push(group);
            Ok(())
        } else {
            self.convert_into(op, state)
        }
    }

    /// Converts `op` into a single element. A group with a single element is unwrapped.
    fn as_element(&self, op: &OpRef, state: &mut ConversionState) -> AlgebraResult<Element> {
        let group = self.as_element_group(op, state)?;
        Ok(match <[Element; 1]>::try_from(group) {
            Ok([element]) => element,
            Err(group) => Element::Group(group),
        })
    }

    /// Converts `op` into an element that is always a group.
    fn as_group(&self, op: &OpRef, state: &mut ConversionState) -> AlgebraResult<Element> {
        Ok(match self.as_element(op, state)? {
            Element::Group(elements) => Element::Group(elements),
            element => Element::Group(vec![element]),
        })
    }
}

fn assignment_element(variable: &Variable, expression: &Expression, is_assign: bool) -> Element {
    let variable = variable.clone();
    let expression = expression.clone();
    if is_assign {
        Element::Assign {
            variable,
            expression,
        }
    } else {
        Element::Bind {
            variable,
            expression,
        }
    }
}

/// An assignment that has been lifted out of the pattern of a query level.
#[derive(Debug, Clone)]
struct Assignment {
    variable: Variable,
    expression: Expression,
}

/// The modifiers of a single query level.
///
/// The algebra generator applies the modifiers in a fixed order. The analysis peels them off in
/// the reverse order: slice, distinct, reduced, project, select expressions, order, values,
/// having, and group.
struct QueryLevel<'a> {
    slice: Option<(Option<usize>, Option<usize>)>,
    distinct: bool,
    reduced: bool,
    project: Option<&'a [Variable]>,
    /// In the order in which they are applied.
    assignments: Vec<Assignment>,
    order: Option<&'a [OrderExpression]>,
    values: Option<&'a Table>,
    having: Vec<Expression>,
    group: Option<(
        &'a [(Variable, Option<Expression>)],
        &'a [(Variable, AggregateExpression)],
    )>,
    pattern: &'a OpRef,
}

impl<'a> QueryLevel<'a> {
    fn analyse(op: &'a OpRef) -> Self {
        let mut level = QueryLevel {
            slice: None,
            distinct: false,
            reduced: false,
            project: None,
            assignments: Vec::new(),
            order: None,
            values: None,
            having: Vec::new(),
            group: None,
            pattern: op,
        };

        let mut op = op;
        if let Op::Slice {
            start,
            length,
            inner,
        } = op.as_ref()
        {
            level.slice = Some((*start, *length));
            op = inner;
        }
        if let Op::Distinct { inner } = op.as_ref() {
            level.distinct = true;
            op = inner;
        }
        if let Op::Reduced { inner } = op.as_ref() {
            level.reduced = true;
            op = inner;
        }
        if let Op::Project { variables, inner } = op.as_ref() {
            level.project = Some(variables.as_slice());
            op = inner;
        }

        // Assignments are collected from the outside in. Only assignments of projected
        // variables become select expressions. Everything else stays in the pattern.
        let mut assignments = Vec::new();
        if let Some(project) = level.project {
            op = peel_assignments(op, &mut assignments, |variable| project.contains(variable));
        }

        if let Op::Order { conditions, inner } = op.as_ref() {
            level.order = Some(conditions.as_slice());
            op = inner;
        }

        if let Op::Join { left, right } = op.as_ref() {
            if let Op::Table { table } = right.as_ref() {
                if !table.is_join_identity() {
                    level.values = Some(table);
                    op = left;
                }
            }
        }

        if has_group_below(op) {
            let mut having = Vec::new();
            loop {
                match op.as_ref() {
                    Op::Filter { exprs, inner } => {
                        having.push(exprs.as_slice());
                        op = inner;
                    }
                    Op::Extend { .. } | Op::Assign { .. } => {
                        op = peel_assignments(op, &mut assignments, |_| true);
                    }
                    Op::Group {
                        keys,
                        aggregates,
                        inner,
                    } => {
                        level.group = Some((keys.as_slice(), aggregates.as_slice()));
                        op = inner;
                        break;
                    }
                    _ => break,
                }
            }
            level.having = having.into_iter().rev().flatten().cloned().collect();
        }

        assignments.reverse();
        level.assignments = assignments;
        level.pattern = op;
        level
    }
}

/// Collects a chain of [Op::Extend] and [Op::Assign] operators, outermost first. Stops at the
/// first operator that binds a variable rejected by `peel`.
fn peel_assignments<'a>(
    mut op: &'a OpRef,
    assignments: &mut Vec<Assignment>,
    peel: impl Fn(&Variable) -> bool,
) -> &'a OpRef {
    loop {
        let (Op::Extend { bindings, inner } | Op::Assign { bindings, inner }) = op.as_ref() else {
            return op;
        };
        if !bindings.iter().all(|(variable, _)| peel(variable)) {
            return op;
        }
        // Within a node, later bindings are applied last.
        for (variable, expression) in bindings.iter().rev() {
            assignments.push(Assignment {
                variable: variable.clone(),
                expression: expression.clone(),
            });
        }
        op = inner;
    }
}

/// Returns whether a group is reachable through filters and assignments only.
fn has_group_below(mut op: &OpRef) -> bool {
    loop {
        match op.as_ref() {
            Op::Group { .. } => return true,
            Op::Filter { inner, .. } | Op::Extend { inner, .. } | Op::Assign { inner, .. } => {
                op = inner;
            }
            _ => return false,
        }
    }
}

/// The accumulator that is threaded through the conversion of a query level.
struct ConversionState {
    /// The group that receives new elements.
    current: Vec<Element>,
    /// The enclosing groups.
    stack: Vec<Vec<Element>>,
    /// Assignments that have been lifted out of the pattern. They become select expressions.
    side_table: Vec<Assignment>,
}

impl ConversionState {
    fn new(side_table: Vec<Assignment>) -> Self {
        Self {
            current: Vec::new(),
            stack: Vec::new(),
            side_table,
        }
    }

    fn push(&mut self, element: Element) {
        self.current.push(element);
    }

    fn start_sub_group(&mut self) {
        let current = take(&mut self.current);
        self.stack.push(current);
    }

    fn end_sub_group(&mut self) -> Vec<Element> {
        let parent = self.stack.pop().unwrap_or_default();
        replace(&mut self.current, parent)
    }

    /// Removes the assignment of `variable` from the side table. If `variable` is assigned
    /// multiple times, the last assignment wins.
    fn take_assignment(&mut self, variable: &Variable) -> Option<Expression> {
        let position = self
            .side_table
            .iter()
            .rposition(|assignment| &assignment.variable == variable)?;
        Some(self.side_table.remove(position).expression)
    }

    /// Returns the pattern of the query level. A single sub-query is not wrapped in a group.
    fn finish(self) -> Element {
        match <[Element; 1]>::try_from(self.current) {
            Ok([Element::SubQuery(query)]) => Element::SubQuery(query),
            Ok([element]) => Element::Group(vec![element]),
            Err(elements) => Element::Group(elements),
        }
    }
}
