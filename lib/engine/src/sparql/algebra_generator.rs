use crate::config::AlgebraConfig;
use crate::sparql::path_compiler::{compile_block, BlockItem};
use crate::sparql::syntax::{Element, Query};
use rdf_fusion_common::error::AlgebraError;
use rdf_fusion_common::AlgebraResult;
use rdf_fusion_logical::transform::{transform, TransformSimplify};
use rdf_fusion_logical::{ExtensionRegistry, Op, OpRef, VarExprList};
use rdf_fusion_model::{Expression, VarAlloc};
use std::cell::RefCell;
use std::sync::Arc;

/// Compiles a [Query] into an operator tree of the SPARQL algebra.
///
/// The pattern is compiled group by group. Within a group, the elements are folded from left to
/// right into an accumulator that starts with the join identity. Filters apply to the whole
/// group and are placed around the group result, unless
/// [fixed_filter_position](AlgebraConfig::fixed_filter_position) is enabled. `EXISTS` and
/// `NOT EXISTS` always stay at their position. Afterward, the solution modifiers are applied
/// in the following order: group, having, values, order, project, distinct, reduced, and slice.
pub struct AlgebraGenerator {
    config: AlgebraConfig,
    registry: Arc<ExtensionRegistry>,
    state: RefCell<GeneratorState>,
}

#[derive(Debug)]
struct GeneratorState {
    path_vars: VarAlloc,
    sub_query_depth: usize,
}

/// An entry of a group after filters have been extracted and adjacent blocks have been merged.
enum GroupItem<'a> {
    Block(Vec<BlockItem>),
    Element(&'a Element),
}

impl AlgebraGenerator {
    pub fn new(config: AlgebraConfig, registry: Arc<ExtensionRegistry>) -> Self {
        Self {
            config,
            registry,
            state: RefCell::new(GeneratorState {
                path_vars: VarAlloc::new("*P"),
                sub_query_depth: 0,
            }),
        }
    }

    /// Compiles the pattern and the solution modifiers of `query`.
    pub fn compile(&self, query: &Query) -> AlgebraResult<OpRef> {
        let pattern = self.compile_pattern(&query.pattern)?;
        let op = Self::compile_modifiers(query, pattern);

        let depth = self.state.borrow().sub_query_depth;
        tracing::debug!(depth, "Compiled query:\n{op}");
        Ok(op)
    }

    /// Compiles a pattern and simplifies the result (if enabled).
    ///
    /// If joins are simplified while they are built, no separate simplification pass runs.
    pub fn compile_pattern(&self, element: &Element) -> AlgebraResult<OpRef> {
        let op = self.compile_element(element)?;
        if self.config.simplify && !self.config.simplify_early {
            return transform(&mut TransformSimplify, &op);
        }
        Ok(op)
    }

    /// Compiles a single element without simplifying the result.
    pub fn compile_element(&self, element: &Element) -> AlgebraResult<OpRef> {
        match element {
            Element::Group(elements) => self.compile_group(elements),
            Element::Union(branches) => self.compile_union(branches),
            Element::NamedGraph { name, inner } => {
                Ok(Op::graph(name.clone(), self.compile_element(inner)?))
            }
            Element::Service {
                endpoint,
                inner,
                silent,
            } => Ok(Arc::new(Op::Service {
                endpoint: endpoint.clone(),
                silent: *silent,
                inner: self.compile_element(inner)?,
            })),
            Element::Triples(patterns) => Ok(Op::bgp(patterns.clone())),
            Element::PathBlock(paths) => Ok(self.compile_path_block(
                paths.iter().cloned().map(BlockItem::Path).collect(),
            )),
            Element::Data(table) => Ok(Arc::new(Op::Table {
                table: table.clone(),
            })),
            Element::SubQuery(query) => self.compile_sub_query(query),
            Element::Extension { tag, args } => self.compile_extension(tag, args),
            // Elements that operate on the preceding part of a group. Outside a group, they
            // operate on the join identity.
            Element::Filter(_)
            | Element::Bind { .. }
            | Element::Assign { .. }
            | Element::Optional(_)
            | Element::Minus(_)
            | Element::Exists(_)
            | Element::NotExists(_)
            | Element::Lateral(_) => self.compile_one_in_group(element, Op::unit()),
        }
    }

    fn compile_group(&self, elements: &[Element]) -> AlgebraResult<OpRef> {
        let (filters, items) = self.prepare_group(elements);

        let mut current = Op::unit();
        for item in items {
            current = match item {
                GroupItem::Block(block) => self.join(current, self.compile_path_block(block)),
                GroupItem::Element(element) => self.compile_one_in_group(element, current)?,
            };
        }

        if !filters.is_empty() {
            current = Op::filter(filters, current);
        }
        Ok(current)
    }

    /// Extracts the filters of a group and merges adjacent triple and path blocks.
    fn prepare_group<'a>(&self, elements: &'a [Element]) -> (Vec<Expression>, Vec<GroupItem<'a>>) {
        let mut filters = Vec::new();
        let mut items = Vec::new();
        let mut block: Option<Vec<BlockItem>> = None;

        for element in elements {
            match element {
                Element::Filter(expression) if !self.config.fixed_filter_position => {
                    filters.push(expression.clone());
                }
                Element::Triples(patterns) => block
                    .get_or_insert_with(Vec::new)
                    .extend(patterns.iter().cloned().map(BlockItem::Triple)),
                Element::PathBlock(paths) => block
                    .get_or_insert_with(Vec::new)
                    .extend(paths.iter().cloned().map(BlockItem::Path)),
                element => {
                    if let Some(block) = block.take() {
                        items.push(GroupItem::Block(block));
                    }
                    items.push(GroupItem::Element(element));
                }
            }
        }
        if let Some(block) = block {
            items.push(GroupItem::Block(block));
        }

        (filters, items)
    }

    fn compile_one_in_group(&self, element: &Element, current: OpRef) -> AlgebraResult<OpRef> {
        match element {
            Element::Bind {
                variable,
                expression,
            } => Ok(Arc::new(Op::Extend {
                bindings: vec![(variable.clone(), expression.clone())],
                inner: current,
            })),
            Element::Assign {
                variable,
                expression,
            } => Ok(Arc::new(Op::Assign {
                bindings: vec![(variable.clone(), expression.clone())],
                inner: current,
            })),
            Element::Optional(inner) => self.compile_optional(inner, current),
            Element::Minus(inner) => Ok(Arc::new(Op::Minus {
                left: current,
                right: self.compile_pattern(inner)?,
            })),
            Element::Exists(inner) => self.compile_exists(inner, current, false),
            Element::NotExists(inner) => self.compile_exists(inner, current, true),
            Element::Lateral(inner) => Ok(Arc::new(Op::Lateral {
                left: current,
                right: self.compile_element(inner)?,
            })),
            // Filters at a fixed position or outside of a group.
            Element::Filter(expression) => Ok(Op::filter(vec![expression.clone()], current)),
            Element::Group(_)
            | Element::Triples(_)
            | Element::PathBlock(_)
            | Element::Union(_)
            | Element::NamedGraph { .. }
            | Element::Service { .. }
            | Element::Data(_)
            | Element::SubQuery(_)
            | Element::Extension { .. } => {
                let op = self.compile_element(element)?;
                Ok(self.join(current, op))
            }
        }
    }

    /// Compiles an `OPTIONAL`. The filter of the optional body becomes the condition of the left
    /// join.
    fn compile_optional(&self, inner: &Element, current: OpRef) -> AlgebraResult<OpRef> {
        let op = self.compile_element(inner)?;
        if let Op::Filter { exprs, inner } = op.as_ref() {
            if matches!(inner.as_ref(), Op::Filter { .. }) {
                return AlgebraError::internal("Nested filters in the body of an OPTIONAL.");
            }
            return Ok(Op::left_join(current, Arc::clone(inner), exprs.clone()));
        }
        Ok(Op::left_join(current, op, Vec::new()))
    }

    /// The pattern of an `EXISTS` is simplified on its own, as it is evaluated separately.
    fn compile_exists(
        &self,
        inner: &Element,
        current: OpRef,
        negated: bool,
    ) -> AlgebraResult<OpRef> {
        Ok(Arc::new(Op::FilterExists {
            negated,
            inner: current,
            pattern: self.compile_pattern(inner)?,
        }))
    }

    fn compile_union(&self, branches: &[Element]) -> AlgebraResult<OpRef> {
        let mut branches = branches.iter();
        let Some(first) = branches.next() else {
            return AlgebraError::internal("UNION without any alternatives.");
        };

        let mut current = self.compile_element(first)?;
        for branch in branches {
            current = Op::union(current, self.compile_element(branch)?);
        }
        Ok(current)
    }

    fn compile_path_block(&self, block: Vec<BlockItem>) -> OpRef {
        let mut state = self.state.borrow_mut();
        compile_block(block, &mut state.path_vars)
    }

    fn compile_sub_query(&self, query: &Query) -> AlgebraResult<OpRef> {
        self.state.borrow_mut().sub_query_depth += 1;
        let result = self.compile(query);
        self.state.borrow_mut().sub_query_depth -= 1;
        result
    }

    fn compile_extension(&self, tag: &str, args: &[Expression]) -> AlgebraResult<OpRef> {
        let Some(builder) = self.registry.get(tag) else {
            return AlgebraError::internal(format!("Unknown extension element '{tag}'."));
        };
        builder.build(args)
    }

    fn compile_modifiers(query: &Query, pattern: OpRef) -> OpRef {
        let mut op = pattern;

        if query.has_group() {
            op = Arc::new(Op::Group {
                keys: query.group_by.clone(),
                aggregates: query.aggregates.clone(),
                inner: op,
            });
        }

        for expression in &query.having {
            op = Op::filter(vec![expression.clone()], op);
        }

        if let Some(values) = &query.values {
            op = Op::join(
                op,
                Arc::new(Op::Table {
                    table: values.clone(),
                }),
            );
        }

        if !query.order_by.is_empty() {
            op = Arc::new(Op::Order {
                conditions: query.order_by.clone(),
                inner: op,
            });
        }

        // No projection for SELECT * so that all bindings remain visible.
        if !query.result_star && !query.project.is_empty() {
            let bindings: VarExprList = query
                .project
                .iter()
                .filter_map(|(variable, expression)| {
                    expression
                        .as_ref()
                        .map(|expression| (variable.clone(), expression.clone()))
                })
                .collect();
            if !bindings.is_empty() {
                op = Arc::new(Op::Assign {
                    bindings,
                    inner: op,
                });
            }

            op = Arc::new(Op::Project {
                variables: query
                    .project
                    .iter()
                    .map(|(variable, _)| variable.clone())
                    .collect(),
                inner: op,
            });
        }

        if query.distinct {
            op = Arc::new(Op::Distinct { inner: op });
        }

        if query.reduced {
            op = Arc::new(Op::Reduced { inner: op });
        }

        if query.offset.is_some() || query.limit.is_some() {
            op = Arc::new(Op::Slice {
                start: query.offset,
                length: query.limit,
                inner: op,
            });
        }

        op
    }

    /// Joins `right` to the accumulator of a group.
    fn join(&self, current: OpRef, right: OpRef) -> OpRef {
        if self.config.simplify && self.config.simplify_early {
            Op::join_reduce(current, right)
        } else {
            Op::join(current, right)
        }
    }
}
