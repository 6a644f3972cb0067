use crate::op::{Op, PropFuncArg, TriplePath};
use rdf_fusion_model::TriplePattern;
use std::fmt::{Display, Formatter, Result};

/// Renders the operator tree with one operator per line. Inputs are indented by two spaces.
impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.fmt_indented(f, 0)
    }
}

impl Op {
    fn fmt_indented(&self, f: &mut Formatter<'_>, indent: usize) -> Result {
        write!(f, "{:width$}", "", width = indent * 2)?;
        self.fmt_node(f)?;
        for input in self.inputs() {
            writeln!(f)?;
            input.fmt_indented(f, indent + 1)?;
        }
        Ok(())
    }

    fn fmt_node(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.name())?;
        match self {
            Op::Bgp { patterns } => fmt_patterns(f, patterns),
            Op::QuadPattern { graph, patterns } => {
                write!(f, " {graph}")?;
                fmt_patterns(f, patterns)
            }
            Op::Triple { pattern } => fmt_patterns(f, std::slice::from_ref(pattern)),
            Op::Path { path } => write!(f, " {}", DisplayTriplePath(path)),
            Op::Table { table } => {
                if table.is_join_identity() {
                    return f.write_str(": unit");
                }
                f.write_str(":")?;
                for variable in table.variables() {
                    write!(f, " {variable}")?;
                }
                write!(f, " rows={}", table.rows().len())
            }
            Op::DatasetNames { graph } => write!(f, " {graph}"),
            Op::Filter { exprs, .. } => {
                f.write_str(": ")?;
                fmt_separated(f, exprs, ", ")
            }
            Op::Graph { name, .. } => write!(f, " {name}"),
            Op::Service {
                endpoint, silent, ..
            } => {
                if *silent {
                    f.write_str(" SILENT")?;
                }
                write!(f, " {endpoint}")
            }
            Op::PropFunc {
                property,
                subject,
                object,
                ..
            } => write!(
                f,
                " {} {property} {}",
                DisplayPropFuncArg(subject),
                DisplayPropFuncArg(object)
            ),
            Op::Assign { bindings, .. } | Op::Extend { bindings, .. } => {
                f.write_str(":")?;
                for (i, (variable, expression)) in bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {variable} := {expression}")?;
                }
                Ok(())
            }
            Op::Label { label, .. } => write!(f, ": {label}"),
            Op::Order { conditions, .. } => {
                f.write_str(": ")?;
                fmt_separated(f, conditions, " ")
            }
            Op::Project { variables, .. } => {
                f.write_str(":")?;
                for variable in variables {
                    write!(f, " {variable}")?;
                }
                Ok(())
            }
            Op::Slice { start, length, .. } => {
                f.write_str(": offset=")?;
                fmt_optional(f, *start)?;
                f.write_str(" limit=")?;
                fmt_optional(f, *length)
            }
            Op::Group {
                keys, aggregates, ..
            } => {
                f.write_str(":")?;
                for (variable, expression) in keys {
                    match expression {
                        None => write!(f, " {variable}")?,
                        Some(expression) => write!(f, " ({variable} := {expression})")?,
                    }
                }
                if !aggregates.is_empty() {
                    f.write_str(" aggregates=")?;
                    for (i, (variable, aggregate)) in aggregates.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "({variable} := {aggregate})")?;
                    }
                }
                Ok(())
            }
            Op::LeftJoin { exprs, .. } if !exprs.is_empty() => {
                f.write_str(": ")?;
                fmt_separated(f, exprs, ", ")
            }
            Op::Extension(extension) => {
                write!(f, ": {}", extension.tag)?;
                if !extension.args.is_empty() {
                    f.write_str(" ")?;
                    fmt_separated(f, &extension.args, ", ")?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn fmt_patterns(f: &mut Formatter<'_>, patterns: &[TriplePattern]) -> Result {
    for pattern in patterns {
        write!(
            f,
            " ({} {} {})",
            pattern.subject, pattern.predicate, pattern.object
        )?;
    }
    Ok(())
}

fn fmt_separated<T: Display>(f: &mut Formatter<'_>, items: &[T], separator: &str) -> Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn fmt_optional(f: &mut Formatter<'_>, value: Option<usize>) -> Result {
    match value {
        None => f.write_str("-"),
        Some(value) => write!(f, "{value}"),
    }
}

struct DisplayTriplePath<'a>(&'a TriplePath);

impl Display for DisplayTriplePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "({} {} {})", self.0.subject, self.0.path, self.0.object)
    }
}

struct DisplayPropFuncArg<'a>(&'a PropFuncArg);

impl Display for DisplayPropFuncArg<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.0 {
            PropFuncArg::Node(node) => write!(f, "{node}"),
            PropFuncArg::List(nodes) => {
                f.write_str("(")?;
                fmt_separated(f, nodes, " ")?;
                f.write_str(")")
            }
        }
    }
}
