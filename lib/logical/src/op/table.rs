use rdf_fusion_model::{GroundTerm, Variable};

/// A fixed set of solutions, as produced by a `VALUES` block.
///
/// Each row holds one optional value per variable. A `None` value means that the variable is
/// unbound in that row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Table {
    variables: Vec<Variable>,
    rows: Vec<Vec<Option<GroundTerm>>>,
}

impl Table {
    pub fn new(variables: Vec<Variable>, rows: Vec<Vec<Option<GroundTerm>>>) -> Self {
        Self { variables, rows }
    }

    /// The table with no variables and a single empty row. Joining with this table does not
    /// change the other side.
    pub fn unit() -> Self {
        Self {
            variables: Vec::new(),
            rows: vec![Vec::new()],
        }
    }

    /// A table without any rows.
    pub fn empty(variables: Vec<Variable>) -> Self {
        Self {
            variables,
            rows: Vec::new(),
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn rows(&self) -> &[Vec<Option<GroundTerm>>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns `true` if this is the [unit](Self::unit) table.
    pub fn is_join_identity(&self) -> bool {
        self.variables.is_empty() && matches!(self.rows.as_slice(), [row] if row.is_empty())
    }
}
