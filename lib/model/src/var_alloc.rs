use oxrdf::Variable;

/// Allocates fresh variables that cannot clash with variables of a parsed query.
///
/// The prefix should contain a character that is not allowed in SPARQL variable names (e.g.,
/// `*`). Rewrites that introduce new variables use this to avoid capturing user variables.
#[derive(Debug, Clone)]
pub struct VarAlloc {
    prefix: String,
    next: usize,
}

impl VarAlloc {
    /// Creates a new allocator that creates variables named `{prefix}{n}`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Returns a new variable.
    pub fn allocate(&mut self) -> Variable {
        let variable = Variable::new_unchecked(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        variable
    }
}
