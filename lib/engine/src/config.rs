/// Holds the configuration of the algebra pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlgebraConfig {
    /// Whether join identities are removed from the generated operator tree.
    pub simplify: bool,
    /// Whether join identities are already absorbed while joins are built, instead of running a
    /// simplification pass after the pattern has been compiled. Only has an effect if
    /// [simplify](Self::simplify) is enabled.
    pub simplify_early: bool,
    /// Places each filter at its syntactic position within a group instead of applying all
    /// filters of a group to the whole group.
    ///
    /// This mode does not produce conformant SPARQL semantics and only exists for diagnostic
    /// purposes.
    pub fixed_filter_position: bool,
    /// Whether the operator tree is converted into quad form.
    pub quad_form: bool,
    /// Whether, by default, patterns match against the union of all named graphs.
    pub union_default_graph: bool,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            simplify: true,
            simplify_early: false,
            fixed_filter_position: false,
            quad_form: false,
            union_default_graph: false,
        }
    }
}

impl AlgebraConfig {
    #[must_use]
    pub fn with_simplify(mut self, simplify: bool) -> Self {
        self.simplify = simplify;
        self
    }

    #[must_use]
    pub fn with_simplify_early(mut self, simplify_early: bool) -> Self {
        self.simplify_early = simplify_early;
        self
    }

    #[must_use]
    pub fn with_fixed_filter_position(mut self, fixed_filter_position: bool) -> Self {
        self.fixed_filter_position = fixed_filter_position;
        self
    }

    #[must_use]
    pub fn with_quad_form(mut self, quad_form: bool) -> Self {
        self.quad_form = quad_form;
        self
    }

    #[must_use]
    pub fn with_union_default_graph(mut self, union_default_graph: bool) -> Self {
        self.union_default_graph = union_default_graph;
        self
    }
}
