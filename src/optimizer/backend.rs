//! Minimal linear-programming contract the optimizer is written against, a
//! recording implementation used to inspect and check models, and the
//! `good_lp` backend that actually solves them.

use std::fmt;

use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::Serialize;

/// Handle to a variable, valid for the model that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSpec {
    pub name: String,
    pub lower: f64,
    /// `None` means unbounded above.
    pub upper: Option<f64>,
    pub integer: bool,
}

impl VariableSpec {
    pub fn non_negative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: None,
            integer: false,
        }
    }

    pub fn integer(mut self, integer: bool) -> Self {
        self.integer = integer;
        self
    }
}

/// Sum of `coefficient * variable` terms plus a constant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    pub fn evaluate(&self, mut value_of: impl FnMut(VarId) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(var, coefficient)| {
                acc + coefficient * value_of(var)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl Relation {
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            Self::Eq => (lhs - rhs).abs() <= tolerance,
            Self::Le => lhs <= rhs + tolerance,
            Self::Ge => lhs + tolerance >= rhs,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    Optimal,
    /// A feasible but not proven optimal assignment is available.
    Suboptimal,
    Infeasible,
    Unbounded,
    Error,
}

impl SolveStatus {
    /// Whether the solver left an assignment worth extracting.
    pub const fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Suboptimal)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Suboptimal => "suboptimal",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model construction half of the solver contract.
pub trait ModelBuilder {
    fn add_variable(&mut self, spec: VariableSpec) -> VarId;
    fn add_constraint(&mut self, expr: LinearExpr, relation: Relation, rhs: f64, name: &str);
    fn set_objective(&mut self, expr: LinearExpr, sense: Sense);
}

/// A model builder that can also solve what it was given.
pub trait LpBackend: ModelBuilder {
    fn optimize(&mut self) -> SolveStatus;

    /// Value of `var` in the last solution; `None` when no assignment exists.
    fn value_of(&self, var: VarId) -> Option<f64>;

    /// Solver message accompanying the last non-optimal status, if any.
    fn detail(&self) -> Option<String> {
        None
    }
}

/// A constraint or bound that an assignment fails to satisfy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub name: String,
    pub lhs: f64,
    pub relation: Relation,
    pub rhs: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.name,
            self.lhs,
            self.relation.symbol(),
            self.rhs
        )
    }
}

/// In-memory record of a linear model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearProgram {
    pub variables: Vec<VariableSpec>,
    pub constraints: Vec<LinearConstraint>,
    pub objective: LinearExpr,
    pub sense: Sense,
}

impl Default for LinearProgram {
    fn default() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
            sense: Sense::Minimize,
        }
    }
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraint(&self, name: &str) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    pub fn objective_value(&self, assignment: &[f64]) -> f64 {
        self.objective.evaluate(|var| assignment[var.0])
    }

    /// Every bound and constraint the assignment breaks, within `tolerance`.
    ///
    /// # Panics
    /// If `assignment` is shorter than the number of variables.
    pub fn violations(&self, assignment: &[f64], tolerance: f64) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (spec, &value) in self.variables.iter().zip(assignment) {
            if value + tolerance < spec.lower {
                violations.push(Violation {
                    name: format!("{} lower bound", spec.name),
                    lhs: value,
                    relation: Relation::Ge,
                    rhs: spec.lower,
                });
            }
            if let Some(upper) = spec.upper {
                if value > upper + tolerance {
                    violations.push(Violation {
                        name: format!("{} upper bound", spec.name),
                        lhs: value,
                        relation: Relation::Le,
                        rhs: upper,
                    });
                }
            }
        }
        for constraint in &self.constraints {
            let lhs = constraint.expr.evaluate(|var| assignment[var.0]);
            if !constraint.relation.holds(lhs, constraint.rhs, tolerance) {
                violations.push(Violation {
                    name: constraint.name.clone(),
                    lhs,
                    relation: constraint.relation,
                    rhs: constraint.rhs,
                });
            }
        }
        violations
    }
}

impl ModelBuilder for LinearProgram {
    fn add_variable(&mut self, spec: VariableSpec) -> VarId {
        self.variables.push(spec);
        VarId(self.variables.len() - 1)
    }

    fn add_constraint(&mut self, expr: LinearExpr, relation: Relation, rhs: f64, name: &str) {
        self.constraints.push(LinearConstraint {
            name: name.to_string(),
            expr,
            relation,
            rhs,
        });
    }

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.objective = expr;
        self.sense = sense;
    }
}

/// Solves a recorded [LinearProgram] with `good_lp`'s pure-Rust `microlp`
/// solver.
#[derive(Debug, Clone, Default)]
pub struct GoodLpBackend {
    program: LinearProgram,
    values: Option<Vec<f64>>,
    detail: Option<String>,
}

impl GoodLpBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelBuilder for GoodLpBackend {
    fn add_variable(&mut self, spec: VariableSpec) -> VarId {
        self.program.add_variable(spec)
    }

    fn add_constraint(&mut self, expr: LinearExpr, relation: Relation, rhs: f64, name: &str) {
        self.program.add_constraint(expr, relation, rhs, name);
    }

    fn set_objective(&mut self, expr: LinearExpr, sense: Sense) {
        self.program.set_objective(expr, sense);
    }
}

impl LpBackend for GoodLpBackend {
    fn optimize(&mut self) -> SolveStatus {
        self.values = None;
        self.detail = None;

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = self
            .program
            .variables
            .iter()
            .map(|spec| {
                let mut definition = variable().min(spec.lower).name(spec.name.clone());
                if let Some(upper) = spec.upper {
                    definition = definition.max(upper);
                }
                if spec.integer {
                    definition = definition.integer();
                }
                vars.add(definition)
            })
            .collect();

        let objective = to_expression(&self.program.objective, &handles);
        let unsolved = match self.program.sense {
            Sense::Minimize => vars.minimise(objective),
            Sense::Maximize => vars.maximise(objective),
        };
        let mut problem = unsolved.using(microlp);
        for c in &self.program.constraints {
            let lhs = to_expression(&c.expr, &handles);
            let built = match c.relation {
                Relation::Eq => constraint::eq(lhs, c.rhs),
                Relation::Le => constraint::leq(lhs, c.rhs),
                Relation::Ge => constraint::geq(lhs, c.rhs),
            };
            problem.add_constraint(built);
        }

        match problem.solve() {
            Ok(solution) => {
                self.values = Some(handles.iter().map(|&var| solution.value(var)).collect());
                SolveStatus::Optimal
            }
            Err(ResolutionError::Infeasible) => SolveStatus::Infeasible,
            Err(ResolutionError::Unbounded) => SolveStatus::Unbounded,
            Err(err) => {
                self.detail = Some(err.to_string());
                SolveStatus::Error
            }
        }
    }

    fn value_of(&self, var: VarId) -> Option<f64> {
        self.values.as_ref().and_then(|values| values.get(var.0).copied())
    }

    fn detail(&self) -> Option<String> {
        self.detail.clone()
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(var, coefficient) in &expr.terms {
        out += coefficient * handles[var.0];
    }
    out
}
