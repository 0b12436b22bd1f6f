//! Linear formulation of the workforce recurrence.
//!
//! Each derived quantity of the dynamics engine gets its own variable so the
//! recurrence becomes a set of linear equalities. Pinning every variable to a
//! simulated trajectory must therefore satisfy the model exactly.

use crate::optimizer::backend::{LinearExpr, ModelBuilder, Relation, Sense, VarId, VariableSpec};
use crate::workforce::{Horizon, Parameters, Trajectory};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormulationOptions {
    /// Restrict training starts to whole workers.
    pub integer_trainees: bool,
}

/// Variable handles per period, in horizon order.
#[derive(Debug, Clone, PartialEq)]
pub struct Formulation {
    pub trainees: Vec<VarId>,
    pub new_experienced: Vec<VarId>,
    pub old_experienced: Vec<VarId>,
    pub experienced: Vec<VarId>,
    pub available_hours: Vec<VarId>,
    pub objective: LinearExpr,
}

impl Formulation {
    pub fn variable_count(&self) -> usize {
        self.trainees.len() * 5
    }

    /// Assignment that pins every model variable to the simulated trajectory.
    pub fn assignment_from(&self, trajectory: &Trajectory) -> Vec<f64> {
        let mut assignment = vec![0.0; self.variable_count()];
        let columns = [
            (&self.trainees, &trajectory.trainees),
            (&self.new_experienced, &trajectory.new_experienced),
            (&self.old_experienced, &trajectory.old_experienced),
            (&self.experienced, &trajectory.experienced),
            (&self.available_hours, &trajectory.available_hours),
        ];
        for (vars, values) in columns {
            for (var, &value) in vars.iter().zip(values.iter()) {
                assignment[var.0] = value;
            }
        }
        assignment
    }
}

/// Adds the training-plan model for `horizon` to `model`.
///
/// Expects an empty model: variable ids are assumed to start at zero by
/// [Formulation::assignment_from].
pub fn formulate<M: ModelBuilder>(
    model: &mut M,
    horizon: &Horizon,
    params: &Parameters,
    options: FormulationOptions,
) -> Formulation {
    let periods = horizon.len();
    let mut formulation = Formulation {
        trainees: Vec::with_capacity(periods),
        new_experienced: Vec::with_capacity(periods),
        old_experienced: Vec::with_capacity(periods),
        experienced: Vec::with_capacity(periods),
        available_hours: Vec::with_capacity(periods),
        objective: LinearExpr::new(),
    };

    for t in 0..periods {
        formulation.trainees.push(model.add_variable(
            VariableSpec::non_negative(format!("trainees[{t}]")).integer(options.integer_trainees),
        ));
        formulation
            .new_experienced
            .push(model.add_variable(VariableSpec::non_negative(format!("new_experienced[{t}]"))));
        formulation
            .old_experienced
            .push(model.add_variable(VariableSpec::non_negative(format!("old_experienced[{t}]"))));
        formulation
            .experienced
            .push(model.add_variable(VariableSpec::non_negative(format!("experienced[{t}]"))));
        formulation
            .available_hours
            .push(model.add_variable(VariableSpec::non_negative(format!("available_hours[{t}]"))));
    }

    let f = &formulation;

    model.add_constraint(
        LinearExpr::new().term(f.old_experienced[0], 1.0),
        Relation::Eq,
        params.initial_experienced,
        "init_old_experienced",
    );
    model.add_constraint(
        LinearExpr::new().term(f.new_experienced[0], 1.0),
        Relation::Eq,
        0.0,
        "init_new_experienced",
    );

    for (t, demand) in horizon.demand().enumerate() {
        model.add_constraint(
            LinearExpr::new()
                .term(f.experienced[t], 1.0)
                .term(f.old_experienced[t], -1.0)
                .term(f.new_experienced[t], -1.0),
            Relation::Eq,
            0.0,
            &format!("experienced[{t}]"),
        );
        model.add_constraint(
            LinearExpr::new()
                .term(f.available_hours[t], 1.0)
                .term(f.experienced[t], -params.hours_per_experienced)
                .term(f.trainees[t], params.hours_lost_per_trainee),
            Relation::Eq,
            0.0,
            &format!("available_hours[{t}]"),
        );
        model.add_constraint(
            LinearExpr::new().term(f.available_hours[t], 1.0),
            Relation::Ge,
            demand,
            &format!("demand[{t}]"),
        );
    }

    for t in 0..periods.saturating_sub(1) {
        model.add_constraint(
            LinearExpr::new()
                .term(f.new_experienced[t + 1], 1.0)
                .term(f.trainees[t], -1.0),
            Relation::Eq,
            0.0,
            &format!("new_experienced[{}]", t + 1),
        );
        model.add_constraint(
            LinearExpr::new()
                .term(f.old_experienced[t + 1], 1.0)
                .term(f.old_experienced[t], -params.retention())
                .term(f.new_experienced[t], -1.0),
            Relation::Eq,
            0.0,
            &format!("old_experienced[{}]", t + 1),
        );
    }

    // Training in the last period adds cost but no capacity inside the horizon.
    model.add_constraint(
        LinearExpr::new().term(f.trainees[periods - 1], 1.0),
        Relation::Eq,
        0.0,
        "no_training_final_period",
    );

    let mut objective = LinearExpr::new();
    for t in 0..periods {
        objective.add_term(f.experienced[t], params.cost_per_experienced);
        objective.add_term(f.trainees[t], params.cost_per_trainee);
    }
    model.set_objective(objective.clone(), Sense::Minimize);
    formulation.objective = objective;

    formulation
}
