//! SAT-based CP solver implementation.
//!
//! Integer variables use order encoding (`order_vars[i]` means `x <= lb +
//! i`). Linear constraints over variables with a `{0,1}` domain and unit
//! coefficients are compiled to a sequential-counter cardinality network
//! (Sinz 2005); anything with a wider-domain variable in it falls back to
//! enumerating that variable's small domain and posting a cardinality
//! constraint per combination, or, if even that is too large, to bound
//! propagation. A constraint can be reified on a conjunction of boolean
//! conditions: every clause the base encoding would emit gets each
//! condition's negation appended, so "cond => constraint" holds without the
//! solver natively supporting half-reification.

use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// Status of a CP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpStatus {
    /// A provably optimal solution was found.
    Optimal,
    /// A feasible solution was found but the time budget ran out before
    /// optimality could be proven.
    Feasible,
    /// The model has no solution.
    Infeasible,
    /// The solver did not reach a verdict (e.g. no feasible point was found
    /// before the time budget expired).
    Unknown,
}

impl CpStatus {
    /// Whether this status carries variable values worth reading.
    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

/// Handle to an integer variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntVarId(usize);

/// A boolean condition used to reify a linear constraint: either "this
/// model variable equals 1/0" or a raw SAT literal introduced internally
/// while enumerating a reified constraint's non-boolean terms.
#[derive(Debug, Clone, Copy)]
pub enum BoolRef {
    /// "`var` equals 1" if `positive`, "`var` equals 0" otherwise. `var`
    /// must have domain `[0, 1]`.
    Var { var: IntVarId, positive: bool },
    /// A literal with no corresponding [`IntVarId`] (see
    /// [`CpModel::eq_condition`]).
    Raw(Lit),
}

impl BoolRef {
    /// The negation of this condition.
    pub fn negated(self) -> BoolRef {
        match self {
            BoolRef::Var { var, positive } => BoolRef::Var {
                var,
                positive: !positive,
            },
            BoolRef::Raw(lit) => BoolRef::Raw(!lit),
        }
    }
}

#[derive(Debug)]
struct IntVar {
    #[allow(dead_code)]
    name: String,
    lb: i64,
    ub: i64,
    /// order_vars[i] means "x <= lb + i"; a `{0,1}` variable has exactly one.
    order_vars: Vec<Var>,
}

impl IntVar {
    fn is_bool(&self) -> bool {
        self.lb == 0 && self.ub == 1
    }
}

enum LinearOp {
    Le,
    Ge,
    Eq,
}

struct LinearConstraint {
    op: LinearOp,
    vars: Vec<IntVarId>,
    coeffs: Vec<i64>,
    rhs: i64,
    cond: Vec<BoolRef>,
}

struct Objective {
    terms: Vec<(IntVarId, i64)>,
    minimize: bool,
}

/// Progress update emitted while [`CpModel::solve`] improves on its
/// objective during binary search.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    /// The best objective value found so far.
    pub objective_value: i64,
    /// Wall-clock time since the solve started.
    pub wall_time: Duration,
}

/// Options controlling a [`CpModel::solve`] call.
pub struct SolveOptions {
    /// Wall-clock budget for the whole solve. Optimization solves stop
    /// binary search and return the best solution found so far once this
    /// elapses; a plain satisfaction solve returns [`CpStatus::Unknown`] if
    /// the single SAT call does not finish in time.
    pub time_limit: Duration,
    /// Channel to report intermediate objective improvements on, for
    /// optimization solves. Ignored for pure satisfaction models.
    pub progress: Option<Sender<ProgressEvent>>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(5),
            progress: None,
        }
    }
}

/// Solution from a [`CpModel::solve`] call.
pub struct CpSolution {
    /// Solve status.
    pub status: CpStatus,
    /// Objective value, for optimization models that reached a solution.
    pub objective_value: Option<i64>,
    values: HashMap<IntVarId, i64>,
    /// Wall-clock solve time.
    pub wall_time: Duration,
}

impl CpSolution {
    /// Value assigned to `var`. Zero if the model was infeasible/unknown.
    pub fn value(&self, var: IntVarId) -> i64 {
        self.values.get(&var).copied().unwrap_or(0)
    }
}

/// A model of integer variables, linear constraints and an optional linear
/// objective, compiled to CNF and solved with [`varisat`].
pub struct CpModel {
    vars: Vec<IntVar>,
    constraints: Vec<LinearConstraint>,
    objective: Option<Objective>,
    next_var: Var,
}

impl Default for CpModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CpModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self {
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
            next_var: Var::from_index(0),
        }
    }

    fn alloc_var(next_var: &mut Var) -> Var {
        let v = *next_var;
        *next_var = Var::from_index(v.index() + 1);
        v
    }

    /// Add an integer variable with domain `[lb, ub]`.
    pub fn new_int_var(&mut self, lb: i64, ub: i64, name: &str) -> IntVarId {
        assert!(lb <= ub, "invalid domain for `{name}`: {lb} > {ub}");
        let num_order_vars = (ub - lb) as usize;
        let order_vars = (0..num_order_vars)
            .map(|_| Self::alloc_var(&mut self.next_var))
            .collect();

        let id = IntVarId(self.vars.len());
        self.vars.push(IntVar {
            name: name.to_string(),
            lb,
            ub,
            order_vars,
        });
        id
    }

    /// Add a boolean variable (an integer variable with domain `[0, 1]`).
    pub fn new_bool_var(&mut self, name: &str) -> IntVarId {
        self.new_int_var(0, 1, name)
    }

    /// The condition "`var` is true" (`var == 1`). `var` must have domain
    /// `[0, 1]`.
    pub fn bool_lit(&self, var: IntVarId) -> BoolRef {
        assert!(self.vars[var.0].is_bool(), "bool_lit on a non-bool var");
        BoolRef::Var {
            var,
            positive: true,
        }
    }

    /// Constrain a boolean variable to a fixed value.
    pub fn fix_bool(&mut self, var: IntVarId, value: bool) {
        self.add_linear_eq(&[var], &[1], value as i64);
    }

    /// `sum(coeffs[i] * vars[i]) <= rhs`.
    pub fn add_linear_le(&mut self, vars: &[IntVarId], coeffs: &[i64], rhs: i64) {
        self.add_linear(LinearOp::Le, vars, coeffs, rhs, &[]);
    }

    /// `sum(coeffs[i] * vars[i]) >= rhs`.
    pub fn add_linear_ge(&mut self, vars: &[IntVarId], coeffs: &[i64], rhs: i64) {
        self.add_linear(LinearOp::Ge, vars, coeffs, rhs, &[]);
    }

    /// `sum(coeffs[i] * vars[i]) == rhs`.
    pub fn add_linear_eq(&mut self, vars: &[IntVarId], coeffs: &[i64], rhs: i64) {
        self.add_linear(LinearOp::Eq, vars, coeffs, rhs, &[]);
    }

    /// `cond => sum(coeffs[i] * vars[i]) <= rhs`, where `cond` is the
    /// conjunction of the given conditions.
    pub fn add_linear_le_reified(
        &mut self,
        cond: &[BoolRef],
        vars: &[IntVarId],
        coeffs: &[i64],
        rhs: i64,
    ) {
        self.add_linear(LinearOp::Le, vars, coeffs, rhs, cond);
    }

    /// `cond => sum(coeffs[i] * vars[i]) >= rhs`, where `cond` is the
    /// conjunction of the given conditions.
    pub fn add_linear_ge_reified(
        &mut self,
        cond: &[BoolRef],
        vars: &[IntVarId],
        coeffs: &[i64],
        rhs: i64,
    ) {
        self.add_linear(LinearOp::Ge, vars, coeffs, rhs, cond);
    }

    fn add_linear(
        &mut self,
        op: LinearOp,
        vars: &[IntVarId],
        coeffs: &[i64],
        rhs: i64,
        cond: &[BoolRef],
    ) {
        assert_eq!(vars.len(), coeffs.len());
        self.constraints.push(LinearConstraint {
            op,
            vars: vars.to_vec(),
            coeffs: coeffs.to_vec(),
            rhs,
            cond: cond.to_vec(),
        });
    }

    /// Set the objective to `minimize sum(coeff * var)`.
    pub fn minimize(&mut self, terms: &[(IntVarId, i64)]) {
        self.objective = Some(Objective {
            terms: terms.to_vec(),
            minimize: true,
        });
    }

    /// Set the objective to `maximize sum(coeff * var)`.
    pub fn maximize(&mut self, terms: &[(IntVarId, i64)]) {
        self.objective = Some(Objective {
            terms: terms.to_vec(),
            minimize: false,
        });
    }

    /// Build the base CNF formula (monotonicity + constraints, no objective
    /// bound). `alloc` is the shared fresh-variable counter for this
    /// formula: callers that go on to encode an objective bound into the
    /// same formula must keep threading it through rather than reseeding
    /// from `self.next_var`, or the two encoding passes hand out colliding
    /// auxiliary `Var` ids.
    fn build_base_formula(&self, alloc: &mut Var) -> CnfFormula {
        let mut formula = CnfFormula::new();

        for var in &self.vars {
            for i in 0..var.order_vars.len().saturating_sub(1) {
                formula.add_clause(&[
                    Lit::from_var(var.order_vars[i], false),
                    Lit::from_var(var.order_vars[i + 1], true),
                ]);
            }
        }

        for constraint in &self.constraints {
            self.encode_linear(&mut formula, alloc, constraint);
        }

        formula
    }

    /// Solve the model within the given options.
    pub fn solve(&self, options: &SolveOptions) -> CpSolution {
        let start = Instant::now();
        if let Some(obj) = &self.objective {
            self.solve_optimization(obj, start, options)
        } else {
            let mut alloc = self.next_var;
            let formula = self.build_base_formula(&mut alloc);
            self.solve_satisfaction(formula, start, options.time_limit)
        }
    }

    fn solve_satisfaction(
        &self,
        formula: CnfFormula,
        start: Instant,
        time_limit: Duration,
    ) -> CpSolution {
        let remaining = time_limit.saturating_sub(start.elapsed());
        let outcome = run_with_deadline(
            move || {
                let mut solver = Solver::new();
                solver.add_formula(&formula);
                let sat = solver.solve();
                (sat.ok(), solver.model().as_deref().map(owned_model))
            },
            remaining,
        );

        match outcome {
            Some((Some(true), Some(model))) => CpSolution {
                status: CpStatus::Optimal,
                objective_value: None,
                values: self.extract_values(&model),
                wall_time: start.elapsed(),
            },
            Some((Some(false), _)) => CpSolution {
                status: CpStatus::Infeasible,
                objective_value: None,
                values: HashMap::new(),
                wall_time: start.elapsed(),
            },
            _ => CpSolution {
                status: CpStatus::Unknown,
                objective_value: None,
                values: HashMap::new(),
                wall_time: start.elapsed(),
            },
        }
    }

    fn solve_optimization(
        &self,
        obj: &Objective,
        start: Instant,
        options: &SolveOptions,
    ) -> CpSolution {
        let (mut lo, mut hi) = self.objective_bounds(obj);
        let mut best_values: Option<HashMap<IntVarId, i64>> = None;
        let mut best_obj: Option<i64> = None;
        let mut timed_out_without_proof = false;

        while lo <= hi {
            if start.elapsed() >= options.time_limit {
                timed_out_without_proof = true;
                break;
            }

            let mid = if obj.minimize {
                lo + (hi - lo) / 2
            } else {
                hi - (hi - lo) / 2
            };

            let mut alloc = self.next_var;
            let mut formula = self.build_base_formula(&mut alloc);
            self.encode_objective_bound(&mut formula, obj, mid, &mut alloc);

            let remaining = options.time_limit.saturating_sub(start.elapsed());
            let outcome = run_with_deadline(
                move || {
                    let mut solver = Solver::new();
                    solver.add_formula(&formula);
                    let sat = solver.solve();
                    (sat.ok(), solver.model().as_deref().map(owned_model))
                },
                remaining,
            );

            match outcome {
                Some((Some(true), Some(model))) => {
                    let values = self.extract_values(&model);
                    let actual = self.objective_value(&values, obj);
                    if let Some(tx) = &options.progress {
                        let _ = tx.send(ProgressEvent {
                            objective_value: actual,
                            wall_time: start.elapsed(),
                        });
                    }
                    best_obj = Some(actual);
                    if obj.minimize {
                        hi = actual - 1;
                    } else {
                        lo = actual + 1;
                    }
                    best_values = Some(values);
                }
                Some((Some(false), _)) => {
                    if obj.minimize {
                        lo = mid + 1;
                    } else {
                        hi = mid - 1;
                    }
                }
                _ => {
                    timed_out_without_proof = true;
                    break;
                }
            }
        }

        match best_values {
            Some(values) => CpSolution {
                status: if timed_out_without_proof {
                    CpStatus::Feasible
                } else {
                    CpStatus::Optimal
                },
                objective_value: best_obj,
                values,
                wall_time: start.elapsed(),
            },
            None => CpSolution {
                status: if timed_out_without_proof {
                    CpStatus::Unknown
                } else {
                    CpStatus::Infeasible
                },
                objective_value: None,
                values: HashMap::new(),
                wall_time: start.elapsed(),
            },
        }
    }

    fn objective_bounds(&self, obj: &Objective) -> (i64, i64) {
        let mut lb = 0i64;
        let mut ub = 0i64;
        for (var_id, coeff) in &obj.terms {
            let var = &self.vars[var_id.0];
            if *coeff >= 0 {
                lb += coeff * var.lb;
                ub += coeff * var.ub;
            } else {
                lb += coeff * var.ub;
                ub += coeff * var.lb;
            }
        }
        (lb, ub)
    }

    fn objective_value(&self, values: &HashMap<IntVarId, i64>, obj: &Objective) -> i64 {
        obj.terms
            .iter()
            .map(|(var_id, coeff)| coeff * values.get(var_id).copied().unwrap_or(0))
            .sum()
    }

    fn encode_objective_bound(
        &self,
        formula: &mut CnfFormula,
        obj: &Objective,
        bound: i64,
        alloc: &mut Var,
    ) {
        let (vars, coeffs): (Vec<_>, Vec<_>) = obj.terms.iter().copied().unzip();
        let constraint = LinearConstraint {
            op: if obj.minimize {
                LinearOp::Le
            } else {
                LinearOp::Ge
            },
            vars,
            coeffs,
            rhs: bound,
            cond: Vec::new(),
        };
        self.encode_linear(formula, alloc, &constraint);
    }

    fn encode_linear(&self, formula: &mut CnfFormula, alloc: &mut Var, c: &LinearConstraint) {
        match c.op {
            LinearOp::Le => self.encode_linear_le(formula, alloc, &c.vars, &c.coeffs, c.rhs, &c.cond),
            LinearOp::Ge => {
                let neg: Vec<i64> = c.coeffs.iter().map(|x| -x).collect();
                self.encode_linear_le(formula, alloc, &c.vars, &neg, -c.rhs, &c.cond);
            }
            LinearOp::Eq => {
                self.encode_linear_le(formula, alloc, &c.vars, &c.coeffs, c.rhs, &c.cond);
                let neg: Vec<i64> = c.coeffs.iter().map(|x| -x).collect();
                self.encode_linear_le(formula, alloc, &c.vars, &neg, -c.rhs, &c.cond);
            }
        }
    }

    fn resolve_lit(&self, b: BoolRef) -> Lit {
        match b {
            BoolRef::Var { var, positive } => Lit::from_var(self.vars[var.0].order_vars[0], positive),
            BoolRef::Raw(lit) => lit,
        }
    }

    /// `sum(coeffs[i] * vars[i]) <= rhs`, reified on `cond`.
    ///
    /// Splits `vars` into `{0,1}`-domain terms with unit coefficients
    /// (compiled to a cardinality network) and everything else (small
    /// wider-domain variables, enumerated and folded into the cardinality
    /// bound per combination).
    fn encode_linear_le(
        &self,
        formula: &mut CnfFormula,
        alloc: &mut Var,
        vars: &[IntVarId],
        coeffs: &[i64],
        rhs: i64,
        cond: &[BoolRef],
    ) {
        let mut bool_terms = Vec::new();
        let mut other_terms = Vec::new();
        for (var_id, coeff) in vars.iter().zip(coeffs) {
            let var = &self.vars[var_id.0];
            if var.is_bool() && coeff.abs() == 1 {
                bool_terms.push((*var_id, *coeff));
            } else {
                other_terms.push((*var_id, *coeff));
            }
        }

        if other_terms.is_empty() {
            self.encode_bool_cardinality_le(formula, alloc, &bool_terms, rhs, cond);
            return;
        }

        let total_combinations: u64 = other_terms
            .iter()
            .map(|(v, _)| (self.vars[v.0].ub - self.vars[v.0].lb + 1) as u64)
            .product();

        if total_combinations == 0 || total_combinations > 10_000 {
            // Too many combinations to enumerate; fall back to the weaker
            // bound-propagation path, dropping reification (best effort).
            self.encode_linear_le_bounds(formula, vars, coeffs, rhs);
            return;
        }

        let mut indices: Vec<i64> = other_terms.iter().map(|(v, _)| self.vars[v.0].lb).collect();
        loop {
            let contributed: i64 = indices
                .iter()
                .zip(&other_terms)
                .map(|(val, (_, coeff))| val * coeff)
                .sum();

            let mut combo_cond = cond.to_vec();
            for (val, (var_id, _)) in indices.iter().zip(&other_terms) {
                combo_cond.push(self.eq_condition(*var_id, *val, formula, alloc));
            }
            self.encode_bool_cardinality_le(formula, alloc, &bool_terms, rhs - contributed, &combo_cond);

            let mut i = indices.len();
            loop {
                if i == 0 {
                    return;
                }
                i -= 1;
                let (var_id, _) = other_terms[i];
                indices[i] += 1;
                if indices[i] <= self.vars[var_id.0].ub {
                    break;
                }
                indices[i] = self.vars[var_id.0].lb;
            }
        }
    }

    /// Produce a [`BoolRef`]-shaped condition for "`var == value`" by
    /// introducing a fresh boolean tied to the two order-encoding literals
    /// that pin the variable down. This is only used inside the
    /// reified-enumeration path, so the auxiliary variable never needs to
    /// appear in an extracted solution.
    fn eq_condition(
        &self,
        var_id: IntVarId,
        value: i64,
        formula: &mut CnfFormula,
        alloc: &mut Var,
    ) -> BoolRef {
        let var = &self.vars[var_id.0];
        let le_lit = if value < var.ub {
            Some(Lit::from_var(var.order_vars[(value - var.lb) as usize], true))
        } else {
            None
        };
        let gt_prev_lit = if value > var.lb {
            Some(Lit::from_var(
                var.order_vars[(value - var.lb - 1) as usize],
                false,
            ))
        } else {
            None
        };

        let aux = Self::alloc_var(alloc);
        let aux_true = Lit::from_var(aux, true);
        let aux_false = Lit::from_var(aux, false);

        // aux => (le_lit AND gt_prev_lit)
        if let Some(l) = le_lit {
            formula.add_clause(&[aux_false, l]);
        }
        if let Some(l) = gt_prev_lit {
            formula.add_clause(&[aux_false, l]);
        }
        // (le_lit AND gt_prev_lit) => aux
        let mut reverse = vec![aux_true];
        if let Some(l) = le_lit {
            reverse.push(!l);
        }
        if let Some(l) = gt_prev_lit {
            reverse.push(!l);
        }
        formula.add_clause(&reverse);

        BoolRef::Raw(aux_true)
    }

    /// `sum(bool_terms) <= rhs`, reified on `cond`, via a sequential-counter
    /// at-most-k network (Sinz 2005). Negative-coefficient terms are
    /// rewritten through `1 - x` so the network only ever sees positive
    /// literals and a shifted bound.
    fn encode_bool_cardinality_le(
        &self,
        formula: &mut CnfFormula,
        alloc: &mut Var,
        bool_terms: &[(IntVarId, i64)],
        rhs: i64,
        cond: &[BoolRef],
    ) {
        let mut lits = Vec::with_capacity(bool_terms.len());
        let mut negatives = 0i64;
        for (var_id, coeff) in bool_terms {
            let ov = self.vars[var_id.0].order_vars[0];
            if *coeff > 0 {
                lits.push(Lit::from_var(ov, true));
            } else {
                lits.push(Lit::from_var(ov, false));
                negatives += 1;
            }
        }
        let k = rhs + negatives;

        let cond_negations: Vec<Lit> = cond.iter().map(|c| !self.resolve_lit(*c)).collect();
        let mut emit = |clause: Vec<Lit>| {
            let mut full = clause;
            full.extend_from_slice(&cond_negations);
            formula.add_clause(&full);
        };

        let n = lits.len() as i64;
        if k < 0 {
            emit(Vec::new());
            return;
        }
        if k >= n {
            return;
        }
        if k == 0 {
            for l in &lits {
                emit(vec![!*l]);
            }
            return;
        }
        if k == 1 {
            for i in 0..lits.len() {
                for j in (i + 1)..lits.len() {
                    emit(vec![!lits[i], !lits[j]]);
                }
            }
            return;
        }

        let k = k as usize;
        let n = lits.len();
        let s: Vec<Vec<Var>> = (0..n).map(|_| (0..k).map(|_| Self::alloc_var(alloc)).collect()).collect();

        emit(vec![!lits[0], Lit::from_var(s[0][0], true)]);
        for j in 1..k {
            emit(vec![Lit::from_var(s[0][j], false)]);
        }
        for i in 1..n {
            emit(vec![!lits[i], Lit::from_var(s[i][0], true)]);
            emit(vec![Lit::from_var(s[i - 1][0], false), Lit::from_var(s[i][0], true)]);
            for j in 1..k {
                emit(vec![
                    !lits[i],
                    Lit::from_var(s[i - 1][j - 1], false),
                    Lit::from_var(s[i][j], true),
                ]);
                emit(vec![Lit::from_var(s[i - 1][j], false), Lit::from_var(s[i][j], true)]);
            }
            emit(vec![!lits[i], Lit::from_var(s[i - 1][k - 1], false)]);
        }
    }

    /// Weak fallback for constraints too large to enumerate: derives a
    /// single-variable bound from the others' domain extremes. Sound but
    /// incomplete, matching the bound-propagation path this replaces when a
    /// constraint's non-boolean part is too wide to enumerate.
    fn encode_linear_le_bounds(
        &self,
        formula: &mut CnfFormula,
        vars: &[IntVarId],
        coeffs: &[i64],
        rhs: i64,
    ) {
        for (i, (var_id, coeff)) in vars.iter().zip(coeffs).enumerate() {
            if *coeff == 0 {
                continue;
            }
            let var = &self.vars[var_id.0];

            let mut other_min = 0i64;
            for (j, (other_id, other_coeff)) in vars.iter().zip(coeffs).enumerate() {
                if i == j {
                    continue;
                }
                let other = &self.vars[other_id.0];
                other_min += if *other_coeff >= 0 {
                    other_coeff * other.lb
                } else {
                    other_coeff * other.ub
                };
            }

            let bound = rhs - other_min;
            if *coeff > 0 {
                let max_x = bound / coeff;
                if max_x < var.ub && max_x >= var.lb {
                    let idx = (max_x - var.lb) as usize;
                    if idx < var.order_vars.len() {
                        formula.add_clause(&[Lit::from_var(var.order_vars[idx], true)]);
                    }
                } else if max_x < var.lb {
                    formula.add_clause(&[]);
                }
            } else {
                let min_x = (bound + (-coeff) - 1) / (-coeff);
                if min_x > var.lb && min_x <= var.ub {
                    let idx = (min_x - var.lb - 1) as usize;
                    if idx < var.order_vars.len() {
                        formula.add_clause(&[Lit::from_var(var.order_vars[idx], false)]);
                    }
                } else if min_x > var.ub {
                    formula.add_clause(&[]);
                }
            }
        }
    }

    fn extract_values(&self, model: &HashMap<Var, bool>) -> HashMap<IntVarId, i64> {
        let mut values = HashMap::with_capacity(self.vars.len());
        for (i, var) in self.vars.iter().enumerate() {
            let mut value = var.ub;
            for (k, order_var) in var.order_vars.iter().enumerate() {
                if model.get(order_var).copied().unwrap_or(false) {
                    value = var.lb + k as i64;
                    break;
                }
            }
            values.insert(IntVarId(i), value);
        }
        values
    }
}

fn owned_model(lits: &[Lit]) -> HashMap<Var, bool> {
    lits.iter().map(|l| (l.var(), l.is_positive())).collect()
}

/// Run `f` on a worker thread, giving up and returning `None` if it hasn't
/// finished within `deadline`. The worker is detached, not killed, if it
/// overruns: `varisat` has no external cancellation hook, so an abandoned
/// solve keeps running until the process exits. This is the same shape of
/// compromise the engine this module replaces makes when its own
/// SIGALRM-based interrupt can't reach into an FFI call.
fn run_with_deadline<F, T>(f: F, deadline: Duration) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(deadline).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfies_simple_equality() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 10, "x");
        let y = model.new_int_var(0, 10, "y");
        model.add_linear_eq(&[x, y], &[1, 1], 10);

        let solution = model.solve(&SolveOptions::default());
        assert!(solution.status.has_solution());
        assert_eq!(solution.value(x) + solution.value(y), 10);
    }

    #[test]
    fn minimizes_objective() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 10, "x");
        let y = model.new_int_var(0, 10, "y");
        model.add_linear_eq(&[x, y], &[1, 1], 10);
        model.minimize(&[(x, 1)]);

        let solution = model.solve(&SolveOptions::default());
        assert_eq!(solution.status, CpStatus::Optimal);
        assert_eq!(solution.value(x), 0);
        assert_eq!(solution.value(y), 10);
    }

    #[test]
    fn detects_infeasibility() {
        let mut model = CpModel::new();
        let x = model.new_int_var(0, 5, "x");
        let y = model.new_int_var(0, 5, "y");
        model.add_linear_eq(&[x, y], &[1, 1], 20);

        let solution = model.solve(&SolveOptions::default());
        assert_eq!(solution.status, CpStatus::Infeasible);
    }

    #[test]
    fn at_most_one_of_many_booleans() {
        let mut model = CpModel::new();
        let bools: Vec<_> = (0..8).map(|i| model.new_bool_var(&format!("b{i}"))).collect();
        model.add_linear_le(&bools, &vec![1; bools.len()], 1);
        model.maximize(&bools.iter().map(|b| (*b, 1)).collect::<Vec<_>>());

        let solution = model.solve(&SolveOptions::default());
        assert_eq!(solution.status, CpStatus::Optimal);
        let total: i64 = bools.iter().map(|b| solution.value(*b)).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn reified_constraint_only_binds_when_condition_holds() {
        let mut model = CpModel::new();
        let cond = model.new_bool_var("cond");
        let a = model.new_bool_var("a");
        model.fix_bool(cond, false);
        let c = model.bool_lit(cond);
        model.add_linear_le_reified(&[c], &[a], &[1], 0);
        model.maximize(&[(a, 1)]);

        let solution = model.solve(&SolveOptions::default());
        assert_eq!(solution.status, CpStatus::Optimal);
        assert_eq!(solution.value(a), 1, "constraint must not bind when cond is false");
    }

    #[test]
    fn reified_constraint_binds_when_condition_holds() {
        let mut model = CpModel::new();
        let cond = model.new_bool_var("cond");
        let a = model.new_bool_var("a");
        model.fix_bool(cond, true);
        let c = model.bool_lit(cond);
        model.add_linear_le_reified(&[c], &[a], &[1], 0);
        model.maximize(&[(a, 1)]);

        let solution = model.solve(&SolveOptions::default());
        assert_eq!(solution.status, CpStatus::Optimal);
        assert_eq!(solution.value(a), 0);
    }
}
