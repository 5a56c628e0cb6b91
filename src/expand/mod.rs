//! Combinatorial Expander
//!
//! Turns each skeleton marker into the ordered sequence of instantiations the
//! generated type needs: one per alternative on the `single` axis, one per
//! visitor arity on the `paired` axis. Within a paired instantiation,
//! `${for sel}` walks the selection cross product in a fixed order.
//!
//! Fragments are checked against their axis before anything is rendered, so
//! a malformed skeleton fails without producing partial output. Every
//! fragment must use its axis variable, and the instantiations of one marker
//! must be pairwise distinct: two equal non-empty renderings would be a
//! duplicate construct in the artifact.

pub mod axis;

use crate::error::GeneratorError;
use crate::params::GenerationParameters;
use crate::skeleton::fragment::{BinOp, Expr, RepeatOver, RepeatedTemplate, TemplateElement};
use crate::skeleton::{ExpansionMarker, Skeleton};
use axis::{selection_count, selections, AxisIndex, AxisKind};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Default upper bound on the loop iterations spent expanding one marker.
pub const DEFAULT_MAX_INSTANTIATIONS: usize = 1 << 20;

/// One concrete rendering of a marker's fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    pub marker: String,
    pub index: AxisIndex,
    pub text: String,
}

/// Instantiation sequences keyed by marker name, plus the parameters they
/// were expanded for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    params: GenerationParameters,
    groups: BTreeMap<String, Vec<Instantiation>>,
}

impl Expansion {
    pub fn new(params: GenerationParameters) -> Self {
        Self {
            params,
            groups: BTreeMap::new(),
        }
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    pub fn insert(&mut self, marker: impl Into<String>, instantiations: Vec<Instantiation>) {
        self.groups.insert(marker.into(), instantiations);
    }

    pub fn get(&self, marker: &str) -> Option<&[Instantiation]> {
        self.groups.get(marker).map(Vec::as_slice)
    }

    /// Per-marker instantiation counts, sorted by marker name.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.groups
            .iter()
            .map(|(name, insts)| (name.clone(), insts.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Expands markers for one set of resolved parameters.
#[derive(Debug, Clone)]
pub struct Expander {
    params: GenerationParameters,
    max_instantiations: usize,
}

impl Expander {
    pub fn new(params: GenerationParameters) -> Self {
        Self {
            params,
            max_instantiations: DEFAULT_MAX_INSTANTIATIONS,
        }
    }

    /// Bound the total loop iterations, nested loops and `${for sel}`
    /// included, spent on any one marker.
    pub fn with_max_instantiations(mut self, max: usize) -> Self {
        self.max_instantiations = max;
        self
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.params
    }

    /// Expand every marker of the skeleton, in declaration order.
    pub fn expand_all(&self, skeleton: &Skeleton) -> Result<Expansion, GeneratorError> {
        let mut expansion = Expansion::new(self.params);
        for marker in skeleton.markers() {
            let instantiations = self.expand_marker(marker)?;
            expansion.insert(marker.name.clone(), instantiations);
        }
        Ok(expansion)
    }

    /// Expand one marker into its ordered instantiations.
    pub fn expand_marker(
        &self,
        marker: &ExpansionMarker,
    ) -> Result<Vec<Instantiation>, GeneratorError> {
        let kind = AxisKind::parse(&marker.name, &marker.axis)?;
        check_scope(&marker.template.elements, kind, &mut Vec::new(), false)
            .map_err(|reason| GeneratorError::marker(&marker.name, reason))?;
        if !mentions_axis(&marker.template.elements, kind) {
            return Err(GeneratorError::marker(
                &marker.name,
                format!(
                    "fragment never uses '{}', so every {} instantiation would be identical",
                    kind.variable(),
                    kind
                ),
            ));
        }

        let values = kind.values(&self.params);
        let mut instantiations = Vec::with_capacity(values.len());
        let mut spent = 0usize;
        for value in values {
            let index = AxisIndex::new(kind, value);
            let mut env = Env::new(&self.params, kind, value, spent);
            let mut text = String::new();
            self.render_elements(&marker.template.elements, &mut env, &mut text)
                .map_err(|reason| {
                    GeneratorError::marker(&marker.name, format!("{} (at {})", reason, index))
                })?;
            spent = env.iterations;
            instantiations.push(Instantiation {
                marker: marker.name.clone(),
                index,
                text,
            });
        }
        check_distinct(&instantiations)
            .map_err(|reason| GeneratorError::marker(&marker.name, reason))?;

        debug!(
            marker = %marker.name,
            axis = %kind,
            instantiations = instantiations.len(),
            "Marker expanded"
        );
        Ok(instantiations)
    }

    fn render_elements(
        &self,
        elements: &[TemplateElement],
        env: &mut Env,
        out: &mut String,
    ) -> Result<(), String> {
        for element in elements {
            match element {
                TemplateElement::Text(text) => out.push_str(text),
                TemplateElement::Subst(expr) => {
                    let value = env.eval(expr)?;
                    if value < 0 {
                        return Err(format!(
                            "interpolated value {} is below the axis bound",
                            value
                        ));
                    }
                    out.push_str(&value.to_string());
                }
                TemplateElement::Repeat(repeat) => self.render_repeat(repeat, env, out)?,
                TemplateElement::Conditional(cond) => {
                    if env.eval(&cond.condition)? != 0 {
                        self.render_elements(&cond.template.elements, env, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn render_repeat(
        &self,
        repeat: &RepeatedTemplate,
        env: &mut Env,
        out: &mut String,
    ) -> Result<(), String> {
        match &repeat.over {
            RepeatOver::Range {
                var,
                start,
                end,
                inclusive,
            } => {
                let start = env.eval(start)?;
                let end = env.eval(end)?;
                if start < 0 || end < 0 {
                    return Err(format!(
                        "range {}..{} for '{}' reaches below the axis bound",
                        start, end, var
                    ));
                }
                let end = if *inclusive { end.saturating_add(1) } else { end };
                let len = (end - start).max(0) as usize;
                self.charge(env, len).map_err(|spent| {
                    format!(
                        "loop over '{}' would bring the marker to {} iterations (limit {})",
                        var, spent, self.max_instantiations
                    )
                })?;
                for (i, value) in (start..end).enumerate() {
                    if i > 0 {
                        out.push_str(&repeat.separator);
                    }
                    env.locals.push((var.clone(), value));
                    let result = self.render_elements(&repeat.template.elements, env, out);
                    env.locals.pop();
                    result?;
                }
            }
            RepeatOver::Selections => {
                let type_count = self.params.type_count();
                let arity = env.arity;
                let exceeded = || {
                    format!(
                        "selection cross product {}^{} exceeds the marker's limit of {} iterations",
                        type_count, arity, self.max_instantiations
                    )
                };
                let count = selection_count(type_count, arity).ok_or_else(exceeded)?;
                self.charge(env, count).map_err(|_| exceeded())?;
                for (ord, selection) in selections(type_count, arity).enumerate() {
                    if ord > 0 {
                        out.push_str(&repeat.separator);
                    }
                    env.selection = Some(selection);
                    env.locals.push(("ord".to_string(), ord as i64));
                    let result = self.render_elements(&repeat.template.elements, env, out);
                    env.locals.pop();
                    env.selection = None;
                    result?;
                }
            }
        }
        Ok(())
    }

    /// Charge `iterations` to the marker's running total before a loop runs.
    /// On overflow of the budget, returns the total the loop would reach.
    fn charge(&self, env: &mut Env, iterations: usize) -> Result<(), usize> {
        let total = env.iterations.saturating_add(iterations);
        if total > self.max_instantiations {
            return Err(total);
        }
        env.iterations = total;
        Ok(())
    }
}

/// Bindings visible while rendering one instantiation.
struct Env {
    locals: Vec<(String, i64)>,
    arity: usize,
    selection: Option<Vec<usize>>,
    /// Loop iterations spent on the marker so far, across instantiations.
    iterations: usize,
}

impl Env {
    fn new(params: &GenerationParameters, kind: AxisKind, value: usize, iterations: usize) -> Self {
        let locals = vec![
            ("N".to_string(), params.type_count() as i64),
            ("M".to_string(), params.visitor_arity() as i64),
            (kind.variable().to_string(), value as i64),
        ];
        let arity = match kind {
            AxisKind::Paired => value,
            AxisKind::Single => 0,
        };
        Self {
            locals,
            arity,
            selection: None,
            iterations,
        }
    }

    fn lookup(&self, name: &str) -> Result<i64, String> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .ok_or_else(|| format!("variable '{}' is not bound", name))
    }

    fn eval(&self, expr: &Expr) -> Result<i64, String> {
        match expr {
            Expr::Int(value) => Ok(*value),
            Expr::Var(name) => self.lookup(name),
            Expr::Selected(position) => {
                let position = self.eval(position)?;
                let selection = self
                    .selection
                    .as_ref()
                    .ok_or_else(|| "'s[..]' used outside '${for sel}'".to_string())?;
                if position < 1 || position as usize > selection.len() {
                    return Err(format!(
                        "s[{}] is outside argument positions 1..={}",
                        position,
                        selection.len()
                    ));
                }
                Ok(selection[position as usize - 1] as i64)
            }
            Expr::Binary(lhs, op, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                let value = match op {
                    BinOp::Add => lhs.checked_add(rhs),
                    BinOp::Sub => lhs.checked_sub(rhs),
                    BinOp::Mul => lhs.checked_mul(rhs),
                    BinOp::Eq => Some((lhs == rhs) as i64),
                    BinOp::Ne => Some((lhs != rhs) as i64),
                    BinOp::Lt => Some((lhs < rhs) as i64),
                    BinOp::Le => Some((lhs <= rhs) as i64),
                    BinOp::Gt => Some((lhs > rhs) as i64),
                    BinOp::Ge => Some((lhs >= rhs) as i64),
                };
                value.ok_or_else(|| "arithmetic overflow in interpolation".to_string())
            }
        }
    }
}

/// Whether the fragment depends on its axis value anywhere: an interpolation,
/// a loop bound, a condition, or (paired) a `${for sel}` block.
fn mentions_axis(elements: &[TemplateElement], kind: AxisKind) -> bool {
    fn in_expr(expr: &Expr, var: &str) -> bool {
        match expr {
            Expr::Int(_) => false,
            Expr::Var(name) => name == var,
            Expr::Selected(position) => in_expr(position, var),
            Expr::Binary(lhs, _, rhs) => in_expr(lhs, var) || in_expr(rhs, var),
        }
    }

    let var = kind.variable();
    elements.iter().any(|element| match element {
        TemplateElement::Text(_) => false,
        TemplateElement::Subst(expr) => in_expr(expr, var),
        TemplateElement::Conditional(cond) => {
            in_expr(&cond.condition, var) || mentions_axis(&cond.template.elements, kind)
        }
        TemplateElement::Repeat(repeat) => {
            let head = match &repeat.over {
                RepeatOver::Range { start, end, .. } => in_expr(start, var) || in_expr(end, var),
                RepeatOver::Selections => kind == AxisKind::Paired,
            };
            head || mentions_axis(&repeat.template.elements, kind)
        }
    })
}

/// Reject two instantiations of one marker rendering the same non-empty text.
fn check_distinct(instantiations: &[Instantiation]) -> Result<(), String> {
    let mut seen: HashMap<&str, AxisIndex> = HashMap::new();
    for inst in instantiations {
        if inst.text.is_empty() {
            continue;
        }
        if let Some(first) = seen.insert(inst.text.as_str(), inst.index) {
            return Err(format!(
                "instantiations at {} and {} render identical text {:?}",
                first,
                inst.index,
                inst.text.trim_end()
            ));
        }
    }
    Ok(())
}

/// Verify every name a fragment uses is bound on its axis.
fn check_scope(
    elements: &[TemplateElement],
    kind: AxisKind,
    locals: &mut Vec<String>,
    in_selection: bool,
) -> Result<(), String> {
    for element in elements {
        match element {
            TemplateElement::Text(_) => {}
            TemplateElement::Subst(expr) => check_expr(expr, kind, locals, in_selection)?,
            TemplateElement::Conditional(cond) => {
                check_expr(&cond.condition, kind, locals, in_selection)?;
                check_scope(&cond.template.elements, kind, locals, in_selection)?;
            }
            TemplateElement::Repeat(repeat) => match &repeat.over {
                RepeatOver::Range { var, start, end, .. } => {
                    check_expr(start, kind, locals, in_selection)?;
                    check_expr(end, kind, locals, in_selection)?;
                    if locals.contains(var) {
                        return Err(format!("loop variable '{}' shadows an outer loop", var));
                    }
                    locals.push(var.clone());
                    let result = check_scope(&repeat.template.elements, kind, locals, in_selection);
                    locals.pop();
                    result?;
                }
                RepeatOver::Selections => {
                    if kind != AxisKind::Paired {
                        return Err(format!(
                            "'${{for sel}}' needs the paired axis, marker is {}",
                            kind
                        ));
                    }
                    if in_selection {
                        return Err("'${for sel}' cannot be nested".to_string());
                    }
                    check_scope(&repeat.template.elements, kind, locals, true)?;
                }
            },
        }
    }
    Ok(())
}

fn check_expr(
    expr: &Expr,
    kind: AxisKind,
    locals: &[String],
    in_selection: bool,
) -> Result<(), String> {
    match expr {
        Expr::Int(_) => Ok(()),
        Expr::Var(name) => match name.as_str() {
            "N" | "M" => Ok(()),
            "ord" if in_selection => Ok(()),
            "k" | "a" if name == kind.variable() => Ok(()),
            "k" | "a" => Err(format!("'{}' is not bound on the {} axis", name, kind)),
            _ if locals.iter().any(|l| l == name) => Ok(()),
            _ => Err(format!("unknown variable '{}'", name)),
        },
        Expr::Selected(position) => {
            if !in_selection {
                return Err("'s[..]' used outside '${for sel}'".to_string());
            }
            check_expr(position, kind, locals, in_selection)
        }
        Expr::Binary(lhs, _, rhs) => {
            check_expr(lhs, kind, locals, in_selection)?;
            check_expr(rhs, kind, locals, in_selection)
        }
    }
}
