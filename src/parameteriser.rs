//! Parameter sets ("hypercubes") and the wrappers the engine builds around them.
//!
//! Every parameteriser kind answers the same hypercube accessors, so they
//! are exposed once through the [`Parameteriser`] trait and each concrete
//! wrapper only adds what is specific to its kind.
use crate::error::{Result, SwiftError};
use crate::handle::{native_type, HandleKind, NativeHandle};
use crate::marshal::{self, cstring, CharacterVectorBuffer};
use crate::native::{self, SwiftApi};
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::os::raw::{c_int, c_void};
use std::path::Path;
/// One row of a hypercube: a named parameter with its bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterSpec {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}
impl ParameterSpec {
    pub fn new(name: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            value,
            min,
            max,
        }
    }
    /// Whether an optimiser has room to move this parameter.
    pub fn is_free(&self) -> bool {
        self.max - self.min > 0.0
    }
}
/// Builds rows from parallel name, value, min and max columns.
pub fn specs_from_columns<S: AsRef<str>>(
    names: &[S],
    values: &[f64],
    mins: &[f64],
    maxs: &[f64],
) -> Result<Vec<ParameterSpec>> {
    SwiftError::check_len("parameter values", names.len(), values.len())?;
    SwiftError::check_len("parameter minima", names.len(), mins.len())?;
    SwiftError::check_len("parameter maxima", names.len(), maxs.len())?;
    Ok(names
        .iter()
        .enumerate()
        .map(|(i, n)| ParameterSpec::new(n.as_ref(), values[i], mins[i], maxs[i]))
        .collect())
}
#[derive(Clone, Copy)]
enum Bound {
    Value,
    Min,
    Max,
}
fn set_bound(ptr: *mut c_void, name: &str, v: f64, which: Bound) -> Result<()> {
    let name = cstring(name)?;
    native::call(|api| {
        let f = match which {
            Bound::Value => api.set_parameter_value,
            Bound::Min => api.set_min_parameter_value,
            Bound::Max => api.set_max_parameter_value,
        };
        unsafe { f(ptr, name.as_ptr(), v) }
    })
}
fn set_bounds(ptr: *mut c_void, names: &[&str], values: &[f64], which: Bound) -> Result<()> {
    SwiftError::check_len("parameter values", names.len(), values.len())?;
    names
        .iter()
        .zip(values)
        .try_for_each(|(n, v)| set_bound(ptr, n, *v, which))
}
fn get_bound(ptr: *mut c_void, name: &str, which: Bound) -> Result<f64> {
    let name = cstring(name)?;
    native::call(|api| {
        let f = match which {
            Bound::Value => api.get_parameter_value,
            Bound::Min => api.get_parameter_min_value,
            Bound::Max => api.get_parameter_max_value,
        };
        unsafe { f(ptr, name.as_ptr()) }
    })
}
/// Hypercube accessors shared by every parameteriser kind.
pub trait Parameteriser {
    fn handle(&self) -> &NativeHandle;
    fn num_parameters(&self) -> Result<usize> {
        let ptr = self.handle().as_ptr();
        Ok(native::call(|api| unsafe { (api.get_num_parameters)(ptr) })?.max(0) as usize)
    }
    /// Names in the order the engine lists them.
    fn parameter_names(&self) -> Result<Vec<String>> {
        let ptr = self.handle().as_ptr();
        (0..self.num_parameters()? as c_int)
            .map(|i| native::call_string(|api| unsafe { (api.get_parameter_name)(ptr, i) }))
            .collect()
    }
    fn value(&self, name: &str) -> Result<f64> {
        get_bound(self.handle().as_ptr(), name, Bound::Value)
    }
    fn min_value(&self, name: &str) -> Result<f64> {
        get_bound(self.handle().as_ptr(), name, Bound::Min)
    }
    fn max_value(&self, name: &str) -> Result<f64> {
        get_bound(self.handle().as_ptr(), name, Bound::Max)
    }
    fn set_value(&self, name: &str, value: f64) -> Result<()> {
        set_bound(self.handle().as_ptr(), name, value, Bound::Value)
    }
    fn set_min_value(&self, name: &str, value: f64) -> Result<()> {
        set_bound(self.handle().as_ptr(), name, value, Bound::Min)
    }
    fn set_max_value(&self, name: &str, value: f64) -> Result<()> {
        set_bound(self.handle().as_ptr(), name, value, Bound::Max)
    }
    fn set_values(&self, names: &[&str], values: &[f64]) -> Result<()> {
        set_bounds(self.handle().as_ptr(), names, values, Bound::Value)
    }
    fn set_min_values(&self, names: &[&str], values: &[f64]) -> Result<()> {
        set_bounds(self.handle().as_ptr(), names, values, Bound::Min)
    }
    fn set_max_values(&self, names: &[&str], values: &[f64]) -> Result<()> {
        set_bounds(self.handle().as_ptr(), names, values, Bound::Max)
    }
    /// Rows as the engine holds them; values are never clamped here.
    fn as_specs(&self) -> Result<Vec<ParameterSpec>> {
        self.parameter_names()?
            .into_iter()
            .map(|name| {
                Ok(ParameterSpec {
                    value: self.value(&name)?,
                    min: self.min_value(&name)?,
                    max: self.max_value(&name)?,
                    name,
                })
            })
            .collect()
    }
    fn num_free_parameters(&self) -> Result<usize> {
        Ok(self.as_specs()?.iter().filter(|s| s.is_free()).count())
    }
    fn is_within_bounds(&self) -> Result<bool> {
        let ptr = self.handle().as_ptr();
        native::call(|api| unsafe { (api.is_within_bounds)(ptr) })
    }
    fn supports_thread_safe_cloning(&self) -> Result<bool> {
        let ptr = self.handle().as_ptr();
        native::call(|api| unsafe { (api.supports_thread_safe_cloning)(ptr) })
    }
    /// Adds parameters; each name must be new to the hypercube.
    fn add_specs(&self, specs: &[ParameterSpec]) -> Result<()> {
        let ptr = self.handle().as_ptr();
        for s in specs {
            let name = cstring(&s.name)?;
            native::call(|api| unsafe {
                (api.add_parameter_definition)(ptr, name.as_ptr(), s.min, s.max, s.value)
            })?;
        }
        Ok(())
    }
    fn add_parameter(&self, name: &str, value: f64, min: f64, max: f64) -> Result<()> {
        self.add_specs(&[ParameterSpec::new(name, value, min, max)])
    }
    /// Overwrites value and bounds of existing parameters.
    fn set_specs(&self, specs: &[ParameterSpec]) -> Result<()> {
        let ptr = self.handle().as_ptr();
        for s in specs {
            let name = cstring(&s.name)?;
            native::call(|api| unsafe {
                (api.set_parameter_definition)(ptr, name.as_ptr(), s.min, s.max, s.value)
            })?;
        }
        Ok(())
    }
    /// Engine defaults for the parameters of a runoff model.
    fn set_default_parameters(&self, model_id: &str) -> Result<()> {
        let ptr = self.handle().as_ptr();
        let model = cstring(model_id)?;
        native::call(|api| unsafe { (api.set_default_parameters)(ptr, model.as_ptr()) })
    }
    fn apply_sys_config(&self, simulation: &Simulation) -> Result<()> {
        let ptr = self.handle().as_ptr();
        native::call(|api| unsafe { (api.apply_configuration)(ptr, simulation.ptr()) })
    }
    /// Same parameters, applied only to the elements of `subcatchment`.
    fn subcatchment_parameteriser(&self, subcatchment: &Simulation) -> Result<HypercubeParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe {
            (api.create_subcatchment_hypercube_parameterizer)(ptr, subcatchment.ptr())
        })?;
        HypercubeParameteriser::from_native(out, "CreateSubcatchmentHypercubeParameterizer")
    }
    fn try_clone(&self) -> Result<HypercubeParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe { (api.clone_hypercube_parameterizer)(ptr) })?;
        HypercubeParameteriser::from_native(out, "CloneHypercubeParameterizer")
    }
    /// Point moved from `self` towards `point` by `factor`.
    fn homothetic_transform(&self, point: &dyn Parameteriser, factor: f64) -> Result<HypercubeParameteriser> {
        let (centre, point) = (self.handle().as_ptr(), point.handle().as_ptr());
        let out = native::call(|api| unsafe { (api.homothetic_transform)(centre, point, factor) })?;
        HypercubeParameteriser::from_native(out, "HomotheticTransform")
    }
    /// Wrapper on which virtual parameters such as `log_x4` can be defined.
    fn wrap_transform(&self) -> Result<TransformParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe { (api.create_transform_parameterizer)(ptr) })?;
        TransformParameteriser::from_native(out, "CreateTransformParameterizer")
    }
    /// Parameters in the untransformed space.
    fn backtransform(&self) -> Result<HypercubeParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe { (api.untransform_hypercube_parameterizer)(ptr) })?;
        HypercubeParameteriser::from_native(out, "UntransformHypercubeParameterizer")
    }
    fn make_state_init_parameteriser(&self) -> Result<StateInitParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe { (api.create_state_init_parameterizer)(ptr) })?;
        StateInitParameteriser::from_native(out, "CreateStateInitParameterizer")
    }
    /// Deep copy wrapped in a filter that can hide parameters.
    fn filtered(&self) -> Result<FilteringParameteriser> {
        let ptr = self.handle().as_ptr();
        let out = native::call(|api| unsafe { (api.create_filtering_parameterizer)(ptr) })?;
        FilteringParameteriser::from_native(out, "CreateFilteringParameterizer")
    }
    /// View of the parameters with `prefix` prepended to every name.
    fn prefixed(&self, prefix: &str) -> Result<HypercubeParameteriser> {
        let ptr = self.handle().as_ptr();
        let prefix = cstring(prefix)?;
        let out = native::call(|api| unsafe { (api.create_prefixing_parameterizer)(ptr, prefix.as_ptr()) })?;
        HypercubeParameteriser::from_native(out, "CreatePrefixingParameterizer")
    }
    fn tag(&self, tag: &str) -> Result<()> {
        let ptr = self.handle().as_ptr();
        let tag = cstring(tag)?;
        native::call(|api| unsafe { (api.tag_parameterizer)(ptr, tag.as_ptr()) })
    }
    fn save(&self, path: &Path) -> Result<()> {
        let ptr = self.handle().as_ptr();
        let path = cstring(&path.to_string_lossy())?;
        native::call(|api| unsafe { (api.save_parameterizer)(ptr, path.as_ptr()) })
    }
}
native_type!(
    /// Any parameteriser the engine can treat as a plain hypercube.
    HypercubeParameteriser,
    Hypercube,
    HandleKind::is_hypercube
);
native_type!(CompositeParameteriser, CompositeParameteriser);
native_type!(
    /// Applies one parameteriser to the model and others to objective functions.
    FunctionsParameteriser,
    FunctionsParameteriser
);
native_type!(FilteringParameteriser, FilteringParameteriser);
native_type!(TransformParameteriser, TransformParameteriser);
native_type!(
    /// Ties parameters to model states through linear relationships.
    ScalingParameteriser,
    ScalingParameteriser
);
native_type!(SubareasScalingParameteriser, SubareasScalingParameteriser);
native_type!(
    /// Sets initial model states, applied when a simulation is reset.
    StateInitParameteriser,
    StateInitParameteriser
);
native_type!(ConstraintParameteriser, ConstraintParameteriser);
macro_rules! impl_parameteriser {
    ($($name:ident),+) => {
        $(impl Parameteriser for $name {
            fn handle(&self) -> &NativeHandle {
                &self.handle
            }
        })+
    };
}
impl_parameteriser!(
    HypercubeParameteriser,
    CompositeParameteriser,
    FunctionsParameteriser,
    FilteringParameteriser,
    TransformParameteriser,
    ScalingParameteriser,
    SubareasScalingParameteriser,
    StateInitParameteriser,
    ConstraintParameteriser
);
impl HypercubeParameteriser {
    /// Empty hypercube for a strategy such as `generic subareas`, `generic links` or `no apply`.
    pub fn create(strategy: &str) -> Result<Self> {
        let strategy = cstring(strategy)?;
        let ptr = native::call(|api| unsafe { (api.create_hypercube_parameterizer)(strategy.as_ptr()) })?;
        Self::from_native(ptr, "CreateHypercubeParameterizer")
    }
    pub fn with_specs(strategy: &str, specs: &[ParameterSpec]) -> Result<Self> {
        let p = Self::create(strategy)?;
        p.add_specs(specs)?;
        Ok(p)
    }
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SwiftError::FileNotFound(path.to_path_buf()));
        }
        let c_path = cstring(&path.to_string_lossy())?;
        let ptr = native::call(|api| unsafe { (api.load_parameterizer)(c_path.as_ptr()) })?;
        Self::from_native(ptr, "LoadParameterizer")
    }
}
impl CompositeParameteriser {
    pub fn create() -> Result<Self> {
        let ptr = native::call(|api| unsafe { (api.create_composite_parameterizer)() })?;
        Self::from_native(ptr, "CreateCompositeParameterizer")
    }
    pub fn append(&self, parameteriser: &dyn Parameteriser) -> Result<()> {
        let inner = parameteriser.handle().as_ptr();
        native::call(|api| unsafe { (api.add_to_composite_parameterizer)(self.ptr(), inner) })
    }
    /// Single parameteriser over all of `parts`; an empty strategy means `composite`.
    pub fn concatenate(parts: &[&dyn Parameteriser], strategy: &str) -> Result<Self> {
        let strategy = cstring(strategy)?;
        let mut ptrs: Vec<*mut c_void> = parts.iter().map(|p| p.handle().as_ptr()).collect();
        let n = ptrs.len() as c_int;
        let out = native::call(|api| unsafe {
            (api.aggregate_parameterizers)(strategy.as_ptr(), ptrs.as_mut_ptr(), n)
        })?;
        Self::from_native(out, "AggregateParameterizers")
    }
    /// GR4J parameters scaled by subarea area and time step.
    pub fn gr4j_scaled(reference_area_km2: f64, time_step_seconds: i32) -> Result<Self> {
        let ptr = native::call(|api| unsafe {
            (api.create_gr4_scaled_parameterizer)(reference_area_km2, time_step_seconds)
        })?;
        Self::from_native(ptr, "CreateGr4ScaledParameterizer")
    }
}
impl FunctionsParameteriser {
    pub fn create(model_parameters: &dyn Parameteriser, function_parameters: &dyn Parameteriser) -> Result<Self> {
        let (model, funcs) = (model_parameters.handle().as_ptr(), function_parameters.handle().as_ptr());
        let ptr = native::call(|api| unsafe { (api.create_functions_parameterizer)(model, funcs) })?;
        Self::from_native(ptr, "CreateFunctionsParameterizer")
    }
}
/// How [`FilteringParameteriser::hide_parameters`] matches names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PatternMatch {
    pub regex: bool,
    /// Ignored when `regex` is set.
    pub starts_with: bool,
    /// Error if an exact pattern matches nothing; only for exact matching.
    pub strict: bool,
}
impl FilteringParameteriser {
    /// Hides matching parameters from optimisers; objective functions still see them.
    pub fn hide_parameters<S: AsRef<str>>(&self, patterns: &[S], how: PatternMatch) -> Result<()> {
        let mut buf = CharacterVectorBuffer::new(patterns)?;
        native::call(|api| unsafe {
            (api.hide_parameters)(self.ptr(), buf.as_mut_ptr(), how.regex, how.starts_with, how.strict)
        })
    }
    pub fn show_parameters<S: AsRef<str>>(&self, patterns: &[S], how: PatternMatch) -> Result<()> {
        let mut buf = CharacterVectorBuffer::new(patterns)?;
        native::call(|api| unsafe {
            (api.show_parameters)(self.ptr(), buf.as_mut_ptr(), how.regex, how.starts_with)
        })
    }
}
impl TransformParameteriser {
    /// Defines `param_name = F(a * inner + b)`, e.g. `log_x4` from `x4` with `log10`.
    pub fn add_transform(
        &self,
        param_name: &str,
        inner_param_name: &str,
        transform_id: &str,
        a: f64,
        b: f64,
    ) -> Result<()> {
        let (name, inner, transform) = (cstring(param_name)?, cstring(inner_param_name)?, cstring(transform_id)?);
        native::call(|api| unsafe {
            (api.add_parameter_transform)(self.ptr(), name.as_ptr(), inner.as_ptr(), transform.as_ptr(), a, b)
        })
    }
}
/// One tie `state = value * scaling_var + intercept` for [`ScalingParameteriser`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScaling {
    pub param_name: String,
    pub state_name: String,
    pub scaling_var_name: String,
    pub min_value: f64,
    pub max_value: f64,
    pub value: f64,
    #[serde(default)]
    pub intercept: f64,
}
impl ScalingParameteriser {
    pub fn create(selector_type: &str) -> Result<Self> {
        let selector = cstring(selector_type)?;
        let ptr = native::call(|api| unsafe { (api.create_target_scaling_parameterizer)(selector.as_ptr()) })?;
        Self::from_native(ptr, "CreateTargetScalingParameterizer")
    }
    /// E.g. an initial store level `S0` as a fraction of capacity `Smax` for state `S`,
    /// on the elements picked by `selector_type` (`subareas`, `each subarea`...).
    pub fn linear(rows: &[LinearScaling], selector_type: &str) -> Result<Self> {
        let p = Self::create(selector_type)?;
        rows.iter().try_for_each(|r| p.add_linear_scaling(r))?;
        Ok(p)
    }
    pub fn add_linear_scaling(&self, row: &LinearScaling) -> Result<()> {
        let param = cstring(&row.param_name)?;
        let state = cstring(&row.state_name)?;
        let scaling = cstring(&row.scaling_var_name)?;
        native::call(|api| unsafe {
            (api.add_linear_scaling_parameterizer)(
                self.ptr(),
                param.as_ptr(),
                state.as_ptr(),
                scaling.as_ptr(),
                row.intercept,
                row.min_value,
                row.max_value,
                row.value,
            )
        })
    }
}
/// Builds linear scaling rows from parallel columns; `intercepts` is either
/// empty (all zero), a single value, or one per row.
#[allow(clippy::too_many_arguments)]
pub fn linear_scaling_rows<S: AsRef<str>>(
    param_names: &[S],
    state_names: &[S],
    scaling_var_names: &[S],
    min_values: &[f64],
    max_values: &[f64],
    values: &[f64],
    intercepts: &[f64],
) -> Result<Vec<LinearScaling>> {
    let n = param_names.len();
    SwiftError::check_len("state names", n, state_names.len())?;
    SwiftError::check_len("scaling variable names", n, scaling_var_names.len())?;
    SwiftError::check_len("minimum values", n, min_values.len())?;
    SwiftError::check_len("maximum values", n, max_values.len())?;
    SwiftError::check_len("values", n, values.len())?;
    let intercept = |i: usize| -> Result<f64> {
        match intercepts.len() {
            0 => Ok(0.0),
            1 => Ok(intercepts[0]),
            len => {
                SwiftError::check_len("intercepts", n, len)?;
                Ok(intercepts[i])
            }
        }
    };
    (0..n)
        .map(|i| {
            Ok(LinearScaling {
                param_name: param_names[i].as_ref().to_string(),
                state_name: state_names[i].as_ref().to_string(),
                scaling_var_name: scaling_var_names[i].as_ref().to_string(),
                min_value: min_values[i],
                max_value: max_values[i],
                value: values[i],
                intercept: intercept(i)?,
            })
        })
        .collect()
}
impl SubareasScalingParameteriser {
    /// `inner = param * sqrt(area / reference_area)` on every subarea.
    pub fn sqrt_area_ratio(
        reference_area_km2: f64,
        param_name: &str,
        inner_param_name: &str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        let (param, inner) = (cstring(param_name)?, cstring(inner_param_name)?);
        let ptr = native::call(|api| unsafe {
            (api.create_sqrt_area_ratio_parameterizer)(
                reference_area_km2,
                param.as_ptr(),
                inner.as_ptr(),
                min,
                max,
                value,
            )
        })?;
        Self::from_native(ptr, "CreateSqrtAreaRatioParameterizer")
    }
}
impl ConstraintParameteriser {
    /// Keeps Muskingum `K` and `X` feasible for the links of `simulation`,
    /// whose link properties must already be set. `delta_t_hours` is the time step.
    pub fn muskingum(
        inner: &dyn Parameteriser,
        delta_t_hours: f64,
        param_name_k: &str,
        param_name_x: &str,
        simulation: &Simulation,
    ) -> Result<Self> {
        let (k, x) = (cstring(param_name_k)?, cstring(param_name_x)?);
        let inner = inner.handle().as_ptr();
        let ptr = native::call(|api| unsafe {
            (api.create_muskingum_constraint)(inner, delta_t_hours, k.as_ptr(), x.as_ptr(), simulation.ptr())
        })?;
        Self::from_native(ptr, "CreateMuskingumConstraint")
    }
}
impl Simulation {
    /// Feasible Muskingum parameter bounds, by name, for a time step in hours.
    pub fn muskingum_feasible_bounds(&self, delta_t_hours: f64) -> Result<BTreeMap<String, f64>> {
        let ptr = native::call(|api| unsafe { (api.get_feasible_muskingum_bounds)(self.ptr(), delta_t_hours) })?;
        let api = SwiftApi::instance()?;
        Ok(unsafe { marshal::take_named_values(api, ptr) }?.into_iter().collect())
    }
}
/// Strategy and rows of a known example parameteriser.
pub(crate) fn example_definition(kind: &str, strict: bool) -> Result<(&'static str, Vec<ParameterSpec>)> {
    match kind.to_lowercase().as_str() {
        "log-likelihood" => {
            let (censopt, calc_m_and_s) = (0.0, 1.0);
            let rows = [
                ("b", -7.0, -30.0, 0.0),
                ("m", 0.0, 0.0, 0.0),
                ("s", 100.0, 1.0, 1000.0),
                ("a", -10.0, -30.0, 1.0),
                ("maxobs", 100.0, 100.0, 100.0),
                ("ct", 0.01, 0.01, 0.01),
                ("censopt", censopt, censopt, censopt),
                ("calc_mod_m_s", calc_m_and_s, calc_m_and_s, calc_m_and_s),
            ];
            Ok((
                "no apply",
                rows.iter()
                    .map(|&(n, v, lo, hi)| ParameterSpec::new(n, v, lo, hi))
                    .collect(),
            ))
        }
        _ if strict => Err(SwiftError::unknown("example parameteriser", kind)),
        _ => Ok(("Generic", Vec::new())),
    }
}
/// Typical parameterisers by name; only `log-likelihood` is known. Anything
/// else yields an empty `Generic` hypercube, or an error when `strict`.
pub fn example_parameteriser(kind: &str, strict: bool) -> Result<HypercubeParameteriser> {
    let (strategy, specs) = example_definition(kind, strict)?;
    HypercubeParameteriser::with_specs(strategy, &specs)
}
/// Name, value, min and max columns per runoff model. SAC carries bounds for
/// all fifteen parameters, from the 2015-01-11 SAC default table.
type DefaultColumns = (&'static [&'static str], &'static [f64], &'static [f64], &'static [f64]);
fn default_columns(model_id: &str) -> Option<DefaultColumns> {
    Some(match model_id {
        "GR4J" => (
            &["x1", "x2", "x3", "x4"],
            &[650.488, -0.280648, 7.89123, 18.9172],
            &[1.0, -27.0, 1.0, 1.0],
            &[3000.0, 27.0, 660.0, 240.0],
        ),
        "GR2M" => (&["x1", "x2"], &[650.488, -0.280648], &[1.0, 1e-4], &[3000.0, 27.0]),
        "GR5H" => (
            &["x1", "x2", "x3", "x4", "x5"],
            &[44.6, 30.0, 10.0, 14.0, 200.0],
            &[1.0, 1.0, 0.0, 1.0, 1.0],
            &[1000.0, 400.0, 1000.0, 240.0, 1000.0],
        ),
        "GR6J" => (
            &["x1", "x2", "x3", "x4", "x5", "x6"],
            &[20.0, -2.0, 10.0, 2.0, 0.0, 1.0],
            &[1.0, -5.0, 0.0, 1.0, 0.0, 0.0],
            &[1000.0, 400.0, 1000.0, 240.0, 1.0, 1.0],
        ),
        "PDM" => (
            &["cmax", "cminrat", "b", "be", "kg", "bg", "Strat", "k1", "k2rat", "kb"],
            &[400.0, 0.5, 1.8, 1.0, 1300.0, 1.0, 0.5, 35.0, 0.3, 2.4],
            &[1.0, 0.0, 0.001, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0001, 1.0],
            &[3000.0, 1.0, 2.0, 2.0, 50000.0, 1.0, 1.0, 300.0, 1.0, 2000.0],
        ),
        "SAC" | "SACSMA" => (
            &[
                "UZTWM", "UZFWM", "UZK", "PCTIM", "ADIMP", "RIVA", "REXP", "LZTWM", "LZFSM",
                "LZFPM", "LZSK", "LZPK", "PFREE", "RSERV", "SIDE",
            ],
            &[
                50.0, 40.0, 0.245, 0.01, 0.0, 0.01, 2.0, 130.0, 23.0, 40.0, 0.043, 0.009, 0.1,
                0.3, 0.0,
            ],
            &[
                10.0, 5.0, 0.1, 0.0, 0.0, 0.0, 1.0, 10.0, 5.0, 10.0, 0.001, 0.001, 0.0, 0.0,
                0.0,
            ],
            &[
                300.0, 150.0, 0.75, 1.0, 1.0, 1.0, 5.0, 500.0, 400.0, 1000.0, 0.35, 0.05, 0.8,
                1.0, 1.0,
            ],
        ),
        _ => return None,
    })
}
/// Default rows for a runoff model's parameters.
pub fn default_parameter_specs(model_id: &str) -> Result<Vec<ParameterSpec>> {
    let (names, values, mins, maxs) =
        default_columns(model_id).ok_or_else(|| SwiftError::unknown("runoff model defaults", model_id))?;
    specs_from_columns(names, values, mins, maxs)
}
/// `Generic` hypercube holding the default rows of `model_id`.
pub fn parameters_for(model_id: &str) -> Result<HypercubeParameteriser> {
    HypercubeParameteriser::with_specs("Generic", &default_parameter_specs(model_id)?)
}
/// Parameteriser for a multisite objective: one parameteriser per objective
/// function (tagged with its identifier and optionally prefixed), an optional
/// mixing function parameteriser, and the model parameteriser (`no apply` if none).
pub fn multisite_objective_parameteriser<S: AsRef<str>>(
    function_parameterisers: &[&dyn Parameteriser],
    function_ids: &[S],
    prefixes: Option<&[S]>,
    mixing: Option<&dyn Parameteriser>,
    hydro: Option<&dyn Parameteriser>,
) -> Result<FunctionsParameteriser> {
    SwiftError::check_len("objective identifiers", function_parameterisers.len(), function_ids.len())?;
    if let Some(prefixes) = prefixes {
        SwiftError::check_len("parameter prefixes", function_parameterisers.len(), prefixes.len())?;
    }
    let composite = CompositeParameteriser::create()?;
    for (i, (p, id)) in function_parameterisers.iter().zip(function_ids).enumerate() {
        p.tag(id.as_ref())?;
        match prefixes {
            Some(prefixes) => composite.append(&p.prefixed(prefixes[i].as_ref())?)?,
            None => composite.append(*p)?,
        }
    }
    if let Some(mixing) = mixing {
        mixing.tag("mixing_function")?;
        composite.append(&mixing.prefixed("mixing_function.")?)?;
    }
    match hydro {
        Some(hydro) => FunctionsParameteriser::create(hydro, &composite),
        None => FunctionsParameteriser::create(&HypercubeParameteriser::create("no apply")?, &composite),
    }
}
/// Any native handle of the hypercube family, e.g. one returned by an estimator.
pub fn as_hypercube(handle: NativeHandle) -> Result<HypercubeParameteriser> {
    HypercubeParameteriser::try_from(handle)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn log_likelihood_example_rows() {
        let (strategy, specs) = example_definition("Log-Likelihood", true).unwrap();
        assert_eq!(strategy, "no apply");
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "m", "s", "a", "maxobs", "ct", "censopt", "calc_mod_m_s"]);
        let s = &specs[2];
        assert_eq!((s.value, s.min, s.max), (100.0, 1.0, 1000.0));
        assert_eq!(specs.iter().filter(|s| s.is_free()).count(), 3);
        assert!(specs.iter().all(|s| s.min <= s.value && s.value <= s.max));
    }
    #[test]
    fn unknown_example_falls_back_unless_strict() {
        let (strategy, specs) = example_definition("nse", false).unwrap();
        assert_eq!(strategy, "Generic");
        assert!(specs.is_empty());
        let err = example_definition("nse", true).unwrap_err();
        assert!(err.to_string().contains("nse"));
    }
    #[test]
    fn gr4j_defaults() {
        let specs = default_parameter_specs("GR4J").unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[3], ParameterSpec::new("x4", 18.9172, 1.0, 240.0));
        assert!(specs.iter().all(ParameterSpec::is_free));
    }
    #[test]
    fn gr2m_and_sac_alias() {
        let gr2m = default_parameter_specs("GR2M").unwrap();
        assert_eq!(gr2m[1].min, 1e-4);
        assert_eq!(default_parameter_specs("SACSMA").unwrap(), default_parameter_specs("SAC").unwrap());
        assert!(matches!(
            default_parameter_specs("AWBM"),
            Err(SwiftError::UnknownIdentifier { .. })
        ));
    }
    #[test]
    fn default_tables_are_rectangular() {
        for model in ["GR4J", "GR2M", "GR5H", "GR6J", "PDM", "SAC"] {
            let (names, values, mins, maxs) = default_columns(model).unwrap();
            assert_eq!(names.len(), values.len(), "{model}");
            assert_eq!(names.len(), mins.len(), "{model}");
            assert_eq!(names.len(), maxs.len(), "{model}");
        }
    }
    #[test]
    fn spec_columns_must_line_up() {
        let err = specs_from_columns(&["x1", "x2"], &[1.0, 2.0], &[0.0], &[3.0, 3.0]).unwrap_err();
        assert!(matches!(err, SwiftError::LengthMismatch { what: "parameter minima", .. }));
    }
    #[test]
    fn specs_use_data_frame_column_names_in_json() {
        let json = serde_json::to_value(ParameterSpec::new("x1", 1.0, 0.0, 2.0)).unwrap();
        assert_eq!(json["Name"], "x1");
        assert_eq!(json["Max"], 2.0);
    }
    #[test]
    fn linear_scaling_intercepts_broadcast() {
        let rows = linear_scaling_rows(
            &["S0", "R0"],
            &["S", "R"],
            &["x1", "x3"],
            &[0.0, 0.0],
            &[1.0, 1.0],
            &[0.9, 0.9],
            &[0.5],
        )
        .unwrap();
        assert!(rows.iter().all(|r| r.intercept == 0.5));
        assert_eq!(rows[1].scaling_var_name, "x3");
        let none = linear_scaling_rows(&["S0"], &["S"], &["x1"], &[0.0], &[1.0], &[0.5], &[]).unwrap();
        assert_eq!(none[0].intercept, 0.0);
        let bad = linear_scaling_rows(
            &["S0", "R0", "T0"],
            &["S", "R", "T"],
            &["x1", "x3", "x5"],
            &[0.0; 3],
            &[1.0; 3],
            &[0.5; 3],
            &[0.1, 0.2],
        );
        assert!(matches!(bad, Err(SwiftError::LengthMismatch { what: "intercepts", .. })));
    }
    #[test]
    fn linear_scaling_reads_from_json_rows() {
        let json = r#"[{"param_name":"S0","state_name":"S","scaling_var_name":"x1",
            "min_value":0.0,"max_value":1.0,"value":0.9}]"#;
        let rows: Vec<LinearScaling> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].intercept, 0.0);
    }
    #[test]
    fn every_hypercube_kind_converts_but_objectives_do_not() {
        assert!(as_hypercube(NativeHandle::detached(HandleKind::ScalingParameteriser)).is_ok());
        assert!(as_hypercube(NativeHandle::detached(HandleKind::StateInitParameteriser)).is_ok());
        assert!(as_hypercube(NativeHandle::detached(HandleKind::StateInitialiser)).is_err());
        assert!(HypercubeParameteriser::try_from(NativeHandle::detached(HandleKind::StateInitialiser)).is_err());
        assert!(as_hypercube(NativeHandle::detached(HandleKind::ObjectiveScores)).is_err());
        let err = TransformParameteriser::try_from(NativeHandle::detached(HandleKind::Hypercube)).unwrap_err();
        assert!(err.to_string().contains("TRANSFORM_PARAMETERIZER_PTR"));
    }
    #[test]
    fn missing_parameteriser_file_is_reported_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = HypercubeParameteriser::load(dir.path().join("p.json")).unwrap_err();
        assert!(matches!(err, SwiftError::FileNotFound(_)));
    }
}
