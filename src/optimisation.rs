//! Shuffled complex evolution and other optimisers run by the engine.
use crate::error::{Result, SwiftError};
use crate::handle::native_type;
use crate::marshal::{cstring, copy_string_array, CStringArray, StringMapBuffer};
use crate::native::structs::OptimizerLogData;
pub use crate::native::structs::SceParameters;
use crate::native::{self, SwiftApi};
use crate::objectives::{ObjectiveEvaluator, VectorObjectiveScores};
use crate::parameteriser::Parameteriser;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::os::raw::c_int;
impl SceParameters {
    /// Defaults for `n_params` free parameters and `n_shuffle` shuffles.
    pub fn defaults(n_params: i32, n_shuffle: i32) -> Self {
        let m = 2 * n_params + 1;
        Self {
            alpha: 1,
            beta: m,
            p: n_params + 2,
            pmin: n_params + 2,
            m,
            q: (m - 2).max(2),
            num_shuffle: n_shuffle,
            trapezoidal_density_parameter: 1.0,
            reflection_ratio: -1.0,
            contraction_ratio: 0.5,
        }
    }
}
impl Default for SceParameters {
    fn default() -> Self {
        Self::defaults(4, 40)
    }
}
native_type!(SceTerminationCondition, SceTerminationCondition);
native_type!(
    /// Seeded sampler of candidate parameter sets.
    CandidateFactorySeed,
    CandidateFactorySeed
);
native_type!(Optimiser, Optimiser);
/// When an SCE run stops.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum TerminationCriterion {
    /// Stops after `cutoff_no_improvement` successive improvements below `tolerance`, or after `max_hours`.
    Marginal {
        tolerance: f64,
        cutoff_no_improvement: i32,
        max_hours: f64,
    },
    MaxRuntime { max_hours: f64 },
    /// Number of objective evaluations.
    MaxIterations { max_iterations: i32 },
    /// A criterion known to the engine by name, e.g. `relative standard deviation`
    /// or `maximum evaluations`, with its arguments in string form.
    Named { kind: String, arguments: Vec<String> },
}
impl TerminationCriterion {
    pub fn marginal() -> Self {
        TerminationCriterion::Marginal {
            tolerance: 1e-6,
            cutoff_no_improvement: 10,
            max_hours: 0.05,
        }
    }
    pub fn max_runtime() -> Self {
        TerminationCriterion::MaxRuntime { max_hours: 0.05 }
    }
    pub fn max_iterations() -> Self {
        TerminationCriterion::MaxIterations { max_iterations: 1000 }
    }
    pub fn relative_standard_deviation(tolerance: f64, max_hours: f64) -> Self {
        TerminationCriterion::Named {
            kind: "relative standard deviation".to_string(),
            arguments: vec![tolerance.to_string(), max_hours.to_string()],
        }
    }
    pub fn create(&self) -> Result<SceTerminationCondition> {
        let ptr = match self {
            TerminationCriterion::Marginal {
                tolerance,
                cutoff_no_improvement,
                max_hours,
            } => native::call(|api| unsafe {
                (api.create_sce_marginal_termination_wila)(*tolerance, *cutoff_no_improvement, *max_hours)
            })?,
            TerminationCriterion::MaxRuntime { max_hours } => {
                native::call(|api| unsafe { (api.create_sce_max_runtime_termination_wila)(*max_hours) })?
            }
            TerminationCriterion::MaxIterations { max_iterations } => {
                native::call(|api| unsafe { (api.create_sce_max_iteration_termination_wila)(*max_iterations) })?
            }
            TerminationCriterion::Named { kind, arguments } => {
                let kind = cstring(kind)?;
                let mut args = CStringArray::new(arguments)?;
                native::call(|api| unsafe {
                    (api.create_sce_termination_wila)(kind.as_ptr(), args.as_mut_ptr(), args.len())
                })?
            }
        };
        SceTerminationCondition::from_native(ptr, "CreateSceTerminationWila")
    }
}
/// Relative standard deviation of the population below 0.002, or ten seconds.
impl Default for TerminationCriterion {
    fn default() -> Self {
        Self::relative_standard_deviation(0.002, 10.0 / 3600.0)
    }
}
impl CandidateFactorySeed {
    /// Sampler within the bounds of `parameters`; `sampler_type` is e.g. `urs` (uniform random).
    pub fn new(parameters: &dyn Parameteriser, sampler_type: &str, seed: i32) -> Result<Self> {
        let p = parameters.handle().as_ptr();
        let kind = cstring(sampler_type)?;
        let ptr = native::call(|api| unsafe { (api.create_candidate_factory_seed_wila)(p, kind.as_ptr(), seed) })?;
        Self::from_native(ptr, "CreateCandidateFactorySeedWila")
    }
}
/// Initial population of an SCE run.
pub enum PopulationInitialiser<'a> {
    Seed(&'a CandidateFactorySeed),
    /// Sampled uniformly at random within the bounds, with seed 0.
    Hypercube(&'a dyn Parameteriser),
}
impl Optimiser {
    /// SCE optimiser; without a termination condition the default criterion is used.
    pub fn sce(
        objective: &ObjectiveEvaluator,
        termination: Option<&SceTerminationCondition>,
        params: Option<SceParameters>,
        population: PopulationInitialiser<'_>,
    ) -> Result<Self> {
        let sampled;
        let seed = match population {
            PopulationInitialiser::Seed(seed) => seed,
            PopulationInitialiser::Hypercube(p) => {
                sampled = CandidateFactorySeed::new(p, "urs", 0)?;
                &sampled
            }
        };
        let default_termination;
        let termination = match termination {
            Some(t) => t,
            None => {
                default_termination = TerminationCriterion::default().create()?;
                &default_termination
            }
        };
        let params = params.unwrap_or_default();
        log::debug!("creating SCE optimiser with {params:?}");
        let ptr = native::call(|api| unsafe {
            (api.create_shuffled_complex_evolution_wila)(objective.ptr(), termination.ptr(), params, seed.ptr())
        })?;
        Self::from_native(ptr, "CreateShuffledComplexEvolutionWila")
    }
    /// Optimiser configured by engine options, e.g. `Optimizer = sce`.
    pub fn with_options(
        objective: &ObjectiveEvaluator,
        parameters: &dyn Parameteriser,
        options: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut map = StringMapBuffer::new(options)?;
        let p = parameters.handle().as_ptr();
        let ptr = native::call(|api| unsafe { (api.create_optimizer_wila)(objective.ptr(), p, map.as_mut_ptr()) })?;
        Self::from_native(ptr, "CreateOptimizerWila")
    }
    /// Blocks until the run terminates; returns the final population.
    pub fn execute(&self) -> Result<VectorObjectiveScores> {
        log::info!("starting optimisation");
        let ptr = native::call(|api| unsafe { (api.execute_optimizer_wila)(self.ptr()) })?;
        VectorObjectiveScores::from_native(ptr, "ExecuteOptimizerWila")
    }
    /// Records each step of the run; `kind` may be empty for the default logger.
    pub fn set_calibration_logger(&self, kind: &str) -> Result<()> {
        let kind = cstring(kind)?;
        native::call(|api| unsafe { (api.set_optimizer_logger_wila)(self.ptr(), kind.as_ptr()) })
    }
    /// Threads used by the run; -1 uses all cores.
    pub fn set_maximum_threads(&self, n_threads: i32) -> Result<()> {
        native::call(|api| unsafe { (api.set_max_threads_optimizer_wila)(self.ptr(), n_threads) })
    }
    pub fn logger_content(&self, add_numbering: bool) -> Result<OptimisationLog> {
        let ptr = native::call(|api| unsafe { (api.get_optimizer_log_data_wila)(self.ptr()) })?;
        take_log(ptr, add_numbering, "GetOptimizerLogDataWila")
    }
    /// Numbered log, checked to have `fitness` and the message and category columns.
    pub fn extract_optimisation_log(&self, fitness: &str) -> Result<OptimisationLog> {
        let log = self.logger_content(true)?;
        log.check_columns(&[fitness, MESSAGE_COLUMN, CATEGORY_COLUMN])?;
        Ok(log)
    }
}
pub const POINT_NUMBER_COLUMN: &str = "PointNumber";
pub const MESSAGE_COLUMN: &str = "Message";
pub const CATEGORY_COLUMN: &str = "Category";
/// Column of an [`OptimisationLog`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogColumn {
    Text(Vec<String>),
    Numeric(Vec<f64>),
}
impl LogColumn {
    fn len(&self) -> usize {
        match self {
            LogColumn::Text(v) => v.len(),
            LogColumn::Numeric(v) => v.len(),
        }
    }
    fn select(&self, rows: &[usize]) -> LogColumn {
        match self {
            LogColumn::Text(v) => LogColumn::Text(rows.iter().map(|&i| v[i].clone()).collect()),
            LogColumn::Numeric(v) => LogColumn::Numeric(rows.iter().map(|&i| v[i]).collect()),
        }
    }
}
/// Table of the steps of an optimisation: text columns such as `Message`
/// and `Category`, then numeric ones for parameters and scores.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct OptimisationLog {
    rows: usize,
    columns: Vec<(String, LogColumn)>,
}
pub(crate) fn take_log(ptr: *mut OptimizerLogData, add_numbering: bool, origin: &'static str) -> Result<OptimisationLog> {
    if ptr.is_null() {
        return Err(SwiftError::NullHandle(origin));
    }
    let api = SwiftApi::instance()?;
    let log = unsafe { OptimisationLog::from_native(&*ptr, add_numbering) };
    unsafe { (api.dispose_optimizer_log_data_wila)(ptr) };
    log
}
impl OptimisationLog {
    pub fn new(columns: Vec<(String, LogColumn)>) -> Result<Self> {
        let rows = columns.first().map_or(0, |(_, c)| c.len());
        for (_, column) in &columns {
            SwiftError::check_len("optimisation log column", rows, column.len())?;
        }
        Ok(Self { rows, columns })
    }
    unsafe fn from_native(data: &OptimizerLogData, add_numbering: bool) -> Result<Self> {
        let rows = data.log_length.max(0) as usize;
        if rows == 0 {
            return Ok(Self::default());
        }
        let count = |n: c_int| n.max(0) as usize;
        let text_names = copy_string_array(data.names_string_data, count(data.string_data_count))?;
        let num_names = copy_string_array(data.names_numeric_data, count(data.numeric_data_count))?;
        let mut columns = Vec::with_capacity(text_names.len() + num_names.len() + 1);
        for (i, name) in text_names.into_iter().enumerate() {
            let values = copy_string_array(*data.string_data.add(i), rows)?;
            columns.push((name, LogColumn::Text(values)));
        }
        for (i, name) in num_names.into_iter().enumerate() {
            let values = std::slice::from_raw_parts(*data.numeric_data.add(i), rows).to_vec();
            columns.push((name, LogColumn::Numeric(values)));
        }
        if add_numbering {
            columns.push((
                POINT_NUMBER_COLUMN.to_string(),
                LogColumn::Numeric((1..=rows).map(|i| i as f64).collect()),
            ));
        }
        Ok(Self { rows, columns })
    }
    pub fn len(&self) -> usize {
        self.rows
    }
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
    pub fn column(&self, name: &str) -> Option<&LogColumn> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }
    pub fn text(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            LogColumn::Text(v) => Some(v),
            LogColumn::Numeric(_) => None,
        }
    }
    pub fn numbers(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            LogColumn::Numeric(v) => Some(v),
            LogColumn::Text(_) => None,
        }
    }
    pub fn check_columns(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| self.column(n).is_none()) {
            Some(missing) => Err(SwiftError::unknown("optimisation log column", *missing)),
            None => Ok(()),
        }
    }
    /// E.g. shortens `subarea.Wolf_Creek.x1` to `x1`.
    pub fn rename_columns(&mut self, names: &BTreeMap<String, String>) {
        for (name, _) in &mut self.columns {
            if let Some(new) = names.get(name.as_str()) {
                *name = new.clone();
            }
        }
    }
    /// Rows whose text in `column` matches `pattern` from its start.
    pub fn subset_by_pattern(&self, column: &str, pattern: &str) -> Result<Self> {
        let re = Regex::new(&format!("^(?:{pattern})"))?;
        let values = self
            .text(column)
            .ok_or_else(|| SwiftError::unknown("text log column", column))?;
        let rows: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| re.is_match(v))
            .map(|(i, _)| i)
            .collect();
        Ok(Self {
            rows: rows.len(),
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.select(&rows)))
                .collect(),
        })
    }
    /// Steps that produced new points: initial sampling, reflection, contraction and additions.
    pub fn subset_by_message(&self, pattern: Option<&str>) -> Result<Self> {
        self.subset_by_pattern(MESSAGE_COLUMN, pattern.unwrap_or("Initial.*|Reflec.*|Contrac.*|Add.*"))
    }
    /// Copy with a numeric column clamped to `[lo, hi]`, e.g. to plot a fitness.
    pub fn bound_column(&self, column: &str, lo: f64, hi: f64) -> Result<Self> {
        let mut bounded = self.clone();
        match bounded.columns.iter_mut().find(|(n, _)| n == column) {
            Some((_, LogColumn::Numeric(values))) => {
                values.iter_mut().for_each(|v| *v = v.min(hi).max(lo));
                Ok(bounded)
            }
            _ => Err(SwiftError::unknown("numeric log column", column)),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::os::raw::{c_char, c_double};
    #[test]
    fn sce_defaults_for_four_parameters() {
        let p = SceParameters::default();
        assert_eq!((p.p, p.pmin, p.m, p.q), (6, 6, 9, 7));
        assert_eq!((p.alpha, p.beta, p.num_shuffle), (1, 9, 40));
        assert_eq!(p.reflection_ratio, -1.0);
        let one = SceParameters::defaults(1, 10);
        assert_eq!(one.q, 2);
        let json = serde_json::to_value(one).unwrap();
        assert_eq!(json["NumShuffle"], 10);
        assert_eq!(json["Pmin"], 3);
    }
    #[test]
    fn default_termination_is_relative_standard_deviation() {
        match TerminationCriterion::default() {
            TerminationCriterion::Named { kind, arguments } => {
                assert_eq!(kind, "relative standard deviation");
                assert_eq!(arguments[0], "0.002");
                let hours: f64 = arguments[1].parse().unwrap();
                assert!((hours * 3600.0 - 10.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            TerminationCriterion::marginal(),
            TerminationCriterion::Marginal { tolerance: 1e-6, cutoff_no_improvement: 10, max_hours: 0.05 }
        );
    }
    fn sample_log() -> OptimisationLog {
        OptimisationLog::new(vec![
            (
                "Message".into(),
                LogColumn::Text(
                    ["Initial Population", "Shuffling", "Reflection", "Contraction", "Adding point"]
                        .map(String::from)
                        .to_vec(),
                ),
            ),
            ("Category".into(), LogColumn::Text(vec!["Complex 0".into(); 5])),
            ("NSE".into(), LogColumn::Numeric(vec![-3.0, 0.1, 0.5, 0.7, 0.9])),
            ("x1".into(), LogColumn::Numeric(vec![10.0, 20.0, 30.0, 40.0, 50.0])),
        ])
        .unwrap()
    }
    #[test]
    fn message_subset_keeps_new_points() {
        let log = sample_log().subset_by_message(None).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.numbers("x1").unwrap(), &[10.0, 30.0, 40.0, 50.0]);
        let reflections = sample_log().subset_by_pattern("Message", "Reflec").unwrap();
        assert_eq!(reflections.len(), 1);
        // Matches from the start only.
        assert!(sample_log().subset_by_pattern("Message", "Population").unwrap().is_empty());
    }
    #[test]
    fn subset_rejects_unknown_or_numeric_columns() {
        assert!(sample_log().subset_by_pattern("Nope", ".*").is_err());
        assert!(sample_log().subset_by_pattern("NSE", ".*").is_err());
        assert!(matches!(
            sample_log().subset_by_pattern("Message", "("),
            Err(SwiftError::Pattern(_))
        ));
    }
    #[test]
    fn bound_column_clamps_a_copy() {
        let log = sample_log();
        let bounded = log.bound_column("NSE", 0.0, 1.0).unwrap();
        assert_eq!(bounded.numbers("NSE").unwrap(), &[0.0, 0.1, 0.5, 0.7, 0.9]);
        assert_eq!(log.numbers("NSE").unwrap()[0], -3.0);
        assert!(log.bound_column("Message", 0.0, 1.0).is_err());
    }
    #[test]
    fn ragged_columns_are_rejected() {
        let err = OptimisationLog::new(vec![
            ("a".into(), LogColumn::Numeric(vec![1.0, 2.0])),
            ("b".into(), LogColumn::Numeric(vec![1.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, SwiftError::LengthMismatch { expected: 2, actual: 1, .. }));
    }
    #[test]
    fn renames_and_checks_columns() {
        let mut log = sample_log();
        log.rename_columns(&BTreeMap::from([("x1".to_string(), "X1".to_string())]));
        assert!(log.check_columns(&["X1", "Message", "Category"]).is_ok());
        let err = log.check_columns(&["log.likelihood"]).unwrap_err();
        assert!(err.to_string().contains("log.likelihood"));
    }
    #[test]
    fn native_log_is_copied_with_point_numbers() {
        let s = |v: &str| CString::new(v).unwrap().into_raw();
        let mut text_names = [s("Message")];
        let mut num_names = [s("NSE")];
        let mut messages = [s("Initial Population"), s("Reflection")];
        let mut text_cols: [*mut *mut c_char; 1] = [messages.as_mut_ptr()];
        let mut nse: [c_double; 2] = [0.25, 0.5];
        let mut num_cols: [*mut c_double; 1] = [nse.as_mut_ptr()];
        let data = OptimizerLogData {
            log_length: 2,
            string_data_count: 1,
            numeric_data_count: 1,
            names_numeric_data: num_names.as_mut_ptr(),
            names_string_data: text_names.as_mut_ptr(),
            numeric_data: num_cols.as_mut_ptr(),
            string_data: text_cols.as_mut_ptr(),
        };
        let log = unsafe { OptimisationLog::from_native(&data, true) }.unwrap();
        assert_eq!(log.column_names().collect::<Vec<_>>(), vec!["Message", "NSE", "PointNumber"]);
        assert_eq!(log.text("Message").unwrap()[1], "Reflection");
        assert_eq!(log.numbers("PointNumber").unwrap(), &[1.0, 2.0]);
        for p in [text_names[0], num_names[0], messages[0], messages[1]] {
            drop(unsafe { CString::from_raw(p) });
        }
    }
    #[test]
    fn empty_native_log_has_no_columns() {
        let data = OptimizerLogData {
            log_length: 0,
            string_data_count: 0,
            numeric_data_count: 0,
            names_numeric_data: std::ptr::null_mut(),
            names_string_data: std::ptr::null_mut(),
            numeric_data: std::ptr::null_mut(),
            string_data: std::ptr::null_mut(),
        };
        let log = unsafe { OptimisationLog::from_native(&data, true) }.unwrap();
        assert!(log.is_empty());
        assert_eq!(log.column_names().count(), 0);
    }
}
