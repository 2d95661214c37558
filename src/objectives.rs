//! Objective evaluators and the scores they produce.
use crate::error::{Result, SwiftError};
use crate::handle::{native_type, HandleKind};
use crate::marshal::{self, cstring, NamedValuesBuffer};
use crate::native::structs::{
    MarshaledDateTime, MultiStatisticDefinition, MultiTimeSeriesData, StatisticDefinition,
};
use crate::native::{self, SwiftApi};
use crate::parameteriser::{HypercubeParameteriser, ParameterSpec, Parameteriser};
use crate::simulation::Simulation;
use crate::timeseries::TimeSeries;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::CString;
use std::os::raw::{c_char, c_double, c_int};
native_type!(
    /// Computes goodness of fit statistics of a simulation against observations.
    ///
    /// Holds either a plain evaluator or one wrapped for use by optimisers; the
    /// constructors here return wrapped evaluators unless stated otherwise.
    ObjectiveEvaluator,
    ObjectiveEvaluatorWila,
    HandleKind::is_objective
);
native_type!(
    /// Scores of one parameter set, with a copy of that parameter set.
    ObjectiveScores,
    ObjectiveScores
);
native_type!(
    /// Population of [`ObjectiveScores`], e.g. the final complexes of an optimisation.
    VectorObjectiveScores,
    VectorObjectiveScores
);
/// One row of a multisite objective definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatisticSpec {
    pub model_var_id: String,
    /// Bivariate statistic, e.g. `nse` or `log-likelihood`.
    pub statistic_id: String,
    pub objective_id: String,
    pub objective_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
/// Owns a `multi_statistic_definition` and everything it points into.
struct MultiStatisticBuffer {
    _strings: Vec<CString>,
    _values: Vec<Vec<f64>>,
    _value_ptrs: Vec<Box<[*mut c_double; 1]>>,
    _series: Vec<Box<MultiTimeSeriesData>>,
    _stats: Vec<Box<StatisticDefinition>>,
    _stat_ptrs: Vec<*mut StatisticDefinition>,
    raw: MultiStatisticDefinition,
}
impl MultiStatisticBuffer {
    fn new(specs: &[StatisticSpec], observations: &[TimeSeries]) -> Result<Self> {
        SwiftError::check_len("observation series", specs.len(), observations.len())?;
        let mut strings = Vec::new();
        let mut keep = |s: &str| -> Result<*mut c_char> {
            let c = cstring(s)?;
            let ptr = c.as_ptr() as *mut c_char;
            strings.push(c);
            Ok(ptr)
        };
        let mut values = Vec::with_capacity(specs.len());
        let mut value_ptrs = Vec::with_capacity(specs.len());
        let mut series = Vec::with_capacity(specs.len());
        let mut stats = Vec::with_capacity(specs.len());
        for (spec, obs) in specs.iter().zip(observations) {
            let mut data = obs.values.clone();
            let mut ptrs = Box::new([data.as_mut_ptr()]);
            let mut mts = Box::new(MultiTimeSeriesData {
                time_series_geometry: obs.geometry()?,
                ensemble_size: 1,
                numeric_data: ptrs.as_mut_ptr(),
            });
            stats.push(Box::new(StatisticDefinition {
                model_variable_id: keep(&spec.model_var_id)?,
                objective_identifier: keep(&spec.objective_id)?,
                objective_name: keep(&spec.objective_name)?,
                statistic_identifier: keep(&spec.statistic_id)?,
                start: MarshaledDateTime::from_datetime(&spec.start),
                end: MarshaledDateTime::from_datetime(&spec.end),
                observations: &mut *mts,
            }));
            values.push(data);
            value_ptrs.push(ptrs);
            series.push(mts);
        }
        let mut stat_ptrs: Vec<*mut StatisticDefinition> =
            stats.iter_mut().map(|s| &mut **s as *mut StatisticDefinition).collect();
        let raw = MultiStatisticDefinition {
            size: specs.len() as c_int,
            statistics: stat_ptrs.as_mut_ptr(),
            mix_statistics_id: std::ptr::null_mut(),
        };
        Ok(Self {
            _strings: strings,
            _values: values,
            _value_ptrs: value_ptrs,
            _series: series,
            _stats: stats,
            _stat_ptrs: stat_ptrs,
            raw,
        })
    }
    fn as_mut_ptr(&mut self) -> *mut MultiStatisticDefinition {
        &mut self.raw
    }
}
pub(crate) fn observation_window(
    observation: &TimeSeries,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(Vec<f64>, crate::native::structs::MarshaledTsGeometry)> {
    let windowed = observation.window(Some(start), Some(end));
    let geom = windowed.geometry()?;
    Ok((windowed.values, geom))
}
impl ObjectiveEvaluator {
    /// Statistic of `var_id` against `observation` over `[start, end]`.
    pub fn single(
        simulation: &Simulation,
        var_id: &str,
        observation: &TimeSeries,
        statistic: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self> {
        let (mut values, mut geom) = observation_window(observation, start, end)?;
        let (var, stat) = (cstring(var_id)?, cstring(statistic)?);
        let ptr = native::call(|api| unsafe {
            (api.create_single_observation_objective_evaluator_wila)(
                simulation.ptr(),
                var.as_ptr(),
                values.as_mut_ptr(),
                &mut geom,
                stat.as_ptr(),
            )
        })?;
        Self::from_native(ptr, "CreateSingleObservationObjectiveEvaluatorWila")
    }
    /// Weighted statistics on one observation, defined by a YAML string such as
    /// `"{nse: 0.5, bias: 0.5}"`. Returns an unwrapped evaluator.
    pub fn composite_observation(
        simulation: &Simulation,
        var_id: &str,
        observation: &TimeSeries,
        yaml_statistics: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self> {
        let (mut values, mut geom) = observation_window(observation, start, end)?;
        let (var, yaml) = (cstring(var_id)?, cstring(yaml_statistics)?);
        let ptr = native::call(|api| unsafe {
            (api.create_composite_observation_objective_evaluator)(
                simulation.ptr(),
                var.as_ptr(),
                values.as_mut_ptr(),
                &mut geom,
                yaml.as_ptr(),
            )
        })?;
        Self::from_native_as(ptr, HandleKind::ObjectiveEvaluator, "CreateCompositeObservationObjectiveEvaluator")
    }
    /// Weighted combination of objectives, each named for reporting.
    pub fn composite<S: AsRef<str>>(objectives: &[&ObjectiveEvaluator], weights: &[f64], names: &[S]) -> Result<Self> {
        SwiftError::check_len("objective weights", objectives.len(), weights.len())?;
        SwiftError::check_len("objective names", objectives.len(), names.len())?;
        let ptr = native::call(|api| unsafe { (api.create_empty_composite_objective_evaluator)() })?;
        let composite = Self::from_native_as(ptr, HandleKind::ObjectiveEvaluator, "CreateEmptyCompositeObjectiveEvaluator")?;
        for ((objective, weight), name) in objectives.iter().zip(weights).zip(names) {
            let name = cstring(name.as_ref())?;
            let unwrapped;
            let single = if objective.handle().kind() == HandleKind::ObjectiveEvaluatorWila {
                unwrapped = objective.unwrap_evaluator()?;
                &unwrapped
            } else {
                *objective
            };
            native::call(|api| unsafe {
                (api.add_single_observation_objective_evaluator)(composite.ptr(), single.ptr(), *weight, name.as_ptr())
            })?;
        }
        composite.wrap(true)
    }
    /// Objective combining statistics at several sites, for whole of catchment calibration.
    /// `weights` are keyed by objective identifier.
    pub fn multisite(
        simulation: &Simulation,
        specs: &[StatisticSpec],
        observations: &[TimeSeries],
        weights: &BTreeMap<String, f64>,
    ) -> Result<Self> {
        let mut defn = MultiStatisticBuffer::new(specs, observations)?;
        let names: Vec<&str> = weights.keys().map(String::as_str).collect();
        let values: Vec<f64> = weights.values().copied().collect();
        let mut weights = NamedValuesBuffer::new(&names, &values)?;
        let ptr = native::call(|api| unsafe {
            (api.create_multisite_objective_evaluator)(simulation.ptr(), defn.as_mut_ptr(), weights.as_mut_ptr())
        })?;
        Self::from_native_as(ptr, HandleKind::ObjectiveEvaluator, "CreateMultisiteObjectiveEvaluator")?.wrap(true)
    }
    /// Evaluator usable by optimisers; `clone` takes a copy of the inner evaluator.
    pub fn wrap(&self, clone: bool) -> Result<Self> {
        self.require(HandleKind::ObjectiveEvaluator)?;
        let ptr = native::call(|api| unsafe { (api.wrap_objective_evaluator_wila)(self.ptr(), clone) })?;
        Self::from_native(ptr, "WrapObjectiveEvaluatorWila")
    }
    pub fn unwrap_evaluator(&self) -> Result<Self> {
        self.require(HandleKind::ObjectiveEvaluatorWila)?;
        let ptr = native::call(|api| unsafe { (api.unwrap_objective_evaluator_wila)(self.ptr()) })?;
        Self::from_native_as(ptr, HandleKind::ObjectiveEvaluator, "UnwrapObjectiveEvaluatorWila")
    }
    fn require(&self, kind: HandleKind) -> Result<()> {
        let actual = self.handle().kind();
        if actual == kind {
            Ok(())
        } else {
            Err(SwiftError::TypeMismatch {
                expected: kind.type_tag(),
                actual,
            })
        }
    }
    /// Copy bound to another simulation, e.g. a clone of the original one.
    pub fn try_clone(&self, simulation: &Simulation) -> Result<Self> {
        let ptr = native::call(|api| unsafe { (api.clone_objective_evaluator)(self.ptr(), simulation.ptr()) })?;
        Self::from_native_as(ptr, self.handle().kind(), "CloneObjectiveEvaluator")
    }
    pub fn name(&self) -> Result<String> {
        native::call_string(|api| unsafe { (api.get_name_objective_evaluator)(self.ptr()) })
    }
    pub fn is_maximisable(&self) -> Result<bool> {
        native::call(|api| unsafe { (api.objective_evaluator_is_maximizable)(self.ptr()) })
    }
    /// Score with the simulation as currently configured; unwrapped evaluators only.
    pub fn evaluate_score(&self) -> Result<f64> {
        self.require(HandleKind::ObjectiveEvaluator)?;
        native::call(|api| unsafe { (api.evaluate_score)(self.ptr()) })
    }
    /// Single score after applying `parameters`; unwrapped evaluators only.
    pub fn evaluate_score_for(&self, parameters: &dyn Parameteriser, init_state: bool) -> Result<f64> {
        self.require(HandleKind::ObjectiveEvaluator)?;
        let p = parameters.handle().as_ptr();
        native::call(|api| unsafe {
            if init_state {
                (api.evaluate_score_for_parameters_init_state)(self.ptr(), p)
            } else {
                (api.evaluate_score_for_parameters)(self.ptr(), p)
            }
        })
    }
    /// Scores of `parameters`; with `init_state`, model states are initialised
    /// by the parameteriser before the run.
    pub fn get_score(&self, parameters: &dyn Parameteriser, init_state: bool) -> Result<ObjectiveScores> {
        let p = parameters.handle().as_ptr();
        let ptr = native::call(|api| unsafe {
            if init_state {
                (api.evaluate_score_for_parameters_wila_init_state)(self.ptr(), p)
            } else {
                (api.evaluate_score_for_parameters_wila)(self.ptr(), p)
            }
        })?;
        ObjectiveScores::from_native(ptr, "EvaluateScoreForParametersWila")
    }
    /// Named scores only, without the parameter set.
    pub fn get_scores(&self, parameters: &dyn Parameteriser) -> Result<BTreeMap<String, f64>> {
        let p = parameters.handle().as_ptr();
        let ptr = native::call(|api| unsafe { (api.evaluate_scores_for_parameters_wila)(self.ptr(), p) })?;
        let api = SwiftApi::instance()?;
        Ok(unsafe { marshal::take_named_values(api, ptr) }?.into_iter().collect())
    }
}
/// Plain data form of [`ObjectiveScores`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoresRecord {
    pub scores: BTreeMap<String, f64>,
    pub sys_config: Vec<ParameterSpec>,
}
impl ScoresRecord {
    /// Scores then parameter values in one flat map, as one row of a population table.
    pub fn flatten(&self) -> BTreeMap<String, f64> {
        let mut row = self.scores.clone();
        row.extend(self.sys_config.iter().map(|s| (s.name.clone(), s.value)));
        row
    }
}
impl ObjectiveScores {
    pub fn num_scores(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_scores_wila)(self.ptr()) })?.max(0) as usize)
    }
    /// Score names and values in native order.
    pub fn scores(&self) -> Result<Vec<(String, f64)>> {
        (0..self.num_scores()? as c_int)
            .map(|i| {
                let name = native::call_string(|api| unsafe { (api.get_score_name_wila)(self.ptr(), i) })?;
                let value = native::call(|api| unsafe { (api.get_score_wila)(self.ptr(), i) })?;
                Ok((name, value))
            })
            .collect()
    }
    pub fn score(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.scores()?.into_iter().find(|(n, _)| n == name).map(|(_, v)| v))
    }
    /// Parameter set these scores were obtained with.
    pub fn parameteriser(&self) -> Result<HypercubeParameteriser> {
        let ptr = native::call(|api| unsafe { (api.get_system_configuration_wila)(self.ptr()) })?;
        HypercubeParameteriser::from_native(ptr, "GetSystemConfigurationWila")
    }
    pub fn apply_sys_config(&self, simulation: &Simulation) -> Result<()> {
        self.parameteriser()?.apply_sys_config(simulation)
    }
    pub fn to_record(&self) -> Result<ScoresRecord> {
        Ok(ScoresRecord {
            scores: self.scores()?.into_iter().collect(),
            sys_config: self.parameteriser()?.as_specs()?,
        })
    }
}
impl VectorObjectiveScores {
    pub fn len(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_length_set_of_scores)(self.ptr()) })?.max(0) as usize)
    }
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
    /// Zero based.
    pub fn get(&self, index: usize) -> Result<ObjectiveScores> {
        SwiftError::check_index("score population", index, self.len()?)?;
        let ptr = native::call(|api| unsafe { (api.get_scores_at_index)(self.ptr(), index as c_int) })?;
        ObjectiveScores::from_native(ptr, "GetScoresAtIndex")
    }
    /// Sorted best first on the named score.
    pub fn sort_by_score(&self, score_name: &str) -> Result<VectorObjectiveScores> {
        let name = cstring(score_name)?;
        let ptr = native::call(|api| unsafe { (api.sort_set_of_scores_by)(self.ptr(), name.as_ptr()) })?;
        Self::from_native(ptr, "SortSetOfScoresBy")
    }
    pub fn best_score(&self, score_name: &str) -> Result<ObjectiveScores> {
        self.sort_by_score(score_name)?.get(0)
    }
    pub fn to_records(&self) -> Result<Vec<ScoresRecord>> {
        (0..self.len()?).map(|i| self.get(i)?.to_record()).collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NativeHandle;
    use crate::marshal::copy_string;
    use chrono::NaiveDate;
    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }
    fn spec(site: &str) -> StatisticSpec {
        StatisticSpec {
            model_var_id: format!("node.{site}.OutflowRate"),
            statistic_id: "log-likelihood".into(),
            objective_id: site.into(),
            objective_name: format!("{site} flow"),
            start: day(2),
            end: day(4),
        }
    }
    #[test]
    fn multisite_definition_points_at_owned_data() {
        let specs = vec![spec("n2"), spec("n4")];
        let obs = vec![
            TimeSeries::daily(day(1), vec![1.0, 2.0, 3.0]),
            TimeSeries::daily(day(1), vec![4.0, 5.0]),
        ];
        let mut buf = MultiStatisticBuffer::new(&specs, &obs).unwrap();
        let raw = unsafe { &*buf.as_mut_ptr() };
        assert_eq!(raw.size, 2);
        assert!(raw.mix_statistics_id.is_null());
        let second = unsafe { &**raw.statistics.add(1) };
        assert_eq!(unsafe { copy_string(second.objective_identifier) }.unwrap(), "n4");
        assert_eq!(unsafe { copy_string(second.statistic_identifier) }.unwrap(), "log-likelihood");
        assert_eq!(second.start.day, 2);
        let series = unsafe { &*second.observations };
        assert_eq!(series.ensemble_size, 1);
        assert_eq!(series.time_series_geometry.length, 2);
        let values = unsafe { std::slice::from_raw_parts(*series.numeric_data, 2) };
        assert_eq!(values, &[4.0, 5.0]);
    }
    #[test]
    fn multisite_definition_needs_one_series_per_statistic() {
        let obs = vec![TimeSeries::daily(day(1), vec![1.0])];
        let err = MultiStatisticBuffer::new(&[spec("n2"), spec("n4")], &obs).err().unwrap();
        assert!(matches!(err, SwiftError::LengthMismatch { expected: 2, actual: 1, .. }));
    }
    #[test]
    fn observations_are_windowed_to_the_statistic_period() {
        let obs = TimeSeries::daily(day(1), (1..=10).map(f64::from).collect());
        let (values, geom) = observation_window(&obs, day(3), day(5)).unwrap();
        assert_eq!(values, vec![3.0, 4.0, 5.0]);
        assert_eq!(geom.start.day, 3);
        assert_eq!(geom.length, 3);
    }
    #[test]
    fn evaluator_kinds() {
        let wrapped = ObjectiveEvaluator::try_from(NativeHandle::detached(HandleKind::ObjectiveEvaluatorWila)).unwrap();
        assert!(matches!(
            wrapped.evaluate_score(),
            Err(SwiftError::TypeMismatch { expected: "OBJECTIVE_EVALUATOR_PTR", .. })
        ));
        assert!(wrapped.wrap(false).is_err());
        let plain = ObjectiveEvaluator::try_from(NativeHandle::detached(HandleKind::ObjectiveEvaluator)).unwrap();
        assert!(plain.unwrap_evaluator().is_err());
        assert!(ObjectiveEvaluator::try_from(NativeHandle::detached(HandleKind::ObjectiveScores)).is_err());
    }
    #[test]
    fn composite_lengths_are_checked_first() {
        let a = ObjectiveEvaluator::try_from(NativeHandle::detached(HandleKind::ObjectiveEvaluator)).unwrap();
        let err = ObjectiveEvaluator::composite(&[&a], &[0.5, 0.5], &["nse"]).unwrap_err();
        assert!(matches!(err, SwiftError::LengthMismatch { what: "objective weights", .. }));
    }
    #[test]
    fn score_population_index_is_bounded() {
        assert!(SwiftError::check_index("score population", 2, 3).is_ok());
        let err = SwiftError::check_index("score population", 3, 3).unwrap_err();
        assert!(matches!(err, SwiftError::IndexOutOfRange { index: 3, len: 3, .. }));
        assert!(err.to_string().contains("score population of length 3"));
    }
    #[test]
    fn record_flattens_scores_and_parameters() {
        let record = ScoresRecord {
            scores: BTreeMap::from([("NSE".to_string(), 0.8)]),
            sys_config: vec![ParameterSpec::new("x1", 350.0, 1.0, 3000.0)],
        };
        let row = record.flatten();
        assert_eq!(row["NSE"], 0.8);
        assert_eq!(row["x1"], 350.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sys_config"][0]["Name"], "x1");
    }
    #[test]
    fn statistic_specs_read_from_json() {
        let json = r#"{"ModelVarId":"node.n2.OutflowRate","StatisticId":"nse",
            "ObjectiveId":"n2","ObjectiveName":"n2","Start":"2020-01-02T00:00:00","End":"2020-01-04T00:00:00"}"#;
        let s: StatisticSpec = serde_json::from_str(json).unwrap();
        assert_eq!(s.end, day(4));
    }
}
