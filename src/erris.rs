//! Estimation of ERRIS, MAERRIS and Dual-Pass error correction models.
//!
//! The staged estimators calibrate the error model in successive stages,
//! each stage starting from the parameters found by the previous one; the
//! one-shot functions run every stage in a single native call.
use crate::ensemble::EnsembleSimulation;
use crate::error::{Result, SwiftError};
use crate::handle::native_type;
use crate::marshal::cstring;
use crate::native::structs::{MarshaledDateTime, MarshaledTsGeometry};
use crate::native;
use crate::objectives::observation_window;
use crate::optimisation::{take_log, OptimisationLog, SceTerminationCondition, TerminationCriterion};
use crate::parameteriser::{HypercubeParameteriser, Parameteriser};
use crate::simulation::Simulation;
use crate::timeseries::TimeSeries;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_void};
native_type!(ErrisStagedCalibration, ErrisStagedCalibration);
native_type!(MaerrisStagedCalibration, MaerrisStagedCalibration);
/// Closed time interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
impl Period {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(SwiftError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }
    fn native(&self) -> (MarshaledDateTime, MarshaledDateTime) {
        (
            MarshaledDateTime::from_datetime(&self.start),
            MarshaledDateTime::from_datetime(&self.end),
        )
    }
}
/// Estimation period with the optional warmup and exclusion periods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPeriods {
    pub estimation: Period,
    #[serde(default)]
    pub warmup: Option<Period>,
    #[serde(default)]
    pub exclusion: Option<Period>,
}
struct NativePeriods {
    estimation: (MarshaledDateTime, MarshaledDateTime),
    warmup: (MarshaledDateTime, MarshaledDateTime, bool),
    exclusion: (MarshaledDateTime, MarshaledDateTime, bool),
}
impl CalibrationPeriods {
    pub fn new(estimation: Period) -> Self {
        Self {
            estimation,
            warmup: None,
            exclusion: None,
        }
    }
    pub fn with_warmup(mut self, warmup: Period) -> Self {
        self.warmup = Some(warmup);
        self
    }
    pub fn with_exclusion(mut self, exclusion: Period) -> Self {
        self.exclusion = Some(exclusion);
        self
    }
    // An absent period is sent as the estimation period with its flag off.
    fn native(&self) -> NativePeriods {
        let estimation = self.estimation.native();
        let optional = |p: Option<Period>| match p {
            Some(p) => {
                let (s, e) = p.native();
                (s, e, true)
            }
            None => (estimation.0, estimation.1, false),
        };
        NativePeriods {
            estimation,
            warmup: optional(self.warmup),
            exclusion: optional(self.exclusion),
        }
    }
}
/// Treatment of observations below a threshold as censored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Censoring {
    pub threshold: f64,
    pub option: f64,
}
impl Default for Censoring {
    /// No threshold, censoring option 2.
    fn default() -> Self {
        Self {
            threshold: 0.0,
            option: 2.0,
        }
    }
}
/// Termination condition passed to a native estimator, kept alive for the call.
struct TerminationArg {
    _owned: Option<SceTerminationCondition>,
    ptr: *mut c_void,
}
// Without a condition each optimisation runs for at most 0.05 hours.
fn termination_arg(termination: Option<&SceTerminationCondition>) -> Result<TerminationArg> {
    match termination {
        Some(t) => Ok(TerminationArg {
            _owned: None,
            ptr: t.ptr(),
        }),
        None => {
            let owned = TerminationCriterion::max_runtime().create()?;
            Ok(TerminationArg {
                ptr: owned.ptr(),
                _owned: Some(owned),
            })
        }
    }
}
fn optional_ptr(p: Option<&dyn Parameteriser>) -> *mut c_void {
    p.map_or(std::ptr::null_mut(), |p| p.handle().as_ptr())
}
fn full_series(series: &TimeSeries) -> Result<(Vec<f64>, MarshaledTsGeometry)> {
    Ok((series.values.clone(), series.geometry()?))
}
/// Inputs shared by the ERRIS and MAERRIS estimators.
pub struct ErrorModelTarget<'a> {
    pub simulation: &'a Simulation,
    pub observation: &'a TimeSeries,
    /// Network element carrying the error correction model.
    pub element_id: &'a str,
}
impl ErrisStagedCalibration {
    /// Staged ERRIS estimator; without a termination condition each stage runs for at most 0.05 hours.
    pub fn create(
        target: &ErrorModelTarget<'_>,
        estimation: Period,
        censoring: Censoring,
        termination: Option<&SceTerminationCondition>,
        restriction_on: bool,
        weighted_least_square: bool,
    ) -> Result<Self> {
        let (mut values, mut geom) = full_series(target.observation)?;
        let element = cstring(target.element_id)?;
        let termination = termination_arg(termination)?;
        let (start, end) = estimation.native();
        let ptr = native::call(|api| unsafe {
            (api.create_erris_parameter_estimator)(
                target.simulation.ptr(),
                values.as_mut_ptr(),
                &mut geom,
                element.as_ptr(),
                start,
                end,
                censoring.threshold,
                censoring.option,
                termination.ptr,
                restriction_on,
                weighted_least_square,
            )
        })?;
        Self::from_native(ptr, "CreateERRISParameterEstimator")
    }
    pub fn set_max_observation(&self, max_observation: f64) -> Result<()> {
        native::call(|api| unsafe { (api.set_erris_max_observation)(self.ptr(), max_observation) })
    }
}
impl MaerrisStagedCalibration {
    /// Staged MAERRIS estimator; `s2_window` is the window of the second stage, in time steps.
    pub fn create(
        target: &ErrorModelTarget<'_>,
        estimation: Period,
        s2_window: f64,
        censoring: Censoring,
        termination: Option<&SceTerminationCondition>,
        restriction_on: bool,
    ) -> Result<Self> {
        let (mut values, mut geom) = full_series(target.observation)?;
        let element = cstring(target.element_id)?;
        let termination = termination_arg(termination)?;
        let (start, end) = estimation.native();
        let ptr = native::call(|api| unsafe {
            (api.create_maerris_parameter_estimator)(
                target.simulation.ptr(),
                values.as_mut_ptr(),
                &mut geom,
                element.as_ptr(),
                start,
                end,
                s2_window,
                censoring.threshold,
                censoring.option,
                termination.ptr,
                restriction_on,
            )
        })?;
        Self::from_native(ptr, "CreateMAERRISParameterEstimator")
    }
    pub fn set_s2_window(&self, s2_window: f64) -> Result<()> {
        native::call(|api| unsafe { (api.set_maerris_s2_window)(self.ptr(), s2_window) })
    }
    pub fn set_max_observation(&self, max_observation: f64) -> Result<()> {
        native::call(|api| unsafe { (api.set_maerris_max_observation)(self.ptr(), max_observation) })
    }
    pub fn set_restriction_on(&self, restriction_on: bool) -> Result<()> {
        native::call(|api| unsafe { (api.set_maerris_restriction_on)(self.ptr(), restriction_on) })
    }
}
/// Results of the stages, for [`ErrisStagedCalibration::concatenate`].
pub struct StageResults<'a> {
    pub hydro: &'a dyn Parameteriser,
    pub stage1: &'a dyn Parameteriser,
    pub stage2: &'a dyn Parameteriser,
    pub stage3: &'a dyn Parameteriser,
    pub stage4a: &'a dyn Parameteriser,
    pub stage4b: &'a dyn Parameteriser,
}
// The staged calibrations differ only in the native entry points they call.
macro_rules! staged_calibration {
    ($name:ident, $label:literal, $prefix:ident) => {
        impl $name {
            pub fn set_hydrologic_parameter_space(&self, parameters: &dyn Parameteriser) -> Result<()> {
                let p = parameters.handle().as_ptr();
                native::call(|api| unsafe { (api_fn!(api, $prefix, hydrologic_parameter_space))(self.ptr(), p) })
            }
            pub fn set_error_correction_parameter_space(&self, parameters: &dyn Parameteriser) -> Result<()> {
                let p = parameters.handle().as_ptr();
                native::call(|api| unsafe {
                    (api_fn!(api, $prefix, error_correction_parameter_space))(self.ptr(), p)
                })
            }
            pub fn set_estimation_period(&self, period: Period) -> Result<()> {
                let (s, e) = period.native();
                native::call(|api| unsafe { (api_fn!(api, $prefix, estimation_period))(self.ptr(), s, e) })
            }
            pub fn set_warmup_period(&self, period: Period) -> Result<()> {
                let (s, e) = period.native();
                native::call(|api| unsafe { (api_fn!(api, $prefix, warmup_period))(self.ptr(), s, e) })
            }
            pub fn set_exclusion_period(&self, period: Period) -> Result<()> {
                let (s, e) = period.native();
                native::call(|api| unsafe { (api_fn!(api, $prefix, exclusion_period))(self.ptr(), s, e) })
            }
            pub fn remove_warmup_period(&self) -> Result<()> {
                native::call(|api| unsafe { (api_fn!(api, $prefix, remove_warmup_period))(self.ptr()) })
            }
            pub fn remove_exclusion_period(&self) -> Result<()> {
                native::call(|api| unsafe { (api_fn!(api, $prefix, remove_exclusion_period))(self.ptr()) })
            }
            pub fn set_censoring_option(&self, option: f64) -> Result<()> {
                native::call(|api| unsafe { (api_fn!(api, $prefix, cens_options))(self.ptr(), option) })
            }
            pub fn set_verbose_calibration(&self, verbose: bool) -> Result<()> {
                native::call(|api| unsafe { (api_fn!(api, $prefix, verbose_calibration))(self.ptr(), verbose) })
            }
            pub fn stage_one(&self) -> Result<HypercubeParameteriser> {
                log::debug!(concat!($label, " calibration stage 1"));
                let ptr = native::call(|api| unsafe { (api_fn!(api, $prefix, stage_one))(self.ptr()) })?;
                HypercubeParameteriser::from_native(ptr, concat!("Calibrate", $label, "StageOne"))
            }
            pub fn stage_two(&self, previous: &dyn Parameteriser) -> Result<HypercubeParameteriser> {
                log::debug!(concat!($label, " calibration stage 2"));
                let p = previous.handle().as_ptr();
                let ptr = native::call(|api| unsafe { (api_fn!(api, $prefix, stage_two))(self.ptr(), p) })?;
                HypercubeParameteriser::from_native(ptr, concat!("Calibrate", $label, "StageTwo"))
            }
            pub fn stage_three(&self, previous: &dyn Parameteriser) -> Result<HypercubeParameteriser> {
                log::debug!(concat!($label, " calibration stage 3"));
                let p = previous.handle().as_ptr();
                let ptr = native::call(|api| unsafe { (api_fn!(api, $prefix, stage_three))(self.ptr(), p) })?;
                HypercubeParameteriser::from_native(ptr, concat!("Calibrate", $label, "StageThree"))
            }
            /// Stage three for a multi-site error model.
            pub fn stage_three_ms(&self, previous: &dyn Parameteriser) -> Result<HypercubeParameteriser> {
                let p = previous.handle().as_ptr();
                let ptr =
                    native::call(|api| unsafe { (api_fn!(api, $prefix, stage_three_ms))(self.ptr(), p) })?;
                HypercubeParameteriser::from_native(ptr, concat!("Calibrate", $label, "StageThreeMS"))
            }
            /// Stage four, on the rising limb of the hydrograph if `use_rising`, else the falling one.
            pub fn stage_four(&self, previous: &dyn Parameteriser, use_rising: bool) -> Result<HypercubeParameteriser> {
                log::debug!(concat!($label, " calibration stage 4 (rising: {})"), use_rising);
                let p = previous.handle().as_ptr();
                let ptr = native::call(|api| unsafe {
                    (api_fn!(api, $prefix, stage_four))(self.ptr(), p, use_rising)
                })?;
                HypercubeParameteriser::from_native(ptr, concat!("Calibrate", $label, "StageFour"))
            }
            /// Combined parameter set of all stages.
            pub fn concatenate(&self, stages: &StageResults<'_>, long_parameter_names: bool) -> Result<HypercubeParameteriser> {
                let ptrs = [stages.hydro, stages.stage1, stages.stage2, stages.stage3, stages.stage4a, stages.stage4b]
                    .map(|p| p.handle().as_ptr());
                let ptr = native::call(|api| unsafe {
                    (api_fn!(api, $prefix, concatenate))(
                        self.ptr(),
                        ptrs[0],
                        ptrs[1],
                        ptrs[2],
                        ptrs[3],
                        ptrs[4],
                        ptrs[5],
                        long_parameter_names,
                    )
                })?;
                HypercubeParameteriser::from_native(ptr, concat!("Concatenate", $label, "StagesParameters"))
            }
            pub fn calibration_log(&self, add_numbering: bool) -> Result<OptimisationLog> {
                let ptr = native::call(|api| unsafe { (api_fn!(api, $prefix, log))(self.ptr()) })?;
                take_log(ptr, add_numbering, concat!("Get", $label, "CalibrationLog"))
            }
        }
    };
}
macro_rules! api_fn {
    ($api:ident, erris, hydrologic_parameter_space) => { $api.set_erris_hydrologic_parameter_space };
    ($api:ident, erris, error_correction_parameter_space) => { $api.set_erris_error_correction_parameter_space };
    ($api:ident, erris, estimation_period) => { $api.set_erris_estimation_period };
    ($api:ident, erris, warmup_period) => { $api.set_erris_warmup_period };
    ($api:ident, erris, exclusion_period) => { $api.set_erris_exclusion_period };
    ($api:ident, erris, remove_warmup_period) => { $api.remove_erris_warmup_period };
    ($api:ident, erris, remove_exclusion_period) => { $api.remove_erris_exclusion_period };
    ($api:ident, erris, cens_options) => { $api.set_erris_cens_options };
    ($api:ident, erris, verbose_calibration) => { $api.set_erris_verbose_calibration };
    ($api:ident, erris, stage_one) => { $api.calibrate_erris_stage_one };
    ($api:ident, erris, stage_two) => { $api.calibrate_erris_stage_two };
    ($api:ident, erris, stage_three) => { $api.calibrate_erris_stage_three };
    ($api:ident, erris, stage_three_ms) => { $api.calibrate_erris_stage_three_ms };
    ($api:ident, erris, stage_four) => { $api.calibrate_erris_stage_four };
    ($api:ident, erris, concatenate) => { $api.concatenate_erris_stages_parameters };
    ($api:ident, erris, log) => { $api.get_erris_calibration_log };
    ($api:ident, maerris, hydrologic_parameter_space) => { $api.set_maerris_hydrologic_parameter_space };
    ($api:ident, maerris, error_correction_parameter_space) => { $api.set_maerris_error_correction_parameter_space };
    ($api:ident, maerris, estimation_period) => { $api.set_maerris_estimation_period };
    ($api:ident, maerris, warmup_period) => { $api.set_maerris_warmup_period };
    ($api:ident, maerris, exclusion_period) => { $api.set_maerris_exclusion_period };
    ($api:ident, maerris, remove_warmup_period) => { $api.remove_maerris_warmup_period };
    ($api:ident, maerris, remove_exclusion_period) => { $api.remove_maerris_exclusion_period };
    ($api:ident, maerris, cens_options) => { $api.set_maerris_cens_options };
    ($api:ident, maerris, verbose_calibration) => { $api.set_maerris_verbose_calibration };
    ($api:ident, maerris, stage_one) => { $api.calibrate_maerris_stage_one };
    ($api:ident, maerris, stage_two) => { $api.calibrate_maerris_stage_two };
    ($api:ident, maerris, stage_three) => { $api.calibrate_maerris_stage_three };
    ($api:ident, maerris, stage_three_ms) => { $api.calibrate_maerris_stage_three_ms };
    ($api:ident, maerris, stage_four) => { $api.calibrate_maerris_stage_four };
    ($api:ident, maerris, concatenate) => { $api.concatenate_maerris_stages_parameters };
    ($api:ident, maerris, log) => { $api.get_maerris_calibration_log };
}
staged_calibration!(ErrisStagedCalibration, "ERRIS", erris);
staged_calibration!(MaerrisStagedCalibration, "MAERRIS", maerris);
/// Starting points and options of a one-shot estimation.
#[derive(Default)]
pub struct EstimationOptions<'a> {
    pub censoring: Censoring,
    pub termination: Option<&'a SceTerminationCondition>,
    /// Hydrological parameters to calibrate along with the error model.
    pub hydro_parameters: Option<&'a dyn Parameteriser>,
    /// Initial error model parameters.
    pub error_parameters: Option<&'a dyn Parameteriser>,
    pub restriction_on: bool,
}
impl<'a> EstimationOptions<'a> {
    pub fn new() -> Self {
        Self {
            restriction_on: true,
            ..Default::default()
        }
    }
}
/// Runs every ERRIS stage and returns the estimated parameters.
pub fn estimate_erris_parameters(
    target: &ErrorModelTarget<'_>,
    periods: &CalibrationPeriods,
    options: &EstimationOptions<'_>,
    weighted_least_square: bool,
) -> Result<HypercubeParameteriser> {
    let (mut values, mut geom) = full_series(target.observation)?;
    let element = cstring(target.element_id)?;
    let termination = termination_arg(options.termination)?;
    let p = periods.native();
    log::info!("estimating ERRIS parameters for {}", target.element_id);
    let ptr = native::call(|api| unsafe {
        (api.estimate_erris_parameters)(
            target.simulation.ptr(),
            values.as_mut_ptr(),
            &mut geom,
            element.as_ptr(),
            p.warmup.0,
            p.warmup.1,
            p.warmup.2,
            p.estimation.0,
            p.estimation.1,
            options.censoring.threshold,
            options.censoring.option,
            p.exclusion.0,
            p.exclusion.1,
            p.exclusion.2,
            termination.ptr,
            optional_ptr(options.error_parameters),
            optional_ptr(options.hydro_parameters),
            options.restriction_on,
            weighted_least_square,
        )
    })?;
    HypercubeParameteriser::from_native(ptr, "EstimateERRISParameters")
}
/// Runs every MAERRIS stage and returns the estimated parameters.
pub fn estimate_maerris_parameters(
    target: &ErrorModelTarget<'_>,
    periods: &CalibrationPeriods,
    s2_window: f64,
    options: &EstimationOptions<'_>,
) -> Result<HypercubeParameteriser> {
    let (mut values, mut geom) = full_series(target.observation)?;
    let element = cstring(target.element_id)?;
    let termination = termination_arg(options.termination)?;
    let p = periods.native();
    log::info!("estimating MAERRIS parameters for {}", target.element_id);
    let ptr = native::call(|api| unsafe {
        (api.estimate_maerris_parameters)(
            target.simulation.ptr(),
            values.as_mut_ptr(),
            &mut geom,
            element.as_ptr(),
            p.warmup.0,
            p.warmup.1,
            p.warmup.2,
            p.estimation.0,
            p.estimation.1,
            s2_window,
            options.censoring.threshold,
            options.censoring.option,
            p.exclusion.0,
            p.exclusion.1,
            p.exclusion.2,
            termination.ptr,
            optional_ptr(options.error_parameters),
            optional_ptr(options.hydro_parameters),
            options.restriction_on,
        )
    })?;
    HypercubeParameteriser::from_native(ptr, "EstimateMAERRISParameters")
}
/// Windows of the Dual-Pass error correction, in time steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualPassWindows {
    pub window_l: i32,
    pub window_decay_l: i32,
    pub window_decay_s: i32,
    pub use_long_pass: bool,
}
pub fn estimate_dual_pass_parameters(
    target: &ErrorModelTarget<'_>,
    periods: &CalibrationPeriods,
    windows: DualPassWindows,
    objective_yaml: &str,
    termination: Option<&SceTerminationCondition>,
) -> Result<HypercubeParameteriser> {
    let (mut values, mut geom) = full_series(target.observation)?;
    let element = cstring(target.element_id)?;
    let objective = cstring(objective_yaml)?;
    let termination = termination_arg(termination)?;
    let p = periods.native();
    let ptr = native::call(|api| unsafe {
        (api.estimate_dual_pass_parameters)(
            target.simulation.ptr(),
            values.as_mut_ptr(),
            &mut geom,
            element.as_ptr(),
            p.warmup.0,
            p.warmup.1,
            p.warmup.2,
            p.estimation.0,
            p.estimation.1,
            windows.window_l,
            windows.window_decay_l,
            windows.window_decay_s,
            windows.use_long_pass,
            objective.as_ptr() as *mut c_char,
            p.exclusion.0,
            p.exclusion.1,
            p.exclusion.2,
            termination.ptr,
        )
    })?;
    HypercubeParameteriser::from_native(ptr, "EstimateDualPassParameters")
}
/// Parameters of the log-sinh transformation of `observation` for a log-likelihood objective.
pub fn estimate_transformation_parameters(
    observation: &TimeSeries,
    estimation: Period,
    exclusion: Option<Period>,
    censor_threshold: f64,
    termination: Option<&SceTerminationCondition>,
) -> Result<HypercubeParameteriser> {
    let (mut values, mut geom) = full_series(observation)?;
    let p = CalibrationPeriods {
        estimation,
        warmup: None,
        exclusion,
    }
    .native();
    let termination = termination_arg(termination)?;
    let ptr = native::call(|api| unsafe {
        (api.estimate_transformation_parameters)(
            values.as_mut_ptr(),
            &mut geom,
            p.estimation.0,
            p.estimation.1,
            censor_threshold,
            Censoring::default().option,
            p.exclusion.0,
            p.exclusion.1,
            p.exclusion.2,
            termination.ptr,
        )
    })?;
    HypercubeParameteriser::from_native(ptr, "EstimateTransformationParameters")
}
/// As [`estimate_transformation_parameters`], from a caller supplied parameter space.
pub fn estimate_transformation_parameters_ms(
    observation: &TimeSeries,
    estimation: Period,
    exclusion: Option<Period>,
    parameters: &dyn Parameteriser,
    termination: Option<&SceTerminationCondition>,
) -> Result<HypercubeParameteriser> {
    let (mut values, mut geom) = full_series(observation)?;
    let p = CalibrationPeriods {
        estimation,
        warmup: None,
        exclusion,
    }
    .native();
    let termination = termination_arg(termination)?;
    let params = parameters.handle().as_ptr();
    let ptr = native::call(|api| unsafe {
        (api.estimate_transformation_parameters_ms)(
            values.as_mut_ptr(),
            &mut geom,
            p.estimation.0,
            p.estimation.1,
            p.exclusion.0,
            p.exclusion.1,
            p.exclusion.2,
            termination.ptr,
            params,
        )
    })?;
    HypercubeParameteriser::from_native(ptr, "EstimateTransformationParametersMS")
}
impl Simulation {
    /// Ensemble simulation with an ERRIS model on `element_id`, warmed up over `warmup`.
    pub fn prepare_erris_forecasting(
        &self,
        observation: &TimeSeries,
        element_id: &str,
        warmup: Period,
    ) -> Result<EnsembleSimulation> {
        let (mut values, mut geom) = observation_window(observation, warmup.start, warmup.end)?;
        let element = cstring(element_id)?;
        let (start, end) = warmup.native();
        let ptr = native::call(|api| unsafe {
            (api.prepare_erris_forecasting)(self.ptr(), values.as_mut_ptr(), &mut geom, element.as_ptr(), start, end)
        })?;
        EnsembleSimulation::from_native(ptr, "PrepareERRISForecasting")
    }
    /// Ensemble simulation with a Dual-Pass model on `element_id`.
    pub fn prepare_dual_pass_forecasting(
        &self,
        observation: &TimeSeries,
        element_id: &str,
        warmup: Period,
        required_windows_percentage: f64,
    ) -> Result<EnsembleSimulation> {
        let (mut values, mut geom) = observation_window(observation, warmup.start, warmup.end)?;
        let element = cstring(element_id)?;
        let (start, end) = warmup.native();
        let ptr = native::call(|api| unsafe {
            (api.prepare_dual_pass_forecasting)(
                self.ptr(),
                values.as_mut_ptr(),
                &mut geom,
                element.as_ptr(),
                start,
                end,
                required_windows_percentage,
            )
        })?;
        EnsembleSimulation::from_native(ptr, "PrepareDualPassForecasting")
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{HandleKind, NativeHandle};
    use chrono::NaiveDate;
    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2000, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }
    #[test]
    fn periods_must_be_ordered() {
        assert!(Period::new(day(1), day(1)).is_ok());
        let err = Period::new(day(5), day(2)).unwrap_err();
        assert!(matches!(err, SwiftError::InvalidPeriod { .. }));
    }
    #[test]
    fn absent_periods_are_flagged_off() {
        let estimation = Period::new(day(10), day(20)).unwrap();
        let p = CalibrationPeriods::new(estimation).native();
        assert!(!p.warmup.2);
        assert!(!p.exclusion.2);
        assert_eq!(p.warmup.0, p.estimation.0);
        let with = CalibrationPeriods::new(estimation)
            .with_warmup(Period::new(day(1), day(9)).unwrap())
            .native();
        assert!(with.warmup.2);
        assert_eq!(with.warmup.1.day, 9);
        assert!(!with.exclusion.2);
    }
    #[test]
    fn periods_read_from_json() {
        let json = r#"{"estimation": {"start": "2000-01-10T00:00:00", "end": "2000-01-20T00:00:00"}}"#;
        let periods: CalibrationPeriods = serde_json::from_str(json).unwrap();
        assert_eq!(periods.estimation.end, day(20));
        assert!(periods.warmup.is_none());
    }
    #[test]
    fn estimation_defaults() {
        let options = EstimationOptions::new();
        assert!(options.restriction_on);
        assert_eq!(options.censoring, Censoring { threshold: 0.0, option: 2.0 });
        assert!(optional_ptr(options.hydro_parameters).is_null());
    }
    #[test]
    fn staged_calibrations_check_their_kind() {
        assert!(ErrisStagedCalibration::try_from(NativeHandle::detached(HandleKind::ErrisStagedCalibration)).is_ok());
        let err = MaerrisStagedCalibration::try_from(NativeHandle::detached(HandleKind::ErrisStagedCalibration))
            .unwrap_err();
        assert!(matches!(err, SwiftError::TypeMismatch { .. }));
    }
}
