//! Ensemble runs templated on a [`Simulation`].
use crate::erris::Period;
use crate::error::{Result, SwiftError};
use crate::handle::native_type;
use crate::marshal::cstring;
use crate::native::{self, structs::MarshaledDateTime};
use crate::simulation::Simulation;
use crate::timeseries::TimeSeries;
use chrono::NaiveDateTime;
use ndarray::Array2;
use std::os::raw::c_int;
native_type!(
    /// Runs a simulation over ensembles of inputs for one forecast time.
    EnsembleSimulation,
    EnsembleSimulation
);
native_type!(
    /// Successive ensemble forecasts issued at a regular interval over a span.
    EnsembleForecastSimulation,
    EnsembleForecastSimulation
);
fn to_c_int(what: &'static str, n: usize) -> Result<c_int> {
    c_int::try_from(n).map_err(|_| SwiftError::LengthMismatch {
        what,
        expected: c_int::MAX as usize,
        actual: n,
    })
}
impl Simulation {
    pub fn ensemble_simulation(&self, ensemble_size: usize) -> Result<EnsembleSimulation> {
        let size = to_c_int("ensemble size", ensemble_size)?;
        let ptr = native::call(|api| unsafe { (api.create_ensemble_model_runner)(self.ptr(), size) })?;
        EnsembleSimulation::from_native(ptr, "CreateEnsembleModelRunner")
    }
    /// Ensemble simulation with an ERRIS model on `element_id`, warmed up against `observation`.
    pub fn erris_ensemble_simulation(
        &self,
        warmup: Period,
        observation: &TimeSeries,
        element_id: &str,
    ) -> Result<EnsembleSimulation> {
        let mut values = observation.values.clone();
        let mut geom = observation.geometry()?;
        let element = cstring(element_id)?;
        let (start, end) = (
            MarshaledDateTime::from_datetime(&warmup.start),
            MarshaledDateTime::from_datetime(&warmup.end),
        );
        let ptr = native::call(|api| unsafe {
            (api.prepare_ensemble_model_runner)(self.ptr(), start, end, values.as_mut_ptr(), &mut geom, element.as_ptr())
        })?;
        EnsembleSimulation::from_native(ptr, "PrepareEnsembleModelRunner")
    }
    /// Forecasts of `lead_time` steps issued every `steps_between_forecasts` steps from `start`.
    pub fn ensemble_forecast_simulation(
        &self,
        start: NaiveDateTime,
        lead_time: usize,
        ensemble_size: usize,
        simulation_length: usize,
        steps_between_forecasts: usize,
    ) -> Result<EnsembleForecastSimulation> {
        let start = MarshaledDateTime::from_datetime(&start);
        let lead = to_c_int("lead time", lead_time)?;
        let size = to_c_int("ensemble size", ensemble_size)?;
        let length = to_c_int("simulation length", simulation_length)?;
        let between = to_c_int("steps between forecasts", steps_between_forecasts)?;
        log::debug!("ensemble forecast simulation: {ensemble_size} members, lead time {lead_time}");
        let ptr = native::call(|api| unsafe {
            (api.create_ensemble_forecast_simulation)(self.ptr(), start, lead, size, length, between)
        })?;
        EnsembleForecastSimulation::from_native(ptr, "CreateEnsembleForecastSimulation")
    }
}
impl EnsembleSimulation {
    pub fn setup(&self, forecast_start: NaiveDateTime, ensemble_size: usize, horizon_length: usize) -> Result<()> {
        let start = MarshaledDateTime::from_datetime(&forecast_start);
        let size = to_c_int("ensemble size", ensemble_size)?;
        let horizon = to_c_int("forecast horizon", horizon_length)?;
        native::call(|api| unsafe { (api.setup_ensemble_model_runner)(self.ptr(), start, size, horizon) })
    }
    pub fn record(&self, var_id: &str) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.record_ensemble_model_runner)(self.ptr(), id.as_ptr()) })
    }
}
/// Lays out member rows as an ensemble by lead time block.
fn ensemble_block(rows: &[Vec<f64>], lead_length: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows.len(), lead_length), |(member, lead)| rows[member][lead])
}
impl EnsembleForecastSimulation {
    pub fn execute(&self) -> Result<()> {
        native::call(|api| unsafe { (api.execute_ensemble_forecast_simulation)(self.ptr()) })
    }
    /// Number of time steps of each forecast.
    pub fn lead_length(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_ensemble_forecast_lead_length)(self.ptr()) })?.max(0) as usize)
    }
    pub fn ensemble_size(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_ensemble_forecast_ensemble_size)(self.ptr()) })?.max(0) as usize)
    }
    pub fn record(&self, var_id: &str) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.record_ensemble_forecast_time_series)(self.ptr(), id.as_ptr()) })
    }
    /// Trace of one member of the forecast issued at `forecast_index`.
    pub fn recorded_member(&self, var_id: &str, forecast_index: usize, member: usize) -> Result<Vec<f64>> {
        let id = cstring(var_id)?;
        let index = to_c_int("forecast index", forecast_index)?;
        let member = to_c_int("ensemble member", member)?;
        let mut values = vec![f64::NAN; self.lead_length()?];
        native::call(|api| unsafe {
            (api.get_ensemble_forecast_single_recorded)(self.ptr(), id.as_ptr(), index, member, values.as_mut_ptr())
        })?;
        Ok(values)
    }
    /// All members of the forecast issued at `forecast_index`, one row per member.
    pub fn recorded_ensemble(&self, var_id: &str, forecast_index: usize) -> Result<Array2<f64>> {
        let id = cstring(var_id)?;
        let index = to_c_int("forecast index", forecast_index)?;
        let lead_length = self.lead_length()?;
        let mut rows = vec![vec![f64::NAN; lead_length]; self.ensemble_size()?];
        let mut ptrs: Vec<*mut f64> = rows.iter_mut().map(|r| r.as_mut_ptr()).collect();
        native::call(|api| unsafe {
            (api.get_ensemble_forecast_ensemble_recorded)(self.ptr(), id.as_ptr(), index, ptrs.as_mut_ptr())
        })?;
        Ok(ensemble_block(&rows, lead_length))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{HandleKind, NativeHandle};
    #[test]
    fn members_become_rows() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let block = ensemble_block(&rows, 3);
        assert_eq!(block.shape(), &[2, 3]);
        assert_eq!(block[[1, 0]], 4.0);
        assert_eq!(block.row(0).to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ensemble_block(&[], 5).shape(), &[0, 5]);
    }
    #[test]
    fn oversized_counts_are_rejected() {
        assert_eq!(to_c_int("ensemble size", 100).unwrap(), 100);
        let err = to_c_int("ensemble size", usize::MAX).unwrap_err();
        assert!(matches!(err, SwiftError::LengthMismatch { what: "ensemble size", .. }));
    }
    #[test]
    fn ensemble_kinds_are_distinct() {
        assert!(EnsembleSimulation::try_from(NativeHandle::detached(HandleKind::EnsembleSimulation)).is_ok());
        assert!(EnsembleForecastSimulation::try_from(NativeHandle::detached(HandleKind::EnsembleSimulation)).is_err());
    }
}
