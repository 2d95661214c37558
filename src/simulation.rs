use crate::error::{Result, SwiftError};
use crate::handle::native_type;
use crate::marshal::{self, cstring, CStringArray};
use crate::native::{self, structs::{MarshaledDateTime, MarshaledTsGeometry}};
use crate::timeseries::TimeSeries;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::os::raw::c_int;
use std::path::Path;
use std::str::FromStr;
/// Outflow of the whole catchment, the usual calibration target.
pub const CATCHMENT_FLOWRATE_VARID: &str = "Catchment.StreamflowRate";
/// Joins identifier parts with the engine's `.` separator.
pub fn make_id(parts: &[&str]) -> String {
    parts.join(".")
}
native_type!(
    /// A catchment model instance: topology, model assignments, span and
    /// the time series played into or recorded from it.
    Simulation,
    Simulation
);
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimulationSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_step: String,
}
/// Which model structure [`Simulation::swap_model`] replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelSlot {
    Runoff,
    ChannelRouting,
}
impl FromStr for ModelSlot {
    type Err = SwiftError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "runoff" => Ok(ModelSlot::Runoff),
            "channel_routing" => Ok(ModelSlot::ChannelRouting),
            other => Err(SwiftError::unknown("model slot", other)),
        }
    }
}
/// A model state value of one of the three types the engine stores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Double(f64),
    Int(i32),
    Bool(bool),
}
impl From<f64> for StateValue {
    fn from(v: f64) -> Self {
        StateValue::Double(v)
    }
}
impl From<i32> for StateValue {
    fn from(v: i32) -> Self {
        StateValue::Int(v)
    }
}
impl From<bool> for StateValue {
    fn from(v: bool) -> Self {
        StateValue::Bool(v)
    }
}
/// Identifier to display name maps for each element type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimulationDescription {
    pub subareas: BTreeMap<String, String>,
    pub nodes: BTreeMap<String, String>,
    pub links: BTreeMap<String, String>,
}
impl Simulation {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SwiftError::FileNotFound(path.to_path_buf()));
        }
        let c_path = cstring(&path.to_string_lossy())?;
        let ptr = native::call(|api| unsafe { (api.load_model_simulation_from_json)(c_path.as_ptr()) })?;
        Self::from_native(ptr, "LoadModelSimulationFromJson")
    }
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let c_path = cstring(&path.as_ref().to_string_lossy())?;
        native::call(|api| unsafe { (api.save_model_simulation_to_json)(self.ptr(), c_path.as_ptr()) })
    }
    /// Single-subarea simulation with the given runoff model.
    pub fn create_subarea(model_id: &str, area_km2: f64) -> Result<Self> {
        let model = cstring(model_id)?;
        let ptr = native::call(|api| unsafe { (api.create_subarea)(model.as_ptr(), area_km2) })?;
        Self::from_native(ptr, "CreateSubarea")
    }
    /// Deep copy of the native model.
    pub fn try_clone(&self) -> Result<Self> {
        let ptr = native::call(|api| unsafe { (api.clone_model)(self.ptr()) })?;
        Self::from_native(ptr, "CloneModel")
    }
    pub fn span(&self) -> Result<SimulationSpan> {
        let mut start = MarshaledDateTime::default();
        let mut end = MarshaledDateTime::default();
        native::call(|api| unsafe {
            (api.get_start)(self.ptr(), &mut start);
            (api.get_end)(self.ptr(), &mut end);
        })?;
        let time_step = self.time_step_name()?;
        Ok(SimulationSpan {
            start: start.to_datetime()?,
            end: end.to_datetime()?,
            time_step,
        })
    }
    pub fn set_span(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
        let (s, e) = (
            MarshaledDateTime::from_datetime(&start),
            MarshaledDateTime::from_datetime(&end),
        );
        native::call(|api| unsafe { (api.set_span)(self.ptr(), s, e) })
    }
    /// Sets the time step by name, e.g. `daily` or `hourly`; case insensitive.
    pub fn set_time_step(&self, name: &str) -> Result<()> {
        let name = cstring(&name.to_lowercase())?;
        native::call(|api| unsafe { (api.set_time_step)(self.ptr(), name.as_ptr()) })
    }
    pub fn time_step_name(&self) -> Result<String> {
        native::call_string(|api| unsafe { (api.get_time_step_name)(self.ptr()) })
    }
    pub fn num_steps(&self) -> Result<usize> {
        let n = native::call(|api| unsafe { (api.get_num_steps)(self.ptr()) })?;
        Ok(n.max(0) as usize)
    }
    pub fn num_steps_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<usize> {
        let (s, e) = (
            MarshaledDateTime::from_datetime(&start),
            MarshaledDateTime::from_datetime(&end),
        );
        let n = native::call(|api| unsafe { (api.get_num_steps_for_time_span)(self.ptr(), s, e) })?;
        Ok(n.max(0) as usize)
    }
    pub fn exec_simulation(&self, reset_initial_states: bool) -> Result<()> {
        log::debug!("executing simulation (reset states: {reset_initial_states})");
        native::call(|api| unsafe { (api.execute_simulation)(self.ptr(), reset_initial_states) })
    }
    /// Configuration problems preventing execution; empty when runnable.
    pub fn check_simulation(&self) -> Result<Vec<String>> {
        native::call_strings(|api, size| unsafe { (api.check_simulation_errors)(self.ptr(), size) })
    }
    pub fn reset_model_states(&self) -> Result<()> {
        native::call(|api| unsafe { (api.reset_model_states)(self.ptr()) })
    }
    /// Clone of this simulation using another model in the given slot.
    pub fn swap_model(&self, model_id: &str, slot: ModelSlot) -> Result<Simulation> {
        let model = cstring(model_id)?;
        match slot {
            ModelSlot::Runoff => {
                let ptr = native::call(|api| unsafe { (api.swap_runoff_model)(self.ptr(), model.as_ptr()) })?;
                Self::from_native(ptr, "SwapRunoffModel")
            }
            ModelSlot::ChannelRouting => {
                let cloned = self.try_clone()?;
                native::call(|api| unsafe {
                    (api.set_channel_routing_model)(cloned.ptr(), model.as_ptr())
                })?;
                Ok(cloned)
            }
        }
    }
    pub fn set_error_correction_model(
        &self,
        model_id: &str,
        element_id: &str,
        length: i32,
        seed: i32,
    ) -> Result<()> {
        let (model, element) = (cstring(model_id)?, cstring(element_id)?);
        native::call(|api| unsafe {
            (api.set_error_correction_model)(self.ptr(), model.as_ptr(), element.as_ptr(), length, seed)
        })
    }
    pub fn set_seed_for_model(&self, model_object_id: &str, seed: i32) -> Result<()> {
        let id = cstring(model_object_id)?;
        native::call(|api| unsafe { (api.set_seed_for_model)(self.ptr(), id.as_ptr(), seed) })
    }
    /// `model_id` is e.g. `ControlledReleaseReservoir` or `LevelVolumeAreaReservoir`.
    pub fn set_reservoir_model(&self, model_id: &str, element_id: &str) -> Result<()> {
        let (model, element) = (cstring(model_id)?, cstring(element_id)?);
        native::call(|api| unsafe {
            (api.set_reservoir_model)(self.ptr(), model.as_ptr(), element.as_ptr())
        })
    }
    pub fn set_reservoir_geometry(
        &self,
        element_id: &str,
        level: &[f64],
        storage: &[f64],
        area: &[f64],
    ) -> Result<()> {
        SwiftError::check_len("reservoir storage", level.len(), storage.len())?;
        SwiftError::check_len("reservoir area", level.len(), area.len())?;
        let element = cstring(element_id)?;
        let (mut level, mut storage, mut area) = (level.to_vec(), storage.to_vec(), area.to_vec());
        native::call(|api| unsafe {
            (api.set_reservoir_geometry)(
                self.ptr(),
                element.as_ptr(),
                level.len() as c_int,
                level.as_mut_ptr(),
                storage.as_mut_ptr(),
                area.as_mut_ptr(),
            )
        })
    }
    pub fn set_reservoir_min_discharge(&self, element_id: &str, level: &[f64], discharge: &[f64]) -> Result<()> {
        self.set_level_discharge(element_id, level, discharge, LevelDischarge::Min)
    }
    pub fn set_reservoir_max_discharge(&self, element_id: &str, level: &[f64], discharge: &[f64]) -> Result<()> {
        self.set_level_discharge(element_id, level, discharge, LevelDischarge::Max)
    }
    pub fn set_reservoir_ops_release_curve(&self, element_id: &str, level: &[f64], discharge: &[f64]) -> Result<()> {
        self.set_level_discharge(element_id, level, discharge, LevelDischarge::OpsRelease)
    }
    fn set_level_discharge(
        &self,
        element_id: &str,
        level: &[f64],
        discharge: &[f64],
        which: LevelDischarge,
    ) -> Result<()> {
        SwiftError::check_len("reservoir discharge", level.len(), discharge.len())?;
        let element = cstring(element_id)?;
        let (mut level, mut discharge) = (level.to_vec(), discharge.to_vec());
        let n = level.len() as c_int;
        native::call(|api| {
            let f = match which {
                LevelDischarge::Min => api.set_reservoir_min_discharge,
                LevelDischarge::Max => api.set_reservoir_max_discharge,
                LevelDischarge::OpsRelease => api.set_reservoir_ops_release_curve,
            };
            unsafe { f(self.ptr(), element.as_ptr(), n, level.as_mut_ptr(), discharge.as_mut_ptr()) }
        })
    }
    pub fn remove_storage_discharge_relationship(&self, element_id: &str, relationship_type: &str) -> Result<()> {
        let (element, kind) = (cstring(element_id)?, cstring(relationship_type)?);
        native::call(|api| unsafe {
            (api.remove_storage_discharge_relationship)(self.ptr(), element.as_ptr(), kind.as_ptr())
        })
    }
    pub fn set_runoff_post_processing_model(&self, model_id: &str, element_id: &str) -> Result<()> {
        let (model, element) = (cstring(model_id)?, cstring(element_id)?);
        native::call(|api| unsafe {
            (api.set_runoff_post_processing_model)(self.ptr(), model.as_ptr(), element.as_ptr())
        })
    }
    pub fn set_subarea_inputs_preprocessor_model(&self, model_id: &str, subarea_id: &str) -> Result<()> {
        let (model, subarea) = (cstring(model_id)?, cstring(subarea_id)?);
        native::call(|api| unsafe {
            (api.set_subarea_inputs_preprocessor_model)(self.ptr(), model.as_ptr(), subarea.as_ptr())
        })
    }
    pub fn wire_subarea_inputs_preprocessor_model(
        &self,
        from_output: &str,
        to_input: &str,
        subarea_id: &str,
    ) -> Result<()> {
        let (from, to, subarea) = (cstring(from_output)?, cstring(to_input)?, cstring(subarea_id)?);
        native::call(|api| unsafe {
            (api.wire_subarea_inputs_preprocessor_model)(self.ptr(), from.as_ptr(), to.as_ptr(), subarea.as_ptr())
        })
    }
    pub fn remove_model(&self, full_model_id: &str) -> Result<()> {
        let id = cstring(full_model_id)?;
        native::call(|api| unsafe { (api.remove_model)(self.ptr(), id.as_ptr()) })
    }
    pub fn link_names(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_link_names)(self.ptr(), n) })
    }
    pub fn node_names(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_node_names)(self.ptr(), n) })
    }
    pub fn subarea_names(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_subarea_names)(self.ptr(), n) })
    }
    pub fn link_ids(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_link_identifiers)(self.ptr(), n) })
    }
    pub fn node_ids(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_node_identifiers)(self.ptr(), n) })
    }
    pub fn subarea_ids(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_subarea_identifiers)(self.ptr(), n) })
    }
    pub fn num_links(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_links)(self.ptr()) })?.max(0) as usize)
    }
    pub fn num_nodes(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_nodes)(self.ptr()) })?.max(0) as usize)
    }
    pub fn num_subareas(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_subareas)(self.ptr()) })?.max(0) as usize)
    }
    /// Variable identifiers of an element, or of the simulation when `element_id` is `None`.
    /// With `full_id`, each is prefixed by the element identifier.
    pub fn variable_ids(&self, element_id: Option<&str>, full_id: bool) -> Result<Vec<String>> {
        let element = element_id.map(cstring).transpose()?;
        let element_ptr = element.as_ref().map_or(std::ptr::null(), |e| e.as_ptr());
        let ids = native::call_strings(|api, n| unsafe {
            (api.get_element_var_identifiers)(self.ptr(), element_ptr, n)
        })?;
        Ok(match element_id {
            Some(prefix) if full_id => ids.iter().map(|v| make_id(&[prefix, v])).collect(),
            _ => ids,
        })
    }
    pub fn is_variable_id(&self, var_id: &str) -> Result<bool> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.is_valid_variable_identifier)(self.ptr(), id.as_ptr()) })
    }
    pub fn state_value(&self, var_id: &str) -> Result<f64> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.get_variable)(self.ptr(), id.as_ptr()) })
    }
    /// Reads a state with the type the engine stores it as.
    pub fn typed_state_value(&self, var_id: &str) -> Result<StateValue> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe {
            let p = self.ptr();
            if (api.variable_is_bool)(p, id.as_ptr()) {
                StateValue::Bool((api.get_variable_bool)(p, id.as_ptr()))
            } else if (api.variable_is_int)(p, id.as_ptr()) {
                StateValue::Int((api.get_variable_int)(p, id.as_ptr()))
            } else {
                StateValue::Double((api.get_variable)(p, id.as_ptr()))
            }
        })
    }
    pub fn state_values<S: AsRef<str>>(&self, var_ids: &[S]) -> Result<BTreeMap<String, f64>> {
        var_ids
            .iter()
            .map(|v| Ok((v.as_ref().to_string(), self.state_value(v.as_ref())?)))
            .collect()
    }
    pub fn set_state_value(&self, var_id: &str, value: impl Into<StateValue>) -> Result<()> {
        let id = cstring(var_id)?;
        let value = value.into();
        native::call(|api| unsafe {
            match value {
                StateValue::Double(v) => (api.set_variable)(self.ptr(), id.as_ptr(), v),
                StateValue::Int(v) => (api.set_variable_int)(self.ptr(), id.as_ptr(), v),
                StateValue::Bool(v) => (api.set_variable_bool)(self.ptr(), id.as_ptr(), v),
            }
        })
    }
    pub fn set_state_values<S: AsRef<str>>(&self, values: &[(S, StateValue)]) -> Result<()> {
        values
            .iter()
            .try_for_each(|(id, v)| self.set_state_value(id.as_ref(), *v))
    }
    pub fn describe(&self) -> Result<SimulationDescription> {
        let zip = |ids: Vec<String>, names: Vec<String>| -> Result<BTreeMap<String, String>> {
            SwiftError::check_len("element names", ids.len(), names.len())?;
            Ok(ids.into_iter().zip(names).collect())
        };
        Ok(SimulationDescription {
            subareas: zip(self.subarea_ids()?, self.subarea_names()?)?,
            nodes: zip(self.node_ids()?, self.node_names()?)?,
            links: zip(self.link_ids()?, self.link_names()?)?,
        })
    }
    pub fn play_input(&self, var_id: &str, series: &TimeSeries) -> Result<()> {
        let id = cstring(var_id)?;
        let mut geom = series.geometry()?;
        let mut values = series.values.clone();
        native::call(|api| unsafe {
            (api.play)(self.ptr(), id.as_ptr(), values.as_mut_ptr(), &mut geom)
        })
    }
    /// Plays `series` into `subarea.<subarea_name>.<input_name>`.
    pub fn play_subarea_input(&self, series: &TimeSeries, subarea_name: &str, input_name: &str) -> Result<()> {
        self.play_input(&make_id(&["subarea", subarea_name, input_name]), series)
    }
    pub fn record_state(&self, var_id: &str) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.record)(self.ptr(), id.as_ptr()) })
    }
    pub fn remove_played_time_series(&self, var_id: &str) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.remove_played_time_series)(self.ptr(), id.as_ptr()) })
    }
    pub fn remove_recorder(&self, var_id: &str) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.remove_recorder)(self.ptr(), id.as_ptr()) })
    }
    pub fn played_varnames(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_played_variable_names)(self.ptr(), n) })
    }
    pub fn recorded_varnames(&self) -> Result<Vec<String>> {
        native::call_strings(|api, n| unsafe { (api.get_recorded_variable_names)(self.ptr(), n) })
    }
    pub fn num_played_variables(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_played_variables)(self.ptr()) })?.max(0) as usize)
    }
    pub fn num_recorded_variables(&self) -> Result<usize> {
        Ok(native::call(|api| unsafe { (api.get_num_recorded_variables)(self.ptr()) })?.max(0) as usize)
    }
    pub fn get_played(
        &self,
        var_id: &str,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<TimeSeries> {
        Ok(self.read_series(var_id, SeriesSource::Played)?.window(from, to))
    }
    pub fn get_recorded(
        &self,
        var_id: &str,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<TimeSeries> {
        Ok(self.read_series(var_id, SeriesSource::Recorded)?.window(from, to))
    }
    fn read_series(&self, var_id: &str, source: SeriesSource) -> Result<TimeSeries> {
        let id = cstring(var_id)?;
        let mut geom = MarshaledTsGeometry::default();
        native::call(|api| unsafe {
            match source {
                SeriesSource::Played => (api.get_played_ts_geometry)(self.ptr(), id.as_ptr(), &mut geom),
                SeriesSource::Recorded => (api.get_recorded_ts_geometry)(self.ptr(), id.as_ptr(), &mut geom),
            }
        })?;
        let mut values = vec![f64::NAN; geom.length.max(0) as usize];
        native::call(|api| unsafe {
            let (ptr, len) = (values.as_mut_ptr(), values.len() as c_int);
            match source {
                SeriesSource::Played => (api.get_played)(self.ptr(), id.as_ptr(), ptr, len),
                SeriesSource::Recorded => (api.get_recorded)(self.ptr(), id.as_ptr(), ptr, len),
            }
        })?;
        TimeSeries::from_geometry(&geom, values)
    }
    /// Catchment graph in graphviz DOT syntax.
    pub fn dot_graph(&self) -> Result<String> {
        native::call_string(|api| unsafe { (api.get_catchment_dot_graph)(self.ptr()) })
    }
    /// Model assignments of an element, keyed by model role.
    pub fn model_configuration(&self, element_id: &str) -> Result<BTreeMap<String, String>> {
        let element = cstring(element_id)?;
        let ptr = native::call(|api| unsafe { (api.get_model_configuration)(self.ptr(), element.as_ptr()) })?;
        let api = native::SwiftApi::instance()?;
        unsafe { marshal::take_string_map(api, ptr) }
    }
    /// Element identifiers sorted upstream first, as the engine executes them.
    pub fn sort_by_execution_order<S: AsRef<str>>(&self, element_ids: &[S], sorting_option: &str) -> Result<Vec<String>> {
        let mut ids = CStringArray::new(element_ids)?;
        let option = cstring(sorting_option)?;
        native::call_strings(|api, n| unsafe {
            (api.sort_simulation_elements_by_run_order)(self.ptr(), ids.as_mut_ptr(), ids.len(), option.as_ptr(), n)
        })
    }
}
#[derive(Clone, Copy)]
enum LevelDischarge {
    Min,
    Max,
    OpsRelease,
}
#[derive(Clone, Copy)]
enum SeriesSource {
    Played,
    Recorded,
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{HandleKind, NativeHandle};
    #[test]
    fn model_slot_names() {
        assert_eq!("runoff".parse::<ModelSlot>().unwrap(), ModelSlot::Runoff);
        assert_eq!(
            "channel_routing".parse::<ModelSlot>().unwrap(),
            ModelSlot::ChannelRouting
        );
        let err = "reservoir".parse::<ModelSlot>().unwrap_err();
        assert!(err.to_string().contains("reservoir"));
    }
    #[test]
    fn subarea_input_identifier() {
        assert_eq!(make_id(&["subarea", "lnk1", "P"]), "subarea.lnk1.P");
    }
    #[test]
    fn state_values_convert_from_primitives() {
        assert_eq!(StateValue::from(1.5), StateValue::Double(1.5));
        assert_eq!(StateValue::from(3), StateValue::Int(3));
        assert_eq!(StateValue::from(true), StateValue::Bool(true));
        let json = serde_json::to_string(&[StateValue::Int(2), StateValue::Bool(false)]).unwrap();
        assert_eq!(json, "[2,false]");
    }
    #[test]
    fn only_simulation_handles_become_simulations() {
        assert!(Simulation::try_from(NativeHandle::detached(HandleKind::Simulation)).is_ok());
        for kind in [HandleKind::EnsembleSimulation, HandleKind::Hypercube] {
            let err = Simulation::try_from(NativeHandle::detached(kind)).unwrap_err();
            assert!(matches!(err, SwiftError::TypeMismatch { .. }));
        }
    }
    #[test]
    fn missing_json_model_file_is_reported_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = Simulation::from_json_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SwiftError::FileNotFound(_)));
    }
}
