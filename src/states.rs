//! Model state snapshots and state initialisers.
use crate::error::{Result, SwiftError};
use crate::handle::native_type;
use crate::marshal::cstring;
use crate::native;
use crate::simulation::Simulation;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
native_type!(
    /// Values of every model state of a simulation at one point in time.
    MemoryStates,
    MemoryStates
);
native_type!(
    /// Sets model states whenever a simulation resets them.
    StateInitialiser,
    StateInitialiser
);
/// On-disk encoding of [`MemoryStates`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StateFileFormat {
    #[default]
    Json,
    Binary,
}
impl StateFileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StateFileFormat::Json => "json",
            StateFileFormat::Binary => "binary",
        }
    }
}
impl fmt::Display for StateFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for StateFileFormat {
    type Err = SwiftError;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StateFileFormat::Json),
            "binary" | "bin" => Ok(StateFileFormat::Binary),
            _ => Err(SwiftError::unknown("memory state format", s)),
        }
    }
}
impl MemoryStates {
    pub fn from_json(text: &str) -> Result<Self> {
        let text = cstring(text)?;
        let ptr = native::call(|api| unsafe { (api.memory_states_from_string)(text.as_ptr()) })?;
        Self::from_native(ptr, "MemoryStatesFromString")
    }
    pub fn to_json(&self) -> Result<String> {
        native::call_string(|api| unsafe { (api.get_memory_states)(self.ptr()) })
    }
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.to_json()?)?)
    }
    pub fn save(&self, path: &Path, format: StateFileFormat) -> Result<()> {
        let file = cstring(&path.to_string_lossy())?;
        let format = cstring(format.as_str())?;
        log::debug!("saving memory states to {}", path.display());
        native::call(|api| unsafe { (api.save_memory_states_to_file)(self.ptr(), file.as_ptr(), format.as_ptr()) })
    }
    pub fn load(path: &Path, format: StateFileFormat) -> Result<Self> {
        if !path.exists() {
            return Err(SwiftError::FileNotFound(path.to_path_buf()));
        }
        let file = cstring(&path.to_string_lossy())?;
        let format = cstring(format.as_str())?;
        let ptr = native::call(|api| unsafe { (api.load_memory_states_from_file)(file.as_ptr(), format.as_ptr()) })?;
        Self::from_native(ptr, "LoadMemoryStatesFromFile")
    }
}
impl StateInitialiser {
    /// Initialiser of the named type known to the engine.
    pub fn create(kind: &str) -> Result<Self> {
        let kind = cstring(kind)?;
        let ptr = native::call(|api| unsafe { (api.create_state_initializer)(kind.as_ptr()) })?;
        Self::from_native(ptr, "CreateStateInitializer")
    }
    pub fn try_clone(&self) -> Result<Self> {
        let ptr = native::call(|api| unsafe { (api.clone_state_initializer)(self.ptr()) })?;
        Self::from_native(ptr, "CloneStateInitializer")
    }
    /// True when values can be read and written by state identifier.
    pub fn is_dictionary_like(&self) -> Result<bool> {
        native::call(|api| unsafe { (api.is_dictionary_state_initializer)(self.ptr()) })
    }
    pub fn value(&self, var_id: &str) -> Result<f64> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.get_value_state_initializer)(self.ptr(), id.as_ptr()) })
    }
    pub fn set_value(&self, var_id: &str, value: f64) -> Result<()> {
        let id = cstring(var_id)?;
        native::call(|api| unsafe { (api.set_value_state_initializer)(self.ptr(), id.as_ptr(), value) })
    }
}
impl Simulation {
    pub fn snapshot_state(&self) -> Result<MemoryStates> {
        let ptr = native::call(|api| unsafe { (api.snapshot_memory_states)(self.ptr()) })?;
        MemoryStates::from_native(ptr, "SnapshotMemoryStates")
    }
    /// Overwrites the current model states with `states`.
    pub fn apply_states(&self, states: &MemoryStates) -> Result<()> {
        native::call(|api| unsafe { (api.apply_memory_states)(self.ptr(), states.ptr()) })
    }
    /// Keeps `states` to be applied at each reset of the model states.
    pub fn set_reset_states(&self, states: &MemoryStates) -> Result<()> {
        native::call(|api| unsafe { (api.set_memory_states)(self.ptr(), states.ptr()) })
    }
    pub fn clear_reset_states(&self) -> Result<()> {
        native::call(|api| unsafe { (api.clear_memory_states)(self.ptr()) })
    }
    /// Replaces any state initialiser with `initialiser`.
    pub fn use_state_initialiser(&self, initialiser: &StateInitialiser) -> Result<()> {
        native::call(|api| unsafe { (api.use_state_initializer_model_runner)(self.ptr(), initialiser.ptr()) })
    }
    pub fn add_state_initialiser(&self, initialiser: &StateInitialiser) -> Result<()> {
        native::call(|api| unsafe { (api.add_state_initializer_model_runner)(self.ptr(), initialiser.ptr()) })
    }
    pub fn remove_state_initialisers(&self) -> Result<()> {
        native::call(|api| unsafe { (api.remove_state_initializer_model_runner)(self.ptr()) })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{HandleKind, NativeHandle};
    #[test]
    fn file_formats() {
        assert_eq!("JSON".parse::<StateFileFormat>().unwrap(), StateFileFormat::Json);
        assert_eq!(" binary ".parse::<StateFileFormat>().unwrap(), StateFileFormat::Binary);
        assert_eq!(StateFileFormat::default().to_string(), "json");
        let err = "yaml".parse::<StateFileFormat>().unwrap_err();
        assert!(err.to_string().contains("yaml"));
    }
    #[test]
    fn missing_state_file_is_reported_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let err = MemoryStates::load(&dir.path().join("states.json"), StateFileFormat::Json).unwrap_err();
        assert!(matches!(err, SwiftError::FileNotFound(_)));
    }
    #[test]
    fn state_kinds() {
        assert!(MemoryStates::try_from(NativeHandle::detached(HandleKind::MemoryStates)).is_ok());
        assert!(StateInitialiser::try_from(NativeHandle::detached(HandleKind::MemoryStates)).is_err());
        assert!(!HandleKind::StateInitialiser.is_hypercube());
        assert!(StateInitialiser::try_from(NativeHandle::detached(HandleKind::StateInitialiser)).is_ok());
        assert!(StateInitialiser::try_from(NativeHandle::detached(HandleKind::Hypercube)).is_err());
    }
}
