//! Owning wrappers around opaque native object pointers.
use crate::error::{Result, SwiftError};
use crate::native::{self, SwiftApi};
use std::fmt;
use std::os::raw::c_void;
use std::ptr::NonNull;
/// Kind of native object behind a [`NativeHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Simulation,
    EnsembleSimulation,
    EnsembleForecastSimulation,
    Hypercube,
    CompositeParameteriser,
    FunctionsParameteriser,
    FilteringParameteriser,
    TransformParameteriser,
    ScalingParameteriser,
    SubareasScalingParameteriser,
    StateInitParameteriser,
    ConstraintParameteriser,
    ObjectiveEvaluator,
    ObjectiveEvaluatorWila,
    ObjectiveScores,
    VectorObjectiveScores,
    Optimiser,
    SceTerminationCondition,
    CandidateFactorySeed,
    ErrisStagedCalibration,
    MaerrisStagedCalibration,
    StateInitialiser,
    MemoryStates,
}
impl HandleKind {
    /// Type tag used by the other SWIFT bindings for the same object.
    pub fn type_tag(self) -> &'static str {
        match self {
            HandleKind::Simulation => "MODEL_SIMULATION_PTR",
            HandleKind::EnsembleSimulation => "ENSEMBLE_SIMULATION_PTR",
            HandleKind::EnsembleForecastSimulation => "ENSEMBLE_FORECAST_SIMULATION_PTR",
            HandleKind::Hypercube => "HYPERCUBE_PTR",
            HandleKind::CompositeParameteriser => "COMPOSITE_PARAMETERIZER_PTR",
            HandleKind::FunctionsParameteriser => "FUNCTIONS_PARAMETERIZER_PTR",
            HandleKind::FilteringParameteriser => "FILTERING_PARAMETERIZER_PTR",
            HandleKind::TransformParameteriser => "TRANSFORM_PARAMETERIZER_PTR",
            HandleKind::ScalingParameteriser => "SCALING_PARAMETERIZER_PTR",
            HandleKind::SubareasScalingParameteriser => "SUBAREAS_SCALING_PARAMETERIZER_PTR",
            HandleKind::StateInitParameteriser => "STATE_INIT_PARAMETERIZER_PTR",
            HandleKind::ConstraintParameteriser => "CONSTRAINT_PARAMETERIZER_PTR",
            HandleKind::ObjectiveEvaluator => "OBJECTIVE_EVALUATOR_PTR",
            HandleKind::ObjectiveEvaluatorWila => "OBJECTIVE_EVALUATOR_WILA_PTR",
            HandleKind::ObjectiveScores => "OBJECTIVE_SCORES_WILA_PTR",
            HandleKind::VectorObjectiveScores => "VEC_OBJECTIVE_SCORES_PTR",
            HandleKind::Optimiser => "OPTIMIZER_PTR",
            HandleKind::SceTerminationCondition => "SCE_TERMINATION_CONDITION_WILA_PTR",
            HandleKind::CandidateFactorySeed => "CANDIDATE_FACTORY_SEED_WILA_PTR",
            HandleKind::ErrisStagedCalibration => "ERRIS_STAGED_CALIBRATION_PTR",
            HandleKind::MaerrisStagedCalibration => "MAERRIS_STAGED_CALIBRATION_PTR",
            HandleKind::StateInitialiser => "STATE_INITIALIZER_PTR",
            HandleKind::MemoryStates => "MEMORY_STATES_PTR",
        }
    }
    /// Kinds the native hypercube accessors accept.
    pub fn is_hypercube(self) -> bool {
        matches!(
            self,
            HandleKind::Hypercube
                | HandleKind::CompositeParameteriser
                | HandleKind::FunctionsParameteriser
                | HandleKind::FilteringParameteriser
                | HandleKind::TransformParameteriser
                | HandleKind::ScalingParameteriser
                | HandleKind::SubareasScalingParameteriser
                | HandleKind::StateInitParameteriser
                | HandleKind::ConstraintParameteriser
        )
    }
    pub fn is_objective(self) -> bool {
        matches!(
            self,
            HandleKind::ObjectiveEvaluator | HandleKind::ObjectiveEvaluatorWila
        )
    }
}
impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}
/// Owning pointer to a native SWIFT object; released exactly once.
///
/// Not `Send`: the native exception channel is per thread and the engine
/// objects are not documented as thread safe.
pub struct NativeHandle {
    ptr: NonNull<c_void>,
    kind: HandleKind,
    owned: bool,
}
impl NativeHandle {
    /// Takes ownership of a pointer returned by the native function `origin`.
    pub(crate) fn from_raw(ptr: *mut c_void, kind: HandleKind, origin: &'static str) -> Result<Self> {
        let ptr = NonNull::new(ptr).ok_or(SwiftError::NullHandle(origin))?;
        Ok(Self {
            ptr,
            kind,
            owned: true,
        })
    }
    /// Non-owning handle for exercising kind checks without a native library.
    #[cfg(test)]
    pub(crate) fn detached(kind: HandleKind) -> Self {
        Self {
            ptr: NonNull::dangling(),
            kind,
            owned: false,
        }
    }
    pub fn kind(&self) -> HandleKind {
        self.kind
    }
    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }
    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
    /// Checks the kind before handing the handle to a typed wrapper.
    pub(crate) fn require(
        self,
        expected: HandleKind,
        accepts: fn(HandleKind) -> bool,
    ) -> Result<Self> {
        if accepts(self.kind) {
            Ok(self)
        } else {
            Err(SwiftError::TypeMismatch {
                expected: expected.type_tag(),
                actual: self.kind,
            })
        }
    }
    /// Releases the native object now. Later calls, and the drop, are no-ops.
    pub fn release(&mut self) {
        if !self.owned {
            return;
        }
        self.owned = false;
        // During teardown the library may never have been loaded; nothing to release then.
        if SwiftApi::loaded().is_none() {
            log::warn!("native library not loaded; leaking {} handle", self.kind);
            return;
        }
        log::trace!("releasing {} at {:p}", self.kind, self.ptr);
        let ptr = self.ptr.as_ptr();
        if let Err(err) = native::call(|api| unsafe { (api.dispose_shared_pointer)(ptr) }) {
            log::warn!("failed to release {}: {err}", self.kind);
        }
    }
    pub fn is_released(&self) -> bool {
        !self.owned
    }
}
impl Drop for NativeHandle {
    fn drop(&mut self) {
        self.release();
    }
}
impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("kind", &self.kind)
            .field("ptr", &self.ptr)
            .field("owned", &self.owned)
            .finish()
    }
}
/// Declares a typed owner of a [`NativeHandle`] with a checked
/// `TryFrom<NativeHandle>`; the optional third argument widens the accepted
/// kinds beyond the exact one.
macro_rules! native_type {
    ($(#[$meta:meta])* $name:ident, $kind:ident) => {
        native_type!($(#[$meta])* $name, $kind, |k| k == $crate::handle::HandleKind::$kind);
    };
    ($(#[$meta:meta])* $name:ident, $kind:ident, $accepts:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            handle: $crate::handle::NativeHandle,
        }
        #[allow(dead_code)]
        impl $name {
            pub(crate) fn from_native(
                ptr: *mut std::os::raw::c_void,
                origin: &'static str,
            ) -> $crate::error::Result<Self> {
                Self::from_native_as(ptr, $crate::handle::HandleKind::$kind, origin)
            }
            pub(crate) fn from_native_as(
                ptr: *mut std::os::raw::c_void,
                kind: $crate::handle::HandleKind,
                origin: &'static str,
            ) -> $crate::error::Result<Self> {
                Ok(Self {
                    handle: $crate::handle::NativeHandle::from_raw(ptr, kind, origin)?,
                })
            }
            pub fn handle(&self) -> &$crate::handle::NativeHandle {
                &self.handle
            }
            pub fn into_handle(self) -> $crate::handle::NativeHandle {
                self.handle
            }
            pub(crate) fn ptr(&self) -> *mut std::os::raw::c_void {
                self.handle.as_ptr()
            }
        }
        impl TryFrom<$crate::handle::NativeHandle> for $name {
            type Error = $crate::error::SwiftError;
            fn try_from(handle: $crate::handle::NativeHandle) -> $crate::error::Result<Self> {
                let handle = handle.require($crate::handle::HandleKind::$kind, $accepts)?;
                Ok(Self { handle })
            }
        }
    };
}
pub(crate) use native_type;
/// Clones whatever the handle points to, for the kinds the engine can copy.
pub fn clone_handle(handle: &NativeHandle) -> Result<NativeHandle> {
    let ptr = handle.as_ptr();
    match handle.kind() {
        HandleKind::Simulation => {
            let out = native::call(|api| unsafe { (api.clone_model)(ptr) })?;
            NativeHandle::from_raw(out, HandleKind::Simulation, "CloneModel")
        }
        HandleKind::StateInitialiser => {
            let out = native::call(|api| unsafe { (api.clone_state_initializer)(ptr) })?;
            NativeHandle::from_raw(out, HandleKind::StateInitialiser, "CloneStateInitializer")
        }
        kind if kind.is_hypercube() => {
            let out = native::call(|api| unsafe { (api.clone_hypercube_parameterizer)(ptr) })?;
            NativeHandle::from_raw(out, HandleKind::Hypercube, "CloneHypercubeParameterizer")
        }
        kind => Err(SwiftError::unknown("clonable handle type", kind.type_tag())),
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    native_type!(
        /// Test-only wrapper accepting exact simulations.
        SimOnly,
        Simulation
    );
    native_type!(AnyCube, Hypercube, HandleKind::is_hypercube);
    #[test]
    fn null_pointer_is_rejected_with_origin() {
        let err = NativeHandle::from_raw(std::ptr::null_mut(), HandleKind::Simulation, "CloneModel")
            .unwrap_err();
        assert!(matches!(err, SwiftError::NullHandle("CloneModel")));
    }
    #[test]
    fn exact_kind_conversion() {
        let ok = SimOnly::try_from(NativeHandle::detached(HandleKind::Simulation)).unwrap();
        assert_eq!(ok.handle().kind(), HandleKind::Simulation);
        let err = SimOnly::try_from(NativeHandle::detached(HandleKind::Hypercube)).unwrap_err();
        match err {
            SwiftError::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "MODEL_SIMULATION_PTR");
                assert_eq!(actual, HandleKind::Hypercube);
            }
            other => panic!("unexpected error {other}"),
        }
    }
    #[test]
    fn parameteriser_family_accepts_every_hypercube_kind() {
        for kind in [
            HandleKind::Hypercube,
            HandleKind::CompositeParameteriser,
            HandleKind::TransformParameteriser,
            HandleKind::ConstraintParameteriser,
            HandleKind::StateInitParameteriser,
            HandleKind::SubareasScalingParameteriser,
        ] {
            let cube = AnyCube::try_from(NativeHandle::detached(kind)).unwrap();
            assert_eq!(cube.into_handle().kind(), kind);
        }
        for kind in [
            HandleKind::Simulation,
            HandleKind::ObjectiveEvaluator,
            HandleKind::MemoryStates,
        ] {
            assert!(AnyCube::try_from(NativeHandle::detached(kind)).is_err());
        }
    }
    #[test]
    fn mismatch_message_names_both_tags() {
        let err = SimOnly::try_from(NativeHandle::detached(HandleKind::Optimiser)).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("MODEL_SIMULATION_PTR"));
        assert!(text.contains("OPTIMIZER_PTR"));
    }
    #[test]
    fn release_is_idempotent_and_detached_handles_never_dispose() {
        let mut handle = NativeHandle::detached(HandleKind::MemoryStates);
        assert!(handle.is_released());
        handle.release();
        handle.release();
        assert!(handle.is_released());
    }
    #[test]
    fn clone_of_uncopyable_kind_is_refused_before_any_call() {
        let handle = NativeHandle::detached(HandleKind::Optimiser);
        let err = clone_handle(&handle).unwrap_err();
        assert!(matches!(err, SwiftError::UnknownIdentifier { .. }));
    }
}
