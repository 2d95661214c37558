//! Safe bindings to the SWIFT catchment simulation and calibration engine.
//!
//! The native library is loaded on first use, from the locations given by
//! [`BindingConfig::from_env`], or explicitly with [`initialise`]. Every
//! native object is owned by a typed wrapper and released when dropped.
pub mod catchment;
pub mod config;
pub mod ensemble;
pub mod erris;
pub mod error;
pub mod handle;
mod marshal;
pub mod native;
pub mod objectives;
pub mod optimisation;
pub mod parameteriser;
pub mod simulation;
pub mod states;
pub mod subcatchments;
pub mod system;
pub mod timeseries;
pub use config::{BindingConfig, LogLikelihoodNames};
pub use error::{Result, SwiftError};
pub use handle::{HandleKind, NativeHandle};
pub use objectives::{ObjectiveEvaluator, ObjectiveScores, VectorObjectiveScores};
pub use optimisation::{Optimiser, OptimisationLog, TerminationCriterion};
pub use parameteriser::{HypercubeParameteriser, ParameterSpec, Parameteriser};
pub use simulation::Simulation;
pub use subcatchments::{SplitElement, SubsetAction};
pub use timeseries::{TimeSeries, TimeStep};
/// Loads the native library per `config` and applies its process-wide settings.
///
/// The library location is fixed by the first load; later calls only
/// reapply the settings.
pub fn initialise(config: &BindingConfig) -> Result<()> {
    native::initialise(config)?;
    if let Some(n) = config.max_threads {
        system::set_default_max_threads(n)?;
    }
    if let Some(names) = &config.log_likelihood_names {
        system::set_log_likelihood_names(names)?;
    }
    Ok(())
}
