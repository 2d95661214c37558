//! Process-wide queries and settings of the native engine.
use crate::config::{ExtendedLikelihoodNames, LogLikelihoodNames, StandardLikelihoodNames};
use crate::error::{Result, SwiftError};
use crate::marshal::cstring;
use crate::native;
use serde::Serialize;
/// Identifiers of the runoff models the engine knows, e.g. `GR4J`.
pub fn runoff_model_ids() -> Result<Vec<String>> {
    native::call_strings(|api, n| unsafe { (api.get_runoff_model_identifiers)(n) })
}
fn check_runoff_model_id(known: &[String], model_id: &str) -> Result<()> {
    if known.iter().any(|k| k == model_id) {
        Ok(())
    } else {
        Err(SwiftError::unknown("runoff model", model_id))
    }
}
/// Variables a runoff model exposes; unknown models are rejected before asking the engine.
pub fn runoff_model_var_ids(model_id: &str) -> Result<Vec<String>> {
    check_runoff_model_id(&runoff_model_ids()?, model_id)?;
    let id = cstring(model_id)?;
    native::call_strings(|api, n| unsafe { (api.get_runoff_model_var_identifiers)(id.as_ptr(), n) })
}
/// Default parallelism of new optimisers; -1 uses all available cores.
pub fn set_default_max_threads(n_threads: i32) -> Result<()> {
    native::call(|api| unsafe { (api.set_default_max_threads)(n_threads) })
}
pub fn default_max_threads() -> Result<i32> {
    native::call(|api| unsafe { (api.get_default_max_threads)() })
}
pub fn known_parameterisation_strategies() -> Result<Vec<String>> {
    native::call_strings(|api, n| unsafe { (api.get_known_parameterization_strategies)(n) })
}
pub fn known_aggregation_strategies() -> Result<Vec<String>> {
    native::call_strings(|api, n| unsafe { (api.get_known_aggregation_strategies)(n) })
}
pub fn known_target_selector_types() -> Result<Vec<String>> {
    native::call_strings(|api, n| unsafe { (api.get_known_target_selector_types)(n) })
}
/// Live native objects per type, for leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NativeObjectCounts {
    pub model_runners: i32,
    pub catchments: i32,
    pub rainfall_runoff: i32,
    pub hypercubes: i32,
    pub hypercubes_wila: i32,
    pub state_initialisers: i32,
}
impl NativeObjectCounts {
    pub fn current() -> Result<Self> {
        native::call(|api| unsafe {
            Self {
                model_runners: (api.get_num_model_runners)(),
                catchments: (api.get_num_catchments)(),
                rainfall_runoff: (api.get_num_rainfall_runoff)(),
                hypercubes: (api.get_num_hyper_cubes)(),
                hypercubes_wila: (api.get_num_hyper_cubes_wila)(),
                state_initialisers: (api.get_num_state_initializers)(),
            }
        })
    }
}
fn cstrings<const N: usize>(names: [&str; N]) -> Result<[std::ffi::CString; N]> {
    let owned = names.iter().map(|n| cstring(n)).collect::<Result<Vec<_>>>()?;
    owned.try_into().map_err(|v: Vec<_>| SwiftError::LengthMismatch {
        what: "log-likelihood names",
        expected: N,
        actual: v.len(),
    })
}
fn extended(n: &ExtendedLikelihoodNames) -> [&str; 9] {
    [&n.a, &n.b, &n.m, &n.s1, &n.s2, &n.w, &n.maxobs, &n.ct, &n.censopt]
}
fn standard(n: &StandardLikelihoodNames) -> [&str; 7] {
    [&n.a, &n.b, &n.m, &n.s, &n.maxobs, &n.ct, &n.censopt]
}
/// Names under which log-likelihood objectives find their parameters.
pub fn set_log_likelihood_names(names: &LogLikelihoodNames) -> Result<()> {
    match names {
        LogLikelihoodNames::Standard(n) => {
            let [a, b, m, s, maxobs, ct, censopt] = cstrings(standard(n))?;
            native::call(|api| unsafe {
                (api.set_log_likelihood_variable_names)(
                    a.as_ptr(),
                    b.as_ptr(),
                    m.as_ptr(),
                    s.as_ptr(),
                    maxobs.as_ptr(),
                    ct.as_ptr(),
                    censopt.as_ptr(),
                )
            })
        }
        LogLikelihoodNames::Extended(n) | LogLikelihoodNames::Mixture(n) => {
            let [a, b, m, s1, s2, w, maxobs, ct, censopt] = cstrings(extended(n))?;
            let mixture = matches!(names, LogLikelihoodNames::Mixture(_));
            native::call(|api| unsafe {
                let set = if mixture {
                    api.set_log_likelihood_mixture_variable_names
                } else {
                    api.set_log_likelihood_x_variable_names
                };
                set(
                    a.as_ptr(),
                    b.as_ptr(),
                    m.as_ptr(),
                    s1.as_ptr(),
                    s2.as_ptr(),
                    w.as_ptr(),
                    maxobs.as_ptr(),
                    ct.as_ptr(),
                    censopt.as_ptr(),
                )
            })
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn unknown_runoff_model_is_named() {
        let known = vec!["GR4J".to_string(), "AWBM".to_string()];
        assert!(check_runoff_model_id(&known, "GR4J").is_ok());
        let err = check_runoff_model_id(&known, "NOPE").unwrap_err();
        assert!(matches!(err, SwiftError::UnknownIdentifier { kind: "runoff model", .. }));
        assert!(err.to_string().contains("NOPE"));
    }
    #[test]
    fn likelihood_names_keep_native_argument_order() {
        let names = ExtendedLikelihoodNames {
            w: "weight".into(),
            ..Default::default()
        };
        assert_eq!(extended(&names)[5], "weight");
        assert_eq!(extended(&names)[8], "censopt");
        assert_eq!(standard(&StandardLikelihoodNames::default())[3], "s");
        let owned = cstrings(standard(&StandardLikelihoodNames::default())).unwrap();
        assert_eq!(owned[4].to_str().unwrap(), "maxobs");
    }
    #[test]
    fn names_with_nul_bytes_are_rejected() {
        let names = StandardLikelihoodNames {
            a: "a\0".into(),
            ..Default::default()
        };
        assert!(matches!(cstrings(standard(&names)), Err(SwiftError::Nul(_))));
    }
}
