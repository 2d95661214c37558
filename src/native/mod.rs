//! Runtime binding to the SWIFT shared library.
//!
//! Every native call goes through [`call`] (or one of its string-returning
//! siblings) so that a message raised by the exception callback during the
//! call is turned into [`SwiftError::Native`] before any result is used.
mod api;
mod exception;
pub mod structs;
pub(crate) use api::SwiftApi;
use crate::error::{Result, SwiftError};
use crate::marshal;
use std::os::raw::{c_char, c_int};
fn check() -> Result<()> {
    match exception::take_pending() {
        Some(message) => Err(SwiftError::Native(message)),
        None => Ok(()),
    }
}
/// Runs one native call and surfaces any exception it raised.
pub(crate) fn call<T>(f: impl FnOnce(&SwiftApi) -> T) -> Result<T> {
    let api = SwiftApi::instance()?;
    // Drop anything stale left by a call whose result was never checked.
    if let Some(stale) = exception::take_pending() {
        log::warn!("discarding unchecked native error: {stale}");
    }
    let out = f(api);
    check()?;
    Ok(out)
}
/// Native call returning an owned `char*`.
pub(crate) fn call_string(f: impl FnOnce(&SwiftApi) -> *mut c_char) -> Result<String> {
    let ptr = call(f)?;
    let api = SwiftApi::instance()?;
    unsafe { marshal::take_string(api, ptr) }
}
/// Native call returning an owned `char**` and writing its length.
pub(crate) fn call_strings(
    f: impl FnOnce(&SwiftApi, *mut c_int) -> *mut *mut c_char,
) -> Result<Vec<String>> {
    let mut size: c_int = 0;
    let ptr = call(|api| f(api, &mut size))?;
    let api = SwiftApi::instance()?;
    unsafe { marshal::take_string_array(api, ptr, size) }
}
/// `GetLastStdExceptionMessage`, for diagnostics outside the callback path.
pub fn last_native_error() -> Result<Option<String>> {
    let message = call_string(|api| unsafe { (api.get_last_std_exception_message)() })?;
    Ok(if message.is_empty() { None } else { Some(message) })
}
/// Loads the library with an explicit configuration instead of the environment.
pub(crate) fn initialise(config: &crate::config::BindingConfig) -> Result<()> {
    SwiftApi::initialise(config).map(|_| ())
}
