//! Conversions between Rust values and the C representations the native
//! library reads and returns.
//!
//! Buffers built here own everything the native side points into, so they
//! must outlive the call they are passed to. Results returned by the native
//! side are copied and then handed back to the matching native disposer.
use crate::error::{Result, SwiftError};
use crate::native::structs::{CharacterVector, MarshaledDateTime, NamedValuesVector, StringStringMap};
use crate::native::SwiftApi;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
pub(crate) fn cstring(s: &str) -> Result<CString> {
    Ok(CString::new(s)?)
}
/// Owned `char**` with its backing strings.
pub(crate) struct CStringArray {
    _owned: Vec<CString>,
    ptrs: Vec<*mut c_char>,
}
impl CStringArray {
    pub(crate) fn new<S: AsRef<str>>(items: &[S]) -> Result<Self> {
        let owned = items
            .iter()
            .map(|s| cstring(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let ptrs = owned.iter().map(|s| s.as_ptr() as *mut c_char).collect();
        Ok(Self {
            _owned: owned,
            ptrs,
        })
    }
    /// Null when empty; the native functions pair this with a zero length.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        if self.ptrs.is_empty() {
            std::ptr::null_mut()
        } else {
            self.ptrs.as_mut_ptr()
        }
    }
    pub(crate) fn len(&self) -> c_int {
        self.ptrs.len() as c_int
    }
}
unsafe fn copy_str(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    Ok(CStr::from_ptr(ptr).to_str()?.to_owned())
}
/// Copies a string owned by a native struct that is disposed as a whole.
pub(crate) unsafe fn copy_string(ptr: *const c_char) -> Result<String> {
    copy_str(ptr)
}
pub(crate) unsafe fn copy_string_array(ptr: *const *mut c_char, size: usize) -> Result<Vec<String>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    std::slice::from_raw_parts(ptr, size)
        .iter()
        .map(|&s| copy_str(s))
        .collect()
}
/// Copies then frees a `char*` returned by the native library.
pub(crate) unsafe fn take_string(api: &SwiftApi, ptr: *mut c_char) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    let copied = copy_str(ptr);
    (api.delete_ansi_string)(ptr);
    copied
}
/// Copies then frees a `char**` of `size` entries returned by the native library.
pub(crate) unsafe fn take_string_array(
    api: &SwiftApi,
    ptr: *mut *mut c_char,
    size: c_int,
) -> Result<Vec<String>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    let copied = copy_string_array(ptr, size.max(0) as usize);
    (api.delete_ansi_string_array)(ptr, size);
    copied
}
pub(crate) unsafe fn take_named_values(
    api: &SwiftApi,
    ptr: *mut NamedValuesVector,
) -> Result<Vec<(String, f64)>> {
    if ptr.is_null() {
        return Ok(Vec::new());
    }
    let nv = &*ptr;
    let copied = copy_string_array(nv.names, nv.size).map(|names| {
        let values = if nv.values.is_null() {
            &[][..]
        } else {
            std::slice::from_raw_parts(nv.values, nv.size)
        };
        names.into_iter().zip(values.iter().copied()).collect()
    });
    (api.dispose_named_values_vector)(ptr);
    copied
}
pub(crate) unsafe fn take_string_map(
    api: &SwiftApi,
    ptr: *mut StringStringMap,
) -> Result<BTreeMap<String, String>> {
    if ptr.is_null() {
        return Ok(BTreeMap::new());
    }
    let map = &*ptr;
    let copied = copy_string_array(map.keys, map.size).and_then(|keys| {
        let values = copy_string_array(map.values, map.size)?;
        Ok(keys.into_iter().zip(values).collect())
    });
    (api.dispose_string_string_map)(ptr);
    copied
}
/// `named_values_vector` input, e.g. objective weights.
pub(crate) struct NamedValuesBuffer {
    _names: CStringArray,
    _values: Vec<f64>,
    raw: NamedValuesVector,
}
impl NamedValuesBuffer {
    pub(crate) fn new<S: AsRef<str>>(names: &[S], values: &[f64]) -> Result<Self> {
        SwiftError::check_len("named values", names.len(), values.len())?;
        let mut names = CStringArray::new(names)?;
        let mut values = values.to_vec();
        let raw = NamedValuesVector {
            size: values.len(),
            values: values.as_mut_ptr(),
            names: names.as_mut_ptr(),
        };
        Ok(Self {
            _names: names,
            _values: values,
            raw,
        })
    }
    pub(crate) fn as_mut_ptr(&mut self) -> *mut NamedValuesVector {
        &mut self.raw
    }
}
/// `character_vector` input, e.g. parameter name patterns.
pub(crate) struct CharacterVectorBuffer {
    _values: CStringArray,
    raw: CharacterVector,
}
impl CharacterVectorBuffer {
    pub(crate) fn new<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let mut owned = CStringArray::new(values)?;
        let raw = CharacterVector {
            size: values.len(),
            values: owned.as_mut_ptr(),
        };
        Ok(Self {
            _values: owned,
            raw,
        })
    }
    pub(crate) fn as_mut_ptr(&mut self) -> *mut CharacterVector {
        &mut self.raw
    }
}
/// `string_string_map` input, e.g. optimiser options.
pub(crate) struct StringMapBuffer {
    _keys: CStringArray,
    _values: CStringArray,
    raw: StringStringMap,
}
impl StringMapBuffer {
    pub(crate) fn new(entries: &BTreeMap<String, String>) -> Result<Self> {
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        let values: Vec<&str> = entries.values().map(String::as_str).collect();
        let mut keys = CStringArray::new(&keys)?;
        let mut values = CStringArray::new(&values)?;
        let raw = StringStringMap {
            size: entries.len(),
            keys: keys.as_mut_ptr(),
            values: values.as_mut_ptr(),
        };
        Ok(Self {
            _keys: keys,
            _values: values,
            raw,
        })
    }
    pub(crate) fn as_mut_ptr(&mut self) -> *mut StringStringMap {
        &mut self.raw
    }
}
impl MarshaledDateTime {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month() as c_int,
            day: dt.day() as c_int,
            hour: dt.hour() as c_int,
            minute: dt.minute() as c_int,
            second: dt.second() as c_int,
        }
    }
    pub fn to_datetime(&self) -> Result<NaiveDateTime> {
        let to_u32 = |v: c_int| u32::try_from(v).ok();
        to_u32(self.month)
            .zip(to_u32(self.day))
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(self.year, m, d))
            .and_then(|date| {
                date.and_hms_opt(to_u32(self.hour)?, to_u32(self.minute)?, to_u32(self.second)?)
            })
            .ok_or_else(|| SwiftError::InvalidDateTime(format!("{self:?}")))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn date_time_fields_copy_both_ways() {
        let dt = NaiveDate::from_ymd_opt(1989, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap();
        let native = MarshaledDateTime::from_datetime(&dt);
        assert_eq!(
            (native.year, native.month, native.day, native.hour, native.minute, native.second),
            (1989, 12, 31, 23, 59, 58)
        );
        assert_eq!(native.to_datetime().unwrap(), dt);
    }
    #[test]
    fn impossible_native_date_is_an_error() {
        let native = MarshaledDateTime {
            year: 2001,
            month: 2,
            day: 30,
            ..Default::default()
        };
        assert!(matches!(native.to_datetime(), Err(SwiftError::InvalidDateTime(_))));
        let zeroed = MarshaledDateTime::default();
        assert!(zeroed.to_datetime().is_err());
    }
    #[test]
    fn string_array_points_at_owned_strings() {
        let mut arr = CStringArray::new(&["node.n1", "link.lnk2"]).unwrap();
        assert_eq!(arr.len(), 2);
        let copied = unsafe { copy_string_array(arr.as_mut_ptr(), 2) }.unwrap();
        assert_eq!(copied, vec!["node.n1", "link.lnk2"]);
    }
    #[test]
    fn empty_string_array_is_null() {
        let mut arr = CStringArray::new::<&str>(&[]).unwrap();
        assert!(arr.as_mut_ptr().is_null());
        assert_eq!(arr.len(), 0);
    }
    #[test]
    fn interior_nul_is_rejected() {
        assert!(matches!(CStringArray::new(&["a\0b"]), Err(SwiftError::Nul(_))));
    }
    #[test]
    fn named_values_lengths_are_checked() {
        assert!(NamedValuesBuffer::new(&["w1", "w2"], &[1.0]).is_err());
        let mut buf = NamedValuesBuffer::new(&["w1", "w2"], &[0.25, 0.75]).unwrap();
        let raw = unsafe { &*buf.as_mut_ptr() };
        assert_eq!(raw.size, 2);
        let values = unsafe { std::slice::from_raw_parts(raw.values, raw.size) };
        assert_eq!(values, &[0.25, 0.75]);
        let names = unsafe { copy_string_array(raw.names, raw.size) }.unwrap();
        assert_eq!(names, vec!["w1", "w2"]);
    }
    #[test]
    fn string_map_keeps_keys_and_values_aligned() {
        let mut entries = BTreeMap::new();
        entries.insert("Optimizer".to_string(), "sce".to_string());
        entries.insert("MaxThreads".to_string(), "4".to_string());
        let mut buf = StringMapBuffer::new(&entries).unwrap();
        let raw = unsafe { &*buf.as_mut_ptr() };
        let keys = unsafe { copy_string_array(raw.keys, raw.size) }.unwrap();
        let values = unsafe { copy_string_array(raw.values, raw.size) }.unwrap();
        assert_eq!(keys, vec!["MaxThreads", "Optimizer"]);
        assert_eq!(values, vec!["4", "sce"]);
    }
    #[test]
    fn character_vector_counts_patterns() {
        let mut buf = CharacterVectorBuffer::new(&["x1", "x[2-3]"]).unwrap();
        let raw = unsafe { &*buf.as_mut_ptr() };
        assert_eq!(raw.size, 2);
    }
}
