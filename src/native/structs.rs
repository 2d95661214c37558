//! `#[repr(C)]` layouts shared with the SWIFT C API.
//!
//! Field order and types must match the native headers exactly; these are
//! only ever filled field by field and passed by pointer or value.
use serde::{Deserialize, Serialize};
use std::os::raw::{c_char, c_double, c_int};
/// Hyperparameters of the shuffled complex evolution optimiser.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceParameters {
    pub alpha: c_int,
    pub beta: c_int,
    pub p: c_int,
    pub pmin: c_int,
    pub m: c_int,
    pub q: c_int,
    pub num_shuffle: c_int,
    pub trapezoidal_density_parameter: c_double,
    pub reflection_ratio: c_double,
    pub contraction_ratio: c_double,
}
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarshaledDateTime {
    pub year: c_int,
    pub month: c_int,
    pub day: c_int,
    pub hour: c_int,
    pub minute: c_int,
    pub second: c_int,
}
pub const TIME_STEP_STRICTLY_REGULAR: c_int = 0;
pub const TIME_STEP_MONTHLY: c_int = 1;
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarshaledTsGeometry {
    pub start: MarshaledDateTime,
    pub time_step_seconds: c_int,
    pub length: c_int,
    pub time_step_code: c_int,
}
#[repr(C)]
#[derive(Debug)]
pub struct MultiTimeSeriesData {
    pub time_series_geometry: MarshaledTsGeometry,
    pub ensemble_size: c_int,
    pub numeric_data: *mut *mut c_double,
}
#[repr(C)]
#[derive(Debug)]
pub struct StatisticDefinition {
    pub model_variable_id: *mut c_char,
    pub objective_identifier: *mut c_char,
    pub objective_name: *mut c_char,
    pub statistic_identifier: *mut c_char,
    pub start: MarshaledDateTime,
    pub end: MarshaledDateTime,
    pub observations: *mut MultiTimeSeriesData,
}
#[repr(C)]
#[derive(Debug)]
pub struct MultiStatisticDefinition {
    pub size: c_int,
    pub statistics: *mut *mut StatisticDefinition,
    pub mix_statistics_id: *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct NamedValuesVector {
    pub size: usize,
    pub values: *mut c_double,
    pub names: *mut *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct CharacterVector {
    pub size: usize,
    pub values: *mut *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct StringStringMap {
    pub size: usize,
    pub keys: *mut *mut c_char,
    pub values: *mut *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct NodeInfo {
    pub id: *mut c_char,
    pub name: *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct LinkInfo {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub length_metres: c_double,
    pub f: c_double,
    pub mannings_n: c_double,
    pub slope: c_double,
}
#[repr(C)]
#[derive(Debug)]
pub struct SubareaInfo {
    pub id: *mut c_char,
    pub name: *mut c_char,
    pub subarea_surface_km2: c_double,
}
#[repr(C)]
#[derive(Debug)]
pub struct NodeLinkConnection {
    pub link_id: *mut c_char,
    pub upstream_node_id: *mut c_char,
    pub downstream_node_id: *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct SubareaLinkConnection {
    pub subarea_id: *mut c_char,
    pub link_id: *mut c_char,
}
#[repr(C)]
#[derive(Debug)]
pub struct CatchmentStructureData {
    pub num_nodes: c_int,
    pub num_links: c_int,
    pub num_subareas: c_int,
    pub num_node_link_connections: c_int,
    pub num_subarea_link_connections: c_int,
    pub nodes: *mut NodeInfo,
    pub links: *mut LinkInfo,
    pub subareas: *mut SubareaInfo,
    pub node_link_connections: *mut NodeLinkConnection,
    pub subarea_link_connections: *mut SubareaLinkConnection,
}
#[repr(C)]
#[derive(Debug)]
pub struct OptimizerLogData {
    pub log_length: c_int,
    pub string_data_count: c_int,
    pub numeric_data_count: c_int,
    pub names_numeric_data: *mut *mut c_char,
    pub names_string_data: *mut *mut c_char,
    pub numeric_data: *mut *mut c_double,
    pub string_data: *mut *mut *mut c_char,
}
