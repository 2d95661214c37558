use crate::error::{Result, SwiftError};
use crate::native::structs::{
    MarshaledDateTime, MarshaledTsGeometry, TIME_STEP_MONTHLY, TIME_STEP_STRICTLY_REGULAR,
};
use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::os::raw::c_int;
const fn step_seconds(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(s) => s,
        None => NonZeroU32::MIN,
    }
}
/// Spacing between consecutive values of a [`TimeSeries`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStep {
    Regular { seconds: NonZeroU32 },
    Monthly,
}
impl TimeStep {
    pub const HOURLY: TimeStep = TimeStep::Regular {
        seconds: step_seconds(3600),
    };
    pub const DAILY: TimeStep = TimeStep::Regular {
        seconds: step_seconds(86_400),
    };
    /// Regular step the native geometry can carry: 1 to `i32::MAX` seconds.
    pub fn regular(seconds: u32) -> Result<Self> {
        match NonZeroU32::new(seconds) {
            Some(s) if c_int::try_from(seconds).is_ok() => Ok(TimeStep::Regular { seconds: s }),
            _ => Err(SwiftError::InvalidTimeStep(seconds)),
        }
    }
    /// Timestamp `steps` steps after `start`.
    pub fn offset(self, start: NaiveDateTime, steps: usize) -> Option<NaiveDateTime> {
        match self {
            TimeStep::Regular { seconds } => {
                let secs = i64::from(seconds.get()).checked_mul(i64::try_from(steps).ok()?)?;
                start.checked_add_signed(Duration::seconds(secs))
            }
            TimeStep::Monthly => start.checked_add_months(Months::new(u32::try_from(steps).ok()?)),
        }
    }
    fn from_native(code: c_int, seconds: c_int) -> Result<Self> {
        match code {
            TIME_STEP_MONTHLY => Ok(TimeStep::Monthly),
            TIME_STEP_STRICTLY_REGULAR if seconds > 0 => TimeStep::regular(seconds as u32),
            _ => Err(SwiftError::unknown(
                "time step",
                format!("code {code} with {seconds} seconds"),
            )),
        }
    }
}
/// Regular series of values from `start`; NaN marks missing values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub start: NaiveDateTime,
    pub time_step: TimeStep,
    pub values: Vec<f64>,
}
impl TimeSeries {
    pub fn new(start: NaiveDateTime, time_step: TimeStep, values: Vec<f64>) -> Self {
        Self {
            start,
            time_step,
            values,
        }
    }
    pub fn daily(start: NaiveDateTime, values: Vec<f64>) -> Self {
        Self::new(start, TimeStep::DAILY, values)
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn time_at(&self, index: usize) -> Option<NaiveDateTime> {
        self.time_step.offset(self.start, index)
    }
    /// Timestamp of the last value.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.len().checked_sub(1).and_then(|i| self.time_at(i))
    }
    /// Number of leading values strictly before `t`.
    fn count_before(&self, t: NaiveDateTime) -> usize {
        if t <= self.start {
            return 0;
        }
        match self.time_step {
            TimeStep::Regular { seconds } => {
                let elapsed = (t - self.start).num_seconds();
                let step = i64::from(seconds.get());
                let n = (elapsed + step - 1) / step;
                (n.max(0) as usize).min(self.len())
            }
            TimeStep::Monthly => (0..self.len())
                .find(|&i| self.time_at(i).map_or(true, |ti| ti >= t))
                .unwrap_or(self.len()),
        }
    }
    /// Number of leading values at or before `t`.
    fn count_up_to(&self, t: NaiveDateTime) -> usize {
        if t < self.start {
            return 0;
        }
        match self.time_step {
            TimeStep::Regular { seconds } => {
                let elapsed = (t - self.start).num_seconds();
                let n = elapsed / i64::from(seconds.get()) + 1;
                (n as usize).min(self.len())
            }
            TimeStep::Monthly => (0..self.len())
                .find(|&i| self.time_at(i).map_or(true, |ti| ti > t))
                .unwrap_or(self.len()),
        }
    }
    /// Sub-series with timestamps in `[from, to]`; open ends keep the series bounds.
    pub fn window(&self, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> TimeSeries {
        let lo = from.map_or(0, |t| self.count_before(t));
        let hi = to.map_or(self.len(), |t| self.count_up_to(t)).max(lo);
        let start = self.time_at(lo).unwrap_or(self.start);
        TimeSeries::new(start, self.time_step, self.values[lo..hi].to_vec())
    }
    pub(crate) fn geometry(&self) -> Result<MarshaledTsGeometry> {
        let length = c_int::try_from(self.len()).map_err(|_| SwiftError::LengthMismatch {
            what: "time series length",
            expected: c_int::MAX as usize,
            actual: self.len(),
        })?;
        let (time_step_code, time_step_seconds) = match self.time_step {
            TimeStep::Regular { seconds } => (
                TIME_STEP_STRICTLY_REGULAR,
                c_int::try_from(seconds.get()).map_err(|_| SwiftError::InvalidTimeStep(seconds.get()))?,
            ),
            TimeStep::Monthly => (TIME_STEP_MONTHLY, 0),
        };
        Ok(MarshaledTsGeometry {
            start: MarshaledDateTime::from_datetime(&self.start),
            time_step_seconds,
            length,
            time_step_code,
        })
    }
    pub(crate) fn from_geometry(geom: &MarshaledTsGeometry, values: Vec<f64>) -> Result<Self> {
        SwiftError::check_len("series values", geom.length.max(0) as usize, values.len())?;
        Ok(Self {
            start: geom.start.to_datetime()?,
            time_step: TimeStep::from_native(geom.time_step_code, geom.time_step_seconds)?,
            values,
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }
    #[test]
    fn window_is_inclusive_on_both_ends() {
        let ts = TimeSeries::daily(at(2000, 1, 1, 0), (0..10).map(f64::from).collect());
        let w = ts.window(Some(at(2000, 1, 3, 0)), Some(at(2000, 1, 5, 0)));
        assert_eq!(w.start, at(2000, 1, 3, 0));
        assert_eq!(w.values, vec![2.0, 3.0, 4.0]);
    }
    #[test]
    fn window_between_steps_snaps_inwards() {
        let ts = TimeSeries::daily(at(2000, 1, 1, 0), (0..10).map(f64::from).collect());
        let w = ts.window(Some(at(2000, 1, 2, 12)), Some(at(2000, 1, 4, 12)));
        assert_eq!(w.start, at(2000, 1, 3, 0));
        assert_eq!(w.values, vec![2.0, 3.0]);
    }
    #[test]
    fn window_outside_series_is_empty_or_whole() {
        let ts = TimeSeries::daily(at(2000, 1, 1, 0), vec![1.0, 2.0, 3.0]);
        assert!(ts.window(None, Some(at(1999, 12, 1, 0))).is_empty());
        assert!(ts.window(Some(at(2001, 1, 1, 0)), None).is_empty());
        assert_eq!(ts.window(Some(at(1990, 1, 1, 0)), Some(at(2010, 1, 1, 0))), ts);
    }
    #[test]
    fn monthly_steps_follow_calendar_months() {
        let ts = TimeSeries::new(at(2001, 1, 31, 0), TimeStep::Monthly, vec![0.0; 3]);
        assert_eq!(ts.time_at(1), Some(at(2001, 2, 28, 0)));
        assert_eq!(ts.end(), Some(at(2001, 3, 31, 0)));
        let w = ts.window(Some(at(2001, 2, 1, 0)), None);
        assert_eq!(w.len(), 2);
    }
    #[test]
    fn geometry_carries_step_code_and_length() {
        let ts = TimeSeries::new(at(2010, 6, 1, 9), TimeStep::HOURLY, vec![0.5; 24]);
        let geom = ts.geometry().unwrap();
        assert_eq!(geom.length, 24);
        assert_eq!(geom.time_step_seconds, 3600);
        assert_eq!(geom.time_step_code, TIME_STEP_STRICTLY_REGULAR);
        assert_eq!(geom.start.hour, 9);
        let back = TimeSeries::from_geometry(&geom, ts.values.clone()).unwrap();
        assert_eq!(back, ts);
    }
    #[test]
    fn zero_or_oversized_steps_cannot_be_built() {
        assert!(matches!(TimeStep::regular(0), Err(SwiftError::InvalidTimeStep(0))));
        assert!(TimeStep::regular(u32::MAX).is_err());
        assert_eq!(TimeStep::regular(86_400).unwrap(), TimeStep::DAILY);
        let zero = r#"{"regular":{"seconds":0}}"#;
        assert!(serde_json::from_str::<TimeStep>(zero).is_err());
        let hourly: TimeStep = serde_json::from_str(r#"{"regular":{"seconds":3600}}"#).unwrap();
        let ts = TimeSeries::new(at(2000, 1, 1, 0), hourly, vec![1.0; 3]);
        assert_eq!(ts.window(Some(at(2000, 1, 1, 1)), None).len(), 2);
    }
    #[test]
    fn steps_beyond_the_native_range_are_rejected_in_geometry() {
        let step = TimeStep::Regular {
            seconds: NonZeroU32::new(u32::MAX).unwrap(),
        };
        let ts = TimeSeries::new(at(2000, 1, 1, 0), step, vec![1.0; 2]);
        assert!(matches!(ts.geometry(), Err(SwiftError::InvalidTimeStep(u32::MAX))));
    }
    #[test]
    fn geometry_length_must_match_values() {
        let ts = TimeSeries::daily(at(2010, 6, 1, 0), vec![0.5; 4]);
        let geom = ts.geometry().unwrap();
        let err = TimeSeries::from_geometry(&geom, vec![0.5; 3]).unwrap_err();
        assert!(matches!(err, SwiftError::LengthMismatch { expected: 4, actual: 3, .. }));
    }
}
