//! Convert HealthMate raw location exports into one GPX track per activity.
//!
//! The four `raw_location_*.csv` series are read in lock-step by
//! [`correlate::RowCorrelator`], every decoded sample is handed to the first
//! matching activity by [`route::ActivityRouter`], and each activity that
//! collected points is written out through [`gpx::write_gpx`].

pub mod activity;
pub mod convert;
pub mod correlate;
pub mod error;
pub mod gpx;
pub mod route;
pub mod source;
pub mod timepoint;

pub use activity::{Activity, TrackPoint};
pub use convert::{convert, ConvertSummary, InputPaths};
pub use error::ConvertError;
pub use route::{ActivityRouter, PointObserver, TracePoints};
