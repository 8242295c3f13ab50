use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::{debug, info, instrument};

use crate::{
    activity::load::load_activities_file,
    correlate::RowCorrelator,
    error::{ConvertError, Result},
    route::{ActivityRouter, PointObserver},
};

pub const ACTIVITY_FILE: &str = "activities.csv";
pub const LATITUDE_FILE: &str = "raw_location_latitude.csv";
pub const LONGITUDE_FILE: &str = "raw_location_longitude.csv";
pub const ALTITUDE_FILE: &str = "raw_location_altitude.csv";
pub const SPEED_FILE: &str = "raw_location_gps-speed.csv";

/// Locations of the five export files.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub activities: PathBuf,
    pub latitude: PathBuf,
    pub longitude: PathBuf,
    pub altitude: PathBuf,
    pub speed: PathBuf,
}

impl InputPaths {
    /// The fixed export file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            activities: dir.join(ACTIVITY_FILE),
            latitude: dir.join(LATITUDE_FILE),
            longitude: dir.join(LONGITUDE_FILE),
            altitude: dir.join(ALTITUDE_FILE),
            speed: dir.join(SPEED_FILE),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub activities: usize,
    pub rows: u64,
    pub samples: usize,
    pub routed: usize,
    pub dropped: usize,
    pub written: Vec<PathBuf>,
}

/// Route every sample of the series files into the activities and write one
/// GPX file per activity that received points.
///
/// Files are only written once every row has been read, so a failing run
/// leaves `out_dir` untouched.
#[instrument(level = "info", skip(inputs, out_dir, observer), fields(out_dir = %out_dir.display()))]
pub fn convert<O: PointObserver>(
    inputs: &InputPaths,
    out_dir: &Path,
    observer: O,
) -> Result<ConvertSummary> {
    let started = Instant::now();
    let activities = load_activities_file(&inputs.activities)?;

    let mut summary = ConvertSummary {
        activities: activities.len(),
        ..Default::default()
    };
    let mut router = ActivityRouter::new(activities, observer);

    {
        let rows = RowCorrelator::open(
            &inputs.latitude,
            &inputs.longitude,
            &inputs.altitude,
            &inputs.speed,
        )?;
        for row in rows {
            let row = row?;
            let outcome = router.route(&row);
            summary.rows += 1;
            summary.samples += row.samples.len();
            summary.routed += outcome.routed;
            summary.dropped += outcome.dropped;
        }
    }
    info!(
        rows = summary.rows,
        samples = summary.samples,
        routed = summary.routed,
        dropped = summary.dropped,
        "correlated series"
    );

    fs::create_dir_all(out_dir).map_err(|e| ConvertError::io("creating", out_dir, e))?;
    for activity in router.into_activities() {
        let target = out_dir.join(activity.default_file_name());
        match activity.flush(Some(&target))? {
            Some(path) => summary.written.push(path),
            None => debug!(start = %activity.start(), "no points, skipped"),
        }
    }

    info!(
        written = summary.written.len(),
        elapsed = ?started.elapsed(),
        "conversion finished"
    );
    Ok(summary)
}
