// src/activity/mod.rs
use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Tz;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    error::{ConvertError, Result},
    gpx::write_gpx,
};

pub mod load;

/// One GPS fix routed into an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// metres
    pub elevation: f64,
    /// source units, passed through untouched
    pub speed: f64,
    /// sample instant expressed in the owning activity's zone
    pub time: DateTime<Tz>,
}

/// A recorded activity: an inclusive `[start, stop]` window plus the points
/// collected into it.
#[derive(Debug, Clone)]
pub struct Activity {
    start: DateTime<FixedOffset>,
    stop: DateTime<FixedOffset>,
    activity_type: String,
    timezone: Tz,
    points: Vec<TrackPoint>,
}

impl Activity {
    pub fn new(
        start: DateTime<FixedOffset>,
        stop: DateTime<FixedOffset>,
        activity_type: impl Into<String>,
        timezone: Tz,
    ) -> Self {
        Self {
            start,
            stop,
            activity_type: activity_type.into(),
            timezone,
            points: Vec::new(),
        }
    }

    pub fn start(&self) -> &DateTime<FixedOffset> {
        &self.start
    }

    pub fn stop(&self) -> &DateTime<FixedOffset> {
        &self.stop
    }

    pub fn activity_type(&self) -> &str {
        &self.activity_type
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }

    /// Inclusive on both ends. Instants compare by absolute time, so the zone
    /// `instant` is expressed in does not matter.
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        self.start <= *instant && *instant <= self.stop
    }

    /// Express `instant` in this activity's zone.
    pub fn localize<Z: TimeZone>(&self, instant: &DateTime<Z>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }

    pub fn append(&mut self, point: TrackPoint) {
        self.points.push(point);
    }

    /// `<start>.gpx`, with the start rendered as `2021-01-01 00:00:00+00:00`.
    pub fn default_file_name(&self) -> String {
        format!("{}.gpx", self.start.format("%Y-%m-%d %H:%M:%S%:z"))
    }

    /// Write the collected points as GPX to `path`, or to
    /// [`default_file_name`](Self::default_file_name) in the working directory.
    ///
    /// Activities without points write nothing and return `Ok(None)`.
    pub fn flush(&self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        if !self.has_points() {
            return Ok(None);
        }
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.default_file_name()));

        let file = File::create(&path).map_err(|e| ConvertError::io("creating", &path, e))?;
        let mut out = BufWriter::new(file);
        write_gpx(self, &mut out).map_err(|e| ConvertError::io("writing", &path, e))?;
        out.flush()
            .map_err(|e| ConvertError::io("writing", &path, e))?;

        debug!(
            path = %path.display(),
            points = self.points.len(),
            activity_type = %self.activity_type,
            "wrote activity"
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timepoint::parse_timepoint;
    use anyhow::Result;
    use chrono::Utc;
    use tempfile::tempdir;

    fn walk(start: &str, stop: &str, tz: Tz) -> Activity {
        Activity::new(
            parse_timepoint(start).unwrap(),
            parse_timepoint(stop).unwrap(),
            "walk",
            tz,
        )
    }

    fn point(activity: &Activity, at: &str) -> TrackPoint {
        TrackPoint {
            latitude: 1.0,
            longitude: 2.0,
            elevation: 10.0,
            speed: 0.5,
            time: activity.localize(&parse_timepoint(at).unwrap()),
        }
    }

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        for (at, inside) in [
            ("2021-01-01T00:00:00+0000", true),
            ("2021-01-01T00:30:00+0000", true),
            ("2021-01-01T01:00:00+0000", true),
            ("2020-12-31T23:59:59+0000", false),
            ("2021-01-01T01:00:01+0000", false),
        ] {
            assert_eq!(a.contains(&parse_timepoint(at).unwrap()), inside, "{at}");
        }
    }

    #[test]
    fn contains_compares_absolute_instants() {
        let a = walk(
            "2021-07-01T10:00:00+0200",
            "2021-07-01T11:00:00+0200",
            Tz::Europe__Paris,
        );
        // 08:30 UTC is 10:30 in Paris
        let t = parse_timepoint("2021-07-01T08:30:00+0000").unwrap();
        assert!(a.contains(&t));
        assert!(a.contains(&a.localize(&t)));
        assert!(a.contains(&t.with_timezone(&Utc)));
        assert!(!a.contains(&parse_timepoint("2021-07-01T10:30:00+0000").unwrap()));
    }

    #[test]
    fn localize_uses_activity_zone() {
        let a = walk(
            "2021-07-01T10:00:00+0200",
            "2021-07-01T11:00:00+0200",
            Tz::Europe__Paris,
        );
        let local = a.localize(&parse_timepoint("2021-07-01T08:30:00+0000").unwrap());
        assert_eq!(
            local.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
            "2021-07-01T10:30:00+0200"
        );
    }

    #[test]
    fn append_sets_has_points() {
        let mut a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        assert!(!a.has_points());
        let p = point(&a, "2021-01-01T00:10:00+0000");
        a.append(p.clone());
        assert!(a.has_points());
        assert_eq!(a.points(), &[p]);
    }

    #[test]
    fn default_file_name_uses_start() {
        let a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        assert_eq!(a.default_file_name(), "2021-01-01 00:00:00+00:00.gpx");

        let b = walk(
            "2021-07-01T10:00:00+0200",
            "2021-07-01T11:00:00+0200",
            Tz::Europe__Paris,
        );
        assert_eq!(b.default_file_name(), "2021-07-01 10:00:00+02:00.gpx");
    }

    #[test]
    fn flush_without_points_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        let target = dir.path().join("out.gpx");
        assert_eq!(a.flush(Some(&target))?, None);
        assert!(!target.exists());
        Ok(())
    }

    #[test]
    fn flush_writes_to_given_path() -> Result<()> {
        let dir = tempdir()?;
        let mut a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        let p = point(&a, "2021-01-01T00:10:00+0000");
        a.append(p);
        let target = dir.path().join("out.gpx");
        assert_eq!(a.flush(Some(&target))?, Some(target.clone()));
        let xml = std::fs::read_to_string(&target)?;
        assert!(xml.contains("<trkpt lat=\"1\" lon=\"2\">"));
        Ok(())
    }

    #[test]
    fn flush_without_path_writes_default_name_in_working_dir() -> Result<()> {
        let dir = tempdir()?;
        let mut a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        let p = point(&a, "2021-01-01T00:10:00+0000");
        a.append(p);

        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir.path())?;
        let written = a.flush(None);
        std::env::set_current_dir(previous)?;

        let name = "2021-01-01 00:00:00+00:00.gpx";
        assert_eq!(written?, Some(PathBuf::from(name)));
        assert!(dir.path().join(name).exists());
        Ok(())
    }

    #[test]
    fn flush_reports_unwritable_path() {
        let mut a = walk(
            "2021-01-01T00:00:00+0000",
            "2021-01-01T01:00:00+0000",
            Tz::UTC,
        );
        let p = point(&a, "2021-01-01T00:10:00+0000");
        a.append(p);
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("out.gpx");
        let err = a.flush(Some(&target)).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }), "{err}");
    }
}
