use tracing::trace;

use crate::{
    activity::{Activity, TrackPoint},
    correlate::CorrelatedRow,
};

/// Notified once for every point appended to an activity.
pub trait PointObserver {
    fn on_point(&mut self, activity: &Activity, point: &TrackPoint);
}

impl<F> PointObserver for F
where
    F: FnMut(&Activity, &TrackPoint),
{
    fn on_point(&mut self, activity: &Activity, point: &TrackPoint) {
        self(activity, point)
    }
}

/// Emits a `trace` event per routed point.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracePoints;

impl PointObserver for TracePoints {
    fn on_point(&mut self, activity: &Activity, point: &TrackPoint) {
        trace!(
            activity = %activity.start(),
            lat = point.latitude,
            lon = point.longitude,
            time = %point.time,
            "adding point"
        );
    }
}

/// Counts for one routed row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RouteOutcome {
    pub routed: usize,
    pub dropped: usize,
}

/// Hands samples to the first activity, in declaration order, whose window
/// contains them. Overlapping windows therefore resolve to the earlier one;
/// samples outside every window are dropped.
pub struct ActivityRouter<O = TracePoints> {
    activities: Vec<Activity>,
    observer: O,
}

impl<O: PointObserver> ActivityRouter<O> {
    pub fn new(activities: Vec<Activity>, observer: O) -> Self {
        Self {
            activities,
            observer,
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn into_activities(self) -> Vec<Activity> {
        self.activities
    }

    pub fn route(&mut self, row: &CorrelatedRow) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();

        // every sample of a row shares its instant, so the owner is the same
        let owner = self
            .activities
            .iter()
            .position(|activity| activity.contains(&activity.localize(&row.instant)));

        let Some(idx) = owner else {
            outcome.dropped = row.samples.len();
            return outcome;
        };

        let activity = &mut self.activities[idx];
        let time = activity.localize(&row.instant);
        for sample in &row.samples {
            let point = TrackPoint {
                latitude: sample.latitude,
                longitude: sample.longitude,
                elevation: sample.altitude,
                speed: sample.speed,
                time,
            };
            self.observer.on_point(activity, &point);
            activity.append(point);
            outcome.routed += 1;
        }
        outcome
    }
}
