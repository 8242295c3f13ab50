use chrono_tz::Tz;
use std::{io::Read, path::Path};
use tracing::{debug, info, instrument};

use crate::{
    activity::Activity,
    error::{ConvertError, Result},
    source::{csv_error, csv_reader, field, line_of, open, source_name},
    timepoint::parse_timepoint,
};

const START_COL: usize = 0;
const STOP_COL: usize = 1;
const TIMEZONE_COL: usize = 4;
const TYPE_COL: usize = 5;

/// Read the activity list, one [`Activity`] per data row, in file order.
pub fn load_activities<R: Read>(reader: R, file: &str) -> Result<Vec<Activity>> {
    let mut rdr = csv_reader(reader);
    let mut activities = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error(file, e))?;
        let line = line_of(&record, idx as u64 + 1);

        let parse = |col: usize| {
            let raw = field(&record, col, file, line)?;
            parse_timepoint(raw).map_err(|source| ConvertError::Parse {
                file: file.to_string(),
                line,
                source,
            })
        };
        let start = parse(START_COL)?;
        let stop = parse(STOP_COL)?;

        let zone_name = field(&record, TIMEZONE_COL, file, line)?;
        let timezone: Tz = zone_name.parse().map_err(|_| ConvertError::Timezone {
            file: file.to_string(),
            line,
            name: zone_name.to_string(),
        })?;
        let activity_type = field(&record, TYPE_COL, file, line)?;

        debug!(line, %start, %stop, %timezone, activity_type, "loaded activity");
        activities.push(Activity::new(start, stop, activity_type, timezone));
    }

    Ok(activities)
}

#[instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn load_activities_file(path: &Path) -> Result<Vec<Activity>> {
    let file = open(path)?;
    let activities = load_activities(file, &source_name(path))?;
    info!(count = activities.len(), "loaded activities");
    Ok(activities)
}
