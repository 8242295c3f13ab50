// src/correlate/mod.rs
use chrono::{DateTime, FixedOffset};
use csv::{StringRecord, StringRecordsIntoIter};
use std::{fs::File, io::Read, path::Path};
use tracing::warn;

use crate::{
    error::{ConvertError, Result},
    source::{csv_error, csv_reader, field, line_of, open, source_name},
    timepoint::parse_timepoint,
};

pub mod decode;

use decode::{decode_sample_list, DecodeError};

const TIME_COL: usize = 0;
const SAMPLES_COL: usize = 2;

/// One reading taken from the same position of the four lists of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub speed: f64,
}

/// One data row of the four series files, decoded.
#[derive(Debug, Clone)]
pub struct CorrelatedRow {
    /// 1-based data row (header excluded)
    pub row: u64,
    /// line of the row in the latitude file
    pub line: u64,
    pub timestamp: String,
    pub instant: DateTime<FixedOffset>,
    pub samples: Vec<Sample>,
}

/// A single time-series export: column 0 timestamp, column 2 encoded list.
pub struct SeriesReader<R: Read> {
    name: String,
    records: StringRecordsIntoIter<R>,
    rows: u64,
}

impl<R: Read> SeriesReader<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: csv_reader(reader).into_records(),
            rows: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn next_record(&mut self) -> Result<Option<StringRecord>> {
        match self.records.next() {
            None => Ok(None),
            Some(Err(e)) => Err(csv_error(&self.name, e)),
            Some(Ok(record)) => {
                self.rows += 1;
                Ok(Some(record))
            }
        }
    }

    /// Total readable data rows, reading whatever is left. Records the csv
    /// reader rejects are not counted.
    fn count_rows(&mut self) -> u64 {
        self.rows + self.records.by_ref().filter(|r| r.is_ok()).count() as u64
    }

    fn decode(&self, record: &StringRecord) -> Result<Vec<f64>> {
        let line = line_of(record, self.rows);
        let cell = field(record, SAMPLES_COL, &self.name, line)?;
        decode_sample_list(cell).map_err(|source| ConvertError::Decode {
            file: self.name.clone(),
            line,
            source,
        })
    }
}

impl SeriesReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(open(path)?, source_name(path)))
    }
}

/// Walks latitude, longitude, altitude and speed exports in lock-step.
///
/// Every row taken from the latitude file takes exactly one row from each
/// companion. A companion that runs out early, or still has rows once the
/// latitude file is done, fails with [`ConvertError::RowCountMismatch`].
/// The iterator stops after the first error.
pub struct RowCorrelator<R: Read> {
    latitude: SeriesReader<R>,
    longitude: SeriesReader<R>,
    altitude: SeriesReader<R>,
    speed: SeriesReader<R>,
    finished: bool,
}

impl<R: Read> RowCorrelator<R> {
    pub fn new(
        latitude: SeriesReader<R>,
        longitude: SeriesReader<R>,
        altitude: SeriesReader<R>,
        speed: SeriesReader<R>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            speed,
            finished: false,
        }
    }

    fn mismatch(&mut self, companion: usize) -> ConvertError {
        let expected = self.latitude.count_rows();
        let primary = self.latitude.name.clone();
        let other = self.companion_mut(companion);
        ConvertError::RowCountMismatch {
            file: other.name.clone(),
            found: other.count_rows(),
            primary,
            expected,
        }
    }

    fn companion_mut(&mut self, idx: usize) -> &mut SeriesReader<R> {
        match idx {
            0 => &mut self.longitude,
            1 => &mut self.altitude,
            _ => &mut self.speed,
        }
    }

    fn step(&mut self) -> Result<Option<CorrelatedRow>> {
        let Some(lat_record) = self.latitude.next_record()? else {
            for idx in 0..3 {
                if self.companion_mut(idx).next_record()?.is_some() {
                    return Err(self.mismatch(idx));
                }
            }
            return Ok(None);
        };

        let row = self.latitude.rows;
        let line = line_of(&lat_record, row);
        let timestamp = field(&lat_record, TIME_COL, &self.latitude.name, line)?.to_string();

        let mut companions = Vec::with_capacity(3);
        for idx in 0..3 {
            match self.companion_mut(idx).next_record()? {
                Some(record) => companions.push(record),
                None => return Err(self.mismatch(idx)),
            }
        }
        let (lon_record, alt_record, speed_record) =
            (&companions[0], &companions[1], &companions[2]);

        for (series, record) in [
            (&self.longitude, lon_record),
            (&self.altitude, alt_record),
            (&self.speed, speed_record),
        ] {
            let other = record.get(TIME_COL).map(str::trim).unwrap_or_default();
            if other != timestamp {
                warn!(
                    row,
                    file = series.name(),
                    expected = %timestamp,
                    found = other,
                    "companion timestamp differs from latitude"
                );
            }
        }

        let lats = self.latitude.decode(&lat_record)?;
        let lons = self.longitude.decode(lon_record)?;
        let alts = self.altitude.decode(alt_record)?;
        let speeds = self.speed.decode(speed_record)?;

        for (series, values, record) in [
            (&self.longitude, &lons, lon_record),
            (&self.altitude, &alts, alt_record),
            (&self.speed, &speeds, speed_record),
        ] {
            if values.len() != lats.len() {
                return Err(ConvertError::Decode {
                    file: series.name.clone(),
                    line: line_of(record, row),
                    source: DecodeError::LengthMismatch {
                        series: series.name.clone(),
                        expected: lats.len(),
                        found: values.len(),
                    },
                });
            }
        }

        let instant = parse_timepoint(&timestamp).map_err(|source| ConvertError::Parse {
            file: self.latitude.name.clone(),
            line,
            source,
        })?;

        let samples = lats
            .iter()
            .zip(&lons)
            .zip(&alts)
            .zip(&speeds)
            .map(|(((&latitude, &longitude), &altitude), &speed)| Sample {
                latitude,
                longitude,
                altitude,
                speed,
            })
            .collect();

        Ok(Some(CorrelatedRow {
            row,
            line,
            timestamp,
            instant,
            samples,
        }))
    }
}

impl RowCorrelator<File> {
    pub fn open(latitude: &Path, longitude: &Path, altitude: &Path, speed: &Path) -> Result<Self> {
        Ok(Self::new(
            SeriesReader::open(latitude)?,
            SeriesReader::open(longitude)?,
            SeriesReader::open(altitude)?,
            SeriesReader::open(speed)?,
        ))
    }
}

impl<R: Read> Iterator for RowCorrelator<R> {
    type Item = Result<CorrelatedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
