//! CSV dataset loaders.
//!
//! # CSV formats
//!
//! One record per row, header row required.  Optional columns may be left
//! empty.
//!
//! ```csv
//! # incidents.csv
//! lat,lon,category,severity,timestamp,description
//! 42.8746,74.5698,robbery,5,2024-05-01T22:10:00Z,phone snatched
//!
//! # complaints.csv
//! lat,lon,weight,reporter_female,timestamp,text
//! 42.8751,74.5702,4.5,true,2024-05-03 23:00:00,
//!
//! # safe_places.csv
//! lat,lon,kind,power,radius_m,name
//! 42.8760,74.5710,police,2.5,300,Central precinct
//!
//! # lit_segments.csv
//! start_lat,start_lon,end_lat,end_lon
//! 42.8740,74.5690,42.8790,74.5690
//! ```
//!
//! Timestamps go through [`sr_core::parse_timestamp`].  An unparsable
//! timestamp is **not** an error: the record is kept and treated as
//! happening "now".  Unparsable numbers and out-of-range coordinates are
//! errors, reported with the 1-based data row number.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use sr_core::{Complaint, GeoPoint, Incident, LitSegment, SafePlace, SafePlaceKind, parse_timestamp};

use crate::{RiskError, RiskResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IncidentRecord {
    lat:         f64,
    lon:         f64,
    category:    String,
    severity:    u8,
    timestamp:   Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct ComplaintRecord {
    lat:             f64,
    lon:             f64,
    weight:          f64,
    reporter_female: Option<String>,
    timestamp:       Option<String>,
    text:            Option<String>,
}

#[derive(Deserialize)]
struct SafePlaceRecord {
    lat:      f64,
    lon:      f64,
    kind:     String,
    power:    f64,
    radius_m: f64,
    name:     Option<String>,
}

#[derive(Deserialize)]
struct LitSegmentRecord {
    start_lat: f64,
    start_lon: f64,
    end_lat:   f64,
    end_lon:   f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load incidents from a CSV file.
pub fn load_incidents_csv(path: &Path) -> RiskResult<Vec<Incident>> {
    load_incidents_reader(std::fs::File::open(path)?)
}

/// Like [`load_incidents_csv`] but accepts any `Read` source.
pub fn load_incidents_reader<R: Read>(reader: R) -> RiskResult<Vec<Incident>> {
    map_rows(reader, "incident", |row: IncidentRecord| {
        let point = point(row.lat, row.lon)?;
        let timestamp = timestamp("incident", row.timestamp.as_deref());
        let incident = Incident::new(point, row.category, row.severity, timestamp);
        Ok(match row.description {
            Some(d) => incident.with_description(d),
            None => incident,
        })
    })
}

/// Load complaints from a CSV file.
pub fn load_complaints_csv(path: &Path) -> RiskResult<Vec<Complaint>> {
    load_complaints_reader(std::fs::File::open(path)?)
}

/// Like [`load_complaints_csv`] but accepts any `Read` source.
pub fn load_complaints_reader<R: Read>(reader: R) -> RiskResult<Vec<Complaint>> {
    map_rows(reader, "complaint", |row: ComplaintRecord| {
        let point = point(row.lat, row.lon)?;
        let female = parse_flag(row.reporter_female.as_deref())?;
        let timestamp = timestamp("complaint", row.timestamp.as_deref());
        let complaint = Complaint::new(point, row.weight, female, timestamp);
        Ok(match row.text {
            Some(t) => complaint.with_text(t),
            None => complaint,
        })
    })
}

/// Load safe places from a CSV file.
pub fn load_safe_places_csv(path: &Path) -> RiskResult<Vec<SafePlace>> {
    load_safe_places_reader(std::fs::File::open(path)?)
}

/// Like [`load_safe_places_csv`] but accepts any `Read` source.
pub fn load_safe_places_reader<R: Read>(reader: R) -> RiskResult<Vec<SafePlace>> {
    map_rows(reader, "safe place", |row: SafePlaceRecord| {
        let point = point(row.lat, row.lon)?;
        let kind: SafePlaceKind = row.kind.parse()?;
        if !(row.radius_m.is_finite() && row.radius_m >= 0.0) {
            return Err(RiskError::Parse(format!("invalid radius_m {}", row.radius_m)));
        }
        let place = SafePlace::new(point, kind, row.power, row.radius_m);
        Ok(match row.name {
            Some(n) => place.with_name(n),
            None => place,
        })
    })
}

/// Load lit street segments from a CSV file.
pub fn load_lit_segments_csv(path: &Path) -> RiskResult<Vec<LitSegment>> {
    load_lit_segments_reader(std::fs::File::open(path)?)
}

/// Like [`load_lit_segments_csv`] but accepts any `Read` source.
pub fn load_lit_segments_reader<R: Read>(reader: R) -> RiskResult<Vec<LitSegment>> {
    map_rows(reader, "lit segment", |row: LitSegmentRecord| {
        Ok(LitSegment::new(
            point(row.start_lat, row.start_lon)?,
            point(row.end_lat, row.end_lon)?,
        ))
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Deserialize every row as `Rec` and convert it, tagging errors with the
/// data row number.
fn map_rows<R, Rec, T>(
    reader: R,
    what: &str,
    convert: impl Fn(Rec) -> RiskResult<T>,
) -> RiskResult<Vec<T>>
where
    R: Read,
    Rec: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut out = Vec::new();

    for (i, result) in csv_reader.deserialize::<Rec>().enumerate() {
        let row = i + 1;
        let rec = result.map_err(|e| RiskError::Parse(format!("{what} row {row}: {e}")))?;
        let item = convert(rec).map_err(|e| match e {
            RiskError::Io(io) => RiskError::Io(io),
            other => RiskError::Parse(format!("{what} row {row}: {other}")),
        })?;
        out.push(item);
    }

    log::debug!("loaded {} {what} record(s)", out.len());
    Ok(out)
}

fn point(lat: f64, lon: f64) -> RiskResult<GeoPoint> {
    Ok(GeoPoint::try_new(lat, lon)?)
}

fn timestamp(what: &str, raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() {
        log::debug!("{what}: unparsable timestamp {raw:?}, treating as now");
    }
    parsed
}

fn parse_flag(raw: Option<&str>) -> RiskResult<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("n") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("y") => Ok(true),
        Some(other) => Err(RiskError::Parse(format!(
            "invalid reporter_female {other:?}: expected true/false, yes/no or 1/0"
        ))),
    }
}
