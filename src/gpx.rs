use chrono::SecondsFormat;
use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Writer,
};
use std::io::{self, Write};

use crate::activity::Activity;

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const GPX_SCHEMA: &str = "http://www.topografix.com/GPX/1/1/gpx.xsd";
/// Garmin's TrackPointExtension v2 is the usual home for per-point speed.
const TPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v2";
const TPX_SCHEMA: &str = "https://www8.garmin.com/xmlschemas/TrackPointExtensionv2.xsd";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const CREATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Drop characters XML 1.0 cannot carry even escaped (C0 controls other than
/// tab/newline/CR, U+FFFE, U+FFFF).
fn xml_chars(raw: &str) -> String {
    raw.chars()
        .filter(|&c| match c {
            '\t' | '\n' | '\r' => true,
            '\u{FFFE}' | '\u{FFFF}' => false,
            c => c >= ' ',
        })
        .collect()
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> io::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Serialize `activity` as a GPX 1.1 document with one track and one segment.
///
/// Times are written in the zone each point carries (`Z` for UTC); speed goes
/// into `gpxtpx:TrackPointExtension`. Nothing depends on the wall clock, so the
/// same activity always serializes to the same bytes.
pub fn write_gpx<W: Write>(activity: &Activity, out: W) -> io::Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let schema_location = format!("{GPX_NS} {GPX_SCHEMA} {TPX_NS} {TPX_SCHEMA}");
    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", CREATOR));
    gpx.push_attribute(("xmlns", GPX_NS));
    gpx.push_attribute(("xmlns:gpxtpx", TPX_NS));
    gpx.push_attribute(("xmlns:xsi", XSI_NS));
    gpx.push_attribute(("xsi:schemaLocation", schema_location.as_str()));
    emit(&mut writer, Event::Start(gpx))?;
    emit(&mut writer, Event::Start(BytesStart::new("trk")))?;

    let kind = xml_chars(activity.activity_type());
    if !kind.is_empty() {
        text_element(&mut writer, "type", &kind)?;
    }

    emit(&mut writer, Event::Start(BytesStart::new("trkseg")))?;
    for p in activity.points() {
        let (lat, lon) = (p.latitude.to_string(), p.longitude.to_string());
        let mut trkpt = BytesStart::new("trkpt");
        trkpt.push_attribute(("lat", lat.as_str()));
        trkpt.push_attribute(("lon", lon.as_str()));
        emit(&mut writer, Event::Start(trkpt))?;

        text_element(&mut writer, "ele", &p.elevation.to_string())?;
        text_element(
            &mut writer,
            "time",
            &p.time.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new("extensions")))?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("gpxtpx:TrackPointExtension")),
        )?;
        text_element(&mut writer, "gpxtpx:speed", &p.speed.to_string())?;
        emit(
            &mut writer,
            Event::End(BytesEnd::new("gpxtpx:TrackPointExtension")),
        )?;
        emit(&mut writer, Event::End(BytesEnd::new("extensions")))?;
        emit(&mut writer, Event::End(BytesEnd::new("trkpt")))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("trkseg")))?;
    emit(&mut writer, Event::End(BytesEnd::new("trk")))?;
    emit(&mut writer, Event::End(BytesEnd::new("gpx")))?;

    writer.get_mut().write_all(b"\n")
}
