use super::Context;
use crate::cli::sink::Error as SinkError;
use crate::cli::sink::Sink;
use crate::data::notice::Notice;
use crate::httpclient::data::Observation;
use crate::httpclient::Error as HttpError;
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use std::fmt;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Error downloading a file of observation {}: {}", id, source))]
    Download { source: HttpError, id: u64 },

    #[snafu(display("Error writing data: {}", source))]
    WriteResult { source: SinkError },
}

/// Prints the observation unless quiet, and downloads its data files
/// unless downloads are disabled. Returns the number of downloaded
/// files.
pub async fn handle(ctx: &Context, obs: &Observation) -> Result<usize, Error> {
    if !ctx.quiet {
        ctx.write_result(obs).context(WriteResultSnafu)?;
    }
    if ctx.no_download {
        return Ok(0);
    }

    let links = obs.artifact_links();
    if !ctx.quiet && !links.is_empty() {
        ctx.notify(Notice::info(
            "\n>>> Downloading data files, please be patient...\n",
        ))
        .context(WriteResultSnafu)?;
    }
    let dir = ctx.observation_dir(obs.id);
    for link in links.iter() {
        ctx.client
            .download(link, &dir)
            .await
            .context(DownloadSnafu { id: obs.id })?;
    }
    Ok(links.len())
}

/// Shows a field as the api sent it: strings without quotes, missing
/// values as `-`.
struct Field<'a>(&'a Option<Value>);

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None | Some(Value::Null) => write!(f, "-"),
            Some(Value::String(s)) => write!(f, "{}", s),
            Some(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------------------------------")?;
        writeln!(f, "Observation ID:   {}", self.id)?;
        writeln!(f, "Start Time:       {}", Field(&self.start))?;
        writeln!(f, "End Time:         {}", Field(&self.end))?;
        writeln!(f, "Station ID:       {}", Field(&self.ground_station))?;
        writeln!(f, "Station Name:     {}", Field(&self.station_name))?;
        writeln!(
            f,
            "Lat, Long:        {},{}",
            Field(&self.station_lat),
            Field(&self.station_lng)
        )?;
        writeln!(f, "Station Altitude: {}", Field(&self.station_alt))?;
        writeln!(f, "Transmitter:      {}", Field(&self.transmitter))?;
        writeln!(f, "NORAD CAT ID:     {}", Field(&self.norad_cat_id))?;
        writeln!(f, "Rise Azimuth:     {}", Field(&self.rise_azimuth))?;
        writeln!(f, "Set Azimuth:      {}", Field(&self.set_azimuth))?;
        writeln!(f, "Max Altitude:     {}", Field(&self.max_altitude))?;
        write!(f, "TLE:              {}", Field(&self.tle))
    }
}

impl Sink for Observation {}

#[test]
fn display_fields() {
    let obs: Observation = serde_json::from_value(serde_json::json!({
        "id": 12345,
        "start": "2018-08-01T10:00:00Z",
        "ground_station": 13,
        "station_name": "Boulder",
        "station_lat": 40.0,
        "station_lng": -105.25,
        "norad_cat_id": 25544,
        "max_altitude": 45.5
    }))
    .unwrap();
    let text = obs.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 14);
    assert_eq!(lines[0], "------------------------------------");
    assert_eq!(lines[1], "Observation ID:   12345");
    assert_eq!(lines[2], "Start Time:       2018-08-01T10:00:00Z");
    assert_eq!(lines[3], "End Time:         -");
    assert_eq!(lines[6], "Lat, Long:        40.0,-105.25");
    assert_eq!(lines[9], "NORAD CAT ID:     25544");
    assert_eq!(lines[12], "Max Altitude:     45.5");
    assert_eq!(lines[13], "TLE:              -");
}

#[test]
fn display_fields_as_sent() {
    let obs: Observation = serde_json::from_value(serde_json::json!({
        "id": 7,
        "station_name": null,
        "station_alt": "1600",
        "transmitter": 42,
        "tle": {"tle1": "1 25544U"}
    }))
    .unwrap();
    let text = obs.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[5], "Station Name:     -");
    assert_eq!(lines[7], "Station Altitude: 1600");
    assert_eq!(lines[8], "Transmitter:      42");
    assert_eq!(lines[13], "TLE:              {\"tle1\":\"1 25544U\"}");
}
