//! Line-by-line event formatting
//!
//! Input is NDJSON: one event record per line. Each line either
//! parses into an [`EventRecord`] or is skipped with a warning, so a
//! bad record never takes down the rest of the feed. All events in a
//! run are formatted against the same clock reading.

use std::io::{BufRead, Write};

use anyhow::Context;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::json;

use timcast::{
    group_by_border, is_commercial_vehicle_relevant, near_border, BorderGroup, BorderProximity,
    CifsMessage, EventRecord, TimMessage,
};

use crate::cli::Args;

/// Run the application
///
/// Reads one JSON event record per line from `input` and writes the
/// renderings selected by `args` to `output`. `now` anchors every
/// message in the run to the same instant.
pub fn run<R, W>(args: &Args, now: &DateTime<Utc>, input: R, output: &mut W) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let events = read_events(input)?;
    debug!("formatting {} events", events.len());

    let proximities: Vec<Option<BorderProximity>> = events
        .iter()
        .map(|event| near_border(event, args.threshold))
        .collect();

    for (count, (event, proximity)) in events.iter().zip(&proximities).enumerate() {
        if args.json {
            write_json(args, event, proximity.as_ref(), now, output)?;
        } else {
            if count > 0 {
                writeln!(output, "---")?;
            }
            write_text(args, event, proximity.as_ref(), now, output)?;
        }
    }

    if args.group {
        let annotated = events
            .iter()
            .zip(&proximities)
            .filter_map(|(event, proximity)| Some((event, (*proximity)?)));
        write_group_summary(&group_by_border(annotated), output)?;
    }

    Ok(())
}

// Parse events, one per line. Blank lines are ignored and malformed
// lines are skipped with a warning.
fn read_events<R>(input: R) -> anyhow::Result<Vec<EventRecord>>
where
    R: BufRead,
{
    let mut events = Vec::new();

    for (lineno, line) in input.lines().enumerate() {
        let line = line.context("unable to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<EventRecord>(&line) {
            Ok(event) => events.push(event),
            Err(err) => warn!("line {}: skipping malformed event: {}", lineno + 1, err),
        }
    }

    Ok(events)
}

fn write_text<W>(
    args: &Args,
    event: &EventRecord,
    proximity: Option<&BorderProximity>,
    now: &DateTime<Utc>,
    output: &mut W,
) -> anyhow::Result<()>
where
    W: Write,
{
    if args.format.wants_tim() {
        writeln!(output, "{}", TimMessage::from_event(event, now))?;
        if is_commercial_vehicle_relevant(event) {
            writeln!(output, "[CV-TIM] Relevant to commercial vehicles")?;
        }
    }

    if args.format.wants_cifs() {
        if args.format.wants_tim() {
            writeln!(output)?;
        }
        writeln!(output, "{}", CifsMessage::from_event(event, now))?;
    }

    if let Some(proximity) = proximity {
        writeln!(output, "Near border: {}", proximity)?;
    }

    Ok(())
}

// One JSON object per event. Key order is not significant.
fn write_json<W>(
    args: &Args,
    event: &EventRecord,
    proximity: Option<&BorderProximity>,
    now: &DateTime<Utc>,
    output: &mut W,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut object = serde_json::Map::new();
    object.insert("id".to_owned(), json!(event.id));
    object.insert(
        "cvRelevant".to_owned(),
        json!(is_commercial_vehicle_relevant(event)),
    );

    if args.format.wants_tim() {
        object.insert(
            "tim".to_owned(),
            serde_json::to_value(TimMessage::from_event(event, now))?,
        );
    }

    if args.format.wants_cifs() {
        object.insert(
            "cifs".to_owned(),
            serde_json::to_value(CifsMessage::from_event(event, now))?,
        );
    }

    object.insert(
        "border".to_owned(),
        match proximity {
            Some(proximity) => serde_json::to_value(proximity)?,
            None => serde_json::Value::Null,
        },
    );

    writeln!(output, "{}", serde_json::Value::Object(object))?;
    Ok(())
}

fn write_group_summary<W>(groups: &[BorderGroup<'_>], output: &mut W) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(output)?;
    if groups.is_empty() {
        writeln!(output, "No events near a state border.")?;
        return Ok(());
    }

    writeln!(output, "Events near state borders:")?;
    for group in groups {
        writeln!(
            output,
            "  {} ({}/{}): {} event(s)",
            group.border_name,
            group.states[0],
            group.states[1],
            group.events.len()
        )?;
        for event in &group.events {
            writeln!(output, "    - {}", event.id)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use clap::Parser;

    const EVENTS: &str = r#"{"id": "UT-1", "description": "Bridge construction", "corridor": "I-80", "latitude": 41.222, "longitude": -111.046}
not json at all
{"id": "NE-2", "description": "Crash"}
"#;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn run_with(argv: &[&str], input: &str) -> String {
        let args = Args::try_parse_from(argv).expect("parse args");
        let mut output = Vec::new();
        run(&args, &noon(), input.as_bytes(), &mut output).expect("run");
        String::from_utf8(output).expect("utf8 output")
    }

    #[test]
    fn test_text_output() {
        let text = run_with(&["timfmt"], EVENTS);

        assert!(text.contains("TIM-UT-1"));
        assert!(text.contains("CIFS UT-1"));
        assert!(text.contains("[CV-TIM]"));
        assert!(text.contains("Near border: Evanston (UT/WY), 0 mi"));

        // both events rendered, separated
        assert!(text.contains("---"));
        assert!(text.contains("TIM-NE-2"));

        // the malformed line is skipped, not fatal
        assert!(!text.contains("not json"));
    }

    #[test]
    fn test_format_selection() {
        let tim_only = run_with(&["timfmt", "--format", "tim"], EVENTS);
        assert!(tim_only.contains("TIM-UT-1"));
        assert!(!tim_only.contains("CIFS UT-1"));

        let cifs_only = run_with(&["timfmt", "--format", "cifs"], EVENTS);
        assert!(!cifs_only.contains("TIM-UT-1"));
        assert!(cifs_only.contains("CIFS UT-1"));
        assert!(!cifs_only.contains("[CV-TIM]"));
    }

    #[test]
    fn test_json_output() {
        let out = run_with(&["timfmt", "--json"], EVENTS);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["id"], "UT-1");
        assert_eq!(first["tim"]["messageType"], "TIM");
        assert_eq!(first["cifs"]["messageType"], "CIFS");
        assert_eq!(first["border"]["nearBorder"], true);
        assert_eq!(first["border"]["borderName"], "Evanston");
        assert_eq!(first["cvRelevant"], true);

        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json line");
        assert_eq!(second["id"], "NE-2");
        assert_eq!(second["border"], serde_json::Value::Null);
        assert_eq!(second["cvRelevant"], false);
    }

    #[test]
    fn test_threshold_flag() {
        // about 45 miles from the Evanston crossing
        let offset = r#"{"id": "UT-9", "corridor": "I-80", "latitude": 41.222, "longitude": -110.1812}"#;

        let far = run_with(&["timfmt"], offset);
        assert!(!far.contains("Near border:"));

        let near = run_with(&["timfmt", "--threshold", "50"], offset);
        assert!(near.contains("Near border: Evanston (UT/WY), 45 mi"));
    }

    #[test]
    fn test_group_summary() {
        let out = run_with(&["timfmt", "--group", "--format", "tim"], EVENTS);
        assert!(out.contains("Events near state borders:"));
        assert!(out.contains("Evanston (UT/WY): 1 event(s)"));
        assert!(out.contains("- UT-1"));

        let out = run_with(&["timfmt", "--group"], r#"{"id": "X"}"#);
        assert!(out.contains("No events near a state border."));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(run_with(&["timfmt"], ""), "");
        assert_eq!(run_with(&["timfmt"], "\n\n"), "");
    }
}
