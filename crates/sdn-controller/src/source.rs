//! Newline-delimited JSON event source.
//!
//! Lets the controller run against a recorded event stream instead of a live
//! fabric. Each non-empty line holds one [`ControllerEvent`]; lines starting
//! with `#` are comments. Malformed lines are logged and skipped.

use crate::dispatcher::ControllerEvent;
use crate::error::{ControllerError, Result};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Counters for one pass over a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceReport {
    pub lines: usize,
    pub events: usize,
    pub malformed: usize,
}

/// Decodes one line. Blank lines and comments yield `None`.
pub fn decode_line(line_no: usize, line: &str) -> Result<Option<ControllerEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| ControllerError::EventDecode {
            line: line_no,
            source,
        })
}

/// Reads events from `reader` and sends them down `events` until EOF.
///
/// Lines that are not UTF-8 or not a valid event are counted as malformed and
/// skipped.
///
/// Fails with [`ControllerError::ChannelClosed`] if the receiver goes away
/// first.
pub async fn feed_json_lines<R>(mut reader: R, events: mpsc::Sender<ControllerEvent>) -> Result<SourceReport>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut report = SourceReport::default();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        report.lines += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!(line = report.lines, "skipping event line that is not valid UTF-8");
            report.malformed += 1;
            continue;
        };

        match decode_line(report.lines, line) {
            Ok(Some(event)) => {
                events
                    .send(event)
                    .await
                    .map_err(|_| ControllerError::ChannelClosed)?;
                report.events += 1;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "skipping malformed event");
                report.malformed += 1;
            }
        }
    }

    info!(
        lines = report.lines,
        events = report.events,
        malformed = report.malformed,
        "event source exhausted"
    );
    Ok(report)
}

/// Opens `path` as an event source; `-` reads standard input.
pub async fn open(path: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path).await?;
    Ok(Box::new(BufReader::new(file)))
}
