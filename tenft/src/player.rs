use serde::Serialize;

use crate::clock::{parse_elapsed, parse_unsigned};
use crate::ParseError;

/// Distance between consecutive shot fields, in feet.
pub const DISTANCE_STEP_FT: u32 = 10;

/// One made shot: when it went in and from how far.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Sample {
    pub elapsed_s: i64,
    pub distance_ft: u32,
}

/// Results of one player, built from a single data row.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PlayerRecord {
    name: String,
    starts_throwing_at: Option<u32>,
    samples: Vec<Sample>,
}

impl PlayerRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distance (ft) at which the player switched from putting to throwing.
    pub fn starts_throwing_at(&self) -> Option<u32> {
        self.starts_throwing_at
    }

    /// Made shots ordered by increasing distance.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn times(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.elapsed_s).collect()
    }

    pub fn distances(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.distance_ft).collect()
    }

    /// The made shot at the transition distance, if the player made it.
    pub fn transition_sample(&self) -> Option<Sample> {
        let distance = self.starts_throwing_at?;
        self.samples
            .iter()
            .copied()
            .find(|s| s.distance_ft == distance)
    }

    pub fn max_distance(&self) -> Option<u32> {
        self.samples.last().map(|s| s.distance_ft)
    }

    pub fn last_elapsed(&self) -> Option<i64> {
        self.samples.iter().map(|s| s.elapsed_s).max()
    }
}

/// Parse one comma separated data row into a [`PlayerRecord`].
///
/// Row layout is `name,transition,t1,t2,...` where `tN` is the time remaining
/// (`MM:SS`) when the shot at `10 * N` feet went in, or empty if it never did.
pub fn parse_row(row: &str) -> Result<PlayerRecord, ParseError> {
    let mut fields = row.split(',');
    let name = fields
        .next()
        .filter(|_| !row.is_empty())
        .ok_or(ParseError::MissingField("name"))?;
    let transition = fields
        .next()
        .ok_or(ParseError::MissingField("transition"))?;
    let starts_throwing_at = parse_transition(transition)?;

    let mut samples = Vec::new();
    for (index, value) in fields.enumerate() {
        if value.is_empty() {
            continue;
        }
        let distance_ft = DISTANCE_STEP_FT * (index as u32 + 1);
        samples.push(Sample {
            elapsed_s: parse_elapsed(value)?,
            distance_ft,
        });
    }

    Ok(PlayerRecord {
        name: name.to_string(),
        starts_throwing_at,
        samples,
    })
}

fn parse_transition(value: &str) -> Result<Option<u32>, ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_unsigned(value)
        .map(Some)
        .ok_or_else(|| ParseError::InvalidTransition(value.to_string()))
}
