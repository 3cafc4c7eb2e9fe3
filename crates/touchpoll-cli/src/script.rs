//! Scripted controller behaviour for the mock register bus.
//!
//! A script is a JSON document listing what the controller reports, poll by
//! poll:
//!
//! ```json
//! {
//!   "steps": [
//!     { "type": "report", "points": [{ "id": 2, "x": 300, "y": 150, "event": "down" }] },
//!     { "type": "report", "points": [{ "id": 2, "x": 310, "y": 150 }], "repeat": 5 },
//!     { "type": "not_ready" },
//!     { "type": "fail_point_reads", "index": 0, "times": 2 },
//!     { "type": "raw", "num_points": 1, "records": [[66, 16, 0, 0]] },
//!     { "type": "report", "points": [] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use touchpoll_core::constants::MAX_SUPPORTED_POINTS;
use touchpoll_core::{PointRecord, TouchEventType, TouchId, TouchSample};
use touchpoll_hardware::mock::{MockRegisterBusHandle, RegisterSnapshot};

/// Most polls a single step may cover.
pub const MAX_REPEAT: u32 = 10_000;

fn one() -> u32 {
    1
}

fn contact() -> TouchEventType {
    TouchEventType::Contact
}

/// One point of a scripted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPoint {
    pub id: TouchId,
    pub x: u16,
    pub y: u16,
    #[serde(default = "contact")]
    pub event: TouchEventType,
}

impl From<ScriptPoint> for TouchSample {
    fn from(point: ScriptPoint) -> Self {
        TouchSample::new(point.id, point.x, point.y, point.event)
    }
}

/// One entry of a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// The controller reports `points`, for `repeat` polls.
    Report {
        points: Vec<ScriptPoint>,
        #[serde(default = "one")]
        repeat: u32,
    },

    /// The controller is rewriting its report, for `repeat` polls.
    NotReady {
        #[serde(default = "one")]
        repeat: u32,
    },

    /// Raw register contents, for reports a well-behaved controller never makes.
    Raw {
        num_points: u8,
        #[serde(default)]
        records: Vec<[u8; 4]>,
        #[serde(default = "one")]
        repeat: u32,
    },

    /// The next `times` reads at `offset` fail.
    FailReads { offset: u8, times: u32 },

    /// The next `times` reads of point record `index` fail.
    FailPointReads { index: usize, times: u32 },
}

impl Step {
    /// Polls covered by a snapshot step.
    pub fn repeat(&self) -> Option<u32> {
        match *self {
            Self::Report { repeat, .. } | Self::NotReady { repeat } | Self::Raw { repeat, .. } => {
                Some(repeat)
            }
            Self::FailReads { .. } | Self::FailPointReads { .. } => None,
        }
    }

    /// Snapshots this step queues, one per poll.
    pub fn snapshots(&self) -> Vec<RegisterSnapshot> {
        let (snapshot, repeat) = match self {
            Self::Report { points, repeat } => {
                let samples: Vec<TouchSample> = points.iter().copied().map(Into::into).collect();
                (RegisterSnapshot::from_samples(&samples), *repeat)
            }
            Self::NotReady { repeat } => (RegisterSnapshot::not_ready(), *repeat),
            Self::Raw {
                num_points,
                records,
                repeat,
            } => {
                let mut snapshot = RegisterSnapshot::empty().with_num_points(*num_points);
                for (index, bytes) in records.iter().enumerate() {
                    let record = PointRecord {
                        xh: bytes[0],
                        xl: bytes[1],
                        yh: bytes[2],
                        yl: bytes[3],
                    };
                    snapshot = snapshot.with_record(index, record);
                }
                (snapshot, *repeat)
            }
            Self::FailReads { .. } | Self::FailPointReads { .. } => return Vec::new(),
        };
        vec![snapshot; repeat as usize]
    }

    /// Apply the step to the bus.
    pub fn apply(&self, handle: &MockRegisterBusHandle) {
        match *self {
            Self::FailReads { offset, times } => handle.fail_reads(offset, times),
            Self::FailPointReads { index, times } => handle.fail_point_reads(index, times),
            _ => {
                for snapshot in self.snapshots() {
                    handle.push_snapshot(snapshot);
                }
            }
        }
    }
}

/// A sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    /// Parse and check a script.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(json).context("Malformed script")?;
        script.validate()?;
        Ok(script)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read script {}", path.display()))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        for (n, step) in self.steps.iter().enumerate() {
            if let Some(repeat) = step.repeat()
                && repeat > MAX_REPEAT
            {
                bail!("Step {}: repeat {} exceeds {}", n, repeat, MAX_REPEAT);
            }
            match step {
                Step::Report { points, .. } if points.len() > MAX_SUPPORTED_POINTS => {
                    bail!(
                        "Step {}: {} points reported, the controller holds at most {}",
                        n,
                        points.len(),
                        MAX_SUPPORTED_POINTS
                    );
                }
                Step::Raw { records, .. } if records.len() > MAX_SUPPORTED_POINTS => {
                    bail!("Step {}: {} raw records given", n, records.len());
                }
                Step::FailPointReads { index, .. } if *index >= MAX_SUPPORTED_POINTS => {
                    bail!("Step {}: point index {} out of range", n, index);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Built-in script: one finger taps, a second joins and drags, both lift.
    pub fn demo() -> Result<Self> {
        let mut steps = vec![
            report(&[(0, 120, 80, TouchEventType::Down)])?,
            Step::Report {
                points: vec![point(0, 120, 80, TouchEventType::Contact)?],
                repeat: 3,
            },
            report(&[])?,
        ];
        for n in 0..8u16 {
            steps.push(report(&[
                (0, 200 + n * 20, 240, TouchEventType::Contact),
                (1, 600 - n * 20, 240, TouchEventType::Contact),
            ])?);
        }
        steps.push(Step::NotReady { repeat: 1 });
        steps.push(report(&[(1, 440, 240, TouchEventType::Contact)])?);
        steps.push(report(&[])?);

        Ok(Self { steps })
    }
}

fn point(id: u8, x: u16, y: u16, event: TouchEventType) -> Result<ScriptPoint> {
    Ok(ScriptPoint {
        id: TouchId::new(id)?,
        x,
        y,
        event,
    })
}

/// A single-poll report step.
fn report(points: &[(u8, u16, u16, TouchEventType)]) -> Result<Step> {
    let points = points
        .iter()
        .map(|&(id, x, y, event)| point(id, x, y, event))
        .collect::<Result<Vec<_>>>()?;
    Ok(Step::Report { points, repeat: 1 })
}
