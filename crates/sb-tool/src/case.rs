use serde::{Deserialize, Serialize};

use sb_core::{Direction, Point};
use sb_runtime::SpriteRecord;

pub const TESTCASE_SCHEMA_V1: &str = "sb-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    /// Starting state of the sprite the script drives.
    #[serde(default)]
    pub sprite: SpriteRecord,
    #[serde(default = "default_map")]
    pub map: Point,
    #[serde(default = "default_reduce")]
    pub reduce: bool,
    #[serde(default)]
    pub ticks: Vec<TickAction>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
    #[serde(default)]
    pub expected_final: Option<ExpectedFinal>,
    /// Error code the case must fail with instead of running through.
    #[serde(default)]
    pub expected_error: Option<String>,
}

fn default_map() -> Point {
    Point::new(640.0, 480.0)
}

fn default_reduce() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickAction {
    /// Seconds passed to each run.
    pub delta: f32,
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

fn default_repeat() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    /// A `print` line.
    Print { text: String },
    /// The script switched to `name` during a tick.
    State { name: String },
    /// The driven sprite was removed.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedFinal {
    pub state: Option<String>,
    pub center: Option<Point>,
    pub direction: Option<Direction>,
    pub animation: Option<String>,
    /// Sprites alive in the table, the driven one included.
    pub sprites: Option<usize>,
}
