use serde::Serialize;
use skrifa::outline::OutlinePen;

/// Pen that records every outline point, scaled by a constant factor.
///
/// Both on-curve and off-curve points are recorded, in drawing order.
pub struct PointCollector {
    scale: f32,
    points: Vec<[f32; 2]>,
}

impl PointCollector {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            points: Vec::new(),
        }
    }

    pub fn into_points(self) -> Vec<[f32; 2]> {
        self.points
    }

    fn push(&mut self, x: f32, y: f32) {
        self.points.push([x * self.scale, y * self.scale]);
    }
}

impl OutlinePen for PointCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.push(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.push(cx0, cy0);
        self.push(x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.push(cx0, cy0);
        self.push(cx1, cy1);
        self.push(x, y);
    }

    fn close(&mut self) {}
}

/// Number of outline commands of each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CommandCounts {
    pub move_to: u64,
    pub line_to: u64,
    pub quad_to: u64,
    pub curve_to: u64,
    pub close: u64,
}

impl CommandCounts {
    /// Total number of commands of all kinds.
    pub fn total(&self) -> u64 {
        self.move_to + self.line_to + self.quad_to + self.curve_to + self.close
    }

    /// Counts in `moveTo`, `lineTo`, `quadTo`, `curveTo`, `closePath` order.
    pub fn to_array(&self) -> [u64; 5] {
        [
            self.move_to,
            self.line_to,
            self.quad_to,
            self.curve_to,
            self.close,
        ]
    }

    pub fn merge(&mut self, other: &CommandCounts) {
        self.move_to += other.move_to;
        self.line_to += other.line_to;
        self.quad_to += other.quad_to;
        self.curve_to += other.curve_to;
        self.close += other.close;
    }
}

/// Pen that counts the commands of an outline by kind.
#[derive(Default)]
pub struct CommandCountPen {
    counts: CommandCounts,
}

impl CommandCountPen {
    pub fn counts(&self) -> &CommandCounts {
        &self.counts
    }

    /// The total number of commands, saturating at `u32::MAX`.
    pub fn into_count(self) -> u32 {
        self.counts.total().try_into().unwrap_or(u32::MAX)
    }
}

impl OutlinePen for CommandCountPen {
    fn move_to(&mut self, _x: f32, _y: f32) {
        self.counts.move_to += 1;
    }

    fn line_to(&mut self, _x: f32, _y: f32) {
        self.counts.line_to += 1;
    }

    fn quad_to(&mut self, _cx0: f32, _cy0: f32, _x: f32, _y: f32) {
        self.counts.quad_to += 1;
    }

    fn curve_to(&mut self, _cx0: f32, _cy0: f32, _cx1: f32, _cy1: f32, _x: f32, _y: f32) {
        self.counts.curve_to += 1;
    }

    fn close(&mut self) {
        self.counts.close += 1;
    }
}
