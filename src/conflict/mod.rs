pub mod time;

use serde::{Deserialize, Serialize};

pub use time::{TimeOfDay, times_overlap};

/// A platform assignment for one train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub platform: String,
    #[serde(alias = "arrival")]
    pub start: TimeOfDay,
    #[serde(alias = "departure")]
    pub end: TimeOfDay,
}

impl Booking {
    pub fn new(
        id: impl Into<String>,
        platform: impl Into<String>,
        start: TimeOfDay,
        end: TimeOfDay,
    ) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            start,
            end,
        }
    }

    fn overlaps(&self, other: &Booking) -> bool {
        times_overlap(self.start, self.end, other.start, other.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    PlatformConflict,
}

/// Two bookings that hold the same platform at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    /// Booking ids, earlier input position first.
    pub resource_ids: [String; 2],
    /// The shared platform.
    pub resource: String,
}

/// Every pair `(i, j)`, `i < j`, of bookings on the same platform whose spans
/// overlap, in input order.
pub fn detect_platform_conflicts(bookings: &[Booking]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for (i, first) in bookings.iter().enumerate() {
        for second in &bookings[i + 1..] {
            if first.platform == second.platform && first.overlaps(second) {
                conflicts.push(Conflict {
                    kind: ConflictKind::PlatformConflict,
                    resource_ids: [first.id.clone(), second.id.clone()],
                    resource: first.platform.clone(),
                });
            }
        }
    }

    conflicts
}
