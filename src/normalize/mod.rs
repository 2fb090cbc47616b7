//! Provider JSON → canonical entities. Every function here is pure and total:
//! unexpected shapes produce documented defaults or empty collections, never errors.

pub mod dedup;
pub mod parse;
pub mod payload;
pub mod points_table;
pub mod schedule;
pub mod squad;
pub mod stats;
pub mod status;
pub mod team;
pub mod venue;

pub use dedup::{dedup_by_identity, Identity};
pub use points_table::{normalize_points_table, PointsTable};
pub use schedule::{normalize_schedule, ScheduleBundle};
pub use squad::{build_squad, normalize_players, normalize_squad_list};
pub use stats::normalize_stats;
pub use venue::{combine_with_schedule, normalize_venues};
