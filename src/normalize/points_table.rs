use serde_json::Value;

use super::dedup::dedup_by_identity;
use super::parse::{first_string, parse_float_safe, parse_string_safe, parse_u32_safe};
use super::payload::{first_value, is_header, locate_array};
use super::team::{abbreviate, UNKNOWN_TEAM};
use crate::types::{PointsTableGroup, PointsTableRow};

const ROW_LIST_KEYS: &[&str] = &["pointsTableInfo", "teams", "rows", "table"];

/// Normalized standings: every group, plus the rows chosen as the primary table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointsTable {
    pub groups: Vec<PointsTableGroup>,
    pub primary: Vec<PointsTableRow>,
}

pub fn normalize_points_row(v: &Value, group_name: &str) -> PointsTableRow {
    let team_name = first_string(v, &["teamFullName", "teamName", "name"])
        .unwrap_or_else(|| UNKNOWN_TEAM.to_string());
    let team_short_name = first_string(v, &["teamSName", "teamName", "shortName"])
        .unwrap_or_else(|| abbreviate(&team_name));

    PointsTableRow {
        team_id: first_string(v, &["teamId", "id"]).unwrap_or_default(),
        team_name,
        team_short_name,
        group_name: group_name.to_string(),
        played: parse_u32_safe(first_value(v, &["matchesPlayed", "played", "p"])),
        won: parse_u32_safe(first_value(v, &["matchesWon", "won", "w"])),
        lost: parse_u32_safe(first_value(v, &["matchesLost", "lost", "l"])),
        tied: parse_u32_safe(first_value(v, &["matchesTied", "tied", "t"])),
        no_result: parse_u32_safe(first_value(v, &["noRes", "noResult", "nr"])),
        points: parse_u32_safe(first_value(v, &["points", "pts"])),
        net_run_rate: parse_float_safe(first_value(v, &["nrr", "netRunRate"])),
        position: 0,
        form: parse_form(first_value(v, &["form", "recentForm"])),
        qualify_status: first_string(v, &["teamQualifyStatus", "qualifyStatus"]).unwrap_or_default(),
    }
}

/// `["W","L"]` or `"WL"` / `"W,L"`; kept in provider order.
fn parse_form(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|i| parse_string_safe(Some(i)))
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if s.contains(',') => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn group_rows(group: &Value, group_name: &str) -> Vec<PointsTableRow> {
    let rows = ROW_LIST_KEYS
        .iter()
        .find_map(|k| group.get(*k).and_then(|r| r.as_array()))
        .map(|r| r.as_slice())
        .unwrap_or_default();
    number_rows(rows.iter().filter(|r| r.is_object() && !is_header(r)), group_name)
}

/// Deduplicate by team and assign positions 1..N in response order.
fn number_rows<'a>(rows: impl Iterator<Item = &'a Value>, group_name: &str) -> Vec<PointsTableRow> {
    let mut rows = dedup_by_identity(rows.map(|r| normalize_points_row(r, group_name)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.position = i as u32 + 1;
    }
    rows
}

fn looks_like_group(v: &Value) -> bool {
    v.get("groupName").is_some() || ROW_LIST_KEYS.iter().any(|k| v.get(*k).is_some_and(|r| r.is_array()))
}

/// Groups in response order with 1-based positions. When the provider sends
/// a bare list of rows it becomes a single "Overall" group.
pub fn normalize_points_table(payload: &Value) -> PointsTable {
    let Some(shape) = locate_array(payload, &["pointsTable", "points_table", "groups"], "points table") else {
        return PointsTable::default();
    };

    let records: Vec<&Value> = shape.records().collect();
    let groups: Vec<PointsTableGroup> = if records.iter().any(|r| looks_like_group(r)) {
        records
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let group_name = first_string(g, &["groupName", "name"])
                    .unwrap_or_else(|| format!("Group {}", i + 1));
                let rows = group_rows(g, &group_name);
                PointsTableGroup { group_name, rows }
            })
            .filter(|g| !g.rows.is_empty())
            .collect()
    } else {
        let rows = number_rows(records.into_iter(), "Overall");
        if rows.is_empty() {
            Vec::new()
        } else {
            vec![PointsTableGroup { group_name: "Overall".to_string(), rows }]
        }
    };

    let primary = primary_group(&groups)
        .map(|g| g.rows.clone())
        .unwrap_or_default();
    PointsTable { groups, primary }
}

/// The knockout-stage "Super" group when present, else the first group.
pub fn primary_group(groups: &[PointsTableGroup]) -> Option<&PointsTableGroup> {
    groups
        .iter()
        .find(|g| g.group_name.to_lowercase().contains("super"))
        .or_else(|| groups.first())
}
