use serde_json::Value;

use super::parse::{first_string, parse_string_safe};
use crate::types::{StatEntry, StatLeaderboard};

/// Leaderboards in a stats response. The provider nests one list per format
/// (`t20StatsList`, `odiStatsList`, ...); each list has `headers` and rows whose
/// positional `values` start with player id and player name.
pub fn normalize_stats(stat_type: &str, payload: &Value) -> Vec<StatLeaderboard> {
    let lists: Vec<(String, &Value)> = match payload.as_object() {
        Some(obj) if obj.contains_key("values") => vec![(String::new(), payload)],
        Some(obj) => obj
            .iter()
            .filter(|(k, v)| k.to_lowercase().ends_with("statslist") && v.is_object())
            .map(|(k, v)| (format_label(k), v))
            .collect(),
        None => Vec::new(),
    };

    let boards: Vec<(String, StatLeaderboard)> = lists
        .into_iter()
        .map(|(label, list)| {
            let board = StatLeaderboard {
                stat_type: stat_type.to_string(),
                headers: list
                    .get("headers")
                    .and_then(|h| h.as_array())
                    .map(|h| h.iter().map(|x| parse_string_safe(Some(x))).collect())
                    .unwrap_or_default(),
                entries: list
                    .get("values")
                    .and_then(|v| v.as_array())
                    .map(|rows| rows.iter().filter_map(normalize_stat_entry).collect())
                    .unwrap_or_default(),
            };
            (label, board)
        })
        .filter(|(_, board)| !board.entries.is_empty())
        .collect();

    // Format suffix only when more than one list actually has rows.
    let single = boards.len() == 1;
    boards
        .into_iter()
        .map(|(label, mut board)| {
            if !single && !label.is_empty() {
                board.stat_type = format!("{stat_type}.{label}");
            }
            board
        })
        .collect()
}

/// `t20StatsList` → `t20`.
fn format_label(key: &str) -> String {
    key.strip_suffix("StatsList")
        .or_else(|| key.strip_suffix("statsList"))
        .unwrap_or(key)
        .to_lowercase()
}

fn normalize_stat_entry(row: &Value) -> Option<StatEntry> {
    let positional = row
        .get("values")
        .and_then(|v| v.as_array())
        .or_else(|| row.as_array());

    if let Some(cells) = positional {
        let cells: Vec<String> = cells.iter().map(|c| parse_string_safe(Some(c))).collect();
        if cells.len() < 2 {
            return None;
        }
        return Some(StatEntry {
            player_id: cells[0].clone(),
            player_name: cells[1].clone(),
            values: cells[2..].to_vec(),
        });
    }

    let obj = row.as_object()?;
    let player_id = first_string(row, &["playerId", "id"]).unwrap_or_default();
    let player_name = first_string(row, &["playerName", "name"])?;
    let values = obj
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "playerId" | "id" | "playerName" | "name"))
        .map(|(_, v)| parse_string_safe(Some(v)))
        .filter(|v| !v.is_empty())
        .collect();
    Some(StatEntry { player_id, player_name, values })
}
