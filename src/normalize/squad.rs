use chrono::{DateTime, Utc};
use serde_json::Value;

use super::dedup::{dedup_by_identity, Identity};
use super::parse::{first_string, parse_bool_safe};
use super::payload::{first_value, locate_array};
use super::team::UNKNOWN_TEAM;
use crate::types::{Player, Squad};

pub const UNKNOWN_PLAYER: &str = "Unknown Player";

/// One entry of the squads listing; players are fetched per squad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadHeader {
    pub squad_id: String,
    pub team_id: String,
    pub team_name: String,
}

impl Identity for SquadHeader {
    fn identity_key(&self) -> String {
        if self.team_id.is_empty() {
            format!("squad:{}", self.squad_id)
        } else {
            format!("id:{}", self.team_id)
        }
    }
}

pub fn normalize_squad_header(v: &Value) -> SquadHeader {
    SquadHeader {
        squad_id: first_string(v, &["squadId", "id"]).unwrap_or_default(),
        team_id: first_string(v, &["teamId"]).unwrap_or_default(),
        team_name: first_string(v, &["squadType", "teamName", "name"])
            .unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
    }
}

/// Squad listing. Entries without a squad id cannot be expanded and are dropped.
pub fn normalize_squad_list(payload: &Value) -> Vec<SquadHeader> {
    let Some(shape) = locate_array(payload, &["squads", "squad"], "squads") else {
        return Vec::new();
    };
    dedup_by_identity(
        shape
            .records()
            .map(normalize_squad_header)
            .filter(|h| !h.squad_id.is_empty()),
    )
}

fn flag(v: &Value, keys: &[&str]) -> bool {
    parse_bool_safe(first_value(v, keys))
}

pub fn normalize_player(v: &Value) -> Player {
    Player {
        player_id: first_string(v, &["id", "playerId"]).unwrap_or_default(),
        player_name: first_string(v, &["name", "playerName", "fullName"])
            .unwrap_or_else(|| UNKNOWN_PLAYER.to_string()),
        role: first_string(v, &["role", "playerRole"]).unwrap_or_default(),
        batting_style: first_string(v, &["battingStyle", "battingStyl", "bat"]).unwrap_or_default(),
        bowling_style: first_string(v, &["bowlingStyle", "bowlingStyl", "bowl"]).unwrap_or_default(),
        is_playing11: flag(v, &["isPlaying11", "playing11"]),
        is_captain: flag(v, &["captain", "isCaptain"]),
        is_wicket_keeper: flag(v, &["keeper", "isKeeper", "isWicketKeeper"]),
    }
}

/// Players of one squad; section headers (BATSMEN, ALL ROUNDERS, ...) are skipped.
pub fn normalize_players(payload: &Value) -> Vec<Player> {
    let Some(shape) = locate_array(payload, &["player", "players"], "squad players") else {
        return Vec::new();
    };
    dedup_by_identity(shape.records().map(normalize_player))
}

pub fn build_squad(header: &SquadHeader, players: Vec<Player>, now: DateTime<Utc>) -> Squad {
    Squad {
        squad_id: header.squad_id.clone(),
        team_id: header.team_id.clone(),
        team_name: header.team_name.clone(),
        players,
        last_updated: now,
    }
}
