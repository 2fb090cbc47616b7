use serde_json::Value;

use super::parse::{first_string, parse_bool_safe};
use crate::types::Team;

pub const UNKNOWN_TEAM: &str = "Unknown Team";

const NAME_KEYS: &[&str] = &["teamName", "teamFullName", "name", "teamSName"];
const SHORT_NAME_KEYS: &[&str] = &["teamSName", "shortName", "teamShortName", "sName"];
const ID_KEYS: &[&str] = &["teamId", "id"];

pub fn normalize_team(v: &Value) -> Team {
    let team_name = first_string(v, NAME_KEYS).unwrap_or_else(|| UNKNOWN_TEAM.to_string());
    let team_short_name =
        first_string(v, SHORT_NAME_KEYS).unwrap_or_else(|| abbreviate(&team_name));
    Team {
        team_id: first_string(v, ID_KEYS).unwrap_or_default(),
        team_name,
        team_short_name,
        is_host: v.get("isHost").map(|h| parse_bool_safe(Some(h))),
    }
}

/// "Sri Lanka" → "SL", "India" → "IND".
pub fn abbreviate(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() > 1 {
        words
            .iter()
            .filter_map(|w| w.chars().next())
            .take(4)
            .collect::<String>()
            .to_uppercase()
    } else {
        name.chars().take(3).collect::<String>().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_short_name_present() {
        let t = normalize_team(&json!({"teamSName": "IND"}));
        assert_eq!(t.team_name, "IND");
        assert_eq!(t.team_short_name, "IND");
    }

    #[test]
    fn nothing_present() {
        let t = normalize_team(&json!({}));
        assert_eq!(t.team_name, "Unknown Team");
        assert_eq!(t.team_short_name, "UT");
        assert_eq!(t.team_id, "");
        assert_eq!(t.is_host, None);
    }

    #[test]
    fn fallback_order() {
        let t = normalize_team(&json!({"teamFullName": "Sri Lanka", "name": "SL Cricket", "teamId": 5}));
        assert_eq!(t.team_name, "Sri Lanka");
        assert_eq!(t.team_short_name, "SL");
        assert_eq!(t.team_id, "5");

        let t = normalize_team(&json!({"teamName": "India", "teamFullName": "Republic of India"}));
        assert_eq!(t.team_name, "India");
        assert_eq!(t.team_short_name, "IND");
    }

    #[test]
    fn host_flag_only_when_present() {
        let t = normalize_team(&json!({"teamName": "Pakistan", "isHost": "true"}));
        assert_eq!(t.is_host, Some(true));
    }
}
