use std::collections::HashMap;

use crate::types::{Player, PointsTableRow, ScheduleMatch, Squad, Team, Venue};

/// Identity used to collapse repeated observations of the same entity.
pub trait Identity {
    fn identity_key(&self) -> String;

    /// Fold a later duplicate into the retained first observation.
    /// Identity fields are never overwritten.
    fn absorb(&mut self, _later: Self)
    where
        Self: Sized,
    {
    }
}

/// Unique-by-identity, first observation wins, first-seen order preserved.
pub fn dedup_by_identity<T: Identity>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<T> = Vec::new();
    for item in items {
        let key = item.identity_key();
        match index.get(&key) {
            Some(&i) => out[i].absorb(item),
            None => {
                index.insert(key, out.len());
                out.push(item);
            }
        }
    }
    out
}

fn id_or_name(id: &str, name: &str) -> String {
    if id.is_empty() {
        format!("name:{}", name.trim().to_lowercase())
    } else {
        format!("id:{id}")
    }
}

impl Identity for Team {
    fn identity_key(&self) -> String {
        id_or_name(&self.team_id, &self.team_name)
    }

    fn absorb(&mut self, later: Self) {
        if self.is_host.is_none() {
            self.is_host = later.is_host;
        }
    }
}

impl Identity for Venue {
    fn identity_key(&self) -> String {
        id_or_name(&self.venue_id, &self.venue_name)
    }

    fn absorb(&mut self, later: Self) {
        for id in later.match_ids {
            if !self.match_ids.contains(&id) {
                self.match_ids.push(id);
            }
        }
        if self.city.is_empty() {
            self.city = later.city;
        }
        if self.country.is_empty() {
            self.country = later.country;
        }
        if self.capacity == 0 {
            self.capacity = later.capacity;
        }
    }
}

impl Identity for ScheduleMatch {
    fn identity_key(&self) -> String {
        self.match_id.clone()
    }
}

impl Identity for Player {
    fn identity_key(&self) -> String {
        id_or_name(&self.player_id, &self.player_name)
    }
}

impl Identity for Squad {
    fn identity_key(&self) -> String {
        id_or_name(&self.team_id, &self.squad_id)
    }
}

impl Identity for PointsTableRow {
    fn identity_key(&self) -> String {
        id_or_name(&self.team_id, &self.team_name)
    }
}
