use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::types::{Series, SubResource};

/// True when the cached sub-resource can be served without calling upstream:
/// the collection is non-empty and was synced within `ttl`. Each sub-resource
/// ages on its own stamp, so a frequent schedule refresh does not keep
/// squads or stats fresh forever.
pub fn is_fresh(series: &Series, resource: SubResource, ttl: Duration, now: DateTime<Utc>) -> bool {
    if series.sub_resource_len(resource) == 0 {
        return false;
    }
    let Ok(ttl) = chrono::Duration::from_std(ttl) else {
        return true;
    };
    // A clock-skewed future timestamp counts as age zero.
    let age = now.signed_duration_since(series.synced_at(resource)).max(chrono::Duration::zero());
    age <= ttl
}
