// Worst-of status composition, shared by every roll-up level

use crate::models::HealthStatus;

/// Worst status in `statuses` under `Healthy < Warning < Critical`; an empty input is healthy.
pub fn worst_of<I>(statuses: I) -> HealthStatus
where
    I: IntoIterator<Item = HealthStatus>,
{
    statuses.into_iter().max().unwrap_or_default()
}

/// Number of healthy entries, for population-ratio rules.
pub fn count_healthy<I>(statuses: I) -> u32
where
    I: IntoIterator<Item = HealthStatus>,
{
    statuses.into_iter().filter(|s| s.is_healthy()).count() as u32
}
