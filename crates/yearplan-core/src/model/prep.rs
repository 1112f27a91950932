use serde::{Deserialize, Serialize};

/// A year-preparation checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepItem {
    pub id: String,
    pub task: String,
    pub description: String,
    pub completed: bool,
}

const DEFAULT_ITEMS: [(&str, &str, &str); 9] = [
    (
        "resume-audit",
        "The Life Resume Audit",
        "Score last year's experiences honestly. Would anyone want to read that chapter?",
    ),
    (
        "primary-focus",
        "Identify Your North Star",
        "Name the single focus that settles every other decision this year.",
    ),
    (
        "misogi-lock",
        "Lock the Anchor",
        "Commit to the coin-flip challenge: book it, pay for it, or announce the date.",
    ),
    (
        "life-first-cal",
        "Life-First Calendar Reset",
        "Put trips, family rituals, and date nights on the calendar before any work.",
    ),
    (
        "kevin-rule-6",
        "The 8-Week Clock",
        "Schedule six milestone experiences, one roughly every eight weeks.",
    ),
    (
        "morning-60",
        "The First 60 Protocol",
        "First hour of the day: no phone, a big glass of water, outdoor light.",
    ),
    (
        "env-purge",
        "The Friction Purge",
        "Clear the desk and the inbox so nothing slows the start of a session.",
    ),
    (
        "donate-clothes",
        "Donate Old Clothes",
        "Declutter the closet and pass on what you no longer use.",
    ),
    (
        "no-negotiation",
        "Sign the No-Negotiation Pact",
        "Once it is on the calendar, the debate is over.",
    ),
];

/// Checklist seeded into every new plan.
#[must_use]
pub fn default_checklist() -> Vec<PrepItem> {
    DEFAULT_ITEMS
        .iter()
        .map(|(id, task, description)| PrepItem {
            id: (*id).to_string(),
            task: (*task).to_string(),
            description: (*description).to_string(),
            completed: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_checklist_has_unique_ids_and_starts_open() {
        let items = default_checklist();
        assert_eq!(items.len(), 9);
        let ids: HashSet<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), items.len());
        assert!(items.iter().all(|i| !i.completed));
    }
}
