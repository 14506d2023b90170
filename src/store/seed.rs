use crate::models::NewEvent;

/// (title, start, end, background color, description)
const SEED_EVENTS: [(&str, &str, &str, &str, Option<&str>); 4] = [
    (
        "Opening Weekend",
        "2025-07-04",
        "2025-07-06",
        "#2365A1",
        Some("Elaine, Rick, Mark, Danee"),
    ),
    ("Michael & Katie", "2025-07-25", "2025-08-10", "#388E3C", None),
    (
        "Scott, Doug, Mark, Elaine, Rick",
        "2025-08-16",
        "2025-08-23",
        "#7B1FA2",
        None,
    ),
    ("Chris & Friends", "2025-08-28", "2025-09-02", "#A0522D", None),
];

/// Events written into an empty store on first start.
pub fn seed_events() -> Vec<NewEvent> {
    SEED_EVENTS
        .iter()
        .map(|&(title, start, end, color, description)| NewEvent {
            title: title.to_string(),
            background_color: color.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            description: description.map(str::to_string),
        })
        .collect()
}
