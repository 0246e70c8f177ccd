use serde::Serialize;

/// One head-to-head meeting, flattened from whatever shape the source used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    /// `None` when the source record carried no fixture id.
    pub fixture_id: Option<u64>,
    pub date: String,
    pub league: String,
    pub home: String,
    pub away: String,
    pub home_goals: u32,
    pub away_goals: u32,
}

impl Match {
    /// `"home – away"` score cell.
    pub fn score(&self) -> String {
        format!("{} – {}", self.home_goals, self.away_goals)
    }

    /// Date part of the kickoff (`YYYY-MM-DD`), or a dash when unknown.
    pub fn date_label(&self) -> String {
        chrono::DateTime::parse_from_rfc3339(&self.date)
            .map(|d| d.date_naive().to_string())
            .unwrap_or_else(|_| {
                if self.date.is_empty() {
                    "—".to_string()
                } else {
                    self.date.clone()
                }
            })
    }
}
