use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{self, Field};

/// Identity record for a player, owned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: u64,
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub photo: Option<String>,
    /// Display name of the team, when the backend denormalizes it.
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub team_id: Option<u64>,
}

/// One raw per-period stat line for a player.
///
/// Field names vary between feeds, so the record is kept as-is and read
/// through [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerSeasonStat(pub Map<String, Value>);

impl PlayerSeasonStat {
    pub fn player_id(&self) -> Option<u64> {
        normalize::id(&self.0, Field::PlayerId)
    }

    pub fn team_id(&self) -> Option<u64> {
        normalize::id(&self.0, Field::TeamId)
    }

    pub fn appearances(&self) -> u32 {
        normalize::count(&self.0, Field::Appearances)
    }

    pub fn minutes(&self) -> u32 {
        normalize::count(&self.0, Field::Minutes)
    }

    pub fn goals(&self) -> u32 {
        normalize::count(&self.0, Field::Goals)
    }

    pub fn assists(&self) -> u32 {
        normalize::count(&self.0, Field::Assists)
    }

    pub fn yellow_cards(&self) -> u32 {
        normalize::count(&self.0, Field::YellowCards)
    }

    pub fn red_cards(&self) -> u32 {
        normalize::count(&self.0, Field::RedCards)
    }

    pub fn rating(&self) -> Option<f64> {
        normalize::number(&self.0, Field::Rating)
    }

    pub fn position(&self) -> Option<String> {
        normalize::text(&self.0, Field::Position)
    }
}

impl From<Value> for PlayerSeasonStat {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => PlayerSeasonStat(map),
            _ => PlayerSeasonStat::default(),
        }
    }
}

/// Season totals for one player, folded from all of their stat lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeasonAggregate {
    pub player_id: Option<u64>,
    pub position: Option<String>,
    /// Minutes-weighted mean rating; `None` when no line carried a rating.
    pub rating: Option<f64>,
    pub appearances: u32,
    pub minutes: u32,
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

/// Backend "top stats" record feeding the leaderboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopStat(pub Map<String, Value>);

impl TopStat {
    pub fn topstat_id(&self) -> Option<u64> {
        self.0.get("topstat_id").and_then(Value::as_u64)
    }

    pub fn player_id(&self) -> Option<u64> {
        normalize::id(&self.0, Field::PlayerId)
    }

    pub fn team_id(&self) -> Option<u64> {
        normalize::id(&self.0, Field::TeamId)
    }

    /// Value of a leaderboard category; `None` when the record lacks it.
    pub fn metric(&self, category: Category) -> Option<f64> {
        normalize::number(&self.0, category.field())
    }
}

impl From<Value> for TopStat {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => TopStat(map),
            _ => TopStat::default(),
        }
    }
}

/// Leaderboard categories sourced from top-stats records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Category {
    #[strum(to_string = "Top Goals")]
    Goals,
    #[strum(to_string = "Top Assists")]
    Assists,
    #[strum(to_string = "Most Yellow Cards")]
    YellowCards,
    #[strum(to_string = "Most Red Cards")]
    RedCards,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Goals,
        Category::Assists,
        Category::YellowCards,
        Category::RedCards,
    ];

    pub fn field(self) -> Field {
        match self {
            Category::Goals => Field::Goals,
            Category::Assists => Field::Assists,
            Category::YellowCards => Field::YellowCards,
            Category::RedCards => Field::RedCards,
        }
    }
}

/// One ranked line of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub player_id: u64,
    pub name: String,
    pub team: Option<String>,
    pub photo: Option<String>,
    pub value: f64,
    pub topstat_id: Option<u64>,
}

impl LeaderboardRow {
    /// Value with two decimals, dropping a trailing `.00`.
    pub fn value_label(&self) -> String {
        let s = format!("{:.2}", self.value);
        s.strip_suffix(".00").map(str::to_string).unwrap_or(s)
    }
}

/// All leaderboards of the players page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboards {
    pub goals: Vec<LeaderboardRow>,
    pub assists: Vec<LeaderboardRow>,
    pub yellow_cards: Vec<LeaderboardRow>,
    pub red_cards: Vec<LeaderboardRow>,
    pub ratings: Vec<LeaderboardRow>,
}

impl Leaderboards {
    pub fn category(&self, category: Category) -> &[LeaderboardRow] {
        match category {
            Category::Goals => &self.goals,
            Category::Assists => &self.assists,
            Category::YellowCards => &self.yellow_cards,
            Category::RedCards => &self.red_cards,
        }
    }
}

/// Profile plus season totals for the player details page.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerDetails {
    pub profile: Option<PlayerProfile>,
    pub totals: Option<PlayerSeasonAggregate>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_season_stat_reads_aliases() {
        let stat = PlayerSeasonStat::from(json!({
            "player_id": 276,
            "games_appearences": 3,
            "games_minutes": 270,
            "goals_total": 2,
            "goals_assists": 1,
            "games_rating": "7.10",
            "games_position": "Attacker"
        }));
        assert_eq!(stat.player_id(), Some(276));
        assert_eq!(stat.appearances(), 3);
        assert_eq!(stat.minutes(), 270);
        assert_eq!(stat.goals(), 2);
        assert_eq!(stat.assists(), 1);
        assert_eq!(stat.rating(), Some(7.1));
        assert_eq!(stat.position().as_deref(), Some("Attacker"));
    }

    #[test]
    fn test_value_label() {
        let mut row = LeaderboardRow {
            player_id: 1,
            name: "x".into(),
            team: None,
            photo: None,
            value: 12.0,
            topstat_id: None,
        };
        assert_eq!(row.value_label(), "12");
        row.value = 7.456;
        assert_eq!(row.value_label(), "7.46");
    }

    #[test]
    fn test_top_stat_metric() {
        let top: TopStat = serde_json::from_value(json!({
            "topstat_id": 9, "player_id": 1100, "goals_total": 29, "red_cards": 0
        }))
        .unwrap();
        assert_eq!(top.topstat_id(), Some(9));
        assert_eq!(top.metric(Category::Goals), Some(29.0));
        assert_eq!(top.metric(Category::RedCards), Some(0.0));
        assert_eq!(top.metric(Category::Assists), None);
    }
}
