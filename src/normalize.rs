//! Canonical field access over records whose upstream schemas disagree on
//! naming.
//!
//! Every logical field carries a fixed precedence list of aliases. Lookups try
//! the aliases in order and take the first one holding a usable value, so a
//! record that reports assists as `assists_total` reads the same as one that
//! uses `assists`.

use serde_json::{Map, Value};
use strum_macros::{Display, EnumIter};

/// A logical field with one or more upstream spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Appearances,
    Minutes,
    Goals,
    Assists,
    YellowCards,
    RedCards,
    Position,
    Rating,
    TeamId,
    PlayerId,
}

impl Field {
    /// Upstream keys for this field, in lookup order.
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            // "appearences" is a misspelling some feeds actually ship.
            Field::Appearances => &["appearances", "games_appearances", "games_appearences"],
            Field::Minutes => &["minutes", "games_minutes"],
            Field::Goals => &["goals", "goals_total"],
            Field::Assists => &["assists", "goals_assists", "assists_total"],
            Field::YellowCards => &["cards_yellow", "yellow_cards"],
            Field::RedCards => &["cards_red", "red_cards"],
            Field::Position => &["games_position", "position"],
            Field::Rating => &["games_rating", "rating"],
            Field::TeamId => &["team_id"],
            Field::PlayerId => &["player_id"],
        }
    }
}

/// Coerce a JSON scalar to a finite number. Numeric strings such as `"7.40"`
/// are parsed; everything else yields `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// First alias of `field` that holds a finite number.
pub fn number(record: &Map<String, Value>, field: Field) -> Option<f64> {
    field
        .aliases()
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(to_number)
}

/// Counting stat for `field`, zero when no alias carries a number.
pub fn count(record: &Map<String, Value>, field: Field) -> u32 {
    number(record, field)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32)
        .unwrap_or_default()
}

/// Coerce an identifier. Integers are read exactly; floats and numeric
/// strings are accepted only when they hold a whole non-negative value.
pub fn to_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}

fn whole(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64).then_some(n as u64)
}

/// Integer identifier for `field`: the first alias that holds one.
pub fn id(record: &Map<String, Value>, field: Field) -> Option<u64> {
    field
        .aliases()
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(to_id)
}

/// First alias of `field` holding a non-blank string, trimmed.
pub fn text(record: &Map<String, Value>, field: Field) -> Option<String> {
    field
        .aliases()
        .iter()
        .filter_map(|key| record.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_large_ids_are_exact() {
        let big = 9_007_199_254_740_993u64;
        assert_eq!(to_id(&json!(big)), Some(big));
        assert_eq!(to_id(&json!(big.to_string())), Some(big));
        assert_eq!(to_id(&json!(" 42 ")), Some(42));
        assert_eq!(to_id(&json!(7.0)), Some(7));
        assert_eq!(to_id(&json!(7.5)), None);
        assert_eq!(to_id(&json!(-3)), None);
        assert_eq!(to_id(&json!("abc")), None);

        let record = json!({ "player_id": big }).as_object().unwrap().clone();
        assert_eq!(id(&record, Field::PlayerId), Some(big));
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_assists_total_only() {
        let r = record(json!({ "assists_total": 7 }));
        assert_eq!(count(&r, Field::Assists), 7);
    }

    #[test]
    fn test_alias_precedence() {
        let r = record(json!({ "assists_total": 7, "goals_assists": 3, "assists": 1 }));
        assert_eq!(count(&r, Field::Assists), 1);

        let r = record(json!({ "assists_total": 7, "goals_assists": 3 }));
        assert_eq!(count(&r, Field::Assists), 3);
    }

    #[test]
    fn test_non_numeric_alias_falls_through() {
        let r = record(json!({ "goals": null, "goals_total": 4 }));
        assert_eq!(count(&r, Field::Goals), 4);
    }

    #[test]
    fn test_rating_string_coercion() {
        let r = record(json!({ "games_rating": "7.40" }));
        assert_eq!(number(&r, Field::Rating), Some(7.4));

        let r = record(json!({ "games_rating": "n/a" }));
        assert_eq!(number(&r, Field::Rating), None);

        let r = record(json!({ "games_rating": "inf" }));
        assert_eq!(number(&r, Field::Rating), None);
    }

    #[test]
    fn test_missing_fields_default() {
        let r = record(json!({}));
        for field in Field::iter() {
            assert_eq!(number(&r, field), None, "{field}");
        }
        assert_eq!(count(&r, Field::Minutes), 0);
        assert_eq!(text(&r, Field::Position), None);
    }

    #[test]
    fn test_misspelled_appearances() {
        let r = record(json!({ "games_appearences": 12 }));
        assert_eq!(count(&r, Field::Appearances), 12);
    }

    #[test]
    fn test_text_skips_blank() {
        let r = record(json!({ "games_position": "  ", "position": " Midfielder " }));
        assert_eq!(text(&r, Field::Position).as_deref(), Some("Midfielder"));
    }

    #[test]
    fn test_id_requires_integer() {
        let r = record(json!({ "team_id": "33" }));
        assert_eq!(id(&r, Field::TeamId), Some(33));
        let r = record(json!({ "team_id": 3.5 }));
        assert_eq!(id(&r, Field::TeamId), None);
    }
}
