//! Page-level loaders and the pure functions that shape their data.
//!
//! Every loader takes a [`CancelToken`](crate::cancel::CancelToken); a
//! cancelled load resolves to [`PlStatsError::Cancelled`](crate::PlStatsError::Cancelled)
//! and publishes nothing.

pub mod fixtures;
pub mod h2h;
pub mod live;
pub mod players;
pub mod teams;

pub use fixtures::{build_rows, FixturesView};
pub use h2h::{dedupe_matches, head_to_head, head_to_head_file, to_matches};
pub use live::{LiveHandle, LivePoller, LiveSnapshot};
pub use players::{build_leaderboards, build_player_details, search_player, LEADERBOARD_SIZE};
pub use teams::{filter_allowed, resolve_team, search_teams, TeamsView, ALLOWED_API_TEAM_IDS};
