use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pl_stats::views::{search_player, search_teams};
use pl_stats::{Category, Config, FixtureFilter, PlClient, PlayerProfile, Query, Result};

#[derive(Parser)]
#[command(name = "pl-stats")]
#[command(about = "Premier League fixtures, tables and player stats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Season fixtures, played or upcoming
    Fixtures {
        #[arg(long)]
        upcoming: bool,
    },
    /// Follow live scores of the configured league
    Live {
        /// Stop after this many polls (0 polls forever)
        #[arg(long, default_value_t = 0)]
        cycles: u64,
    },
    /// Events of one fixture
    Events { fixture_id: u64 },
    /// League table
    Standings,
    /// Club directory
    Teams {
        #[arg(long)]
        search: Option<String>,
    },
    /// One club with its season stats
    Team { id: u64 },
    /// Leaderboards
    Players {
        /// Print the player whose name matches instead
        #[arg(long)]
        search: Option<String>,
    },
    /// One player's profile and season totals
    Player { id: u64 },
    /// Head-to-head meetings from an exported JSON file
    H2h { file: PathBuf },
    /// Sign in to the backend
    Login {
        #[arg(long, env = "PL_EMAIL")]
        email: String,
        #[arg(long, env = "PL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let client = PlClient::from_config(Config::from_env()?)?;

    match cli.command {
        Commands::Fixtures { upcoming } => {
            let filter = if upcoming {
                FixtureFilter::Upcoming
            } else {
                FixtureFilter::Played
            };
            let view = client.get_fixtures().await?;
            for row in view.filtered(filter) {
                println!(
                    "{:<12} {:<5} {:>24} {:^7} {:<24} {}",
                    row.when_local, row.status_short, row.home.name, row.score, row.away.name, row.venue
                );
            }
            if let Some(e) = view.error {
                eprintln!("stopped after {} request(s): {e}", view.requests);
            }
        }
        Commands::Live { cycles } => {
            let handle = client.live_poller();
            let mut rx = handle.subscribe();
            let mut seen = 0;
            while rx.changed().await.is_ok() {
                let snap = rx.borrow_and_update().clone();
                println!("-- update {} --", snap.cycles);
                if let Some(e) = &snap.error {
                    eprintln!("{e}");
                }
                if snap.fixtures.is_empty() {
                    println!("no live matches");
                }
                for line in &snap.fixtures {
                    println!("{line}");
                }
                seen += 1;
                if cycles > 0 && seen >= cycles {
                    break;
                }
            }
            handle.stop().await;
        }
        Commands::Events { fixture_id } => {
            for event in client.get_fixture_events(fixture_id).await? {
                let who = event
                    .player
                    .as_ref()
                    .and_then(|p| p.name.as_deref())
                    .unwrap_or("-");
                println!(
                    "{:>3}' {:<10} {:<20} {} ({})",
                    event.time.elapsed, event.kind, event.detail, who, event.team.name
                );
            }
        }
        Commands::Standings => {
            for row in client.get_standings().await? {
                println!(
                    "{:>2} {:<24} {:>2} {:>2} {:>2} {:>2} {:>3}:{:<3} {:>+4} {:>3} {}",
                    row.rank, row.name, row.played, row.win, row.draw, row.lose, row.gf, row.ga, row.gd, row.pts, row.form
                );
            }
        }
        Commands::Teams { search } => {
            let view = client.get_teams().await;
            match view.teams {
                Ok(teams) => {
                    for team in search_teams(&teams, search.as_deref().unwrap_or_default()) {
                        let key = team.key().map(|k| k.to_string()).unwrap_or_default();
                        println!("{key:>5} {:<26} {}", team.name, team.subtitle());
                    }
                }
                Err(e) => eprintln!("teams: {e}"),
            }
            if let Err(e) = view.standings {
                eprintln!("standings: {e}");
            }
        }
        Commands::Team { id } => {
            let details = client.get_team_details(id).await?;
            println!("{} ({})", details.team.name, details.team.subtitle());
            println!("{:<20} {:>6} {:>6} {:>6}", "", "Home", "Away", "Total");
            for line in &details.lines {
                println!("{:<20} {:>6} {:>6} {:>6}", line.label, line.home, line.away, line.total);
            }
            println!("Penalties: {}", details.penalties);
            let form: String = details.stats.form_chars().into_iter().collect();
            if !form.is_empty() {
                println!("Form: {form}");
            }
        }
        Commands::Players { search: Some(query) } => {
            let profiles: Vec<PlayerProfile> = client
                .backend()
                .find("players-profiles", &Query::new())
                .await?
                .into_vec();
            match search_player(&profiles, &query) {
                Some(p) => println!("{} {}", p.player_id, p.name),
                None => println!("no player matches {query:?}"),
            }
        }
        Commands::Players { search: None } => {
            let boards = client.get_leaderboards().await?;
            for category in Category::ALL {
                println!("{category}");
                for row in boards.category(category) {
                    println!(
                        "  {:<26} {:<22} {:>6}",
                        row.name,
                        row.team.as_deref().unwrap_or("—"),
                        row.value_label()
                    );
                }
            }
            println!("Top Ratings");
            for row in &boards.ratings {
                println!("  {:<26} {:<22} {:>6}", row.name, row.team.as_deref().unwrap_or("—"), row.value_label());
            }
        }
        Commands::Player { id } => {
            let details = client.get_player_details(id).await?;
            if let Some(p) = &details.profile {
                println!("{} ({})", p.name, p.nationality.as_deref().unwrap_or("—"));
            }
            match details.totals {
                Some(t) => {
                    let rating = t.rating.map(|r| format!("{r:.2}")).unwrap_or_else(|| "—".into());
                    println!("Position     {}", t.position.as_deref().unwrap_or("—"));
                    println!("Rating       {rating}");
                    println!("Appearances  {}", t.appearances);
                    println!("Minutes      {}", t.minutes);
                    println!("Goals        {}", t.goals);
                    println!("Assists      {}", t.assists);
                    println!("Cards        {} yellow, {} red", t.yellow_cards, t.red_cards);
                }
                None => println!("no season stats"),
            }
        }
        Commands::H2h { file } => {
            let matches = client.head_to_head_file(&file)?;
            info!(count = matches.len(), "head-to-head rows");
            for m in matches {
                println!("{} {:<18} {:>22} {} {}", m.date_label(), m.league, m.home, m.score(), m.away);
            }
        }
        Commands::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("signed in as {} ({})", user.email, user.role);
        }
        Commands::Logout => {
            client.logout()?;
            println!("signed out");
        }
    }
    Ok(())
}
