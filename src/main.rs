use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use versus_board::api::{build_router, state::AppState};
use versus_board::calculate::{build_trend, compute_daily_deltas, summarize_history, TrendKind};
use versus_board::config::{parse_interval, AppConfig, SourceKind};
use versus_board::fetch::{BoardClient, SnapshotParams};
use versus_board::loader::load_snapshot;
use versus_board::models::{BoardSnapshot, PlayerId};
use versus_board::ranking::{build_view, Pagination, RankFilter, RankingMode, RankingQuery, SortOrder};
use versus_board::source::{self, DataSource};

#[derive(Parser)]
#[command(name = "versus-board")]
#[command(about = "Versus leaderboard and player statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Data source: "dir" or "http" (overrides config)
    #[arg(long)]
    source: Option<SourceKind>,

    /// Backend URL for the http source (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,

        /// Reload the snapshot periodically (e.g., "10m")
        #[arg(long)]
        reload_interval: Option<String>,
    },

    /// Print the leaderboard
    Ranking {
        /// Ranking mode: "win_rate" or "rating"
        #[arg(long, default_value = "win_rate")]
        mode: RankingMode,

        /// Sort order: "desc" or "asc"
        #[arg(long, default_value = "desc")]
        order: SortOrder,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long)]
        per_page: Option<u32>,

        /// Filter by player code or name
        #[arg(long)]
        search: Option<String>,

        /// "all", "top10", "top50", "top100"
        #[arg(long, default_value = "all")]
        rank_filter: RankFilter,

        /// Minimum plays for win-rate ranking (overrides config)
        #[arg(long)]
        min_plays: Option<u64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one player's summary
    Player {
        /// Player code or display name
        query: String,

        #[arg(long)]
        json: bool,
    },

    /// Suggest players matching a partial code or name
    Suggest { query: String },

    /// Show daily history for one player
    History {
        /// Player code or display name
        query: String,

        /// Limit to the most recent N days
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Print a player's chart series
    Trend {
        /// Player code or display name
        query: String,

        /// "daily", "rating" or "win_rate"
        #[arg(long, default_value = "daily")]
        kind: TrendKind,

        #[arg(long)]
        json: bool,
    },

    /// List the source's player files
    Files,

    /// Query the remote backend's ranked stats snapshot
    Snapshot {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        per_page: Option<u32>,

        #[arg(long)]
        sort_by: Option<String>,

        #[arg(long)]
        sort_order: Option<String>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        rank_filter: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(kind) = cli.source {
        config.source.kind = kind;
    }
    if let Some(url) = &cli.base_url {
        config.source.base_url = url.clone();
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting versus-board v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
            reload_interval,
        } => {
            let reload = match reload_interval {
                Some(s) => match parse_interval(&s) {
                    Some(d) => Some(d),
                    None => bail!("Invalid --reload-interval: {}", s),
                },
                None => config.reload_interval(),
            };
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let source = source::from_config(&config)?;
            let state = AppState::load(source, config).await;
            if let Some(interval) = reload {
                tracing::info!("Reloading snapshot every {:?}", interval);
                state.spawn_reload(interval);
            }

            let mut app = build_router(state);
            if access_log {
                app = app.layer(TraceLayer::new_for_http());
            }

            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Ranking {
            mode,
            order,
            page,
            per_page,
            search,
            rank_filter,
            min_plays,
            json,
        } => {
            let (_, snapshot) = load(&config).await?;
            let query = RankingQuery::new(mode)
                .order(order)
                .min_plays(min_plays.unwrap_or(config.ranking.min_plays_for_win_rate))
                .search(search.unwrap_or_default())
                .rank_filter(rank_filter)
                .pagination(Pagination::new(
                    Some(page),
                    Some(per_page.unwrap_or(config.ranking.per_page)),
                ));
            let view = build_view(snapshot.players(), &query);

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            println!("\n=== Podium ({}) ===", view.mode);
            for p in &view.podium {
                println!(
                    "  {}. {} ({})  {:.2}%  rating {}",
                    p.rank, p.display_name, p.player_id, p.overall_win_rate, p.current_rating
                );
            }

            println!(
                "\n=== Ranking: page {}/{} ({} players) ===",
                view.pagination.current_page,
                view.pagination.total_pages.max(1),
                view.pagination.total_count
            );
            println!(
                "{:>4}  {:<12} {:<20} {:>8} {:>8} {:>8} {:>8}",
                "#", "Code", "Name", "Wins", "Plays", "Win %", "Rating"
            );
            for p in &view.players {
                println!(
                    "{:>4}  {:<12} {:<20} {:>8} {:>8} {:>8.2} {:>8}",
                    p.rank,
                    p.player_id,
                    p.display_name,
                    p.total_wins,
                    p.total_plays,
                    p.overall_win_rate,
                    p.current_rating
                );
            }
            if view.mode == RankingMode::WinRate {
                println!("\n(players with fewer than {} plays are not ranked)", view.min_plays);
            }
        }
        Commands::Player { query, json } => {
            let (_, snapshot) = load(&config).await?;
            let Some(player) = snapshot.find(&query) else {
                bail!("Player not found: {}", query);
            };

            if json {
                println!("{}", serde_json::to_string_pretty(player)?);
                return Ok(());
            }

            println!("\n=== {} ({}) ===", player.display_name, player.player_id);
            println!("Total wins:   {}", player.total_wins);
            println!("Total plays:  {}", player.total_plays);
            println!("Win rate:     {:.2}%", player.overall_win_rate);
            println!("Rating:       {}", player.current_rating);
            if let Some(latest) = player.latest() {
                println!(
                    "Latest day:   {}  {}W / {}P  ({:+})",
                    latest.timestamp(),
                    latest.wins(),
                    latest.plays(),
                    latest.rating_change()
                );
            }
        }
        Commands::Suggest { query } => {
            let (_, snapshot) = load(&config).await?;
            let matches = snapshot.suggest(&query);
            if matches.is_empty() {
                println!("No players match {:?}", query);
            }
            for p in matches {
                println!("{:<12} {}", p.player_id, p.display_name);
            }
        }
        Commands::History { query, days, json } => {
            let (source, snapshot) = load(&config).await?;
            let player_id = resolve_player(&snapshot, &query);
            let history = source
                .player_history(&player_id, days)
                .await
                .with_context(|| format!("Player not found: {}", query))?;
            let daily = compute_daily_deltas(&history);
            let stats = summarize_history(&daily);

            if json {
                let body = serde_json::json!({
                    "player_id": player_id,
                    "history": history,
                    "daily": daily,
                    "stats": stats,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            println!(
                "\n=== {} ({}) last {} days ===",
                snapshot.names().resolve_name(player_id.as_str()),
                player_id,
                stats.days
            );
            println!("{:<12} {:>8} {:>8} {:>8} {:>8}", "Date", "Wins", "Plays", "Win %", "Rating");
            for d in &daily {
                println!(
                    "{:<12} {:>8} {:>8} {:>8.2} {:>8}",
                    d.date, d.daily_wins, d.daily_plays, d.daily_win_rate, d.rating
                );
            }
            println!(
                "\nTotal: {}W / {}P ({:.2}%), rating change {:+}",
                stats.total_wins, stats.total_plays, stats.win_rate, stats.rating_change
            );
        }
        Commands::Trend { query, kind, json } => {
            let (_, snapshot) = load(&config).await?;
            let Some(player) = snapshot.find(&query) else {
                bail!("Player not found: {}", query);
            };
            let series = build_trend(&player.records, kind);

            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
                return Ok(());
            }

            let names: Vec<&str> = series.datasets.iter().map(|d| d.name.as_str()).collect();
            println!("\n=== {} trend for {} ===", kind, player.display_name);
            println!("{:<12} {}", "Date", names.join("  "));
            for (i, label) in series.labels.iter().enumerate() {
                let values: Vec<String> = series
                    .datasets
                    .iter()
                    .map(|d| format!("{:.2}", d.values[i]))
                    .collect();
                println!("{:<12} {}", label, values.join("  "));
            }
        }
        Commands::Files => {
            let source = source::from_config(&config)?;
            for file in source.list_files().await? {
                println!("{}", file);
            }
        }
        Commands::Snapshot {
            page,
            per_page,
            sort_by,
            sort_order,
            search,
            rank_filter,
        } => {
            let client = BoardClient::new(config.client_config())?;
            let params = SnapshotParams {
                page,
                per_page,
                sort_by,
                sort_order,
                search,
                rank_filter,
            };
            let result = client.stats_snapshot(&params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn load(config: &AppConfig) -> Result<(Arc<dyn DataSource>, BoardSnapshot)> {
    let source = source::from_config(config)?;
    let snapshot = load_snapshot(Arc::clone(&source), &config.loader_config()).await;
    Ok((source, snapshot))
}

/// Exact code, then display name, then the raw query.
fn resolve_player(snapshot: &BoardSnapshot, query: &str) -> PlayerId {
    match snapshot.find(query) {
        Some(player) => player.player_id.clone(),
        None => PlayerId::new(snapshot.names().resolve_id(query.trim())),
    }
}
