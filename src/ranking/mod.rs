//! Leaderboard ranking.
//!
//! Orders a snapshot's players by win rate or rating, picks the podium
//! and slices a page. Input order is the snapshot's player-code order and
//! the sort is stable, so ties always resolve the same way.

pub mod pagination;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{PlayerId, PlayerSummary};
use crate::names::matches_query;

pub use pagination::{Pagination, PaginationMeta, DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Minimum plays to be ranked by win rate.
pub const MIN_PLAYS_FOR_WIN_RATE: u64 = 100;

/// Number of players on the podium.
pub const PODIUM_SIZE: usize = 3;

/// Ranking metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    #[default]
    WinRate,
    Rating,
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingMode::WinRate => write!(f, "win_rate"),
            RankingMode::Rating => write!(f, "rating"),
        }
    }
}

impl FromStr for RankingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "win_rate" | "winrate" | "overall_win_rate" => Ok(RankingMode::WinRate),
            "rating" | "rate" | "current_rating" | "versus_rating" => Ok(RankingMode::Rating),
            other => Err(format!("unknown ranking mode: {}", other)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Desc => write!(f, "desc"),
            SortOrder::Asc => write!(f, "asc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => Ok(SortOrder::Desc),
            "asc" | "ascending" => Ok(SortOrder::Asc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Truncation of the ordered list before search and paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankFilter {
    #[default]
    All,
    /// Keep only the first N ranked players
    Top(usize),
}

impl RankFilter {
    fn apply<T>(&self, items: &mut Vec<T>) {
        if let RankFilter::Top(n) = self {
            items.truncate(*n);
        }
    }
}

impl fmt::Display for RankFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankFilter::All => write!(f, "all"),
            RankFilter::Top(n) => write!(f, "top{}", n),
        }
    }
}

impl FromStr for RankFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() || s == "all" {
            return Ok(RankFilter::All);
        }

        s.strip_prefix("top")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(RankFilter::Top)
            .ok_or_else(|| format!("unknown rank filter: {}", s))
    }
}

/// Everything needed to produce a ranking view.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingQuery {
    pub mode: RankingMode,
    pub order: SortOrder,
    pub min_plays: u64,
    pub search: Option<String>,
    pub rank_filter: RankFilter,
    pub pagination: Pagination,
}

impl Default for RankingQuery {
    fn default() -> Self {
        Self {
            mode: RankingMode::default(),
            order: SortOrder::default(),
            min_plays: MIN_PLAYS_FOR_WIN_RATE,
            search: None,
            rank_filter: RankFilter::default(),
            pagination: Pagination::default(),
        }
    }
}

impl RankingQuery {
    pub fn new(mode: RankingMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn min_plays(mut self, min_plays: u64) -> Self {
        self.min_plays = min_plays;
        self
    }

    /// Blank searches are ignored.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn rank_filter(mut self, rank_filter: RankFilter) -> Self {
        self.rank_filter = rank_filter;
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    /// 1-based position in the ordered list
    pub rank: usize,
    pub player_id: PlayerId,
    pub display_name: String,
    pub total_wins: u64,
    pub total_plays: u64,
    pub current_rating: i64,
    pub overall_win_rate: f64,
}

impl RankedPlayer {
    fn new(rank: usize, summary: &PlayerSummary) -> Self {
        Self {
            rank,
            player_id: summary.player_id.clone(),
            display_name: summary.display_name.clone(),
            total_wins: summary.total_wins,
            total_plays: summary.total_plays,
            current_rating: summary.current_rating,
            overall_win_rate: summary.overall_win_rate,
        }
    }
}

/// Podium plus one page of the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingView {
    pub mode: RankingMode,
    pub order: SortOrder,
    pub min_plays: u64,
    pub podium: Vec<RankedPlayer>,
    pub players: Vec<RankedPlayer>,
    pub pagination: PaginationMeta,
}

fn compare(mode: RankingMode, a: &PlayerSummary, b: &PlayerSummary) -> Ordering {
    match mode {
        RankingMode::WinRate => a.overall_win_rate.total_cmp(&b.overall_win_rate),
        RankingMode::Rating => a.current_rating.cmp(&b.current_rating),
    }
}

/// Filter and order players for a ranking mode.
///
/// Win-rate mode drops players below `min_plays`; rating mode keeps
/// everyone. Equal keys keep their input order.
pub fn rank_players<'a, I>(
    players: I,
    mode: RankingMode,
    order: SortOrder,
    min_plays: u64,
) -> Vec<&'a PlayerSummary>
where
    I: IntoIterator<Item = &'a PlayerSummary>,
{
    let mut ranked: Vec<&PlayerSummary> = players
        .into_iter()
        .filter(|p| mode != RankingMode::WinRate || p.is_eligible(min_plays))
        .collect();

    ranked.sort_by(|a, b| match order {
        SortOrder::Desc => compare(mode, b, a),
        SortOrder::Asc => compare(mode, a, b),
    });

    ranked
}

/// Top of an ordered list.
pub fn podium<T: Clone>(ranked: &[T]) -> Vec<T> {
    ranked.iter().take(PODIUM_SIZE).cloned().collect()
}

/// Build the podium and the requested page.
///
/// Ranks are positions after the rank filter and before search, so a
/// searched player keeps the rank they hold on the full board. The podium
/// ignores search and paging.
pub fn build_view<'a, I>(players: I, query: &RankingQuery) -> RankingView
where
    I: IntoIterator<Item = &'a PlayerSummary>,
{
    let ordered = rank_players(players, query.mode, query.order, query.min_plays);

    let mut rows: Vec<RankedPlayer> = ordered
        .iter()
        .enumerate()
        .map(|(i, p)| RankedPlayer::new(i + 1, p))
        .collect();
    query.rank_filter.apply(&mut rows);

    let top = podium(&rows);

    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        rows.retain(|r| matches_query(&needle, r.player_id.as_str(), &r.display_name));
    }

    let pagination = query.pagination.clamp_to(rows.len());
    let meta = PaginationMeta::new(&pagination, rows.len());
    let page = pagination.slice(&rows).to_vec();

    RankingView {
        mode: query.mode,
        order: query.order,
        min_plays: query.min_plays,
        podium: top,
        players: page,
        pagination: meta,
    }
}
