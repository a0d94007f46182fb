//! Statistics Calculator Module
//! Computes KPIs, grouped counts and map bubbles from a filtered view.

use crate::data::{
    Category, Dimension, FilterSelection, FilteredView, GeoPoint, GeoRecord, JoinKey,
    JoinedRecord, Record, TopN,
};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Dimensions shown as grouped counts.
pub const GROUPED_DIMENSIONS: [Dimension; 4] = [
    Dimension::ContractStatus,
    Dimension::Course,
    Dimension::City,
    Dimension::State,
];

/// Headline numbers for the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kpis {
    pub total: usize,
    pub active: usize,
    /// Share of active students, rounded to one decimal; 0 when there are no rows.
    pub active_percent: f64,
    pub cities: usize,
    pub states: usize,
    pub courses: usize,
}

/// One bar / table row.
#[derive(Debug, Clone, PartialEq)]
pub struct CountEntry {
    pub category: Category,
    pub count: usize,
}

/// Counts per value of one dimension, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedCounts {
    pub dimension: Dimension,
    pub entries: Vec<CountEntry>,
}

impl GroupedCounts {
    pub fn empty(dimension: Dimension) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Count non-blank values. Ties are broken alphabetically on the normalized
    /// value so the order never depends on input order or hashing.
    pub fn from_records<'a>(dimension: Dimension, rows: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut counts: HashMap<&'a Category, usize> = HashMap::new();
        for record in rows {
            let category = record.category(dimension);
            if !category.is_blank() {
                *counts.entry(category).or_insert(0) += 1;
            }
        }

        let mut entries: Vec<CountEntry> = counts
            .into_iter()
            .map(|(category, count)| CountEntry {
                category: category.clone(),
                count,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        Self { dimension, entries }
    }

    pub fn top(&self, n: usize) -> &[CountEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.entries.first().map(|e| e.count).unwrap_or(0)
    }
}

/// Students per city at the city's position.
#[derive(Debug, Clone, PartialEq)]
pub struct CityBubble {
    pub join_key: JoinKey,
    pub city: Category,
    pub state: Category,
    pub point: GeoPoint,
    pub count: usize,
}

/// Students per state at the mean position of the state's geo-valid rows.
#[derive(Debug, Clone, PartialEq)]
pub struct StateBubble {
    pub state: Category,
    pub point: GeoPoint,
    pub count: usize,
}

/// A sized point on the bubble map.
pub trait MapBubble {
    fn label(&self) -> String;
    fn point(&self) -> GeoPoint;
    fn count(&self) -> usize;
}

impl MapBubble for CityBubble {
    fn label(&self) -> String {
        format!("{} - {}", self.city, self.state)
    }

    fn point(&self) -> GeoPoint {
        self.point
    }

    fn count(&self) -> usize {
        self.count
    }
}

impl MapBubble for StateBubble {
    fn label(&self) -> String {
        self.state.to_string()
    }

    fn point(&self) -> GeoPoint {
        self.point
    }

    fn count(&self) -> usize {
        self.count
    }
}

/// Everything the presentation layer needs for one render pass.
#[derive(Debug, Clone)]
pub struct Summary {
    pub kpis: Kpis,
    pub by_status: GroupedCounts,
    pub by_course: GroupedCounts,
    pub by_city: GroupedCounts,
    pub by_state: GroupedCounts,
    pub bubbles: Vec<CityBubble>,
    pub state_bubbles: Vec<StateBubble>,
    pub top_n_cities: TopN,
    pub top_n_states: TopN,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.kpis.total == 0
    }

    pub fn top_cities(&self) -> &[CountEntry] {
        self.by_city.top(self.top_n_cities.get())
    }

    pub fn top_states(&self) -> &[CountEntry] {
        self.by_state.top(self.top_n_states.get())
    }
}

/// Handles aggregate calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    pub fn compute_kpis(rows: &[&Record], active_statuses: &[String]) -> Kpis {
        let active_keys: HashSet<String> = active_statuses
            .iter()
            .map(|s| Category::new(s).key().to_string())
            .collect();

        let total = rows.len();
        let active = rows
            .iter()
            .filter(|r| active_keys.contains(r.contract_status.key()))
            .count();
        let active_percent = if total > 0 {
            (active as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };

        Kpis {
            total,
            active,
            active_percent,
            cities: Self::distinct(rows, Dimension::City),
            states: Self::distinct(rows, Dimension::State),
            courses: Self::distinct(rows, Dimension::Course),
        }
    }

    fn distinct(rows: &[&Record], dimension: Dimension) -> usize {
        rows.iter()
            .map(|r| r.category(dimension))
            .filter(|c| !c.is_blank())
            .map(Category::key)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Grouped counts for every dimension, computed in parallel.
    pub fn compute_all_counts_parallel(rows: &[&Record]) -> HashMap<Dimension, GroupedCounts> {
        GROUPED_DIMENSIONS
            .par_iter()
            .map(|&dimension| {
                (
                    dimension,
                    GroupedCounts::from_records(dimension, rows.iter().copied()),
                )
            })
            .collect()
    }

    /// Aggregate geo-valid rows per join key, largest first.
    pub fn city_bubbles<'a>(rows: impl IntoIterator<Item = &'a GeoRecord>) -> Vec<CityBubble> {
        let mut by_key: HashMap<&'a JoinKey, CityBubble> = HashMap::new();
        for row in rows {
            by_key
                .entry(&row.record.join_key)
                .and_modify(|bubble| bubble.count += 1)
                .or_insert_with(|| CityBubble {
                    join_key: row.record.join_key.clone(),
                    city: row.record.city.clone(),
                    state: row.record.state.clone(),
                    point: row.point,
                    count: 1,
                });
        }

        let mut bubbles: Vec<CityBubble> = by_key.into_values().collect();
        bubbles.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.join_key.cmp(&b.join_key)));
        bubbles
    }

    /// Aggregate geo-valid rows per state, placed at the mean position.
    /// Largest first, ties by normalized state.
    pub fn state_bubbles<'a>(rows: impl IntoIterator<Item = &'a GeoRecord>) -> Vec<StateBubble> {
        // (first label seen, sum of latitudes, sum of longitudes, rows)
        let mut by_state: HashMap<&'a str, (&'a Category, f64, f64, usize)> = HashMap::new();
        for row in rows {
            let state = &row.record.state;
            if state.is_blank() {
                continue;
            }
            let entry = by_state.entry(state.key()).or_insert((state, 0.0, 0.0, 0));
            entry.1 += row.point.latitude();
            entry.2 += row.point.longitude();
            entry.3 += 1;
        }

        let mut bubbles: Vec<StateBubble> = by_state
            .into_values()
            .filter_map(|(state, lat_sum, lon_sum, count)| {
                let n = count as f64;
                GeoPoint::new(lat_sum / n, lon_sum / n).map(|point| StateBubble {
                    state: state.clone(),
                    point,
                    count,
                })
            })
            .collect();
        bubbles.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));
        bubbles
    }

    /// Build the summary for one render pass.
    pub fn summarize(
        view: &FilteredView<'_, JoinedRecord>,
        geo: &FilteredView<'_, GeoRecord>,
        selection: &FilterSelection,
        active_statuses: &[String],
    ) -> Summary {
        let rows: Vec<&Record> = view.iter().map(|row| &row.record).collect();

        let kpis = Self::compute_kpis(&rows, active_statuses);
        let mut counts = Self::compute_all_counts_parallel(&rows);
        let mut take = |dimension: Dimension| {
            counts
                .remove(&dimension)
                .unwrap_or_else(|| GroupedCounts::empty(dimension))
        };

        Summary {
            kpis,
            by_status: take(Dimension::ContractStatus),
            by_course: take(Dimension::Course),
            by_city: take(Dimension::City),
            by_state: take(Dimension::State),
            bubbles: Self::city_bubbles(geo.iter()),
            state_bubbles: Self::state_bubbles(geo.iter()),
            top_n_cities: selection.top_n_cities,
            top_n_states: selection.top_n_states,
        }
    }
}
