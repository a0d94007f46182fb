//! Filter Engine
//! Conjunctive per-column set membership over loaded rows.

use super::model::{Category, Dimension, Record};
use std::collections::{BTreeMap, BTreeSet};

pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

/// Truncation length for a ranked list, always within `[TOP_N_MIN, TOP_N_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN(usize);

impl TopN {
    pub fn new(n: usize) -> Self {
        Self(n.clamp(TOP_N_MIN, TOP_N_MAX))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(TOP_N_DEFAULT)
    }
}

/// The selection made in the sidebar for one render pass.
///
/// A dimension with no selected values is unrestricted. Values within a
/// dimension are OR-ed, dimensions are AND-ed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, BTreeSet<Category>>,
    pub top_n_cities: TopN,
    pub top_n_states: TopN,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSelection::select`] for several raw values.
    pub fn with<'v>(mut self, dimension: Dimension, values: impl IntoIterator<Item = &'v str>) -> Self {
        for value in values {
            self.select(dimension, Category::new(value));
        }
        self
    }

    pub fn with_top_n(mut self, cities: usize, states: usize) -> Self {
        self.top_n_cities = TopN::new(cities);
        self.top_n_states = TopN::new(states);
        self
    }

    pub fn select(&mut self, dimension: Dimension, value: Category) {
        self.selected.entry(dimension).or_default().insert(value);
    }

    pub fn deselect(&mut self, dimension: Dimension, value: &Category) {
        if let Some(values) = self.selected.get_mut(&dimension) {
            values.remove(value);
            if values.is_empty() {
                self.selected.remove(&dimension);
            }
        }
    }

    pub fn is_selected(&self, dimension: Dimension, value: &Category) -> bool {
        self.selected
            .get(&dimension)
            .is_some_and(|values| values.contains(value))
    }

    /// Selected values for a dimension; empty means unrestricted.
    pub fn selected(&self, dimension: Dimension) -> impl Iterator<Item = &Category> {
        self.selected.get(&dimension).into_iter().flatten()
    }

    pub fn clear(&mut self, dimension: Dimension) {
        self.selected.remove(&dimension);
    }

    pub fn is_unrestricted(&self) -> bool {
        self.selected.values().all(BTreeSet::is_empty)
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.selected
            .iter()
            .all(|(dimension, values)| values.is_empty() || values.contains(record.category(*dimension)))
    }

    /// Keep the rows that satisfy every restricted dimension, in input order.
    pub fn apply<'a, T: AsRef<Record>>(&self, rows: &'a [T]) -> FilteredView<'a, T> {
        let rows = if self.is_unrestricted() {
            rows.iter().collect()
        } else {
            rows.iter().filter(|row| self.matches((*row).as_ref())).collect()
        };
        FilteredView { rows }
    }
}

/// Raised when a selection leaves nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyResultWarning;

/// Rows of the current render pass, borrowed from the cached dataset.
#[derive(Debug)]
pub struct FilteredView<'a, T> {
    rows: Vec<&'a T>,
}

impl<'a, T> FilteredView<'a, T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[&'a T] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.rows.iter().copied()
    }

    pub fn empty_warning(&self) -> Option<EmptyResultWarning> {
        self.is_empty().then_some(EmptyResultWarning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(city: &str, state: &str, course: &str) -> Record {
        Record::new(
            Category::new(city),
            Category::new(state),
            Category::new("EAD"),
            Category::new("VIGENTE"),
            Category::new(course),
        )
    }

    fn rows() -> Vec<Record> {
        vec![
            record("Campinas", "SP", "Direito"),
            record("Natal", "RN", "Direito"),
            record("Santos", "SP", "Pedagogia"),
            record("Recife", "PE", "Pedagogia"),
        ]
    }

    fn cities<'a>(view: &FilteredView<'a, Record>) -> Vec<&'a str> {
        view.iter().map(|r| r.city.label()).collect()
    }

    #[test]
    fn empty_selection_is_identity() {
        let data = rows();
        let view = FilterSelection::new().apply(&data);
        assert_eq!(cities(&view), vec!["Campinas", "Natal", "Santos", "Recife"]);
        assert!(view.empty_warning().is_none());
    }

    #[test]
    fn empty_dimension_imposes_no_constraint() {
        let data = rows();
        let by_state = FilterSelection::new().with(Dimension::State, ["SP"]);
        let by_state_and_no_course = FilterSelection::new()
            .with(Dimension::State, ["SP"])
            .with(Dimension::Course, []);
        assert_eq!(
            cities(&by_state.apply(&data)),
            cities(&by_state_and_no_course.apply(&data))
        );
        assert_eq!(cities(&by_state.apply(&data)), vec!["Campinas", "Santos"]);
    }

    #[test]
    fn or_within_and_across_dimensions() {
        let data = rows();
        let selection = FilterSelection::new()
            .with(Dimension::State, ["SP", "PE"])
            .with(Dimension::Course, ["pedagogia"]);
        assert_eq!(cities(&selection.apply(&data)), vec!["Santos", "Recife"]);
    }

    #[test]
    fn no_match_gives_empty_view_and_warning() {
        let data = rows();
        let selection = FilterSelection::new()
            .with(Dimension::State, ["RN"])
            .with(Dimension::City, ["Campinas"]);
        let view = selection.apply(&data);
        assert!(view.is_empty());
        assert_eq!(view.empty_warning(), Some(EmptyResultWarning));
    }

    #[test]
    fn deselecting_last_value_lifts_restriction() {
        let mut selection = FilterSelection::new().with(Dimension::State, ["SP"]);
        selection.deselect(Dimension::State, &Category::new("sp"));
        assert!(selection.is_unrestricted());
        assert_eq!(selection.selected(Dimension::State).count(), 0);
    }

    #[test]
    fn top_n_is_clamped() {
        assert_eq!(TopN::new(1).get(), TOP_N_MIN);
        assert_eq!(TopN::new(99).get(), TOP_N_MAX);
        assert_eq!(TopN::new(12).get(), 12);
        assert_eq!(TopN::default().get(), 10);
    }
}
