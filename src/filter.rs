use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::dataset::{Dataset, Match};

/// Inclusive date interval; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Undated matches only pass when neither bound is set.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(date) = date else {
            return false;
        };
        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        true
    }
}

/// Snapshot of the user's narrowing criteria. The engine only reads it;
/// transitions build a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected_referee: Option<String>,
    pub compare_referees: Vec<String>,
    pub series: BTreeSet<String>,
    pub arenas: BTreeSet<String>,
    pub date_range: DateRange,
    pub partner_focus: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_referee(&self) -> Option<&str> {
        non_empty(&self.selected_referee)
    }

    /// Partner focus only counts while a referee is selected.
    pub fn active_partner(&self) -> Option<&str> {
        self.selected_referee()?;
        non_empty(&self.partner_focus)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.selected_referee().is_none()
            && self.compare_referees.is_empty()
            && self.series.is_empty()
            && self.arenas.is_empty()
            && self.date_range.is_unbounded()
            && non_empty(&self.partner_focus).is_none()
    }

    /// Changing the referee always drops the partner focus.
    pub fn with_referee(mut self, name: Option<&str>) -> Self {
        self.selected_referee = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.partner_focus = None;
        self
    }

    pub fn toggle_partner_focus(mut self, name: &str) -> Self {
        if self.partner_focus.as_deref() == Some(name) {
            self.partner_focus = None;
        } else {
            self.partner_focus = Some(name.to_string());
        }
        self
    }

    pub fn with_compare<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compare_referees.clear();
        for name in names {
            let name = name.into();
            if !name.is_empty() && !self.compare_referees.contains(&name) {
                self.compare_referees.push(name);
            }
        }
        self
    }

    pub fn with_series<I, S>(mut self, series: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.series = series.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_arenas<I, S>(mut self, arenas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arenas = arenas.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn cleared(self) -> Self {
        Self::default()
    }

    pub fn accepts(&self, m: &Match) -> bool {
        if !self.date_range.contains(m.date) {
            return false;
        }
        if !self.series.is_empty() && !self.series.contains(&m.series) {
            return false;
        }
        if !self.arenas.is_empty() && !self.arenas.contains(&m.arena) {
            return false;
        }
        if let Some(referee) = self.selected_referee() {
            if !m.has_referee(referee) {
                return false;
            }
            if let Some(partner) = self.active_partner()
                && !m.has_referee(partner)
            {
                return false;
            }
        }
        true
    }
}

pub fn filter_matches<'a>(dataset: &'a Dataset, fs: &FilterState) -> Vec<&'a Match> {
    let out: Vec<&Match> = dataset.matches.iter().filter(|m| fs.accepts(m)).collect();
    log::debug!(
        "filter kept {} of {} matches",
        out.len(),
        dataset.matches.len()
    );
    out
}

/// Candidates for the comparison picker: everyone but the selected referee.
pub fn referee_options<'a>(dataset: &'a Dataset, fs: &FilterState) -> Vec<&'a str> {
    let selected = fs.selected_referee();
    dataset
        .all_referees
        .iter()
        .map(String::as_str)
        .filter(|name| Some(*name) != selected)
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
