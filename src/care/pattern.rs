//! Base care patterns.
//!
//! A validated [`BasePattern`] answers "who has the child tonight" for any
//! date, given the date the pattern's phase is anchored on.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};
use crate::models::{CareParent, CycleEntryJson, PatternJson, WeekdaySplitJson};

use super::order::parse_weekday;

/// Longest supported custom cycle.
pub const MAX_CYCLE_DAYS: u32 = 56;

/// Overnight owner for each weekday, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSplit([CareParent; 7]);

impl WeekSplit {
    /// Builds a split, requiring every night to be assigned exactly once.
    pub fn new(mother: &[String], father: &[String]) -> EngineResult<Self> {
        let mut owners: [Option<CareParent>; 7] = [None; 7];
        let named = mother
            .iter()
            .map(|day| (day, CareParent::Mother))
            .chain(father.iter().map(|day| (day, CareParent::Father)));

        for (day, parent) in named {
            let weekday = parse_weekday(day)?;
            let slot = &mut owners[weekday.num_days_from_monday() as usize];
            if slot.is_some() {
                return Err(EngineError::malformed(format!(
                    "{weekday} is assigned more than once in a weekday split"
                )));
            }
            *slot = Some(parent);
        }

        let mut split = [CareParent::Mother; 7];
        for (index, owner) in owners.into_iter().enumerate() {
            split[index] = owner.ok_or_else(|| {
                EngineError::malformed(format!(
                    "{} is not assigned in a weekday split",
                    weekday_at(index)
                ))
            })?;
        }
        Ok(Self(split))
    }

    fn from_json(split: &WeekdaySplitJson) -> EngineResult<Self> {
        Self::new(&split.mother, &split.father)
    }

    /// The same week with the parents swapped.
    pub fn reversed(self) -> Self {
        Self(self.0.map(CareParent::other))
    }

    /// Overnight owner for `weekday`.
    pub fn owner(&self, weekday: Weekday) -> CareParent {
        self.0[weekday.num_days_from_monday() as usize]
    }
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_at(index: usize) -> Weekday {
    WEEKDAYS[index % 7]
}

/// A validated recurring base pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BasePattern {
    /// Weekly splits repeating in order, Week A first.
    Weekly(Vec<WeekSplit>),
    /// One owner per cycle day, day 1 first, with carry-over applied.
    Cycle(Vec<CareParent>),
}

impl BasePattern {
    /// Validates a raw pattern.
    ///
    /// # Errors
    ///
    /// Returns `MalformedOrder` for unknown weekday names, splits that do not
    /// cover all seven nights exactly once, cycles outside 1 to 56 days,
    /// cycles without entries, day numbers outside the cycle, or a day number
    /// given to both parents.
    pub fn from_json(pattern: &PatternJson) -> EngineResult<Self> {
        match pattern {
            PatternJson::FixedWeekdaySplit { mother, father } => {
                Ok(BasePattern::Weekly(vec![WeekSplit::new(mother, father)?]))
            }
            PatternJson::WeeklyAlternating { week_a, week_b } => {
                let week_a = WeekSplit::from_json(week_a)?;
                let week_b = match week_b {
                    Some(week_b) => WeekSplit::from_json(week_b)?,
                    None => week_a.reversed(),
                };
                Ok(BasePattern::Weekly(vec![week_a, week_b]))
            }
            PatternJson::CustomRecurrence {
                cycle_length_days,
                entries,
                primary_parent,
            } => Self::cycle(*cycle_length_days, entries, *primary_parent),
        }
    }

    fn cycle(
        length: u32,
        entries: &[CycleEntryJson],
        primary_parent: Option<CareParent>,
    ) -> EngineResult<Self> {
        if !(1..=MAX_CYCLE_DAYS).contains(&length) {
            return Err(EngineError::malformed(format!(
                "cycle_length_days must be between 1 and {MAX_CYCLE_DAYS}, got {length}"
            )));
        }
        if entries.is_empty() {
            return Err(EngineError::malformed("custom recurrence has no entries"));
        }

        let mut changes: Vec<Option<CareParent>> = vec![None; length as usize];
        for entry in entries {
            if entry.day_number == 0 || entry.day_number > length {
                return Err(EngineError::malformed(format!(
                    "day_number {} is outside a {length}-day cycle",
                    entry.day_number
                )));
            }
            let slot = &mut changes[entry.day_number as usize - 1];
            match slot {
                Some(existing) if *existing != entry.overnight_care_owner => {
                    return Err(EngineError::malformed(format!(
                        "day_number {} is assigned to both parents",
                        entry.day_number
                    )));
                }
                _ => *slot = Some(entry.overnight_care_owner),
            }
        }

        // Before the first entry, care carries over from the end of the
        // previous cycle.
        let last_in_cycle = changes.iter().rev().find_map(|owner| *owner);
        let mut current = last_in_cycle
            .or(primary_parent)
            .ok_or_else(|| EngineError::malformed("custom recurrence has no entries"))?;

        let owners = changes
            .into_iter()
            .map(|change| {
                if let Some(owner) = change {
                    current = owner;
                }
                current
            })
            .collect();
        Ok(BasePattern::Cycle(owners))
    }

    /// Overnight owner for the night beginning on `date`.
    ///
    /// Weekly patterns take Week A as the Monday-started week containing
    /// `phase_anchor`; cycles take `phase_anchor` as day 1. Dates before the
    /// anchor continue the pattern backwards.
    pub fn owner_on(&self, date: NaiveDate, phase_anchor: NaiveDate) -> CareParent {
        match self {
            BasePattern::Weekly(weeks) => {
                let week_a_monday = phase_anchor
                    - chrono::Duration::days(i64::from(phase_anchor.weekday().num_days_from_monday()));
                let week = (date - week_a_monday).num_days().div_euclid(7);
                let split = weeks[week.rem_euclid(weeks.len() as i64) as usize];
                split.owner(date.weekday())
            }
            BasePattern::Cycle(owners) => {
                let offset = (date - phase_anchor).num_days().rem_euclid(owners.len() as i64);
                owners[offset as usize]
            }
        }
    }

    /// Days before the pattern repeats.
    pub fn period_days(&self) -> usize {
        match self {
            BasePattern::Weekly(weeks) => weeks.len() * 7,
            BasePattern::Cycle(owners) => owners.len(),
        }
    }
}
