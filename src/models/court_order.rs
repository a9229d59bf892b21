//! Raw court order models.
//!
//! These types mirror the JSON produced by the external order parsing
//! service. They only describe shape; [`crate::care::ValidatedOrder`] is the
//! checked form the care calculator works from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A parent who can hold overnight care under a court order.
///
/// # Example
///
/// ```
/// use child_support_engine::models::CareParent;
///
/// let parent: CareParent = serde_json::from_str("\"Father\"").unwrap();
/// assert_eq!(parent, CareParent::Father);
/// assert_eq!(parent.other(), CareParent::Mother);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareParent {
    /// The mother.
    #[serde(alias = "Mother", alias = "MOTHER")]
    Mother,
    /// The father.
    #[serde(alias = "Father", alias = "FATHER")]
    Father,
}

impl CareParent {
    /// Returns the other parent.
    pub fn other(self) -> Self {
        match self {
            CareParent::Mother => CareParent::Father,
            CareParent::Father => CareParent::Mother,
        }
    }
}

/// A parsed parenting order.
///
/// # Example
///
/// ```
/// use child_support_engine::models::CourtOrderJson;
///
/// let order = CourtOrderJson::from_json_str(r#"{
///     "start_date": "2026-02-02",
///     "pattern": {
///         "type": "weekly_alternating",
///         "week_a": { "mother": ["mon", "tue", "wed"], "father": ["thu", "fri", "sat", "sun"] }
///     }
/// }"#).unwrap();
/// assert!(order.exceptions.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourtOrderJson {
    /// Date the order's pattern starts cycling from.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// The recurring base pattern.
    pub pattern: PatternJson,
    /// Exception periods overriding the base pattern.
    #[serde(default)]
    pub exceptions: Vec<ExceptionJson>,
}

impl CourtOrderJson {
    /// Parses an order from JSON text.
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::malformed(e.to_string()))
    }

    /// Parses an order from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> EngineResult<Self> {
        serde_json::from_value(value).map_err(|e| EngineError::malformed(e.to_string()))
    }
}

/// Weekday names per parent for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeekdaySplitJson {
    /// Nights with the mother.
    #[serde(default)]
    pub mother: Vec<String>,
    /// Nights with the father.
    #[serde(default)]
    pub father: Vec<String>,
}

/// One entry of a custom recurrence cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleEntryJson {
    /// 1-based position in the cycle.
    pub day_number: u32,
    /// Informational weekday name.
    #[serde(default)]
    pub day_name: Option<String>,
    /// Parent holding care overnight from this day.
    pub overnight_care_owner: CareParent,
}

/// The recurring base pattern of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternJson {
    /// The same weekday split every week.
    FixedWeekdaySplit {
        /// Nights with the mother.
        #[serde(default)]
        mother: Vec<String>,
        /// Nights with the father.
        #[serde(default)]
        father: Vec<String>,
    },
    /// Two weeks alternating; week B defaults to week A reversed.
    WeeklyAlternating {
        /// First week of the fortnight.
        week_a: WeekdaySplitJson,
        /// Second week of the fortnight.
        #[serde(default)]
        week_b: Option<WeekdaySplitJson>,
    },
    /// An arbitrary cycle of days.
    CustomRecurrence {
        /// Cycle length, 1 to 56 days.
        cycle_length_days: u32,
        /// Care changes within the cycle.
        entries: Vec<CycleEntryJson>,
        /// Fallback owner when no entry can be carried over.
        #[serde(default)]
        primary_parent: Option<CareParent>,
    },
}

/// Which parent an exception assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParentRule {
    /// Always the same parent.
    Fixed {
        /// The assigned parent.
        parent: CareParent,
    },
    /// Alternates by calendar year.
    AlternatingYears {
        /// The parent assigned in even years.
        even_years: CareParent,
    },
}

impl ParentRule {
    /// Resolves the rule for the given calendar year.
    pub fn parent_for_year(&self, year: i32) -> CareParent {
        match *self {
            ParentRule::Fixed { parent } => parent,
            ParentRule::AlternatingYears { even_years } if year % 2 == 0 => even_years,
            ParentRule::AlternatingYears { even_years } => even_years.other(),
        }
    }
}

/// A named school holiday block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayBlock {
    /// Between terms 1 and 2.
    #[serde(alias = "term_1")]
    Term1,
    /// Between terms 2 and 3.
    #[serde(alias = "term_2")]
    Term2,
    /// Between terms 3 and 4.
    #[serde(alias = "term_3")]
    Term3,
    /// After term 4.
    Summer,
}

impl HolidayBlock {
    /// Human-readable block name.
    pub fn name(self) -> &'static str {
        match self {
            HolidayBlock::Term1 => "Term 1 Holidays",
            HolidayBlock::Term2 => "Term 2 Holidays",
            HolidayBlock::Term3 => "Term 3 Holidays",
            HolidayBlock::Summer => "Summer Holidays",
        }
    }
}

/// How a school holiday block is divided between the parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HolidaySplit {
    /// One parent for the whole block.
    Whole {
        /// The parent holding the block.
        parent_rule: ParentRule,
    },
    /// Each parent takes one half.
    HalfHalf {
        /// The parent holding the first half.
        first_half: ParentRule,
    },
    /// Whole weeks alternate from the block start.
    AlternatingWeeks {
        /// The parent holding the first week.
        first_week: ParentRule,
    },
}

/// An exception overriding the base pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExceptionJson {
    /// Explicit one-off dates, inclusive.
    DateRange {
        /// First night.
        start: NaiveDate,
        /// Last night.
        end: NaiveDate,
        /// The assigned parent.
        parent: CareParent,
        /// Optional display label.
        #[serde(default)]
        label: Option<String>,
    },
    /// The same calendar days every year, such as Christmas.
    AnnualDates {
        /// Month, 1 to 12.
        month: u32,
        /// First day of month, inclusive.
        start_day: u32,
        /// Last day of month, inclusive.
        end_day: u32,
        /// Who holds the days.
        parent_rule: ParentRule,
        /// Optional display label.
        #[serde(default)]
        label: Option<String>,
    },
    /// State school holiday blocks.
    SchoolHolidays {
        /// Blocks the rule applies to.
        blocks: Vec<HolidayBlock>,
        /// How each block is divided.
        split: HolidaySplit,
        /// Optional display label.
        #[serde(default)]
        label: Option<String>,
    },
}

impl ExceptionJson {
    /// Returns true for exceptions that need state school term dates.
    pub fn references_school_holidays(&self) -> bool {
        matches!(self, ExceptionJson::SchoolHolidays { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_fixed_weekday_split() {
        let order = CourtOrderJson::from_json_str(
            r#"{
                "pattern": {
                    "type": "fixed_weekday_split",
                    "mother": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
                    "father": ["Saturday", "Sunday"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(order.start_date, None);
        match order.pattern {
            PatternJson::FixedWeekdaySplit { mother, father } => {
                assert_eq!(mother.len(), 5);
                assert_eq!(father, vec!["Saturday", "Sunday"]);
            }
            other => panic!("Expected FixedWeekdaySplit, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_custom_recurrence_with_capitalised_parents() {
        let order = CourtOrderJson::from_json_str(
            r#"{
                "start_date": "2026-01-05",
                "pattern": {
                    "type": "custom_recurrence",
                    "cycle_length_days": 14,
                    "entries": [
                        { "day_number": 1, "day_name": "Monday", "overnight_care_owner": "Mother" },
                        { "day_number": 5, "overnight_care_owner": "Father" }
                    ]
                }
            }"#,
        )
        .unwrap();

        match order.pattern {
            PatternJson::CustomRecurrence { entries, primary_parent, .. } => {
                assert_eq!(entries[1].overnight_care_owner, CareParent::Father);
                assert_eq!(primary_parent, None);
            }
            other => panic!("Expected CustomRecurrence, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_exceptions() {
        let order = CourtOrderJson::from_json_str(
            r#"{
                "pattern": { "type": "weekly_alternating", "week_a": { "mother": ["mon"], "father": ["tue"] } },
                "exceptions": [
                    { "type": "date_range", "start": "2026-03-01", "end": "2026-03-03", "parent": "father" },
                    { "type": "annual_dates", "month": 12, "start_day": 25, "end_day": 25,
                      "parent_rule": { "type": "alternating_years", "even_years": "mother" }, "label": "Christmas" },
                    { "type": "school_holidays", "blocks": ["term1", "summer"],
                      "split": { "type": "half_half", "first_half": { "type": "fixed", "parent": "mother" } } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(order.exceptions.len(), 3);
        assert!(!order.exceptions[0].references_school_holidays());
        assert!(order.exceptions[2].references_school_holidays());
    }

    #[test]
    fn test_unknown_pattern_type_is_malformed() {
        let result = CourtOrderJson::from_json_str(
            r#"{ "pattern": { "type": "every_second_tuesday" } }"#,
        );
        assert!(matches!(result, Err(EngineError::MalformedOrder { .. })));
    }

    #[test]
    fn test_unknown_top_level_field_is_malformed() {
        let result = CourtOrderJson::from_json_str(
            r#"{ "pattern": { "type": "fixed_weekday_split" }, "holiday_rules": {} }"#,
        );
        assert!(matches!(result, Err(EngineError::MalformedOrder { .. })));
    }

    #[test]
    fn test_missing_pattern_is_malformed() {
        let result = CourtOrderJson::from_value(serde_json::json!({ "start_date": "2026-01-01" }));
        assert!(matches!(result, Err(EngineError::MalformedOrder { .. })));
    }

    #[test]
    fn test_parent_rule_alternating_years() {
        let rule = ParentRule::AlternatingYears {
            even_years: CareParent::Father,
        };
        assert_eq!(rule.parent_for_year(2026), CareParent::Father);
        assert_eq!(rule.parent_for_year(2027), CareParent::Mother);
    }
}
