//! Core data models for the child support engine.
//!
//! This module contains all the domain models used throughout the engine:
//! assessment inputs and results, raw court orders and care projections.

mod assessment_result;
mod care_result;
mod child;
mod court_order;
mod parent;

pub use assessment_result::{
    AgeGroup, AppliedRate, AuditStep, AuditTrace, AuditWarning, CalculationResult,
    ChildParentResult, ChildResult, CostBandInfo, FtbImpact, NonParentCarerResult, ParentResult,
    PartBEligibility, Payer, PaymentSummary, RateFlags,
};
pub use care_result::{
    AssignmentSource, CareCalculationResult, CareSummary, CareWarning, DayAssignment,
    HolidayAssignment, NightOwner,
};
pub use child::{CARE_TOTAL_TOLERANCE, CarePeriod, Child, ChildCare};
pub use court_order::{
    CareParent, CourtOrderJson, CycleEntryJson, ExceptionJson, HolidayBlock, HolidaySplit,
    ParentRule, PatternJson, WeekdaySplitJson,
};
pub use parent::{IncomeStatus, OtherCase, ParentFinancials, RelevantDependents};
