///! Team captains and the rules that decide which players they boost
///!
///! The captain list is loaded once at startup, from a local JSON dump or
///! from the paged captains endpoint, and never refreshed.

mod dataset;
mod eligibility;

pub use dataset::{CaptainSet, CaptainsEndpoint, load_captains};
pub use eligibility::{EligibilityRule, EligibilityRules, MLB_TEAMS, SwitchHitterRule, TeamRule};
