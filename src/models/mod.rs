pub mod account;
pub mod attempt;
pub mod decision;
pub mod loaders;
pub mod log_markers;
pub mod plan;

pub use account::{account_alias, normalize_slot_time, Account, CourtSlot};
pub use attempt::BookingAttempt;
pub use decision::{DecisionCategory, EmailDecision, EmailKind};
pub use loaders::{load_booking_plan, parse_booking_plan};
pub use plan::{BookingPlan, BookingRule, CourtInfo};
