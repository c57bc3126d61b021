pub mod booking_ctx;
pub mod booking_flow;
pub mod session;

pub use booking_ctx::BookingCtx;
pub use booking_flow::BookingFlow;
pub use session::{PreparedSession, SessionProbe};
