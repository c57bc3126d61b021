pub mod toml_loader;

pub use toml_loader::{load_booking_plan, parse_booking_plan};
