pub mod locator;
pub mod page_driver;

pub use locator::Locator;
pub use page_driver::PageDriver;
