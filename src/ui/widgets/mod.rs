//! Custom widgets

mod sparkline;

pub use sparkline::PriceSparkline;
