//! Data access port trait.

use crate::domain::error::CrossbtError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// All bars of the source, in ascending date order.
    fn fetch_bars(&self) -> Result<Vec<Bar>, CrossbtError>;

    /// Human-readable name of the source, used in logs and errors.
    fn source_name(&self) -> String;
}
