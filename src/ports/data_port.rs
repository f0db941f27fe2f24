//! Data access port trait.

use crate::domain::error::TrendscopeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::window::FetchRequest;

pub trait DataPort {
    /// Date-ordered, complete bars inside the requested window.
    ///
    /// An empty vector means the source had nothing for the window; callers
    /// decide whether that is fatal.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        request: &FetchRequest,
    ) -> Result<Vec<OhlcvBar>, TrendscopeError>;
}
