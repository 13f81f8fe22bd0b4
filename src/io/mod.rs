/// CSV export of assembled price series.
pub mod export;
