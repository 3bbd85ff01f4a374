mod price_alerts;

pub use price_alerts::*;
