mod price_alert;

pub use price_alert::*;
