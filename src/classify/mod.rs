mod rules;

pub use rules::{availability, classify_row, classify_rows, safe_pick, trend};
