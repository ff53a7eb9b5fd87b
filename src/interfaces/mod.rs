//! Edges of the system: the queue wire format and the CSV seed/report files.

pub mod csv;
pub mod json;
