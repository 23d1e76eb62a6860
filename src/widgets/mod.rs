pub mod controls;
pub mod debug;
pub mod facet_grid;
pub mod facet_rows;
pub mod header;
pub mod string_counts;
