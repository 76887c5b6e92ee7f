pub mod activity;
pub mod analysis;
pub mod category_tree;
pub mod csv_import;
pub mod households;
pub mod money;
pub mod optimistic;
