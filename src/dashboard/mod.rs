mod aggregator;
mod app;
mod engine;
mod event;
mod keymap;
mod row_table;
mod sources;
mod ui;

#[cfg(test)]
mod test_support;

pub use aggregator::Aggregator;
pub use app::run;
pub use event::AppEvent;
pub use row_table::RowTable;
pub use sources::Collaborators;
