pub mod export;
pub mod table;

pub use export::export_csv;
pub use table::render_table;
