pub mod csv_loader;

pub use csv_loader::load_bars_from_csv;
