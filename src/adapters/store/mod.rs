pub mod csv_seed;
pub mod memory;

pub use memory::InMemoryStore;
