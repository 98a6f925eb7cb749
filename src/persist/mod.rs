pub mod debounce;
pub mod storage;

pub use debounce::Debouncer;
pub use storage::Storage;
