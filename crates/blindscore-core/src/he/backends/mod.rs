pub mod mock;
pub mod rlwe;

pub use mock::MockBackend;
pub use rlwe::RlweBackend;
