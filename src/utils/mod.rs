pub mod components;
pub mod hashing;
pub mod logging;
pub mod parsing;
pub mod random;
pub mod stream;
pub mod types;
