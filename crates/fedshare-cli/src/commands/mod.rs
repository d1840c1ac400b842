pub mod shared;
pub mod tsconfig;
pub mod version;
