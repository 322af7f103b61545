pub mod backend;
pub mod posting;
pub mod inverted;
pub mod multi;
pub mod registry;
pub mod builder;
