pub mod options;
pub mod rset;
pub mod decider;
pub mod results;
pub mod matcher;
pub mod expand;
pub mod enquire;
