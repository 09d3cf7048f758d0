pub mod object;
pub mod region;
