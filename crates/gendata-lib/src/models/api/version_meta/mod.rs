pub mod generated;
pub mod vanilla;
