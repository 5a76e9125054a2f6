pub mod error;
pub mod footprint;
pub mod output;
pub mod policy;
pub mod portfolio;
pub mod rides;
