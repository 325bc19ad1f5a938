pub mod columns;
pub mod details;
pub mod filters;
pub mod help;
pub mod table;
