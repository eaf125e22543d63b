pub mod admin;
pub mod calc;
pub mod health;
pub mod records;
pub mod visits;
