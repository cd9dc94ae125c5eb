pub mod block;
pub mod dashboard;
pub mod export;
pub mod harvest;
pub mod login;
pub mod school;
