pub mod clients;
pub mod forms;
pub mod responses;
