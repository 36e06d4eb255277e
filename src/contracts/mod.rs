pub mod query;
pub mod service;

pub use query::*;
pub use service::ContractService;
