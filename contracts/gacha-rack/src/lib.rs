pub mod assignment;
pub mod contract;
pub mod error;
pub mod execute;
pub mod flow;
pub mod ledger;
pub mod msg;
pub mod query;
pub mod selector;
pub mod state;

pub use crate::error::{ContractError, ErrorKind};
