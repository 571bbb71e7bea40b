pub mod entropy;
pub mod interfaces;
pub mod types;

pub use entropy::{mix_entropy, winning_ticket};
pub use interfaces::{BlockHashResponse, CollectibleExecuteMsg, CollectibleQueryMsg, OracleQueryMsg};
pub use types::DrawStatus;
