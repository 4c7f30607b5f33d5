pub mod contract;

pub use contract::{ScoutContract, connect, connect_with_signer, signer_address};
