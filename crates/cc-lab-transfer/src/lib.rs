pub mod lifecycle;

pub use lifecycle::{TransferRole, TransferTask};
