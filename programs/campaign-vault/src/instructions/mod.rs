pub mod adapter_admin;
pub mod allocation;
pub mod checkpoint;
pub mod deposit;
pub mod emergency;
pub mod fee_change;
pub mod guardian;
pub mod harvest;
pub mod initialize_vault;
pub mod redeem;

pub use adapter_admin::*;
pub use allocation::*;
pub use checkpoint::*;
pub use deposit::*;
pub use emergency::*;
pub use fee_change::*;
pub use guardian::*;
pub use harvest::*;
pub use initialize_vault::*;
pub use redeem::*;
