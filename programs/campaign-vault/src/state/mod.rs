pub mod checkpoint;
pub mod depositor;
pub mod distribution;
pub mod fee_proposal;
pub mod vault;

pub use checkpoint::*;
pub use depositor::*;
pub use distribution::*;
pub use fee_proposal::*;
pub use vault::*;
