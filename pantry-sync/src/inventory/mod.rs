//! Live inventory
//!
//! 前台视图：三个订阅 → 一个 [`InventoryView`]，每次快照后 revision 递增。

pub mod live;
pub mod view;

pub use live::LiveInventory;
pub use view::{AreaGroup, InventoryView, OTHERS_GROUP};
