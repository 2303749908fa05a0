pub mod item;
pub mod item_id;
pub mod rate;
