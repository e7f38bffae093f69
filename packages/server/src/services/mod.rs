pub mod lifecycle;
pub mod listing;
pub mod slug;
pub mod taxonomy;
