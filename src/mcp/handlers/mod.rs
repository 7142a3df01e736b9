pub mod common;
pub mod get_backlinks_list;
pub mod get_traffic;
pub mod keyword_difficulty;
pub mod keyword_generator;
