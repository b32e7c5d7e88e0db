pub mod api;
pub mod config;
pub mod crosscheck;
pub mod leaf;
pub mod merkle_tree;
