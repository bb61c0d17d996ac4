pub mod api;
pub mod client;
pub mod config;
pub mod logging;
pub mod models;
pub mod server;
pub mod storage;
pub mod task_edit;
pub mod task_list;
pub mod ui;
pub mod validation;
pub mod view_state;
