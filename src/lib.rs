pub mod api;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod event;
pub mod ledger;
pub mod logging;
pub mod stopper;
pub mod test_utils;
