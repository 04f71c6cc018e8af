//! Client-side core of the OrderMe product catalog.
//!
//! Server data lives in the [`query`] cache, writes go through [`mutation`],
//! and view state is held in the reducer-driven stores under [`ui`].

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod format;
pub mod logging;
pub mod mutation;
pub mod observer;
pub mod query;
pub mod remote;
pub mod storage;
pub mod ui;
