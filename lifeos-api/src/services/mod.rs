//! Domain logic shared by several handlers

pub mod ai;
pub mod budget_monitor;
pub mod calendar;
pub mod ics;
pub mod life_context;
pub mod seeds;
pub mod shopping_list;
