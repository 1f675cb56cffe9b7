//! Planner use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and the pure engine into use-case APIs.
//! - Keep CLI layers decoupled from storage details.

pub mod dish_service;
pub mod menu_service;
pub mod shopping_service;
