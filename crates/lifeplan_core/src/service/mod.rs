//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate normalization, mutation and persistence into command-level
//!   APIs.
//! - Keep UI layers decoupled from storage and repair details.

pub mod debounce;
pub mod note_preview;
pub mod planner_service;
