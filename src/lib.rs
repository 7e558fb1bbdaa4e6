//! Notepress - a small news and personal notes web service
//!
//! This library provides the core functionality for the Notepress service:
//! a public news feed with user comments and a private per-user notes
//! manager, rendered server-side.

pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod web;
