// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CRM Auth Server - Supabase JWT gate for the CRM API
//!
//! This crate verifies Supabase-issued access tokens against the project's
//! published JWKS and exposes the verified identity to HTTP handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - JWKS fetch, key-set cache, token verification and middleware
//! - `config` - Environment configuration
//! - `error` - Handler and startup errors

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
