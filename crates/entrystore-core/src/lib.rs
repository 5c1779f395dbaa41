//! Entry Store Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `EntryRecord`, `AuditTrail`, `AuditEvent`, `EntryOutcome`
//! - **Use cases** - `EntryStore`, `CachedEntryStore`, `EntryRequestHandler`
//! - **Port definitions** - Traits for adapters: `IEntryRepository`, `ICacheBackend`
//! - **Configuration** - YAML-backed settings shared by every adapter
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
