//! Risk engine, aggregation, and the reactive surveillance controller.
//!
//! This crate turns raw case and water-quality events into cluster
//! detections, per-village risk scores, and district rollups, and hosts
//! the controller that recomputes all of it after every command.
//!
//! # Modules
//!
//! - [`risk`] -- Pure per-village scoring: clusters, water risk, levels.
//! - [`aggregation`] -- Village stats and the district summary.
//! - [`controller`] -- [`SurveillanceController`]: commands, queries, and
//!   read-model broadcast.
//! - [`validation`] -- Ingestion-boundary checks for inbound reports.
//! - [`outbreak`] -- Scripted outbreak steps and their pause/cancel control.
//! - [`runner`] -- Async driver that paces an outbreak.
//! - [`config`] -- Configuration loading from `arogya-config.yaml`.
//! - [`clock`] -- [`Clock`] trait with system and manual clocks.
//! - [`alerts`] -- Bounded newest-first alert log.
//! - [`seed`] -- Demo dataset used when nothing is persisted.
//!
//! [`SurveillanceController`]: controller::SurveillanceController
//! [`Clock`]: clock::Clock

pub mod aggregation;
pub mod alerts;
pub mod clock;
pub mod config;
pub mod controller;
pub mod outbreak;
pub mod risk;
pub mod runner;
pub mod seed;
pub mod validation;
