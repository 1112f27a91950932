//! yearplan-core library.
//!
//! Plan model, year calendar, mutation rules, persistence, and the
//! suggestion client behind the `yp` command.
//!
//! # Conventions
//!
//! - **Days**: a day of the plan year is a zero-based `u16` offset from
//!   January 1st. Only the persisted format uses strings.
//! - **Mutation**: functions in [`mutate`] take the current value and return
//!   a new one. Persistence is an explicit [`store::StateStore`] call.
//! - **Errors**: [`error::PlanError`] for domain and storage failures,
//!   `anyhow::Result` for configuration glue.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod mutate;
pub mod store;
pub mod suggest;
