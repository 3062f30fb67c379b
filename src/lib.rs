//! Heliocast — solar irradiance forecasting and weather stability analysis.
//!
//! Converts an already-fetched hourly weather series (temperature, cloud
//! cover, shortwave radiation, plus optional channels) and a geographic
//! point into an hour-by-hour irradiance forecast with per-hour confidence,
//! and independently summarizes the series into trend, alert, and quality
//! signals. Everything in here is a pure function of its inputs: no
//! fetching, no caching, no hidden state.

pub mod analysis;
pub mod atmosphere;
pub mod forecast;
pub mod server;
pub mod solar;
pub mod tuning;
pub mod weather;
