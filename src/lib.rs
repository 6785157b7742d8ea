//! Scrolling text, symbols, and buffered animations for serpentine-wired LED matrices.
//!
//! The crate is organized around [`LedMatrix`](matrix::LedMatrix), which owns:
//!
//! - a pending frame in physical strip order ([`Surface`](surface::Surface)),
//! - an optional toroidal [`OffscreenBuffer`](buffer::OffscreenBuffer) for procedural animations,
//! - the 7×7 [`GlyphStore`](glyph::GlyphStore) used by the text renderer,
//! - your [`LedStrip`](matrix::LedStrip) driver and an async delay provider.
//!
//! # Glossary
//!
//! - **Serpentine:** wiring where even rows run left to right and odd rows run right to left,
//!   so the strip snakes through the panel. See [`surface::layout`].
//! - **Escape:** a `\` followed by one character inside rendered text. `\0`..`\9` draw a
//!   symbol glyph; `\w \r \g \b \y \m \c` switch the active color. See [`text`].
//! - **Frame delay / hold delay:** the wait between animation frames and the wait after the
//!   last frame. Defaults come from [`MatrixConfig`](matrix::MatrixConfig).
//! - **Border cell:** the extra row and column on each side of the offscreen buffer.
//!
//! # Features
//!
//! - `log` (default): diagnostics through the [`log`](https://docs.rs/log) facade.
//! - `defmt`: diagnostics through [`defmt`](https://docs.rs/defmt) instead.
//! - `host`: `std` helpers for previews and tests ([`to_png`], [`host`]).
#![cfg_attr(not(any(test, feature = "host")), no_std)]
#![allow(async_fn_in_trait, reason = "single-threaded embedded")]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod buffer;
pub mod color;
pub mod effects;
mod error;
pub mod glyph;
#[cfg(any(test, feature = "host"))]
pub mod host;
pub mod matrix;
pub mod scroll;
pub mod surface;
pub mod text;
#[cfg(feature = "host")]
pub mod to_png;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

/// RGB color type used by every frame, cell, and strip write.
#[doc(inline)]
pub use smart_leds::RGB8;
