//! Chip drivers.
//!
//! One chip family is supported: the Avalon A3255. The driver is split
//! the way the hardware splits — wire encoding (`protocol`), clock PLL
//! configuration (`clock`), command sequencing (`controller`) and the
//! nonce readback loop (`nonce`).

pub mod a3255;
