// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions, one module per table.
//!
//! Every function takes `&Database` and runs its closure on the single
//! writer thread, so each closure executes atomically with respect to all
//! other callers.

pub mod bookings;
pub mod sessions;
pub mod subscribers;
pub mod vehicles;
