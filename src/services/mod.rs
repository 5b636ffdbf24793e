// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

pub mod actions;
pub mod codec;
pub mod listing;
pub mod query;
pub mod readers;
