// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — wires configuration, the gallery, the platform bridge, and
// the capture pipeline together for the command-line front-end.

pub mod app_services;
pub mod data_dir;
