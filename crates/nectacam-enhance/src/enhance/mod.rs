// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement module — histogram equalization, contrast stretching, and
// selection dispatch. Every transform reads a `PixelBuffer` and returns a new
// one of identical dimensions.

pub mod contrast;
pub mod dispatch;
pub mod histogram;
