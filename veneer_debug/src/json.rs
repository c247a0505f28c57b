// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines trace export.
//!
//! Every event becomes one JSON object on its own line, tagged with an
//! `"event"` field:
//!
//! ```text
//! {"event":"frame_begin","frame_index":0,"layers_updated":true,"now":1000}
//! {"event":"pan_zoom","frame_index":0,"node_index":0,"scale":[2.0,2.0],...}
//! ```

use std::io::{self, Write};

use serde_json::{Value, json};

use veneer_core::trace::{
    AnimationsSampledEvent, FallbackAppliedEvent, FrameBeginEvent, FrameSummary,
    PanZoomAppliedEvent, RemoteTreeEvent, ShadowChange, TraceSink,
};

/// A [`TraceSink`] that writes one JSON object per event and line.
///
/// Write errors do not interrupt the frame pass; the first one is kept and
/// can be retrieved with [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the first write error, if any, and clears it.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: &Value) {
        let result = serde_json::to_writer(&mut self.out, value)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.emit(&json!({
            "event": "frame_begin",
            "frame_index": e.frame_index,
            "now": e.now.ticks(),
            "layers_updated": e.layers_updated,
        }));
    }

    fn on_animations_sampled(&mut self, e: &AnimationsSampledEvent) {
        self.emit(&json!({
            "event": "animations_sampled",
            "frame_index": e.frame_index,
            "active": e.active,
        }));
    }

    fn on_pan_zoom_applied(&mut self, e: &PanZoomAppliedEvent) {
        self.emit(&json!({
            "event": "pan_zoom",
            "frame_index": e.frame_index,
            "node_index": e.node_index,
            "translation": [e.translation.x, e.translation.y],
            "scale": [e.scale.x, e.scale.y],
            "want_next_frame": e.want_next_frame,
        }));
    }

    fn on_fallback_applied(&mut self, e: &FallbackAppliedEvent) {
        self.emit(&json!({
            "event": "fallback",
            "frame_index": e.frame_index,
            "node_index": e.node_index,
            "offset": [e.offset.x, e.offset.y],
            "scale_diff": [e.scale_diff.x, e.scale_diff.y],
            "shrink": [e.shrink_x, e.shrink_y],
        }));
    }

    fn on_remote_tree(&mut self, e: &RemoteTreeEvent) {
        self.emit(&json!({
            "event": "remote_tree",
            "node_index": e.node_index,
            "id": e.id.0,
            "op": format!("{:?}", e.op),
            "deferred": e.deferred,
        }));
    }

    fn on_frame_end(&mut self, s: &FrameSummary) {
        self.emit(&json!({
            "event": "frame_end",
            "frame_index": s.frame_index,
            "now": s.now.ticks(),
            "path": format!("{:?}", s.path),
            "animations_active": s.animations_active,
            "want_next_frame": s.want_next_frame,
            "render_offset": s.render_offset.map(|o| [o.x, o.y]),
            "ready_for_compose": s.ready_for_compose,
        }));
    }

    fn on_shadow_changes(&mut self, frame_index: u64, changes: &[ShadowChange]) {
        let changes: Vec<Value> = changes
            .iter()
            .map(|c| {
                json!({
                    "tree": c.tree.map(|id| id.0),
                    "node_index": c.node_index,
                    "field": format!("{:?}", c.field),
                })
            })
            .collect();
        self.emit(&json!({
            "event": "shadow_changes",
            "frame_index": frame_index,
            "changes": changes,
        }));
    }
}
