// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.

use std::io::{self, Write};

use veneer_core::trace::{
    AnimationsSampledEvent, FallbackAppliedEvent, FrameBeginEvent, FrameSummary,
    PanZoomAppliedEvent, RemoteTreeEvent, ShadowChange, TraceSink,
};

/// A [`TraceSink`] that writes one line per event.
///
/// Write errors do not interrupt the frame pass; the first one is kept and
/// can be retrieved with [`take_error`](Self::take_error).
#[derive(Debug)]
pub struct PrettyPrintSink<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> PrettyPrintSink<W> {
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

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|()| self.out.write_all(b"\n")) {
            self.error.get_or_insert(e);
        }
    }
}

impl PrettyPrintSink<io::Stderr> {
    /// Creates a sink writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_frame_begin(&mut self, e: &FrameBeginEvent) {
        self.line(format_args!(
            "[frame {}] begin now={} layers_updated={}",
            e.frame_index,
            e.now.ticks(),
            e.layers_updated
        ));
    }

    fn on_animations_sampled(&mut self, e: &AnimationsSampledEvent) {
        self.line(format_args!(
            "[frame {}] animations active={}",
            e.frame_index, e.active
        ));
    }

    fn on_pan_zoom_applied(&mut self, e: &PanZoomAppliedEvent) {
        self.line(format_args!(
            "[frame {}] pan/zoom node={} translate=({:.2}, {:.2}) scale=({:.3}, {:.3}){}",
            e.frame_index,
            e.node_index,
            e.translation.x,
            e.translation.y,
            e.scale.x,
            e.scale.y,
            if e.want_next_frame { " want_next_frame" } else { "" }
        ));
    }

    fn on_fallback_applied(&mut self, e: &FallbackAppliedEvent) {
        self.line(format_args!(
            "[frame {}] fallback node={} offset=({:.2}, {:.2}) scale=({:.3}, {:.3}) shrink=({}, {})",
            e.frame_index,
            e.node_index,
            e.offset.x,
            e.offset.y,
            e.scale_diff.x,
            e.scale_diff.y,
            e.shrink_x,
            e.shrink_y
        ));
    }

    fn on_remote_tree(&mut self, e: &RemoteTreeEvent) {
        self.line(format_args!(
            "remote tree {} node={} {:?}{}",
            e.id.0,
            e.node_index,
            e.op,
            if e.deferred { " (deferred)" } else { "" }
        ));
    }

    fn on_frame_end(&mut self, s: &FrameSummary) {
        let offset = match s.render_offset {
            Some(o) => format!("({:.2}, {:.2})", o.x, o.y),
            None => "-".to_owned(),
        };
        self.line(format_args!(
            "[frame {}] end path={:?} animations={} want_next_frame={} render_offset={} ready={}",
            s.frame_index,
            s.path,
            s.animations_active,
            s.want_next_frame,
            offset,
            s.ready_for_compose
        ));
    }

    fn on_shadow_changes(&mut self, frame_index: u64, changes: &[ShadowChange]) {
        if changes.is_empty() {
            return;
        }
        self.line(format_args!(
            "[frame {frame_index}] {} shadow change(s)",
            changes.len()
        ));
        for c in changes {
            let tree = match c.tree {
                Some(id) => format!("remote {}", id.0),
                None => "local".to_owned(),
            };
            self.line(format_args!("  {tree} node={} {:?}", c.node_index, c.field));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_core::scene::RemoteTreeId;
    use veneer_core::time::HostTime;
    use veneer_core::trace::{FramePath, RemoteTreeOp, ShadowField};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn frame_lines() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_frame_begin(&FrameBeginEvent {
            frame_index: 4,
            now: HostTime(1_000),
            layers_updated: true,
        });
        sink.on_frame_end(&FrameSummary {
            frame_index: 4,
            now: HostTime(1_000),
            animations_active: false,
            path: FramePath::Fallback,
            want_next_frame: false,
            render_offset: None,
            ready_for_compose: true,
        });
        let text = output(sink);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[frame 4] begin now=1000 layers_updated=true");
        assert!(lines[1].contains("path=Fallback"));
        assert!(lines[1].contains("render_offset=-"));
    }

    #[test]
    fn remote_and_shadow_lines() {
        let mut sink = PrettyPrintSink::new(Vec::new());
        sink.on_remote_tree(&RemoteTreeEvent {
            node_index: 2,
            id: RemoteTreeId(9),
            op: RemoteTreeOp::Connected,
            deferred: true,
        });
        sink.on_shadow_changes(0, &[]);
        sink.on_shadow_changes(
            1,
            &[ShadowChange {
                tree: Some(RemoteTreeId(9)),
                node_index: 0,
                field: ShadowField::Opacity,
            }],
        );
        let text = output(sink);
        assert_eq!(
            text,
            "remote tree 9 node=2 Connected (deferred)\n\
             [frame 1] 1 shadow change(s)\n  remote 9 node=0 Opacity\n"
        );
    }

    #[test]
    fn write_errors_are_kept() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut sink = PrettyPrintSink::new(Broken);
        sink.on_animations_sampled(&AnimationsSampledEvent {
            frame_index: 0,
            active: true,
        });
        assert!(sink.take_error().is_some(), "error recorded");
        assert!(sink.take_error().is_none(), "error taken");
    }
}
