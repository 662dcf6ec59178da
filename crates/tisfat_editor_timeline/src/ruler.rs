// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline painting.
//!
//! Features:
//! - Frame ruler with ticks
//! - Layer rows with frameset spans and keyframe markers
//! - Selection highlight
//! - Playhead
//!
//! Everything is produced as `egui::Shape`s in timeline coordinates (origin at
//! the top-left corner of the widget), so it can be painted by any egui
//! painter after translating.

use crate::layer::Layer;
use crate::selection::Selection;
use crate::timeline::{DragOperation, Timeline};
use egui::{pos2, Color32, PointerButton, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::time::Instant;

const BACKGROUND: Color32 = Color32::from_gray(220);
const ROW_EVEN: Color32 = Color32::from_gray(235);
const ROW_ODD: Color32 = Color32::from_gray(225);
const HEADER: Color32 = Color32::from_gray(200);
const FRAMESET_FILL: Color32 = Color32::from_gray(250);
const OUTLINE: Color32 = Color32::from_gray(140);
const SELECTION: Color32 = Color32::from_rgb(40, 230, 255);
const PLAYHEAD: Color32 = Color32::from_rgb(255, 100, 100);
const MINOR_TICK: f32 = 4.0;
const MAJOR_TICK: f32 = 8.0;

/// Paint the timeline into `size` at `now`
pub fn paint_timeline(timeline: &mut Timeline, size: Vec2, now: Instant) -> Vec<Shape> {
    let frame = timeline.frame_for_paint(now);
    let layout = timeline.layout;
    let scroll = timeline.scroll;
    let mut shapes = vec![Shape::rect_filled(Rect::from_min_size(Pos2::ZERO, size), 0.0, BACKGROUND)];

    let visible_frames = ((size.x - layout.header_width) / layout.frame_width).ceil().max(0.0) as u32;
    let first_frame = layout.x_to_frame(layout.header_width, scroll);
    let last_frame = first_frame.saturating_add(visible_frames);

    for (row, layer) in timeline.project().layers().iter().enumerate() {
        let top = layout.layer_top(row, scroll);
        if top + layout.layer_height < layout.ruler_height || top > size.y {
            continue;
        }
        let row_rect = Rect::from_min_max(pos2(layout.header_width, top), pos2(size.x, top + layout.layer_height));
        let fill = if row % 2 == 0 { ROW_EVEN } else { ROW_ODD };
        shapes.push(Shape::rect_filled(row_rect, 0.0, fill));
        paint_layer(&mut shapes, timeline, layer, top, first_frame, last_frame);

        let header = Rect::from_min_max(pos2(0.0, top), pos2(layout.header_width, top + layout.layer_height));
        shapes.push(Shape::rect_filled(header, 0.0, HEADER));
        let [r, g, b] = layer.entity.kind().color();
        let swatch = Rect::from_min_size(header.min + Vec2::splat(3.0), Vec2::splat(layout.layer_height - 6.0));
        shapes.push(Shape::rect_filled(swatch, 0.0, Color32::from_rgb(r, g, b)));
        shapes.push(Shape::line_segment(
            [pos2(0.0, header.max.y), pos2(size.x, header.max.y)],
            Stroke::new(1.0, OUTLINE),
        ));
    }

    paint_ruler(&mut shapes, timeline, size, first_frame, last_frame);

    let x = layout.frame_left(frame, scroll) + layout.frame_width / 2.0;
    if x >= layout.header_width && x <= size.x {
        shapes.push(Shape::line_segment([pos2(x, 0.0), pos2(x, size.y)], Stroke::new(1.0, PLAYHEAD)));
    }

    shapes
}

fn paint_layer(shapes: &mut Vec<Shape>, timeline: &Timeline, layer: &Layer, top: f32, first: u32, last: u32) {
    let layout = timeline.layout;
    let scroll = timeline.scroll;
    let cell = |frame: u32| {
        let left = layout.frame_left(frame as f32, scroll);
        Rect::from_min_max(pos2(left, top + 1.0), pos2(left + layout.frame_width, top + layout.layer_height - 1.0))
    };
    let [r, g, b] = layer.entity.kind().color();
    let key_color = Color32::from_rgb(r, g, b);

    for frameset in layer.framesets() {
        if frameset.end_time() < first || frameset.start_time() > last {
            continue;
        }
        let span = cell(frameset.start_time()).union(cell(frameset.end_time()));
        shapes.push(Shape::rect_filled(span, 0.0, FRAMESET_FILL));
        shapes.push(Shape::rect_stroke(span, 0.0, Stroke::new(1.0, OUTLINE)));
        for keyframe in frameset.keyframes() {
            shapes.push(Shape::rect_filled(cell(keyframe.time).shrink(1.0), 0.0, key_color));
        }
    }

    let selected = match timeline.selection() {
        Selection::Keyframe {
            layer: id,
            frameset,
            keyframe,
        } if id == layer.id => layer.keyframe(frameset, keyframe).map(|k| k.time),
        Selection::BlankFrame { layer: id, time, .. } | Selection::NullFrame { layer: id, time } if id == layer.id => {
            Some(time)
        }
        _ => None,
    };
    if let Some(time) = selected {
        shapes.push(Shape::rect_filled(cell(time).shrink(1.0), 0.0, SELECTION));
    }
}

fn paint_ruler(shapes: &mut Vec<Shape>, timeline: &Timeline, size: Vec2, first: u32, last: u32) {
    let layout = timeline.layout;
    let ruler = Rect::from_min_max(Pos2::ZERO, pos2(size.x, layout.ruler_height));
    shapes.push(Shape::rect_filled(ruler, 0.0, BACKGROUND));

    for frame in first..=last {
        if frame % 5 != 0 {
            continue;
        }
        let x = layout.frame_left(frame as f32, timeline.scroll);
        if x < layout.header_width {
            continue;
        }
        let height = if frame % 10 == 0 { MAJOR_TICK } else { MINOR_TICK };
        shapes.push(Shape::line_segment(
            [pos2(x, layout.ruler_height - height), pos2(x, layout.ruler_height)],
            Stroke::new(1.0, OUTLINE),
        ));
    }
    shapes.push(Shape::line_segment(
        [pos2(0.0, layout.ruler_height), pos2(size.x, layout.ruler_height)],
        Stroke::new(1.0, OUTLINE),
    ));
}

/// Show the timeline in `ui`, forwarding pointer input to the controller
pub fn timeline_ui(ui: &mut egui::Ui, timeline: &mut Timeline) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let origin = rect.min.to_vec2();

    let (pointer, buttons) = ui.input(|i| {
        let pressed = [PointerButton::Primary, PointerButton::Secondary]
            .map(|b| (b, i.pointer.button_pressed(b), i.pointer.button_released(b)));
        (i.pointer.latest_pos(), pressed)
    });
    if let Some(pos) = pointer {
        let local = pos - origin;
        for (button, pressed, _) in buttons {
            if pressed && response.hovered() {
                timeline.mouse_down(local, button);
            }
        }
        timeline.mouse_moved(local);
        for (button, _, released) in buttons {
            if released {
                timeline.mouse_up(local, button);
            }
        }
    }
    if !response.contains_pointer() && timeline.drag_operation() == DragOperation::Scrub {
        timeline.mouse_left();
    }

    let shapes = paint_timeline(timeline, rect.size(), Instant::now());
    let painter = ui.painter_at(rect);
    painter.extend(shapes.into_iter().map(|mut shape| {
        shape.translate(origin);
        shape
    }));

    if timeline.take_redraw_request() {
        ui.ctx().request_repaint();
    }
    response
}
