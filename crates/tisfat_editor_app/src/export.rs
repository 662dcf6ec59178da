// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation export.
//!
//! Export samples the project at a fixed output rate from time zero up to
//! the last frameset end. Each sample is drawn with `for_render` set, so no
//! editing handles appear. Encoding the frames is left to the caller.

use egui::Shape;
use thiserror::Error;
use tisfat_editor_timeline::Project;

/// Output rate used when none is given
pub const DEFAULT_EXPORT_FPS: f32 = 10.0;

/// Largest number of frames a single export may produce
pub const MAX_EXPORT_FRAMES: usize = 100_000;

/// Export errors
#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    /// Output or project rate is zero, negative or not finite
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),

    /// The output rate would sample more than [`MAX_EXPORT_FRAMES`] frames
    #[error("Export at {fps} fps exceeds {MAX_EXPORT_FRAMES} frames")]
    TooManyFrames {
        /// Requested output rate
        fps: f32,
    },
}

/// A rendered export frame
#[derive(Debug, Clone)]
pub struct ExportFrame {
    /// Index in the output sequence
    pub index: usize,
    /// Project frame time that was drawn
    pub time: f32,
    /// Drawing primitives
    pub shapes: Vec<Shape>,
}

fn check_rate(fps: f32) -> Result<(), ExportError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(())
    } else {
        Err(ExportError::InvalidFrameRate(fps))
    }
}

/// Project frame times sampled at `output_fps`
pub fn frame_schedule(project: &Project, output_fps: f32) -> Result<Vec<f32>, ExportError> {
    check_rate(output_fps)?;
    check_rate(project.fps)?;

    // Compare in f64 so the final sample is not lost to rounding.
    let project_fps = f64::from(project.fps);
    let fps = f64::from(output_fps);
    let last = f64::from(project.last_time());
    let limit = (last * fps / project_fps + 1e-9).floor();
    if !limit.is_finite() || limit >= MAX_EXPORT_FRAMES as f64 {
        return Err(ExportError::TooManyFrames { fps: output_fps });
    }
    let count = limit as usize + 1;

    Ok((0..count).map(|k| (k as f64 * project_fps / fps) as f32).collect())
}

/// Draw every scheduled frame
pub fn render_frames(project: &Project, output_fps: f32) -> Result<Vec<ExportFrame>, ExportError> {
    let schedule = frame_schedule(project, output_fps)?;
    tracing::info!("Rendering {} frames at {output_fps} fps", schedule.len());
    Ok(schedule
        .into_iter()
        .enumerate()
        .map(|(index, time)| ExportFrame {
            index,
            time,
            shapes: project.draw(time, true),
        })
        .collect())
}
