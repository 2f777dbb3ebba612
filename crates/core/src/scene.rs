//! Scene bootstrap: camera, lighting and the labelled axis triad.
//!
//! Produces a renderer-agnostic [`SceneLayout`]; front-ends turn it into
//! their own primitives.

use crate::config::SceneConfig;
use crate::core_types::vec3::{Vec3, X_HAT, Y_HAT, Z_HAT};
use serde::{Deserialize, Serialize};

/// Linear RGB colour, components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    /// Dark green used for the axis triad
    pub const AXIS_GREEN: Rgb = Rgb::new(0.0, 102.0 / 255.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Mouse camera controls shown under the canvas
pub const CAMERA_CAPTION: &str = "Drag right mouse button to rotate view\n\
Drag right + left mouse button or mouse wheel to zoom in and out\n\
Drag left mouse button + Shift to translate view\n\n";

/// Label offset as a fraction of the axis length
const LABEL_OFFSET: f64 = 0.06;
/// Label height as a fraction of the axis length
const LABEL_HEIGHT: f64 = 0.2;

/// Camera placement
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub pos: Vec3,
    /// Look direction (points from the camera to the scene centre)
    pub axis: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

/// Point light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub pos: Vec3,
    pub color: Rgb,
}

/// Billboard text label
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: &'static str,
    pub pos: Vec3,
    pub height: f64,
    pub color: Rgb,
}

/// One arrow of the coordinate triad
#[derive(Debug, Clone, PartialEq)]
pub struct AxisArrow {
    pub pos: Vec3,
    pub axis: Vec3,
    pub color: Rgb,
}

/// Everything a renderer needs to set up the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub camera: Camera,
    pub light: Light,
    /// Empty when axes are disabled
    pub axes: Vec<AxisArrow>,
    /// Empty when axes are disabled
    pub labels: Vec<Label>,
    pub title: Option<String>,
    pub caption: Option<&'static str>,
    /// Axis length the scene was scaled to
    pub axis_scale: f64,
}

impl SceneLayout {
    /// Build the layout for `config`
    pub fn bootstrap(config: &SceneConfig) -> Self {
        let length = config.axes_length;
        let cam_pos = Vec3::new(2.0, -2.0, 2.0) * (config.zoom_out_factor * length);

        let (axes, labels) = if config.axes {
            draw_axes(length)
        } else {
            (Vec::new(), Vec::new())
        };

        Self {
            width: config.width,
            height: config.height,
            background: config.background,
            camera: Camera {
                pos: cam_pos,
                axis: -cam_pos,
                up: Z_HAT,
                forward: -X_HAT,
            },
            light: Light {
                pos: Vec3::new(15.0, 0.0, 0.0),
                color: Rgb::WHITE,
            },
            axes,
            labels,
            title: config.title.clone(),
            caption: config.caption.then_some(CAMERA_CAPTION),
            axis_scale: length,
        }
    }
}

/// Axis triad of `length` with "x", "y", "z" labels just beyond each tip
fn draw_axes(length: f64) -> (Vec<AxisArrow>, Vec<Label>) {
    let offset = LABEL_OFFSET * length;
    let specs = [
        ("x", X_HAT, Vec3::new(0.0, offset, 0.0)),
        ("y", Y_HAT, Vec3::new(offset, 0.0, 0.0)),
        ("z", Z_HAT, Vec3::new(offset, 0.0, 0.0)),
    ];

    let mut axes = Vec::with_capacity(3);
    let mut labels = Vec::with_capacity(3);
    for (text, dir, label_offset) in specs {
        let arrow = AxisArrow {
            pos: Vec3::zeros(),
            axis: dir * length,
            color: Rgb::AXIS_GREEN,
        };
        labels.push(Label {
            text,
            pos: arrow.pos + arrow.axis + label_offset,
            height: LABEL_HEIGHT * length,
            color: arrow.color,
        });
        axes.push(arrow);
    }
    (axes, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_default_layout() {
        let layout = SceneLayout::bootstrap(&SceneConfig::default());
        assert_eq!((layout.width, layout.height), (800, 800));
        assert_eq!(layout.background, Rgb::WHITE);
        assert_eq!(layout.camera.pos, Vec3::new(2.0, -2.0, 2.0));
        assert_eq!(layout.camera.axis, Vec3::new(-2.0, 2.0, -2.0));
        assert_eq!(layout.camera.up, Z_HAT);
        assert_eq!(layout.light.pos, Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(layout.axes.len(), 3);
        assert_eq!(layout.caption, Some(CAMERA_CAPTION));
    }

    #[test]
    fn test_labels_sit_past_axis_tips() {
        let config = SceneConfig {
            axes_length: 2.0,
            ..SceneConfig::default()
        };
        let layout = SceneLayout::bootstrap(&config);
        let x = &layout.labels[0];
        assert_eq!(x.text, "x");
        assert_abs_diff_eq!(x.pos, Vec3::new(2.0, 0.12, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(x.height, 0.4, epsilon = 1e-12);
        let z = &layout.labels[2];
        assert_abs_diff_eq!(z.pos, Vec3::new(0.12, 0.0, 2.0), epsilon = 1e-12);
        assert!(layout.axes.iter().all(|a| a.color == Rgb::AXIS_GREEN));
    }

    #[test]
    fn test_hidden_axes_and_no_caption() {
        let config = SceneConfig {
            axes: false,
            caption: false,
            zoom_out_factor: 3.0,
            title: Some("Spin echo".to_string()),
            ..SceneConfig::default()
        };
        let layout = SceneLayout::bootstrap(&config);
        assert!(layout.axes.is_empty());
        assert!(layout.labels.is_empty());
        assert!(layout.caption.is_none());
        assert_eq!(layout.title.as_deref(), Some("Spin echo"));
        assert_eq!(layout.camera.pos, Vec3::new(6.0, -6.0, 6.0));
    }
}
