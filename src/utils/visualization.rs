//! Visualization utilities for reeds_shepp
//!
//! Collects poses and sampled courses as plot layers and renders them with
//! gnuplot in a single 2D axes.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Pose2D, ReedsSheppError, ReedsSheppResult};
use crate::path_planning::reeds_shepp::{Course, Direction};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const FORWARD: &str = RED;
    pub const BACKWARD: &str = ORANGE;
    pub const SAMPLE: &str = GRAY;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::FORWARD, "Path")
    }
}

/// Style for pose rendering: a marker plus a heading tick
#[derive(Debug, Clone)]
pub struct PoseStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    /// Length of the heading tick in world units
    pub heading_length: f64,
    pub caption: String,
}

impl PoseStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.5,
            symbol: 'O',
            heading_length: 1.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_heading_length(mut self, length: f64) -> Self {
        self.heading_length = length;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines {
        x: Vec<f64>,
        y: Vec<f64>,
        style: PathStyle,
    },
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        symbol: char,
        size: f64,
        caption: String,
    },
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            layers: Vec::new(),
            title: String::new(),
            x_label: "X [m]".to_string(),
            y_label: "Y [m]".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Number of layers queued for rendering
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Plot a polyline through the given poses
    pub fn plot_poses(&mut self, poses: &[Pose2D], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: poses.iter().map(|p| p.x).collect(),
            y: poses.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Plot a pose as a marker with a tick pointing along its heading
    pub fn plot_pose(&mut self, pose: &Pose2D, style: &PoseStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: vec![pose.x],
            y: vec![pose.y],
            color: style.color.clone(),
            symbol: style.symbol,
            size: style.size,
            caption: style.caption.clone(),
        });
        let (s, c) = pose.yaw.sin_cos();
        self.layers.push(Layer::Lines {
            x: vec![pose.x, pose.x + style.heading_length * c],
            y: vec![pose.y, pose.y + style.heading_length * s],
            style: PathStyle::new(&style.color, "").with_line_width(2.0),
        });
        self
    }

    pub fn plot_start(&mut self, pose: &Pose2D, heading_length: f64) -> &mut Self {
        self.plot_pose(pose, &PoseStyle::new(colors::START, "Start").with_heading_length(heading_length))
    }

    pub fn plot_goal(&mut self, pose: &Pose2D, heading_length: f64) -> &mut Self {
        self.plot_pose(pose, &PoseStyle::new(colors::GOAL, "Goal").with_heading_length(heading_length))
    }

    /// Plot a sampled course, forward runs and backward runs in different colors
    pub fn plot_course(&mut self, course: &Course) -> &mut Self {
        let mut captioned = (false, false);
        for (direction, poses) in course.runs() {
            let (color, caption, seen) = match direction {
                Direction::Forward => (colors::FORWARD, "Forward", &mut captioned.0),
                Direction::Backward => (colors::BACKWARD, "Backward", &mut captioned.1),
            };
            let caption = if *seen { "" } else { caption };
            *seen = true;
            self.plot_poses(&poses, &PathStyle::new(color, caption));
        }
        self
    }

    /// Plot bare sample positions
    pub fn plot_samples(&mut self, poses: &[Pose2D]) -> &mut Self {
        self.layers.push(Layer::Points {
            x: poses.iter().map(|p| p.x).collect(),
            y: poses.iter().map(|p| p.y).collect(),
            color: colors::SAMPLE.to_string(),
            symbol: '.',
            size: 0.5,
            caption: String::new(),
        });
        self
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> ReedsSheppResult<()> {
        self.render();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| ReedsSheppError::VisualizationError(e.to_string()))
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> ReedsSheppResult<()> {
        self.render();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| ReedsSheppError::VisualizationError(e.to_string()))
    }

    pub fn save_svg(&mut self, path: &str, width: u32, height: u32) -> ReedsSheppResult<()> {
        self.render();
        self.figure
            .save_to_svg(path, width, height)
            .map_err(|e| ReedsSheppError::VisualizationError(e.to_string()))
    }

    /// Rebuild the figure from the queued layers
    fn render(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(
                        x,
                        y,
                        &[
                            Caption(&style.caption),
                            Color(&style.color),
                            LineWidth(style.line_width),
                        ],
                    );
                }
                Layer::Points {
                    x,
                    y,
                    color,
                    symbol,
                    size,
                    caption,
                } => {
                    axes.points(
                        x,
                        y,
                        &[
                            Caption(caption),
                            Color(color),
                            PointSymbol(*symbol),
                            PointSize(*size),
                        ],
                    );
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);
        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::reeds_shepp::ReedsSheppPlanner;

    #[test]
    fn test_visualizer_creation() {
        let vis = Visualizer::new();
        assert!(vis.aspect_ratio.is_some());
        assert_eq!(vis.num_layers(), 0);
    }

    #[test]
    fn test_path_style() {
        let style = PathStyle::new(colors::RED, "Test Path").with_line_width(3.0);
        assert_eq!(style.line_width, 3.0);
        assert_eq!(style.color, colors::RED);
    }

    #[test]
    fn test_pose_adds_marker_and_heading() {
        let mut vis = Visualizer::new();
        vis.plot_start(&Pose2D::origin(), 1.0);
        assert_eq!(vis.num_layers(), 2);
    }

    #[test]
    fn test_course_layers_follow_runs() {
        let planner = ReedsSheppPlanner::with_turning_radius(1.0).unwrap();
        let course = planner
            .plan_course(&Pose2D::origin(), &Pose2D::new(0.0, 0.6, 0.0), 0.1)
            .unwrap();
        let mut vis = Visualizer::new();
        vis.plot_course(&course);
        assert_eq!(vis.num_layers(), course.runs().len());
    }
}
