//! Fire-and-forget observability streams.
//!
//! The navigation core publishes grid dumps and path frames for an external
//! visualization consumer. Publication must never block or fail a request:
//! frames are pushed with `try_send` over a bounded channel and silently
//! dropped when no consumer keeps up (or none is attached).

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::core::WorldPoint;
use crate::planning::TrajectoryPoint;

/// Row-major dump of one grid.
#[derive(Clone, Debug)]
pub struct GridFrame {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<f32>,
}

/// One observability frame.
#[derive(Clone, Debug)]
pub enum NavFrame {
    /// Smoothed occupancy grid, published after build.
    OccupancyGrid(GridFrame),
    /// Binary wall grid, published after build.
    WallGrid(GridFrame),
    /// Exploration coverage grid, published after every scan.
    ExplorationGrid(GridFrame),
    /// Polyline of one candidate motion primitive accepted by the search.
    CandidatePath(Vec<WorldPoint>),
    /// The chosen trajectory of a successful plan.
    Trajectory(Vec<TrajectoryPoint>),
}

/// Sending half of the observability stream.
#[derive(Clone, Debug)]
pub struct FramePublisher {
    tx: Sender<NavFrame>,
}

impl FramePublisher {
    /// Create a publisher and its consumer end with a bounded capacity.
    pub fn channel(capacity: usize) -> (FramePublisher, Receiver<NavFrame>) {
        let (tx, rx) = bounded(capacity);
        (FramePublisher { tx }, rx)
    }

    /// Publish a frame; dropped when the channel is full or disconnected.
    pub fn publish(&self, frame: NavFrame) {
        let _ = self.tx.try_send(frame);
    }
}
