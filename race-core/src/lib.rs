// Shared race telemetry decoding, reconstruction, and smoothing logic.

pub mod frame;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod smoother;

pub use frame::compose_frame;
pub use model::{FrameRow, Gap, HorseTelemetry, LeaderInfo, RaceFrame, Standings};
pub use parser::decode;
pub use reconstruct::{reconstruct, RaceState, ReconstructedHorse, TrackLayout};
pub use smoother::{PositionSmoother, ScreenPoint};
