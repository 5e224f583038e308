mod audio;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod scheduler;

pub use audio::{AudioBackend, LoggingAudio};
#[cfg(feature = "audio")]
pub use audio::{AudioError, RodioAudio};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use rendering::{Canvas, RenderSurface, Rgba, TextAlign, TextStyle};
pub use scene::{Scene, SceneCommand};
pub use scheduler::{FrameScheduler, FrameStep};
