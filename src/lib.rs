pub mod error;
pub mod escape;
pub mod numerics;
pub mod reference;
pub mod scene;
pub mod signals;
pub mod viewport;

pub use error::ConfigError;
pub use escape::{iterate, iterate_observed, ExitPolicy, IterationResult};
pub use numerics::{ComplexCoord, ComplexDf, ComplexQf, Df, PrecisionMode, Qf, Real};
pub use scene::{Frame, RenderConfig, Scene};
pub use viewport::{Resolution, Viewport};
