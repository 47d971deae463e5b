pub mod args;
pub mod core;
pub mod cp15;
pub mod cpu_types;
pub mod image;
pub mod memory;
pub mod mmio;
pub mod scheduler;
pub mod stimulus;

// Re-export commonly used types
pub use args::{Args, load_image_data};
pub use core::{EmulatorConfig, EmulatorCore, StopReason};
pub use cpu_types::CpuMode;
pub use mmio::{EmulatorState, GpioState, TimerState, UartState, VicState};
pub use scheduler::{QuantumResult, SchedulerConfig};
pub use stimulus::StimulusConfig;
