//! Mock battery telemetry: snapshot generation and timed streaming.

pub mod mock;
pub mod quick;
pub mod stream;
pub mod vehicles;

pub use mock::{MockBatteryGenerator, PackLayout, TelemetrySource};
pub use quick::QuickScan;
pub use stream::{StreamOptions, TelemetryStream};
pub use vehicles::{is_known_vehicle, DEFAULT_VEHICLE, VEHICLES};
