//! Long-polling dashboard tiles.
//!
//! A [`Poller`] repeatedly fetches `{url_base}/{config_name}/{widget_id}`
//! (suffixed with the last-seen payload hash so the backend can
//! short-circuit unchanged data), hands changed payloads to a
//! [`WidgetHandler`], and schedules the next poll, backing off tenfold
//! after an error. Rendering and view helpers are pure and independent of
//! the loop.

pub mod errors;
pub mod handler;
pub mod metrics_defs;
pub mod params;
pub mod poller;
pub mod render;
pub mod view;

pub use errors::WidgetError;
pub use handler::{SingleValueWidget, WidgetHandler};
pub use params::WidgetParams;
pub use poller::Poller;
pub use render::Template;
pub use view::{Difference, ThresholdState, check_thresholds, set_difference};
