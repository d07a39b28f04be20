//! Effect surface of the core.
//!
//! Stock HTTP, key-value and render capabilities carry most of the traffic;
//! the two local ones cover what shells must answer themselves: a uniform
//! random draw for background variants and a one-shot device position.

mod geolocation;
mod random;

pub use self::geolocation::{Geolocation, GeolocationOperation, GeolocationOutput};
pub use self::random::{Random, RandomOperation, RandomOutput};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::app::{App, Event};

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub http: Http<Event>,
    pub key_value: KeyValue<Event>,
    pub render: Render<Event>,
    pub random: Random<Event>,
    pub geolocation: Geolocation<Event>,
}
