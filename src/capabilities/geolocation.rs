//! One-shot device position request.
//!
//! The shell owns the permission prompt and the position source; the core
//! only ever asks once per startup pass and treats every failure the same
//! way, by falling through to the fixed fallback city.

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeolocationOperation {
    CurrentPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeolocationOutput {
    Position { lat: f64, lon: f64 },
    /// Permission denied, no provider, or no fix.
    Unavailable { reason: String },
}

impl Operation for GeolocationOperation {
    type Output = GeolocationOutput;
}

pub struct Geolocation<Ev> {
    context: CapabilityContext<GeolocationOperation, Ev>,
}

impl<Ev> Geolocation<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<GeolocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn current_position<F>(&self, make_event: F)
    where
        F: FnOnce(GeolocationOutput) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(GeolocationOperation::CurrentPosition)
                .await;
            context.update_app(make_event(output));
        });
    }
}

impl<Ev> crux_core::capability::Capability<Ev> for Geolocation<Ev> {
    type Operation = GeolocationOperation;
    type MappedSelf<MappedEv> = Geolocation<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Geolocation::new(self.context.map_event(f))
    }
}
