//! Uniform variant picker.
//!
//! Background image selection is pseudo-random, so the draw is requested
//! from the shell like any other effect; tests supply fixed replies.

use crux_core::capability::{CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RandomOperation {
    /// Draw a uniform integer in `1..=upper`.
    Uniform { upper: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomOutput(pub u8);

impl Operation for RandomOperation {
    type Output = RandomOutput;
}

pub struct Random<Ev> {
    context: CapabilityContext<RandomOperation, Ev>,
}

impl<Ev> Random<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<RandomOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn uniform<F>(&self, upper: u8, make_event: F)
    where
        F: FnOnce(RandomOutput) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(RandomOperation::Uniform { upper })
                .await;
            context.update_app(make_event(output));
        });
    }
}

impl<Ev> crux_core::capability::Capability<Ev> for Random<Ev> {
    type Operation = RandomOperation;
    type MappedSelf<MappedEv> = Random<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Random::new(self.context.map_event(f))
    }
}
