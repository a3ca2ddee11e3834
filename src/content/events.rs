//! Timed global events

use serde::{Deserialize, Serialize};

use super::effect::EventModifier;
use crate::core::types::Currency;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalEventDef {
    pub id: String,
    pub name: String,
    /// Player turns the event stays active
    pub duration: u32,
    pub modifiers: Vec<EventModifier>,
}

pub fn standard_events() -> Vec<GlobalEventDef> {
    vec![
        GlobalEventDef {
            id: "eclipse".into(),
            name: "Eclipse".into(),
            duration: 4,
            modifiers: vec![EventModifier::SpreadMultiplier(1.5)],
        },
        GlobalEventDef {
            id: "dawn_of_hope".into(),
            name: "Dawn of Hope".into(),
            duration: 3,
            modifiers: vec![EventModifier::SpreadMultiplier(0.5)],
        },
        GlobalEventDef {
            id: "harvest_moon".into(),
            name: "Harvest Moon".into(),
            duration: 3,
            modifiers: vec![EventModifier::Income { currency: Currency::Divinity, amount: 1 }],
        },
        GlobalEventDef {
            id: "pilgrimage".into(),
            name: "Pilgrimage".into(),
            duration: 3,
            modifiers: vec![EventModifier::Income { currency: Currency::Faith, amount: 1 }],
        },
    ]
}
