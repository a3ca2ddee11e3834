//! Rule resolvers operating on `&mut GameState`

pub mod capture;
pub mod combat;
pub mod corruption;
pub mod effects;
pub mod ledger;
pub mod victory;
pub mod visibility;

pub use capture::{capture_cost, resolve_capture, CaptureOutcome, CostBreakdown};
pub use combat::{resolve_attack, CombatOutcome};
pub use corruption::{run_spread, SpreadReport};
pub use effects::{apply_effect, validate_effects, EffectContext};
pub use victory::{evaluate, MatchOutcome};
pub use visibility::{update_visibility, visibility_for};
