mod entity;
mod fx;
mod scanner;
mod wheel;
mod world;

pub use entity::{
    ActionContext, FieldValue, HackField, Hackable, QuickAction, QuickActionSet, ScanMark,
    TickContext, WorldCommand,
};
pub use fx::{FxMode, FxProfile, ScreenFx};
pub use scanner::{ChargeState, ScanMode, ScannerController, ScannerEvent};
pub use wheel::{HackWheel, WheelDir};
pub use world::{ExecuteError, HackableEntity, HackableId, HackableWorld};
