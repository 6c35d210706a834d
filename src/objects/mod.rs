mod charge_node;
mod door;
mod hack_box;
mod laser;
mod practice;

pub use charge_node::ChargeNode;
pub use door::Door;
pub use hack_box::HackBox;
pub use laser::{Laser, LaserMode};
pub use practice::{PracticeBody, PracticeNode};
