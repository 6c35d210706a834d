mod enemy;

pub use enemy::{EnemyAi, EnemyState};
