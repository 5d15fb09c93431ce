pub mod human;
pub mod play;
pub mod replay;
pub mod terminal;
pub mod train;
pub mod watch;

pub use human::HumanMode;
pub use play::{PlayConfig, PlayMode};
pub use replay::ReplayMode;
pub use train::{TrainConfig, TrainMode};
pub use watch::WatchMode;
