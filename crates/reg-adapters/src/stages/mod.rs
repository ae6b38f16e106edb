pub mod command;
pub mod train;

pub use command::CommandStage;
pub use train::{default_train_declaration, train_model, TrainOptions, TrainOutput, TrainStage, DEFAULT_DATASET};
