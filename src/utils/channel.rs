use tokio::sync::broadcast::{self, Sender};

use crate::rotation::engine::RotationEvent;


const BUFFER_SIZE: usize = 50;
pub fn run() -> Sender<RotationEvent> {
    let (rotation_sender, _) = broadcast::channel(BUFFER_SIZE);
    rotation_sender
}
