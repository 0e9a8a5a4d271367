pub mod handler;
pub mod msg_media_handler;
pub mod msg_room_handler;
pub mod msg_signal_handler;
