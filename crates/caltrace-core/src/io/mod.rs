pub mod avi;
pub mod decode;
pub mod preview;
