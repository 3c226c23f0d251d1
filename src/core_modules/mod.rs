pub mod annotate;
pub mod blob_detector;
pub mod centering;
pub mod fire_sequencer;
pub mod mask;
pub mod motion_command;
pub mod pixel;
pub mod segmentation;
pub mod smart_blob;
