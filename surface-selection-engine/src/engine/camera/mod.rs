pub mod selection_camera;
