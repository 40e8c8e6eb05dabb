pub mod egui_canvas;
pub mod theme;
