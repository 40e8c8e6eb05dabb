/// Interactive view engine: scales, zoom history, graph sets and the panel
pub mod canvas;
pub mod graph_set;
pub mod image_view;
pub mod panel;
pub mod scale;
pub mod view_data;
pub mod widget;

pub use canvas::{ArrowType, Canvas, DrawOp, RecordingCanvas};
pub use graph_set::{Annotation, Frame, GraphSet, ViewEvent};
pub use image_view::ImageView;
pub use panel::{Key, PanelData};
pub use scale::ScaleData;
pub use view_data::{ScaleTarget, ViewData};
pub use widget::{PlotWidget, WidgetKind, Widgets};
