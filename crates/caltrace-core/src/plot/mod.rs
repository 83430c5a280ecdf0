pub mod palette;
pub mod render;
pub mod smooth;
pub mod spec;

pub use render::render_plot;
pub use spec::{PlotSpec, PlotStyle, YAxis};
