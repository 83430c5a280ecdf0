pub mod error;
pub mod extract;
pub mod frame;
pub mod io;
pub mod mask;
pub mod normalize;
pub mod pipeline;
pub mod plot;
pub mod session;
pub mod table;

pub use error::{CaltraceError, Result};
pub use frame::{Frame, VideoData};
pub use io::decode::{decode_video, decode_video_path};
pub use mask::{load_mask, Mask, MaskData};
pub use pipeline::{analyze, AnalyzeConfig};
pub use plot::{render_plot, PlotSpec};
pub use table::{export_csv, import_csv, ResultTable};
